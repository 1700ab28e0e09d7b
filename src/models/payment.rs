use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub beneficiary_id: Option<i64>,
    pub amount: f64,
    pub payment_date: NaiveDate,
    pub payment_type: String,
    pub description: String,
    pub inserted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    /// "{name} {last_name} {dni}" of the beneficiary, when there is one.
    pub beneficiary: Option<String>,
}
