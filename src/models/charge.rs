use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Charge {
    pub id: i64,
    pub rider_id: i64,
    pub charge_date: NaiveDate,
    pub payment_method: String,
    pub amount: f64,
    pub receiver_id: i64,
    pub observations: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

/// Listing row: the charge with rider and receiver names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChargeRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub charge: Charge,
    pub rider_name: String,
    pub rider_last_name: String,
    pub receiver_name: String,
    pub receiver_last_name: String,
    pub rider_has_debt: bool,
}
