use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub profession: String,
    pub address: String,
    pub telephone: String,
    pub locality: String,
    pub job_position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub emergency_contact_name: String,
    pub emergency_contact_num: String,
    pub social_insurance: String,
    pub affiliate_num: i64,
    pub condition: String,
    pub active: bool,
    pub inserted_at: DateTime<Utc>,
    pub user_id: Option<i64>,
}

/// Option rows for select inputs (receivers, beneficiaries, trainers).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmployeeSummary {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub dni: String,
    pub job_position: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}
