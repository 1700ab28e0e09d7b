use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Horse {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub breed: String,
    pub fur: String,
    pub acquisition_type: String,
    pub entry_date: NaiveDate,
    pub sede: String,
    pub rider_type: String,
    pub active: bool,
    pub trainer_id: Option<i64>,
    pub conductor_id: Option<i64>,
}

/// A horse with its trainer and conductor names resolved.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HorseRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub horse: Horse,
    pub trainer_name: Option<String>,
    pub conductor_name: Option<String>,
}
