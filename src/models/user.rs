use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// bcrypt hash; `None` for accounts registered through Google.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub alias: String,
    pub active: bool,
    pub system_admin: bool,
    pub google_logged: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A user together with role names, as shown on the profile and user pages.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingUser {
    pub id: i64,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}
