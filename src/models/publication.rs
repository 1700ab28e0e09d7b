use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Publication {
    pub id: i64,
    pub publication_date: Option<DateTime<Utc>>,
    pub creation_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author_id: i64,
    pub state: String,
}

/// A publication with the author's alias.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PublicationRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub publication: Publication,
    pub author: String,
}
