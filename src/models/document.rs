//! Documents attached to employees, riders and horses. The three tables share one shape.

use crate::config::{EMPLOYEE_FILE_TYPE, HORSE_DOCUMENT_TYPES, RIDER_DOCUMENT_TYPES};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    File,
    Link,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::File => "file",
            DocumentFormat::Link => "link",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOwner {
    Employee,
    Rider,
    Horse,
}

impl DocumentOwner {
    pub fn table(self) -> &'static str {
        match self {
            DocumentOwner::Employee => "employee_documents",
            DocumentOwner::Rider => "rider_documents",
            DocumentOwner::Horse => "horse_documents",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            DocumentOwner::Employee => "employee_id",
            DocumentOwner::Rider => "rider_id",
            DocumentOwner::Horse => "horse_id",
        }
    }

    pub fn owner_table(self) -> &'static str {
        match self {
            DocumentOwner::Employee => "employees",
            DocumentOwner::Rider => "riders",
            DocumentOwner::Horse => "horses",
        }
    }

    /// Accepted `type` values; employee documents are not categorized.
    pub fn types(self) -> Option<&'static [&'static str]> {
        match self {
            DocumentOwner::Employee => None,
            DocumentOwner::Rider => Some(RIDER_DOCUMENT_TYPES),
            DocumentOwner::Horse => Some(HORSE_DOCUMENT_TYPES),
        }
    }

    /// Type stored when the form sends none.
    pub fn default_type(self) -> &'static str {
        match self {
            DocumentOwner::Employee => EMPLOYEE_FILE_TYPE,
            _ => "",
        }
    }

    pub fn not_found(self) -> &'static str {
        match self {
            DocumentOwner::Employee => "Empleado no encontrado",
            DocumentOwner::Rider => "Amazona/Jinete no encontrado",
            DocumentOwner::Horse => "Caballo no encontrado",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub doc_type: String,
    /// `file` or `link`.
    pub format: String,
    /// Object name for files, the URL for links.
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl Document {
    pub fn is_file(&self) -> bool {
        self.format == DocumentFormat::File.as_str()
    }
}
