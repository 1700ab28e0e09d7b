//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Field-by-field validation messages, surfaced to the user as-is.
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("Debe iniciar sesión")]
    Unauthorized,
    #[error("Email y/o contraseña incorrectas")]
    InvalidCredentials,
    #[error("No tiene permiso para acceder a este sitio")]
    Forbidden,
    /// Forbidden with a specific reason (blocked user, pending registration).
    #[error("{0}")]
    Denied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Amazona/Jinete no encontrado")]
    RiderNotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("No se pudo hacer conexión con el almacenamiento de archivos.")]
    Storage(String),
    #[error("{0}")]
    External(String),
    #[error("Algo salió mal en el servidor, reintente")]
    Internal(String),
}

impl AppError {
    /// Validation error from a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    /// Ok when `messages` is empty, otherwise a validation error carrying them.
    pub fn check(messages: Vec<String>) -> Result<(), AppError> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages))
        }
    }

    /// A unique-constraint violation (Postgres `23505`) becomes a conflict carrying `message`.
    pub fn conflict_on_unique(e: sqlx::Error, message: &str) -> Self {
        match e.as_database_error() {
            Some(db) if db.is_unique_violation() => AppError::Conflict(message.to_string()),
            _ => AppError::Db(e),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized | AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden | AppError::Denied(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::RiderNotFound => (StatusCode::NOT_FOUND, "rider_not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Storage(_) => (StatusCode::BAD_GATEWAY, "storage_error"),
            AppError::External(_) => (StatusCode::BAD_GATEWAY, "external_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let details = match &self {
            AppError::Validation(errors) => Some(serde_json::json!({ "errors": errors })),
            _ => None,
        };
        let message = match &self {
            AppError::Db(sqlx::Error::RowNotFound) => "No encontrado".to_string(),
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                "Algo salió mal en el servidor, reintente".to_string()
            }
            AppError::Storage(e) => {
                tracing::warn!(error = %e, "object storage error");
                self.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                self.to_string()
            }
            _ => self.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_carries_messages() {
        let err = AppError::Validation(vec!["uno".into(), "dos".into()]);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"]["code"], "validation_error");
        assert_eq!(v["error"]["details"]["errors"][1], "dos");
    }

    #[test]
    fn row_not_found_is_404() {
        let resp = AppError::Db(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23505".into())
        }
        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = AppError::conflict_on_unique(sqlx::Error::Database(Box::new(DuplicateKey)), "DNI repetido");
        assert!(matches!(&err, AppError::Conflict(m) if m == "DNI repetido"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert!(matches!(
            AppError::conflict_on_unique(sqlx::Error::RowNotFound, "DNI repetido"),
            AppError::Db(sqlx::Error::RowNotFound)
        ));
    }

    #[test]
    fn check_passes_on_empty() {
        assert!(AppError::check(vec![]).is_ok());
        assert!(matches!(
            AppError::check(vec!["x".into()]),
            Err(AppError::Validation(m)) if m.len() == 1
        ));
    }
}
