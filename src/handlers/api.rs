//! Public JSON endpoints used by the institutional site: the contact form and published
//! articles. No session. Errors here are bare JSON (a list of messages or a string), not the
//! admin error envelope.

use crate::auth::recaptcha;
use crate::error::AppError;
use crate::models::PublicationRow;
use crate::service::{contacts, publications};
use crate::state::AppState;
use crate::validation::contacts::{validate_contact_message, ContactMessage};
use crate::validation::publications::{check_api_params, ApiPublicationParams};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const RECAPTCHA_FAILED: &str = "No se pudo validar el reCaptcha";
pub const MESSAGE_SENT: &str = "Mensaje enviado";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 with the list of messages.
    #[error("{}", .0.join(" "))]
    Messages(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Server(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Messages(messages) => (StatusCode::BAD_REQUEST, Json(messages)).into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, Json(message)).into_response(),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, Json(message)).into_response(),
            ApiError::Server(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::BadRequest(m) => ApiError::BadRequest(m),
            AppError::Validation(m) => ApiError::Messages(m),
            AppError::NotFound(m) => ApiError::NotFound(m),
            other => {
                tracing::error!(error = %other, "public api failure");
                ApiError::Server("No se pudo hacer la conexión con la base de datos. Reintente".into())
            }
        }
    }
}

/// POST /api/messages/
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(message) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let errors = validate_contact_message(&message);
    if !errors.is_empty() {
        return Err(ApiError::Messages(errors));
    }
    let solved = recaptcha::verify(&state.http, &state.settings.recaptcha_secret, &message.recaptcha_token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "reCAPTCHA unavailable");
            false
        });
    if !solved {
        return Err(ApiError::Messages(vec![RECAPTCHA_FAILED.into()]));
    }
    contacts::create_contact(&state.pool, &message).await?;
    Ok((StatusCode::CREATED, Json(MESSAGE_SENT)))
}

#[derive(Debug, Serialize)]
pub struct PublicationsPage {
    pub data: Vec<PublicationRow>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// GET /api/publications/
pub async fn list_publications(
    State(state): State<AppState>,
    Query(params): Query<ApiPublicationParams>,
) -> Result<Json<PublicationsPage>, ApiError> {
    let query = check_api_params(&params).map_err(ApiError::BadRequest)?;
    let page = publications::get_publications_api(&state.pool, &query).await?;
    Ok(Json(PublicationsPage {
        data: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

/// GET /api/publications/:id
pub async fn show_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicationRow>, ApiError> {
    Ok(Json(publications::get_published(&state.pool, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_keep_their_public_shape() {
        assert!(matches!(
            ApiError::from(AppError::NotFound("Publicación no encontrada".into())),
            ApiError::NotFound(m) if m == "Publicación no encontrada"
        ));
        assert!(matches!(
            ApiError::from(AppError::Validation(vec!["a".into()])),
            ApiError::Messages(m) if m.len() == 1
        ));
        assert!(matches!(ApiError::from(AppError::Internal("x".into())), ApiError::Server(_)));
    }
}
