//! Follow-up of the messages received through the public contact form.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{success_one_ok, success_page, with_message};
use crate::service::contacts;
use crate::state::AppState;
use crate::validation::contacts::{ContactFilter, ContactUpdateForm};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

/// GET /contacts
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<ContactFilter>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_page(contacts::list_contacts(&state.pool, &filter).await?))
}

/// GET /contacts/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_one_ok(contacts::get_contact(&state.pool, id).await?))
}

/// PUT /contacts/:id: state and comment.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<ContactUpdateForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let contact = contacts::update_contact(&state.pool, id, &form).await?;
    Ok(with_message(contact, "Consulta actualizada exitosamente"))
}

/// DELETE /contacts/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    contacts::delete_contact(&state.pool, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Consulta eliminada exitosamente"))
}
