//! Publications for the public site, managed by editors and administrators.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::publications;
use crate::state::AppState;
use crate::validation::publications::{PublicationForm, PublicationListParams};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

/// GET /publications
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<PublicationListParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require("publication_index")?;
    Ok(success_page(publications::search_and_order_publications(&state.pool, &params).await?))
}

/// GET /publications/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("publication_show")?;
    Ok(success_one_ok(publications::get_publication(&state.pool, id).await?))
}

/// POST /publications
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<PublicationForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("publication_create")?;
    let publication = publications::create_publication(&state.pool, &form).await?;
    Ok(created_with_message(publication, "Publicación creada exitosamente"))
}

/// PUT /publications/:id. Editors may only change their own publications.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<PublicationForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("publication_update")?;
    let publication =
        publications::update_publication(&state.pool, id, &form, user.user_id(), user.session.is_admin()).await?;
    Ok(with_message(publication, "Publicación modificada exitosamente"))
}

/// DELETE /publications/:id. Administracion only.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    publications::delete_publication(&state.pool, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Publicación eliminada exitosamente"))
}
