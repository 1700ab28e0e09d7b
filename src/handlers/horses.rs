//! Horses: listing, registration, edition and activation.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::horses;
use crate::state::AppState;
use crate::validation::horses::HorseForm;
use crate::validation::team::ListParams;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

/// GET /horses
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require("horse_index")?;
    Ok(success_page(horses::search_horses(&state.pool, &params).await?))
}

/// GET /horses/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("horse_show")?;
    Ok(success_one_ok(horses::get_horse(&state.pool, id).await?))
}

/// POST /horses
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<HorseForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("horse_create")?;
    let horse = horses::create_horse(&state.pool, form).await?;
    Ok(created_with_message(horse, "Caballo registrado exitosamente"))
}

/// PUT /horses/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<HorseForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("horse_update")?;
    let horse = horses::modify_horse(&state.pool, id, form).await?;
    Ok(with_message(horse, "Caballo modificado exitosamente"))
}

/// POST /horses/:id/toggle
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("horse_update")?;
    let horse = horses::toggle_active(&state.pool, id).await?;
    let message = if horse.active {
        "El caballo fue activado"
    } else {
        "El caballo fue desactivado"
    };
    Ok(with_message(horse, message))
}
