//! Charges collected from riders.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::charges;
use crate::state::AppState;
use crate::validation::charges::{ChargeFilter, ChargeForm};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

/// GET /charges
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<ChargeFilter>,
) -> Result<impl IntoResponse, AppError> {
    user.require("charge_index")?;
    Ok(success_page(charges::order_and_filter_charges(&state.pool, &filter).await?))
}

/// GET /charges/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("charge_show")?;
    Ok(success_one_ok(charges::get_charge(&state.pool, id).await?))
}

/// POST /charges
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<ChargeForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("charge_create")?;
    let charge = charges::create_charge(&state.pool, &form).await?;
    Ok(created_with_message(charge, "Cobro registrado exitosamente"))
}

/// PUT /charges/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<ChargeForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("charge_update")?;
    let charge = charges::update_charge(&state.pool, id, &form).await?;
    Ok(with_message(charge, "Cobro modificado exitosamente"))
}

/// DELETE /charges/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("charge_destroy")?;
    charges::delete_charge(&state.pool, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Cobro eliminado exitosamente"))
}
