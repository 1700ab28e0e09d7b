//! Payments made by the institution. Administracion only.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::payments;
use crate::state::AppState;
use crate::validation::payments::{PaymentFilter, PaymentForm};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

/// GET /payments
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<PaymentFilter>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_page(payments::order_and_filter_payments(&state.pool, &filter).await?))
}

/// GET /payments/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_one_ok(payments::get_payment(&state.pool, id).await?))
}

/// POST /payments
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<PaymentForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let payment = payments::create_payment(&state.pool, &form).await?;
    Ok(created_with_message(payment, "Pago registrado exitosamente"))
}

/// PUT /payments/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<PaymentForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let payment = payments::update_payment(&state.pool, id, &form).await?;
    Ok(with_message(payment, "Pago modificado exitosamente"))
}

/// DELETE /payments/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    payments::delete_payment(&state.pool, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Pago eliminado exitosamente"))
}
