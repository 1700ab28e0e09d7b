//! Candidates for the selectors of the horse, institutional work, charge and payment forms.

use crate::config::HORSE_TRAINER_POSITION;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{success_many, success_one_ok};
use crate::service::{charges, horses, registration, team};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

/// GET /options/horse-form: active trainers and conductors.
pub async fn horse_form(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("horse_index")?;
    Ok(success_one_ok(serde_json::json!({
        "trainers": team::get_employees_by_job_position(&state.pool, HORSE_TRAINER_POSITION).await?,
        "conductors": team::get_conductors(&state.pool).await?,
    })))
}

/// GET /options/institutional-work
pub async fn institutional_work(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_index")?;
    Ok(success_one_ok(registration::work_options(&state.pool).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AvailableHorsesParams {
    pub headquarters: String,
    pub proposal: String,
}

/// GET /options/available-horses?headquarters=&proposal=
pub async fn available_horses(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AvailableHorsesParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_index")?;
    Ok(success_many(
        horses::available_horses(&state.pool, params.headquarters.trim(), params.proposal.trim()).await?,
    ))
}

/// GET /options/charge-form
pub async fn charge_form(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("charge_index")?;
    Ok(success_one_ok(charges::form_options(&state.pool).await?))
}

/// GET /options/employees: active employees, the payment beneficiaries.
pub async fn employees(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_many(team::get_active_employees(&state.pool).await?))
}

