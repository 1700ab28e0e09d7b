//! Riders: listing, detail, deletion and the five registration sections.
//!
//! The first-time flow is `POST /riders` followed by one `POST /riders/:id/<step>?token=` per
//! section. Each answer carries the next step and a one-time token kept in the session; a step
//! without the matching token is refused. The `PUT` variants edit a section at any time.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::models::Rider;
use crate::response::{created_with_message, success_one_ok, success_page, with_message, with_next_step};
use crate::service::registration::{
    self, REGISTRATION_DONE, STEP_DISABILITY, STEP_INSTITUTIONAL_WORK, STEP_INSURANCE_AND_SCHOOL, STEP_TUTORS,
};
use crate::service::riders;
use crate::state::AppState;
use crate::validation::riders::{DisabilityForm, InstitutionalWorkForm, InsuranceSchoolForm, PersonalDataForm, TutorsForm};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::collections::HashMap;

pub const INVALID_STEP_TOKEN: &str = "El enlace de registro no es válido o ya fue utilizado";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StepToken {
    pub token: String,
}

/// GET /riders
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_index")?;
    Ok(success_page(riders::index(&state.pool, &params).await?))
}

/// GET /riders/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_show")?;
    Ok(success_one_ok(riders::show(&state.pool, id).await?))
}

/// DELETE /riders/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_destroy")?;
    riders::delete(&state.pool, state.storage.as_ref(), id).await?;
    Ok(with_message(
        serde_json::json!({ "id": id }),
        "El jinete ha sido eliminado correctamente",
    ))
}

async fn next_step(
    state: &AppState,
    user: &CurrentUser,
    rider: Rider,
    message: String,
    step: &str,
) -> Result<axum::response::Response, AppError> {
    let token = state
        .sessions
        .issue_step_token(&user.session_id, step, rider.id)
        .await
        .ok_or(AppError::Unauthorized)?;
    Ok(with_next_step(rider, &message, step, &token).into_response())
}

async fn consume(state: &AppState, user: &CurrentUser, step: &str, rider_id: i64, token: &str) -> Result<(), AppError> {
    if state
        .sessions
        .consume_step_token(&user.session_id, step, rider_id, token)
        .await
    {
        Ok(())
    } else {
        tracing::debug!(rider_id, step, "registration step refused");
        Err(AppError::Denied(INVALID_STEP_TOKEN.into()))
    }
}

/// POST /riders: personal data, the first step.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<PersonalDataForm>,
) -> Result<axum::response::Response, AppError> {
    user.require("rider_create")?;
    let rider = registration::create_personal_data(&state.pool, &form).await?;
    let message = format!(
        "¡Se ha añadido a {}! Ahora carguemos sus datos de discapacidad y beneficios gubernamentales",
        rider.name
    );
    next_step(&state, &user, rider, message, STEP_DISABILITY).await
}

/// PUT /riders/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<PersonalDataForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_update")?;
    let rider = registration::update_personal_data(&state.pool, id, &form).await?;
    Ok(with_message(rider, "Datos cambiados exitosamente"))
}

/// POST /riders/:id/disability?token=
pub async fn register_disability(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<StepToken>,
    JsonBody(form): JsonBody<DisabilityForm>,
) -> Result<axum::response::Response, AppError> {
    user.require("rider_create")?;
    consume(&state, &user, STEP_DISABILITY, id, &q.token).await?;
    let rider = registration::save_disability_and_benefits(&state.pool, id, &form).await?;
    let message = format!(
        "¡Bien! Seguiremos con los datos de situación previsional y escolares de {} {}",
        rider.name, rider.last_name
    );
    next_step(&state, &user, rider, message, STEP_INSURANCE_AND_SCHOOL).await
}

/// PUT /riders/:id/disability
pub async fn update_disability(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<DisabilityForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_update")?;
    let rider = registration::save_disability_and_benefits(&state.pool, id, &form).await?;
    Ok(with_message(
        rider,
        "Datos de discapacidad y beneficios sociales actualizados exitosamente",
    ))
}

/// POST /riders/:id/insurance_and_school?token=
pub async fn register_insurance_and_school(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<StepToken>,
    JsonBody(form): JsonBody<InsuranceSchoolForm>,
) -> Result<axum::response::Response, AppError> {
    user.require("rider_create")?;
    consume(&state, &user, STEP_INSURANCE_AND_SCHOOL, id, &q.token).await?;
    let rider = registration::save_insurance_and_school(&state.pool, id, &form).await?;
    let message = format!(
        "¡Muy bien! Seguiremos con los datos de los tutores de {} {}",
        rider.name, rider.last_name
    );
    next_step(&state, &user, rider, message, STEP_TUTORS).await
}

/// PUT /riders/:id/insurance_and_school
pub async fn update_insurance_and_school(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<InsuranceSchoolForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_update")?;
    let rider = registration::save_insurance_and_school(&state.pool, id, &form).await?;
    Ok(with_message(rider, "Datos de obra social y escolares actualizados exitosamente"))
}

/// POST /riders/:id/tutors?token=
pub async fn register_tutors(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<StepToken>,
    JsonBody(form): JsonBody<TutorsForm>,
) -> Result<axum::response::Response, AppError> {
    user.require("rider_create")?;
    consume(&state, &user, STEP_TUTORS, id, &q.token).await?;
    let rider = registration::save_tutors(&state.pool, id, &form).await?;
    let message = format!(
        "¡Genial! Seguiremos con el trabajo en CEDICA de {} {}",
        rider.name, rider.last_name
    );
    next_step(&state, &user, rider, message, STEP_INSTITUTIONAL_WORK).await
}

/// PUT /riders/:id/tutors
pub async fn update_tutors(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<TutorsForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_update")?;
    let rider = registration::save_tutors(&state.pool, id, &form).await?;
    Ok(with_message(rider, "Datos de los tutores actualizados exitosamente"))
}

/// POST /riders/:id/institutional_work?token=: the last step.
pub async fn register_institutional_work(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<StepToken>,
    JsonBody(form): JsonBody<InstitutionalWorkForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_create")?;
    consume(&state, &user, STEP_INSTITUTIONAL_WORK, id, &q.token).await?;
    let rider = registration::save_institutional_work(&state.pool, id, &form).await?;
    Ok(created_with_message(rider, REGISTRATION_DONE))
}

/// PUT /riders/:id/institutional_work
pub async fn update_institutional_work(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<InstitutionalWorkForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("rider_update")?;
    let rider = registration::save_institutional_work(&state.pool, id, &form).await?;
    Ok(with_message(rider, "Datos del trabajo institucional actualizados exitosamente"))
}
