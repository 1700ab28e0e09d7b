//! User administration, the own profile and pending Google registrations.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_many, success_one_ok, success_page, with_message};
use crate::service::{pending_users, users};
use crate::state::AppState;
use crate::validation::users::{AcceptPendingForm, UserForm, UserListParams};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use std::collections::HashMap;

/// GET /users
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require("user_index")?;
    Ok(success_page(users::list_and_search_users(&state.pool, &params).await?))
}

/// GET /users/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if user.user_id() != id {
        user.require("user_show")?;
    }
    Ok(success_one_ok(users::get_user(&state.pool, id).await?))
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<UserForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_sys_admin()?;
    let created = users::create_user(&state.pool, form).await?;
    let message = format!("Se creó el usuario {}", created.alias);
    Ok(created_with_message(created, message))
}

/// PUT /users/:id. System admins edit everything; users editing themselves go through the profile rules.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<UserForm>,
) -> Result<impl IntoResponse, AppError> {
    if user.session.system_admin {
        let notice = users::update_user(&state.pool, id, form).await?;
        let profile = users::get_user(&state.pool, id).await?;
        let message = notice.unwrap_or_else(|| "El usuario se modificó correctamente".into());
        return Ok(with_message(profile, message));
    }
    if user.user_id() != id {
        return Err(AppError::Forbidden);
    }
    users::update_profile(&state.pool, id, form).await?;
    let profile = users::get_user(&state.pool, id).await?;
    Ok(with_message(profile, "El usuario se modificó correctamente"))
}

/// GET /profile
pub async fn profile(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(users::get_user(&state.pool, user.user_id()).await?))
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<UserForm>,
) -> Result<impl IntoResponse, AppError> {
    users::update_profile(&state.pool, user.user_id(), form).await?;
    let profile = users::get_user(&state.pool, user.user_id()).await?;
    Ok(with_message(profile, "Perfil actualizado"))
}

/// POST /users/:id/toggle. Blocking a user also ends their sessions.
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_sys_admin()?;
    let active = users::toggle_active(&state.pool, id).await?;
    if !active {
        state.sessions.remove_user(id).await;
    }
    let message = if active {
        "El usuario fue desbloqueado"
    } else {
        "El usuario fue bloqueado"
    };
    Ok(with_message(serde_json::json!({ "id": id, "active": active }), message))
}

/// GET /publishers
pub async fn publishers(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    user.require("publication_index")?;
    Ok(success_many(users::get_publishers(&state.pool).await?))
}

/// GET /pending-users
pub async fn pending_index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    user.require("accept")?;
    Ok(success_page(pending_users::index(&state.pool, &params).await?))
}

/// POST /pending-users/:id/accept
pub async fn pending_accept(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<AcceptPendingForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require("accept")?;
    let accepted = pending_users::accept(&state.pool, id, &form.alias).await?;
    let message = format!("Se aceptó al usuario {}", accepted.alias);
    Ok(created_with_message(accepted, message))
}

/// DELETE /pending-users/:id
pub async fn pending_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require("accept")?;
    pending_users::delete(&state.pool, id).await?;
    Ok(with_message(serde_json::json!({ "id": id }), "Se eliminó la solicitud"))
}
