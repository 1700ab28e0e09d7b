//! Password login, logout, the current session and the Google sign-in flows.

use crate::auth::google::{self, OAuthFlow};
use crate::auth::session::{clear_cookie, random_token, session_cookie};
use crate::auth::Session;
use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::models::PendingUser;
use crate::response::{created_with_message, success_one_ok, with_message};
use crate::service::{pending_users, users};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn start_session(state: &AppState, session: Session) -> Result<impl IntoResponse, AppError> {
    let alias = session.alias.clone();
    let id = state.sessions.create(session.clone()).await;
    let cookie = session_cookie(&id, state.settings.cookie_secure, state.settings.session_max_age_secs());
    let (status, body) = with_message(session, format!("Bienvenido a Cedica {}", alias));
    Ok((status, [(header::SET_COOKIE, cookie)], body))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::authenticate(&state.pool, form.email.trim(), &form.password).await?;
    let session = users::session_for(&state.pool, &user).await?;
    start_session(&state, session).await
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    state.sessions.remove(&user.session_id).await;
    tracing::info!(user_id = user.user_id(), "session closed");
    let (status, body) = with_message(serde_json::Value::Null, "La sesión se cerró correctamente");
    (status, [(header::SET_COOKIE, clear_cookie())], body)
}

/// GET /auth/me
pub async fn me(user: CurrentUser) -> impl IntoResponse {
    success_one_ok(user.session)
}

async fn google_redirect(state: &AppState, flow: OAuthFlow) -> Result<Redirect, AppError> {
    let google_settings = &state.settings.google;
    if google_settings.client_id.is_empty() {
        return Err(AppError::External("El ingreso con Google no está configurado".into()));
    }
    let discovery = google::discover(&state.http, google_settings).await?;
    let nonce = random_token();
    let redirect = google::redirect_uri(&state.settings.public_base_url, flow);
    let url = google::authorization_url(&discovery, &google_settings.client_id, &redirect, &nonce)?;
    state.sessions.remember_state(nonce, flow).await;
    Ok(Redirect::to(&url))
}

/// GET /auth/google/login
pub async fn google_login(State(state): State<AppState>) -> Result<Redirect, AppError> {
    google_redirect(&state, OAuthFlow::Login).await
}

/// GET /auth/google/register
pub async fn google_register(State(state): State<AppState>) -> Result<Redirect, AppError> {
    google_redirect(&state, OAuthFlow::Register).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

fn parse_flow(flow: &str) -> Result<OAuthFlow, AppError> {
    match flow {
        "login" => Ok(OAuthFlow::Login),
        "register" => Ok(OAuthFlow::Register),
        _ => Err(AppError::NotFound("Ruta no encontrada".into())),
    }
}

/// GET /callback/:flow. The `state` must be one we issued for the same flow.
pub async fn google_callback(
    State(state): State<AppState>,
    Path(flow): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<axum::response::Response, AppError> {
    let flow = parse_flow(&flow)?;
    if state.sessions.take_state(&params.state).await != Some(flow) || params.code.is_empty() {
        return Err(AppError::BadRequest("La solicitud de Google no es válida, reintente".into()));
    }
    let email = google::verified_email(&state.http, &state.settings, flow, &params.code).await?;
    match flow {
        OAuthFlow::Login => {
            let user = users::google_login(&state.pool, &email).await?;
            let session = users::session_for(&state.pool, &user).await?;
            Ok(start_session(&state, session).await?.into_response())
        }
        OAuthFlow::Register => {
            let pending: PendingUser = pending_users::register(&state.pool, &email).await?;
            Ok(created_with_message(pending, pending_users::REQUEST_SENT).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_flows() {
        assert_eq!(parse_flow("login").ok(), Some(OAuthFlow::Login));
        assert_eq!(parse_flow("register").ok(), Some(OAuthFlow::Register));
        assert!(matches!(parse_flow("other"), Err(AppError::NotFound(_))));
    }
}
