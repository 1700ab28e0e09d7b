//! Session-less routes: the public site API, login and the Google callbacks.

use crate::handlers::{api, auth};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/messages/", post(api::send_message))
        .route("/api/publications/", get(api::list_publications))
        .route("/api/publications/:id", get(api::show_publication))
        .route("/auth/login", post(auth::login))
        .route("/auth/google/login", get(auth::google_login))
        .route("/auth/google/register", get(auth::google_register))
        .route("/callback/:flow", get(auth::google_callback))
        .with_state(state)
}
