//! Shared application state for all routes.

use crate::auth::SessionStore;
use crate::config::Settings;
use crate::service::exports;
use crate::storage::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
    pub sessions: SessionStore,
    pub storage: Arc<dyn ObjectStore>,
    /// Outbound client for Google sign-in and reCAPTCHA.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings, storage: Arc<dyn ObjectStore>) -> Self {
        exports::load_chart_font(&settings.chart_font);
        AppState {
            pool,
            sessions: SessionStore::with_ttl(chrono::Duration::minutes(settings.session_ttl_minutes)),
            settings: Arc::new(settings),
            storage,
            http: reqwest::Client::new(),
        }
    }
}
