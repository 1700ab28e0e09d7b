//! The logged-in user, resolved from the session cookie, and the permission guards.

use crate::auth::session::session_id_from_headers;
use crate::auth::Session;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Rejects with 401 when there is no valid session.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session_id: Uuid,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session = state
            .sessions
            .get(&session_id)
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser { session_id, session })
    }
}

impl CurrentUser {
    pub fn user_id(&self) -> i64 {
        self.session.user_id
    }

    /// 403 unless the session holds `permission` or is a system admin.
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.session.has_permission(permission) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.session.user_id, permission, "permission denied");
            Err(AppError::Forbidden)
        }
    }

    /// 403 unless the user has the Administracion role or is a system admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_sys_admin(&self) -> Result<(), AppError> {
        if self.session.system_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
