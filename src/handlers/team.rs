//! Staff members. Every endpoint requires the Administracion role.

use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::response::{created_with_message, success_one_ok, success_page, with_message};
use crate::service::team;
use crate::state::AppState;
use crate::validation::team::{EmployeeForm, ListParams};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

fn notice(base: &str, extra: Option<String>) -> String {
    match extra {
        Some(extra) => format!("{}. {}", base, extra),
        None => base.to_string(),
    }
}

/// GET /employees
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_page(team::list_and_search_employees(&state.pool, &params).await?))
}

/// GET /employees/:id
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    Ok(success_one_ok(team::get_employee(&state.pool, id).await?))
}

/// POST /employees
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(form): JsonBody<EmployeeForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let (employee, extra) = team::create_employee(&state.pool, form).await?;
    Ok(created_with_message(employee, notice(team::CREATED, extra)))
}

/// PUT /employees/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(form): JsonBody<EmployeeForm>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let (employee, extra) = team::modify_employee(&state.pool, id, form).await?;
    Ok(with_message(employee, notice(team::MODIFIED, extra)))
}

/// POST /employees/:id/toggle
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let employee = team::toggle_active(&state.pool, id).await?;
    let message = if employee.active {
        "El empleado fue activado"
    } else {
        "El empleado fue desactivado"
    };
    Ok(with_message(employee, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_appends_link_message() {
        assert_eq!(notice(team::CREATED, None), team::CREATED);
        assert_eq!(
            notice("Listo", Some("El empleado fue asociado al usuario con alias ana".into())),
            "Listo. El empleado fue asociado al usuario con alias ana"
        );
    }
}
