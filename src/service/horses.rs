//! Horses: listing, registration, edition and activation.

use crate::config::{CONDUCTOR_POSITION, HORSE_TRAINER_POSITION, MAX_ELEMENTS_ON_PAGE};
use crate::error::AppError;
use crate::models::{Employee, Horse, HorseRow};
use crate::sql::{allowed, fetch_page, ListQuery, Op, Page};
use crate::validation::horses::{check_horse_order_params, validate_horse_fields, HorseForm, HORSE_ORDER_COLUMNS};
use crate::validation::riders::{check_employee_role, parse_selection};
use crate::validation::team::ListParams;
use sqlx::PgPool;

pub const HORSE_NOT_FOUND: &str = "Caballo no encontrado";

const HORSE_ROW_COLUMNS: &str = "h.id, h.name, h.birth_date, h.gender, h.breed, h.fur, h.acquisition_type, \
     h.entry_date, h.sede, h.rider_type, h.active, h.trainer_id, h.conductor_id, \
     t.name || ' ' || t.last_name AS trainer_name, c.name || ' ' || c.last_name AS conductor_name";

const HORSE_ROW_FROM: &str =
    "horses h LEFT JOIN employees t ON t.id = h.trainer_id LEFT JOIN employees c ON c.id = h.conductor_id";

fn order_column(order: &str) -> &'static str {
    match allowed(order, HORSE_ORDER_COLUMNS) {
        Some("birth_date") => "h.birth_date",
        Some("entry_date") => "h.entry_date",
        _ => "h.name",
    }
}

pub async fn search_horses(pool: &PgPool, params: &ListParams) -> Result<Page<HorseRow>, AppError> {
    if !check_horse_order_params(params) {
        return Err(AppError::BadRequest("Parámetros de búsqueda inválidos".into()));
    }
    let mut list = ListQuery::new(HORSE_ROW_COLUMNS, HORSE_ROW_FROM);
    let value = params.search_value.trim();
    match params.search_by.as_str() {
        "rider" => list = list.filter("h.rider_type", Op::Eq, value),
        "name" if !value.is_empty() => list = list.filter("h.name", Op::LowerLike, value),
        _ => {}
    }
    let list = list.order_by(order_column(&params.order), params.order_direction == "asc");
    fetch_page(pool, &list, params.page, MAX_ELEMENTS_ON_PAGE).await
}

pub async fn find_horse(pool: &PgPool, id: i64) -> Result<Option<Horse>, AppError> {
    Ok(sqlx::query_as::<_, Horse>("SELECT * FROM horses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_horse(pool: &PgPool, id: i64) -> Result<HorseRow, AppError> {
    let sql = format!("SELECT {} FROM {} WHERE h.id = $1", HORSE_ROW_COLUMNS, HORSE_ROW_FROM);
    sqlx::query_as::<_, HorseRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(HORSE_NOT_FOUND.into()))
}

/// Looks up a selected employee and judges it against the position it was picked for.
async fn selected_employee(
    pool: &PgPool,
    raw_id: &str,
    job_position: &str,
    role_name: &str,
    messages: &mut Vec<String>,
) -> Result<Option<i64>, AppError> {
    let id = match parse_selection(raw_id, role_name) {
        Ok(id) => id,
        Err(errs) => {
            messages.extend(errs);
            return Ok(None);
        }
    };
    let employee: Option<Employee> = super::team::find_employee(pool, id).await?;
    let errs = check_employee_role(employee.as_ref(), None, job_position, role_name);
    let ok = errs.is_empty();
    messages.extend(errs);
    Ok(ok.then_some(id))
}

/// Field rules plus the trainer and conductor lookups. Returns both ids when valid.
async fn check_create_horse_params(pool: &PgPool, form: &HorseForm) -> Result<(i64, i64), AppError> {
    let mut messages = validate_horse_fields(form);
    let trainer = selected_employee(pool, &form.trainer_id, HORSE_TRAINER_POSITION, "Entrenador", &mut messages).await?;
    let conductor =
        selected_employee(pool, &form.conductor_id, CONDUCTOR_POSITION, "Conductor del caballo", &mut messages).await?;
    AppError::check(messages)?;
    match (trainer, conductor) {
        (Some(t), Some(c)) => Ok((t, c)),
        _ => Err(AppError::invalid("Entrenador o conductor inválido")),
    }
}

pub async fn create_horse(pool: &PgPool, form: HorseForm) -> Result<Horse, AppError> {
    let (trainer_id, conductor_id) = check_create_horse_params(pool, &form).await?;
    let (Some(birth), Some(entry)) = (form.birth(), form.entry()) else {
        return Err(AppError::invalid("Fecha no válida"));
    };
    let horse = sqlx::query_as::<_, Horse>(
        "INSERT INTO horses (name, birth_date, gender, breed, fur, acquisition_type, entry_date, sede, rider_type, \
         active, trainer_id, conductor_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $11) RETURNING *",
    )
    .bind(form.name.trim())
    .bind(birth)
    .bind(&form.gender)
    .bind(form.breed.trim())
    .bind(form.fur.trim())
    .bind(&form.acquisition_type)
    .bind(entry)
    .bind(&form.sede)
    .bind(&form.rider_type)
    .bind(trainer_id)
    .bind(conductor_id)
    .fetch_one(pool)
    .await?;
    tracing::info!(horse_id = horse.id, "horse created");
    Ok(horse)
}

pub async fn modify_horse(pool: &PgPool, id: i64, form: HorseForm) -> Result<Horse, AppError> {
    if find_horse(pool, id).await?.is_none() {
        return Err(AppError::NotFound(HORSE_NOT_FOUND.into()));
    }
    let (trainer_id, conductor_id) = check_create_horse_params(pool, &form).await?;
    let (Some(birth), Some(entry)) = (form.birth(), form.entry()) else {
        return Err(AppError::invalid("Fecha no válida"));
    };
    let horse = sqlx::query_as::<_, Horse>(
        "UPDATE horses SET name = $2, birth_date = $3, gender = $4, breed = $5, fur = $6, acquisition_type = $7, \
         entry_date = $8, sede = $9, rider_type = $10, trainer_id = $11, conductor_id = $12 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(form.name.trim())
    .bind(birth)
    .bind(&form.gender)
    .bind(form.breed.trim())
    .bind(form.fur.trim())
    .bind(&form.acquisition_type)
    .bind(entry)
    .bind(&form.sede)
    .bind(&form.rider_type)
    .bind(trainer_id)
    .bind(conductor_id)
    .fetch_one(pool)
    .await?;
    tracing::info!(horse_id = id, "horse modified");
    Ok(horse)
}

pub async fn toggle_active(pool: &PgPool, id: i64) -> Result<Horse, AppError> {
    let horse = sqlx::query_as::<_, Horse>("UPDATE horses SET active = NOT active WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(HORSE_NOT_FOUND.into()))?;
    tracing::info!(horse_id = id, active = horse.active, "horse toggled");
    Ok(horse)
}

/// Horses matching a headquarters and a proposal. Blank arguments do not filter.
pub async fn available_horses(pool: &PgPool, headquarters: &str, proposal: &str) -> Result<Vec<Horse>, AppError> {
    let mut list = ListQuery::new("*", "horses").condition("active");
    if !headquarters.is_empty() {
        list = list.filter("sede", Op::Eq, headquarters);
    }
    if !proposal.is_empty() {
        list = list.filter("rider_type", Op::Eq, proposal);
    }
    let list = list.order_by("name", true);
    crate::sql::fetch_all(pool, &list.select_sql(None, None)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_columns_are_qualified() {
        assert_eq!(order_column("entry_date"), "h.entry_date");
        assert_eq!(order_column("name; --"), "h.name");
    }
}
