//! Charges ("cobros") collected from riders.

use crate::config::MAX_ELEMENTS_ON_PAGE;
use crate::error::AppError;
use crate::models::{Charge, ChargeRow, EmployeeSummary, RiderRow};
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::validation::charges::{validate_charge_fields, validate_filter_params, ChargeFilter, ChargeForm, ValidCharge};
use crate::validation::parse_date;
use serde::Serialize;
use sqlx::PgPool;

pub const CHARGE_NOT_FOUND: &str = "El cobro no existe";

const ROW_COLUMNS: &str = "c.id, c.rider_id, c.charge_date, c.payment_method, c.amount, c.receiver_id, \
     c.observations, c.inserted_at, r.name AS rider_name, r.last_name AS rider_last_name, \
     e.name AS receiver_name, e.last_name AS receiver_last_name, r.has_debt AS rider_has_debt";

const ROW_FROM: &str = "charges c JOIN riders r ON r.id = c.rider_id JOIN employees e ON e.id = c.receiver_id";

/// Field rules plus the rider and receiver lookups.
async fn validate_charge_params(pool: &PgPool, form: &ChargeForm) -> Result<ValidCharge, AppError> {
    let charge = validate_charge_fields(form).map_err(AppError::Validation)?;
    let mut errors = Vec::new();
    if super::riders::find_rider(pool, charge.rider_id).await?.is_none() {
        errors.push("No se suministró un jinete/amazona del sistema".to_string());
    }
    match super::team::find_employee(pool, charge.receiver_id).await? {
        Some(e) if e.active => {}
        _ => errors.push("El receptor no es un empleado activo en el sistema".to_string()),
    }
    AppError::check(errors)?;
    Ok(charge)
}

async fn set_debt(conn: &mut sqlx::PgConnection, rider_id: i64, debt: bool) -> Result<(), AppError> {
    sqlx::query("UPDATE riders SET has_debt = $2 WHERE id = $1")
        .bind(rider_id)
        .bind(debt)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Records the charge and marks the rider as debtor or not.
pub async fn create_charge(pool: &PgPool, form: &ChargeForm) -> Result<Charge, AppError> {
    let c = validate_charge_params(pool, form).await?;
    let mut tx = pool.begin().await?;
    let charge = sqlx::query_as::<_, Charge>(
        "INSERT INTO charges (rider_id, charge_date, payment_method, amount, receiver_id, observations) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(c.rider_id)
    .bind(c.charge_date)
    .bind(&c.payment_method)
    .bind(c.amount)
    .bind(c.receiver_id)
    .bind(&c.observations)
    .fetch_one(&mut *tx)
    .await?;
    set_debt(&mut tx, c.rider_id, c.debt).await?;
    tx.commit().await?;
    tracing::info!(charge_id = charge.id, rider_id = c.rider_id, debt = c.debt, "charge created");
    Ok(charge)
}

pub async fn update_charge(pool: &PgPool, id: i64, form: &ChargeForm) -> Result<Charge, AppError> {
    get_charge(pool, id).await?;
    let c = validate_charge_params(pool, form).await?;
    let mut tx = pool.begin().await?;
    let charge = sqlx::query_as::<_, Charge>(
        "UPDATE charges SET rider_id = $2, charge_date = $3, payment_method = $4, amount = $5, receiver_id = $6, \
         observations = $7 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(c.rider_id)
    .bind(c.charge_date)
    .bind(&c.payment_method)
    .bind(c.amount)
    .bind(c.receiver_id)
    .bind(&c.observations)
    .fetch_one(&mut *tx)
    .await?;
    set_debt(&mut tx, c.rider_id, c.debt).await?;
    tx.commit().await?;
    tracing::info!(charge_id = id, rider_id = c.rider_id, debt = c.debt, "charge updated");
    Ok(charge)
}

pub async fn get_charge(pool: &PgPool, id: i64) -> Result<ChargeRow, AppError> {
    let sql = format!("SELECT {} FROM {} WHERE c.id = $1", ROW_COLUMNS, ROW_FROM);
    sqlx::query_as::<_, ChargeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(CHARGE_NOT_FOUND.into()))
}

pub async fn delete_charge(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM charges WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(CHARGE_NOT_FOUND.into()));
    }
    tracing::info!(charge_id = id, "charge deleted");
    Ok(())
}

pub async fn order_and_filter_charges(pool: &PgPool, filter: &ChargeFilter) -> Result<Page<ChargeRow>, AppError> {
    AppError::check(validate_filter_params(filter))?;
    if let Some(rider_id) = filter.rider() {
        if super::riders::find_rider(pool, rider_id).await?.is_none() {
            return Err(AppError::invalid("El jinete seleccionado no existe"));
        }
    }
    let page = filter.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("Número de página inválido".into()));
    }
    let method = Some(filter.payment_method.to_uppercase()).filter(|m| !m.is_empty());
    let list = ListQuery::new(ROW_COLUMNS, ROW_FROM)
        .filter_opt("c.charge_date", Op::Gte, parse_date(&filter.start_date))
        .filter_opt("c.charge_date", Op::Lte, parse_date(&filter.end_date))
        .filter_opt("c.payment_method", Op::Eq, method)
        .filter_opt(
            "e.name",
            Op::ILike,
            Some(filter.receiver_name.trim()).filter(|v| !v.is_empty()),
        )
        .filter_opt(
            "e.last_name",
            Op::ILike,
            Some(filter.receiver_last_name.trim()).filter(|v| !v.is_empty()),
        )
        .filter_opt("c.rider_id", Op::Eq, filter.rider())
        .order_by("c.charge_date", filter.ascending())
        .order_by("c.id", filter.ascending());
    fetch_page(pool, &list, page, MAX_ELEMENTS_ON_PAGE).await
}

/// Riders and active employees to pick from in the charge form.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeOptions {
    pub riders: Vec<RiderRow>,
    pub receivers: Vec<EmployeeSummary>,
}

pub async fn form_options(pool: &PgPool) -> Result<ChargeOptions, AppError> {
    let riders = sqlx::query_as::<_, RiderRow>(
        "SELECT id, dni, name, last_name, has_debt, NULL::text AS professionals FROM riders ORDER BY last_name, name",
    )
    .fetch_all(pool)
    .await?;
    Ok(ChargeOptions {
        riders,
        receivers: super::team::get_active_employees(pool).await?,
    })
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::config::{NO, YES};
    use crate::service::fixtures;

    fn form(rider_id: i64, receiver_id: i64, debt: &str) -> ChargeForm {
        ChargeForm {
            rider_id: Some(rider_id.to_string()),
            charge_date: Some("2024-05-02".into()),
            payment_method: Some("EFECTIVO".into()),
            amount: Some("1500,50".into()),
            debt: Some(debt.into()),
            receiver_id: Some(receiver_id.to_string()),
            observations: None,
        }
    }

    async fn has_debt(pool: &PgPool, rider_id: i64) -> bool {
        sqlx::query_scalar("SELECT has_debt FROM riders WHERE id = $1")
            .bind(rider_id)
            .fetch_one(pool)
            .await
            .expect("rider")
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn debt_flag_follows_the_last_saved_charge(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let receiver_id = fixtures::employee(&pool, "30111222", true).await;

        let charge = create_charge(&pool, &form(rider_id, receiver_id, YES)).await.expect("create");
        assert_eq!(charge.amount, 1500.5);
        assert!(has_debt(&pool, rider_id).await);

        update_charge(&pool, charge.id, &form(rider_id, receiver_id, NO)).await.expect("update");
        assert!(!has_debt(&pool, rider_id).await);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn inactive_receiver_is_rejected(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let receiver_id = fixtures::employee(&pool, "30111222", false).await;
        let refused = create_charge(&pool, &form(rider_id, receiver_id, YES)).await;
        assert!(matches!(
            refused,
            Err(AppError::Validation(m)) if m == vec!["El receptor no es un empleado activo en el sistema".to_string()]
        ));
        assert!(!has_debt(&pool, rider_id).await);
    }
}
