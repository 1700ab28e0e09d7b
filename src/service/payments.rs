//! Payments ("pagos") made by the institution: fees, miscellaneous expenses and suppliers.

use crate::config::MAX_ELEMENTS_ON_PAGE;
use crate::error::AppError;
use crate::models::{Payment, PaymentRow};
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::validation::parse_date;
use crate::validation::payments::{
    validate_payment_fields, validate_payment_filter, PaymentFilter, PaymentForm, BENEFICIARY_NOT_FOUND,
};
use sqlx::PgPool;

pub const PAYMENT_NOT_FOUND: &str = "El pago no existe.";

const ROW_COLUMNS: &str = "p.id, p.beneficiary_id, p.amount, p.payment_date, p.payment_type, p.description, \
     p.inserted_at, CASE WHEN e.id IS NULL THEN NULL ELSE e.name || ' ' || e.last_name || ' ' || e.dni END \
     AS beneficiary";

const ROW_FROM: &str = "payments p LEFT JOIN employees e ON e.id = p.beneficiary_id";

struct ValidPayment {
    beneficiary_id: Option<i64>,
    amount: f64,
    payment_date: chrono::NaiveDate,
}

/// Field rules plus the beneficiary lookup. Fees need one; other types keep one only if sent.
async fn check_create_params(pool: &PgPool, form: &PaymentForm) -> Result<ValidPayment, AppError> {
    AppError::check(validate_payment_fields(form))?;
    let beneficiary_id = match form.beneficiary() {
        Some(id) => {
            if super::team::find_employee(pool, id).await?.is_none() {
                return Err(AppError::invalid(BENEFICIARY_NOT_FOUND));
            }
            Some(id)
        }
        None if form.is_fees() => return Err(AppError::invalid(BENEFICIARY_NOT_FOUND)),
        None => None,
    };
    let amount = form
        .amount
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::invalid("Monto inválido"))?;
    let payment_date =
        parse_date(&form.payment_date).ok_or_else(|| AppError::invalid("Fecha de pago inválida"))?;
    Ok(ValidPayment {
        beneficiary_id,
        amount,
        payment_date,
    })
}

pub async fn create_payment(pool: &PgPool, form: &PaymentForm) -> Result<Payment, AppError> {
    let v = check_create_params(pool, form).await?;
    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (beneficiary_id, amount, payment_date, payment_type, description) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(v.beneficiary_id)
    .bind(v.amount)
    .bind(v.payment_date)
    .bind(&form.payment_type)
    .bind(form.description.trim())
    .fetch_one(pool)
    .await?;
    tracing::info!(payment_id = payment.id, "payment created");
    Ok(payment)
}

pub async fn update_payment(pool: &PgPool, id: i64, form: &PaymentForm) -> Result<Payment, AppError> {
    get_payment(pool, id).await?;
    let v = check_create_params(pool, form).await?;
    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET beneficiary_id = $2, amount = $3, payment_date = $4, payment_type = $5, \
         description = $6 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(v.beneficiary_id)
    .bind(v.amount)
    .bind(v.payment_date)
    .bind(&form.payment_type)
    .bind(form.description.trim())
    .fetch_one(pool)
    .await?;
    tracing::info!(payment_id = id, "payment updated");
    Ok(payment)
}

pub async fn get_payment(pool: &PgPool, id: i64) -> Result<PaymentRow, AppError> {
    let sql = format!("SELECT {} FROM {} WHERE p.id = $1", ROW_COLUMNS, ROW_FROM);
    sqlx::query_as::<_, PaymentRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(PAYMENT_NOT_FOUND.into()))
}

pub async fn delete_payment(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(PAYMENT_NOT_FOUND.into()));
    }
    tracing::info!(payment_id = id, "payment deleted");
    Ok(())
}

/// Filters by payment type (`search_value`) and a date range; ordered by date.
pub async fn order_and_filter_payments(pool: &PgPool, filter: &PaymentFilter) -> Result<Page<PaymentRow>, AppError> {
    AppError::check(validate_payment_filter(filter))?;
    let page = filter.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("Número de página inválido".into()));
    }
    let search = Some(filter.search_value.trim()).filter(|v| !v.is_empty());
    let list = ListQuery::new(ROW_COLUMNS, ROW_FROM)
        .filter_opt("p.payment_type", Op::LowerLike, search)
        .filter_opt("p.payment_date", Op::Gte, parse_date(&filter.start_date))
        .filter_opt("p.payment_date", Op::Lte, parse_date(&filter.end_date))
        .order_by("p.payment_date", filter.order != "desc")
        .order_by("p.id", filter.order != "desc");
    fetch_page(pool, &list, page, MAX_ELEMENTS_ON_PAGE).await
}
