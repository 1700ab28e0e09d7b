//! Contact messages sent from the public site and their follow-up.

use crate::config::MAX_ELEMENTS_ON_PAGE;
use crate::error::AppError;
use crate::models::Contact;
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::validation::contacts::{
    validate_filter_params, validate_update_contact, ContactFilter, ContactMessage, ContactUpdateForm,
};
use crate::validation::parse_date;
use sqlx::PgPool;

pub const CONTACT_NOT_FOUND: &str = "Consulta no encontrada";
const CLOSED_STATE: &str = "terminado";

/// Stores a validated public message as `pendiente`.
pub async fn create_contact(pool: &PgPool, msg: &ContactMessage) -> Result<Contact, AppError> {
    let contact = sqlx::query_as::<_, Contact>(
        "INSERT INTO contacts (state, title, full_name, email, message) VALUES ('pendiente', $1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(msg.title.trim())
    .bind(msg.full_name.trim())
    .bind(msg.email.trim().to_lowercase())
    .bind(msg.message.trim())
    .fetch_one(pool)
    .await?;
    tracing::info!(contact_id = contact.id, "contact message stored");
    Ok(contact)
}

pub async fn list_contacts(pool: &PgPool, filter: &ContactFilter) -> Result<Page<Contact>, AppError> {
    AppError::check(validate_filter_params(filter))?;
    let page = filter.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("No existe esa página, reintente".into()));
    }
    let list = ListQuery::new("*", "contacts")
        .filter_opt("creation_date::date", Op::Gte, parse_date(&filter.start_date))
        .filter_opt("creation_date::date", Op::Lte, parse_date(&filter.end_date))
        .filter_opt("state", Op::Eq, filter.state())
        .order_by("creation_date", filter.oldest_first())
        .order_by("id", filter.oldest_first());
    fetch_page(pool, &list, page, MAX_ELEMENTS_ON_PAGE).await
}

pub async fn get_contact(pool: &PgPool, id: i64) -> Result<Contact, AppError> {
    sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(CONTACT_NOT_FOUND.into()))
}

/// Moving into `terminado` stamps the closing date; leaving it clears the date.
pub async fn update_contact(pool: &PgPool, id: i64, form: &ContactUpdateForm) -> Result<Contact, AppError> {
    let current = get_contact(pool, id).await?;
    AppError::check(validate_update_contact(form))?;
    let closed_date = match (current.state == CLOSED_STATE, form.state == CLOSED_STATE) {
        (false, true) => Some(chrono::Utc::now()),
        (true, true) => current.closed_date,
        (_, false) => None,
    };
    let comment = Some(form.comment.trim()).filter(|c| !c.is_empty());
    let contact = sqlx::query_as::<_, Contact>(
        "UPDATE contacts SET state = $2, comment = $3, closed_date = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&form.state)
    .bind(comment)
    .bind(closed_date)
    .fetch_one(pool)
    .await?;
    tracing::info!(contact_id = id, state = %contact.state, "contact updated");
    Ok(contact)
}

pub async fn delete_contact(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("No se encontró la consulta".into()));
    }
    tracing::info!(contact_id = id, "contact deleted");
    Ok(())
}
