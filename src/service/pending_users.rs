//! Google registrations waiting for an administrator's approval.

use crate::config::{MAX_ELEMENTS_ON_PAGE, VOLUNTEER_ROLE};
use crate::error::AppError;
use crate::models::{PendingUser, User};
use crate::sql::{fetch_page, ListQuery, Op, Page};
use crate::validation::fields::check_alias;
use crate::validation::users::check_search_pending_user_params;
use sqlx::PgPool;
use std::collections::HashMap;

pub const STILL_PENDING: &str = "Su solicitud de registro ya fue enviada, pero aún no ha sido aceptado como usuario. \
     Contactese con un administrador";
pub const REQUEST_SENT: &str = "Su solicitud se ha enviado. Espere a que un administrador lo acepte en el sistema";

pub async fn find_pending_user_by_email(pool: &PgPool, email: &str) -> Result<Option<PendingUser>, AppError> {
    Ok(
        sqlx::query_as::<_, PendingUser>("SELECT * FROM pending_users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_pending_user_by_id(pool: &PgPool, id: i64) -> Result<Option<PendingUser>, AppError> {
    Ok(sqlx::query_as::<_, PendingUser>("SELECT * FROM pending_users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Listing with the `email`, `order` and `page` query keys.
pub async fn index(pool: &PgPool, params: &HashMap<String, String>) -> Result<Page<PendingUser>, AppError> {
    AppError::check(check_search_pending_user_params(params))?;
    let page = match params.get("page").map(String::as_str) {
        None | Some("") => 1,
        Some(p) => p
            .parse::<i64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::BadRequest("Número de página inválido".into()))?,
    };
    let mut list = ListQuery::new("id, email, registered_at", "pending_users");
    if let Some(email) = params.get("email").filter(|e| !e.trim().is_empty()) {
        list = list.filter("email", Op::LowerLike, email.trim());
    }
    list = match params.get("order").map(String::as_str).unwrap_or("") {
        "emailA-Z" => list.order_by("email", true),
        "emailZ-A" => list.order_by("email", false),
        "newer" => list.order_by("registered_at", false),
        "older" => list.order_by("registered_at", true),
        _ => list.order_by("id", true),
    };
    fetch_page(pool, &list, page, MAX_ELEMENTS_ON_PAGE).await
}

/// Records a Google registration. Refused when the email is pending already or belongs to a user.
pub async fn register(pool: &PgPool, email: &str) -> Result<PendingUser, AppError> {
    let email = email.trim().to_lowercase();
    if find_pending_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict(STILL_PENDING.into()));
    }
    if super::users::find_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("El correo {} ya pertenece a un usuario", email)));
    }
    let pending = sqlx::query_as::<_, PendingUser>("INSERT INTO pending_users (email) VALUES ($1) RETURNING *")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    tracing::info!(pending_user_id = pending.id, "registration request stored");
    Ok(pending)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM pending_users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "No se encontró el usuario pendiente de aceptación".into(),
        ));
    }
    tracing::info!(pending_user_id = id, "pending user deleted");
    Ok(())
}

/// Turns a pending registration into a blocked Google user with the Voluntariado role.
pub async fn accept(pool: &PgPool, id: i64, alias: &str) -> Result<User, AppError> {
    let alias = alias.trim();
    let mut messages = check_alias(alias);
    if super::users::find_user_by_alias(pool, alias).await?.is_some() {
        messages.push("Ya existe un usuario en el sistema con ese alias".to_string());
    }
    AppError::check(messages)?;
    let pending = find_pending_user_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Hubo un error. El usuario aceptado no existe".into()))?;

    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, alias, active, system_admin, google_logged) \
         VALUES ($1, NULL, $2, FALSE, FALSE, TRUE) RETURNING *",
    )
    .bind(&pending.email)
    .bind(alias)
    .fetch_one(&mut *tx)
    .await?;
    super::users::set_roles(&mut tx, user.id, &[VOLUNTEER_ROLE.to_string()]).await?;
    sqlx::query("DELETE FROM pending_users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!(user_id = user.id, pending_user_id = id, "pending user accepted");
    Ok(user)
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::service::fixtures;

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn accepted_request_becomes_a_blocked_volunteer(pool: PgPool) {
        fixtures::schema(&pool).await;
        let pending = register(&pool, " Nueva@Gmail.com ").await.expect("register");
        assert_eq!(pending.email, "nueva@gmail.com");
        assert!(matches!(
            register(&pool, "nueva@gmail.com").await,
            Err(AppError::Conflict(m)) if m == STILL_PENDING
        ));

        let user = accept(&pool, pending.id, "nueva_voluntaria").await.expect("accept");
        assert_eq!(user.email, "nueva@gmail.com");
        assert!(!user.active);
        assert!(user.google_logged);
        assert_eq!(
            crate::service::users::get_roles(&pool, user.id).await.expect("roles"),
            vec![VOLUNTEER_ROLE.to_string()]
        );
        assert!(find_pending_user_by_id(&pool, pending.id).await.expect("lookup").is_none());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn taken_alias_keeps_the_request_pending(pool: PgPool) {
        fixtures::schema(&pool).await;
        fixtures::user(&pool, "ocupado", &[VOLUNTEER_ROLE]).await;
        let pending = register(&pool, "otra@gmail.com").await.expect("register");
        assert!(matches!(accept(&pool, pending.id, "ocupado").await, Err(AppError::Validation(_))));
        assert!(find_pending_user_by_id(&pool, pending.id).await.expect("lookup").is_some());
    }
}
