//! User accounts: listing, creation, edition, blocking, login and the role/permission catalog.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::Session;
use crate::config::{EDITOR_ROLE, MAX_ELEMENTS_ON_PAGE};
use crate::error::AppError;
use crate::models::{User, UserProfile};
use crate::sql::{allowed, fetch_page, ListQuery, Op, Page};
use crate::validation::users::{
    check_user_list_params, validate_new_user, validate_user_update, UserForm, UserListParams, USER_ORDER_COLUMNS,
};
use sqlx::{PgConnection, PgPool};

const USER_COLUMNS: &str = "u.id, u.email, u.password, u.alias, u.active, u.system_admin, u.google_logged, \
     u.inserted_at, u.updated_at, \
     ARRAY(SELECT r.name::text FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
           WHERE ur.user_id = u.id ORDER BY r.name) AS roles";

pub const PERMISSIONS: &[&str] = &[
    "user_index",
    "user_create",
    "user_destroy",
    "user_update",
    "user_show",
    "team_index",
    "team_create",
    "team_destroy",
    "team_update",
    "team_show",
    "rider_index",
    "rider_show",
    "rider_update",
    "rider_create",
    "rider_destroy",
    "payment_index",
    "payment_show",
    "payment_update",
    "payment_create",
    "payment_destroy",
    "charge_index",
    "charge_show",
    "charge_update",
    "charge_create",
    "charge_destroy",
    "horse_index",
    "horse_show",
    "horse_update",
    "horse_create",
    "horse_destroy",
    "accept",
    "report_index",
    "report_show",
    "publication_index",
    "publication_create",
    "publication_destroy",
    "publication_update",
    "publication_show",
];

/// (role, description, permissions)
pub const ROLE_CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Tecnica",
        "Rol para el area tecnica",
        &[
            "rider_index",
            "rider_show",
            "rider_update",
            "rider_create",
            "rider_destroy",
            "charge_index",
            "charge_show",
            "horse_index",
            "horse_show",
            "report_index",
            "report_show",
        ],
    ),
    (
        "Administracion",
        "Rol para el area administrativa",
        &[
            "team_index",
            "team_show",
            "team_create",
            "team_update",
            "team_destroy",
            "rider_index",
            "rider_show",
            "rider_update",
            "rider_create",
            "rider_destroy",
            "payment_index",
            "payment_show",
            "payment_update",
            "payment_create",
            "payment_destroy",
            "charge_index",
            "charge_show",
            "charge_update",
            "charge_create",
            "charge_destroy",
            "accept",
            "report_index",
            "report_show",
            "horse_index",
            "horse_show",
            "publication_index",
            "publication_show",
            "publication_update",
            "publication_create",
            "publication_destroy",
        ],
    ),
    ("Voluntariado", "Rol para el area de voluntariado", &[]),
    (
        "Ecuestre",
        "Rol para el area ecuestre",
        &[
            "rider_index",
            "rider_show",
            "horse_index",
            "horse_show",
            "horse_update",
            "horse_create",
            "horse_destroy",
        ],
    ),
    (
        "Editor",
        "Rol para el area de edición de publicaciones",
        &[
            "publication_index",
            "publication_show",
            "publication_update",
            "publication_create",
        ],
    ),
];

pub async fn create_permissions(pool: &PgPool) -> Result<(), AppError> {
    for name in PERMISSIONS {
        sqlx::query("INSERT INTO permissions (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
    }
    tracing::info!(count = PERMISSIONS.len(), "permissions ensured");
    Ok(())
}

/// Creates the fixed roles and grants their permissions. Safe to run more than once.
pub async fn create_roles(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for (name, description, permissions) in ROLE_CATALOG {
        let role_id: i64 = sqlx::query_scalar(
            "INSERT INTO roles (name, description) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1, p.id FROM permissions p WHERE p.name = ANY($2) ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(&permissions)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    tracing::info!(count = ROLE_CATALOG.len(), "roles ensured");
    Ok(())
}

pub async fn find_user_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Case-insensitive lookup.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email.trim())
        .fetch_optional(pool)
        .await?)
}

pub async fn find_user_by_alias(pool: &PgPool, alias: &str) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(alias) = LOWER($1)")
        .bind(alias.trim())
        .fetch_optional(pool)
        .await?)
}

pub async fn get_user(pool: &PgPool, id: i64) -> Result<UserProfile, AppError> {
    let sql = format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS);
    sqlx::query_as::<_, UserProfile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))
}

pub async fn get_roles(pool: &PgPool, user_id: i64) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT r.name FROM roles r JOIN user_roles ur ON ur.role_id = r.id WHERE ur.user_id = $1 ORDER BY r.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_permissions(pool: &PgPool, user_id: i64) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT DISTINCT p.name FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         JOIN user_roles ur ON ur.role_id = rp.role_id \
         WHERE ur.user_id = $1 ORDER BY p.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn has_role(pool: &PgPool, user_id: i64, role: &str) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
         WHERE ur.user_id = $1 AND r.name = $2)",
    )
    .bind(user_id)
    .bind(role)
    .fetch_one(pool)
    .await?)
}

/// Replaces the roles of `user_id` with the named ones. Unknown names are ignored.
pub async fn set_roles(conn: &mut PgConnection, user_id: i64, roles: &[String]) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("INSERT INTO user_roles (user_id, role_id) SELECT $1, r.id FROM roles r WHERE r.name = ANY($2)")
        .bind(user_id)
        .bind(roles)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list_and_search_users(pool: &PgPool, params: &UserListParams) -> Result<Page<UserProfile>, AppError> {
    check_user_list_params(params).map_err(AppError::BadRequest)?;
    let order = allowed(&params.order_by, USER_ORDER_COLUMNS).unwrap_or("email");
    let order_column = if order == "inserted_at" { "u.inserted_at" } else { "u.email" };
    let value = params.search_value.trim();
    let mut list = ListQuery::new(USER_COLUMNS, "users u");
    if !value.is_empty() {
        list = match params.search_by.as_str() {
            "active" => list.filter("u.active", Op::Eq, value.to_lowercase() == "si"),
            "rol" => list.condition_with(
                "EXISTS (SELECT 1 FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
                 WHERE ur.user_id = u.id AND LOWER(r.name) LIKE $?)",
                format!("%{}%", value.to_lowercase()),
            ),
            _ => list.filter("u.email", Op::LowerLike, value),
        };
    }
    let list = list.order_by(order_column, params.order == "asc");
    fetch_page(pool, &list, params.page, MAX_ELEMENTS_ON_PAGE).await
}

fn conflict_if_any(messages: Vec<String>) -> Result<(), AppError> {
    if messages.is_empty() {
        Ok(())
    } else {
        Err(AppError::Conflict(messages.join(" ")))
    }
}

/// Links the active employee with `email` (if any) to `user_id`.
async fn link_employee(conn: &mut PgConnection, user_id: i64, email: &str) -> Result<u64, AppError> {
    let done = sqlx::query("UPDATE employees SET user_id = $1 WHERE LOWER(email) = LOWER($2) AND active")
        .bind(user_id)
        .bind(email)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected())
}

pub async fn create_user(pool: &PgPool, form: UserForm) -> Result<User, AppError> {
    let form = form.normalized();
    AppError::check(validate_new_user(&form))?;
    let mut taken = Vec::new();
    if find_user_by_email(pool, &form.email).await?.is_some() {
        taken.push("Este correo electrónico ya le pertenece a un usuario del sistema".to_string());
    }
    if super::pending_users::find_pending_user_by_email(pool, &form.email).await?.is_some() {
        taken.push("Este correo pertenece a un usuario pendiente de aceptación. Reintente".to_string());
    }
    if find_user_by_alias(pool, &form.alias).await?.is_some() {
        taken.push("Ya existe un usuario en el sistema con ese alias".to_string());
    }
    conflict_if_any(taken)?;

    let hash = hash_password(&form.password).await?;
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, alias, active, system_admin, google_logged) \
         VALUES ($1, $2, $3, TRUE, $4, FALSE) RETURNING *",
    )
    .bind(&form.email)
    .bind(&hash)
    .bind(&form.alias)
    .bind(form.system_admin)
    .fetch_one(&mut *tx)
    .await?;
    set_roles(&mut tx, user.id, &form.roles).await?;
    let linked = link_employee(&mut tx, user.id, &user.email).await?;
    tx.commit().await?;
    tracing::info!(user_id = user.id, linked_employees = linked, "user created");
    Ok(user)
}

/// Full edit by a system admin: account fields, roles and the admin flag.
/// Returns a notice about employee links when the email changed.
pub async fn update_user(pool: &PgPool, id: i64, form: UserForm) -> Result<Option<String>, AppError> {
    let form = form.normalized();
    let user = find_user_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;
    AppError::check(validate_user_update(&form))?;
    check_unique_account(pool, &user, &form).await?;

    let hash = match form.password.as_str() {
        "" => None,
        plain => Some(hash_password(plain).await?),
    };
    let active = form.system_admin || form.active.unwrap_or(user.active);
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE users SET email = $2, alias = $3, password = COALESCE($4, password), \
         system_admin = $5, active = $6, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(&form.email)
    .bind(&form.alias)
    .bind(hash)
    .bind(form.system_admin)
    .bind(active)
    .execute(&mut *tx)
    .await?;
    set_roles(&mut tx, id, &form.roles).await?;
    let notice = relink_employee(&mut tx, &user, &form.email).await?;
    tx.commit().await?;
    tracing::info!(user_id = id, "user updated");
    Ok(notice)
}

/// A user editing their own profile: email, alias and optionally the password.
pub async fn update_profile(pool: &PgPool, id: i64, form: UserForm) -> Result<User, AppError> {
    let form = form.normalized();
    let user = find_user_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("El usuario modificado no existe. Reintente".into()))?;
    let mut messages = crate::validation::general::check_email(&form.email, "usuario");
    messages.extend(crate::validation::fields::check_alias(&form.alias));
    if !form.password.is_empty() {
        messages.extend(crate::validation::fields::check_password(&form.password));
    }
    AppError::check(messages)?;
    check_unique_account(pool, &user, &form).await?;

    let hash = match form.password.as_str() {
        "" => None,
        plain => Some(hash_password(plain).await?),
    };
    let mut tx = pool.begin().await?;
    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET email = $2, alias = $3, password = COALESCE($4, password), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&form.email)
    .bind(&form.alias)
    .bind(hash)
    .fetch_one(&mut *tx)
    .await?;
    relink_employee(&mut tx, &user, &form.email).await?;
    tx.commit().await?;
    tracing::info!(user_id = id, "profile updated");
    Ok(updated)
}

async fn check_unique_account(pool: &PgPool, user: &User, form: &UserForm) -> Result<(), AppError> {
    let mut taken = Vec::new();
    if let Some(other) = find_user_by_email(pool, &form.email).await? {
        if other.id != user.id {
            taken.push("El correo electrónico ingresado ya está en uso".to_string());
        }
    }
    if let Some(other) = find_user_by_alias(pool, &form.alias).await? {
        if other.id != user.id {
            taken.push("Ya existe un usuario en el sistema con ese alias".to_string());
        }
    }
    conflict_if_any(taken)
}

/// On an email change, unlinks the employee of the old address and links the active one of the new.
async fn relink_employee(conn: &mut PgConnection, user: &User, new_email: &str) -> Result<Option<String>, AppError> {
    if user.email.eq_ignore_ascii_case(new_email) {
        return Ok(None);
    }
    let mut notice = Vec::new();
    let old: Option<(String,)> = sqlx::query_as(
        "UPDATE employees SET user_id = NULL WHERE user_id = $1 OR LOWER(email) = LOWER($2) RETURNING name",
    )
    .bind(user.id)
    .bind(&user.email)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((name,)) = old {
        notice.push(format!("El usuario asociado al empleado {} ha sido desvinculado", name));
    }
    let new: Option<(String, String)> = sqlx::query_as(
        "UPDATE employees SET user_id = $1 WHERE LOWER(email) = LOWER($2) AND active RETURNING name, last_name",
    )
    .bind(user.id)
    .bind(new_email)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((name, last_name)) = new {
        notice.push(format!(
            "El empleado {} {} ha sido vinculado al usuario {}",
            name, last_name, user.alias
        ));
    }
    Ok((!notice.is_empty()).then(|| notice.join(". ")))
}

/// Flips `active`. Returns the new value.
pub async fn toggle_active(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let user = find_user_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;
    if user.system_admin {
        return Err(AppError::Conflict(
            "No se puede desactivar un administrador del sistema".into(),
        ));
    }
    let active: bool =
        sqlx::query_scalar("UPDATE users SET active = NOT active, updated_at = NOW() WHERE id = $1 RETURNING active")
            .bind(id)
            .fetch_one(pool)
            .await?;
    tracing::info!(user_id = id, active, "user toggled");
    Ok(active)
}

/// Active users holding the Editor role.
pub async fn get_publishers(pool: &PgPool) -> Result<Vec<User>, AppError> {
    Ok(sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u JOIN user_roles ur ON ur.user_id = u.id JOIN roles r ON r.id = ur.role_id \
         WHERE u.active AND r.name = $1 ORDER BY u.alias",
    )
    .bind(EDITOR_ROLE)
    .fetch_all(pool)
    .await?)
}

pub const BLOCKED_USER: &str = "El usuario esta bloqueado";

/// Password login. Accounts registered through Google never match a password.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let Some(user) = find_user_by_email(pool, email).await? else {
        return Err(AppError::InvalidCredentials);
    };
    if user.google_logged || !verify_password(password, user.password.as_deref()).await {
        tracing::info!(user_id = user.id, "failed password login");
        return Err(AppError::InvalidCredentials);
    }
    if !user.active {
        return Err(AppError::Denied(BLOCKED_USER.into()));
    }
    Ok(user)
}

/// Google login: the account must have registered through Google and be active.
pub async fn google_login(pool: &PgPool, email: &str) -> Result<User, AppError> {
    if super::pending_users::find_pending_user_by_email(pool, email).await?.is_some() {
        return Err(AppError::Denied(super::pending_users::STILL_PENDING.into()));
    }
    let user = match find_user_by_email(pool, email).await? {
        Some(u) if u.google_logged => u,
        _ => return Err(AppError::Denied(NOT_REGISTERED.into())),
    };
    if !user.active {
        return Err(AppError::Denied(BLOCKED_USER.into()));
    }
    Ok(user)
}

pub const NOT_REGISTERED: &str = "Usted no realizó el registro para usuario de CEDICA.";

/// The session a logged-in user carries: roles and permissions resolved once at login.
pub async fn session_for(pool: &PgPool, user: &User) -> Result<Session, AppError> {
    let roles = get_roles(pool, user.id).await?;
    let permissions = get_permissions(pool, user.id).await?;
    Ok(Session::new(
        user.id,
        user.email.clone(),
        user.alias.clone(),
        user.system_admin,
        roles,
        permissions,
    ))
}
