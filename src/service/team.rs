//! Staff members: listing, registration, edition, activation and the lookups other modules
//! use to fill their selectors.

use crate::config::{
    CONDUCTOR_POSITION, MAX_ELEMENTS_ON_PAGE, TEACHER_PROFESSION, THERAPIST_POSITION,
};
use crate::error::AppError;
use crate::models::{Employee, EmployeeSummary, User};
use crate::sql::{allowed, fetch_page, ListQuery, Op, Page};
use crate::validation::team::{
    check_team_order_params, validate_employee, EmployeeForm, ListParams, TEAM_ORDER_COLUMNS,
};
use crate::validation::today;
use sqlx::PgPool;

const EMPLOYEE_COLUMNS: &str = "id, dni, name, last_name, email, profession, address, telephone, locality, \
     job_position, start_date, end_date, emergency_contact_name, emergency_contact_num, social_insurance, \
     affiliate_num, condition, active, inserted_at, user_id";

const SUMMARY_COLUMNS: &str = "id, name, last_name, dni, job_position";

pub const EMPLOYEE_NOT_FOUND: &str = "Empleado no encontrado";
pub const CREATED: &str = "Empleado registrado exitosamente";
pub const MODIFIED: &str = "Empleado modificado exitosamente";

fn search_column(search_by: &str) -> &'static str {
    match search_by {
        "last_name" => "last_name",
        "email" => "email",
        "dni" => "dni",
        "profesion" => "profession",
        _ => "name",
    }
}

pub async fn list_and_search_employees(pool: &PgPool, params: &ListParams) -> Result<Page<Employee>, AppError> {
    check_team_order_params(params).map_err(AppError::BadRequest)?;
    let order = allowed(&params.order, TEAM_ORDER_COLUMNS).unwrap_or("name");
    let mut list = ListQuery::new(EMPLOYEE_COLUMNS, "employees");
    let value = params.search_value.trim();
    if !params.search_by.is_empty() && !value.is_empty() {
        list = list.filter(search_column(&params.search_by), Op::LowerLike, value);
    }
    let list = list.order_by(order, params.order_direction == "asc");
    fetch_page(pool, &list, params.page, MAX_ELEMENTS_ON_PAGE).await
}

pub async fn find_employee(pool: &PgPool, id: i64) -> Result<Option<Employee>, AppError> {
    let sql = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);
    Ok(sqlx::query_as::<_, Employee>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn get_employee(pool: &PgPool, id: i64) -> Result<Employee, AppError> {
    find_employee(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(EMPLOYEE_NOT_FOUND.into()))
}

async fn find_by(pool: &PgPool, sql: &'static str, value: &str) -> Result<Option<i64>, AppError> {
    Ok(sqlx::query_scalar(sql).bind(value).fetch_optional(pool).await?)
}

/// DNI and email must not belong to another employee.
async fn check_unique(pool: &PgPool, form: &EmployeeForm, current: Option<&Employee>) -> Result<(), AppError> {
    let mut taken = Vec::new();
    if current.map_or(true, |e| e.dni != form.dni) {
        if find_by(pool, "SELECT id FROM employees WHERE dni = $1", &form.dni).await?.is_some() {
            taken.push("El DNI ingresado ya está en uso.".to_string());
        }
    }
    if current.map_or(true, |e| !e.email.eq_ignore_ascii_case(&form.email)) {
        if find_by(pool, "SELECT id FROM employees WHERE LOWER(email) = LOWER($1)", &form.email)
            .await?
            .is_some()
        {
            taken.push("El email ingresado ya está registrado.".to_string());
        }
    }
    if taken.is_empty() {
        Ok(())
    } else {
        Err(AppError::Conflict(taken.join(" ")))
    }
}

/// The user account an employee with `email` gets linked to. A blocked account refuses the link.
async fn linked_user(pool: &PgPool, email: &str, action: &str) -> Result<Option<User>, AppError> {
    match super::users::find_user_by_email(pool, email).await? {
        Some(user) if !user.active => Err(AppError::Conflict(format!(
            "El usuario con el mail {} esta bloqueado, desbloquéelo para poder {} el empleado",
            email, action
        ))),
        other => Ok(other),
    }
}

fn affiliate_num(form: &EmployeeForm) -> Result<i64, AppError> {
    form.affiliate_num
        .trim()
        .parse()
        .map_err(|_| AppError::invalid("El número de afiliado debe ser un número"))
}

/// Inserts a new employee. Returns it with an informational notice when it was linked to a user.
pub async fn create_employee(pool: &PgPool, form: EmployeeForm) -> Result<(Employee, Option<String>), AppError> {
    let form = form.normalized();
    AppError::check(validate_employee(&form))?;
    check_unique(pool, &form, None).await?;
    let user = linked_user(pool, &form.email, "crear").await?;
    let start = form.start().ok_or_else(|| AppError::invalid("Fecha de inicio no válida"))?;
    let sql = format!(
        "INSERT INTO employees (dni, name, last_name, email, profession, address, telephone, locality, \
         job_position, start_date, end_date, emergency_contact_name, emergency_contact_num, social_insurance, \
         affiliate_num, condition, active, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) RETURNING {}",
        EMPLOYEE_COLUMNS
    );
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(form.dni.trim())
        .bind(form.name.trim())
        .bind(form.last_name.trim())
        .bind(&form.email)
        .bind(&form.profession)
        .bind(form.address.trim())
        .bind(form.telephone.trim())
        .bind(form.locality.trim())
        .bind(&form.job_position)
        .bind(start)
        .bind(form.end())
        .bind(form.emergency_contact_name.trim())
        .bind(form.emergency_contact_num.trim())
        .bind(form.social_insurance.trim())
        .bind(affiliate_num(&form)?)
        .bind(&form.condition)
        .bind(form.is_active())
        .bind(user.as_ref().map(|u| u.id))
        .fetch_one(pool)
        .await?;
    tracing::info!(employee_id = employee.id, user_id = ?employee.user_id, "employee created");
    let notice = user.map(|u| format!("El empleado fue asociado al usuario con alias {}", u.alias));
    Ok((employee, notice))
}

/// Rewrites every field. Uniqueness is only checked for a changed DNI or email and the
/// user link is recomputed from the (possibly new) email.
pub async fn modify_employee(
    pool: &PgPool,
    id: i64,
    form: EmployeeForm,
) -> Result<(Employee, Option<String>), AppError> {
    let current = get_employee(pool, id).await?;
    let form = form.normalized();
    AppError::check(validate_employee(&form))?;
    check_unique(pool, &form, Some(&current)).await?;
    let user = linked_user(pool, &form.email, "modificar").await?;
    let start = form.start().ok_or_else(|| AppError::invalid("Fecha de inicio no válida"))?;
    let sql = format!(
        "UPDATE employees SET dni = $2, name = $3, last_name = $4, email = $5, profession = $6, address = $7, \
         telephone = $8, locality = $9, job_position = $10, start_date = $11, end_date = $12, \
         emergency_contact_name = $13, emergency_contact_num = $14, social_insurance = $15, affiliate_num = $16, \
         condition = $17, active = $18, user_id = $19 WHERE id = $1 RETURNING {}",
        EMPLOYEE_COLUMNS
    );
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .bind(form.dni.trim())
        .bind(form.name.trim())
        .bind(form.last_name.trim())
        .bind(&form.email)
        .bind(&form.profession)
        .bind(form.address.trim())
        .bind(form.telephone.trim())
        .bind(form.locality.trim())
        .bind(&form.job_position)
        .bind(start)
        .bind(form.end())
        .bind(form.emergency_contact_name.trim())
        .bind(form.emergency_contact_num.trim())
        .bind(form.social_insurance.trim())
        .bind(affiliate_num(&form)?)
        .bind(&form.condition)
        .bind(form.is_active())
        .bind(user.as_ref().map(|u| u.id))
        .fetch_one(pool)
        .await?;
    tracing::info!(employee_id = id, user_id = ?employee.user_id, "employee modified");
    let notice = match (current.user_id, user) {
        (Some(old), Some(u)) if old == u.id => None,
        (_, Some(u)) => Some(format!("El empleado fue asociado al usuario con alias {}", u.alias)),
        (Some(_), None) => Some("El empleado fue desvinculado de su usuario".to_string()),
        (None, None) => None,
    };
    Ok((employee, notice))
}

/// Deactivation stamps today's date as the end date; activation clears it.
pub async fn toggle_active(pool: &PgPool, id: i64) -> Result<Employee, AppError> {
    let current = get_employee(pool, id).await?;
    let end_date = if current.active { Some(today()) } else { None };
    let sql = format!(
        "UPDATE employees SET active = NOT active, end_date = $2 WHERE id = $1 RETURNING {}",
        EMPLOYEE_COLUMNS
    );
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .bind(end_date)
        .fetch_one(pool)
        .await?;
    tracing::info!(employee_id = id, active = employee.active, "employee toggled");
    Ok(employee)
}

/// Active employees holding `job_position`.
pub async fn get_employees_by_job_position(
    pool: &PgPool,
    job_position: &str,
) -> Result<Vec<EmployeeSummary>, AppError> {
    let sql = format!(
        "SELECT {} FROM employees WHERE active AND job_position = $1 ORDER BY last_name, name",
        SUMMARY_COLUMNS
    );
    Ok(sqlx::query_as::<_, EmployeeSummary>(&sql)
        .bind(job_position)
        .fetch_all(pool)
        .await?)
}

/// Active teachers (by profession) and therapists (by job position).
pub async fn get_teachers_and_therapists(pool: &PgPool) -> Result<Vec<EmployeeSummary>, AppError> {
    let sql = format!(
        "SELECT {} FROM employees WHERE active AND (profession = $1 OR job_position = $2) ORDER BY last_name, name",
        SUMMARY_COLUMNS
    );
    Ok(sqlx::query_as::<_, EmployeeSummary>(&sql)
        .bind(TEACHER_PROFESSION)
        .bind(THERAPIST_POSITION)
        .fetch_all(pool)
        .await?)
}

pub async fn get_active_employees(pool: &PgPool) -> Result<Vec<EmployeeSummary>, AppError> {
    let sql = format!("SELECT {} FROM employees WHERE active ORDER BY last_name, name", SUMMARY_COLUMNS);
    Ok(sqlx::query_as::<_, EmployeeSummary>(&sql).fetch_all(pool).await?)
}

/// Active conductors; horses and institutional works both pick from them.
pub async fn get_conductors(pool: &PgPool) -> Result<Vec<EmployeeSummary>, AppError> {
    get_employees_by_job_position(pool, CONDUCTOR_POSITION).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_columns_map_to_table_columns() {
        assert_eq!(search_column("profesion"), "profession");
        assert_eq!(search_column("dni"), "dni");
        assert_eq!(search_column("name"), "name");
    }

    #[test]
    fn affiliate_number_is_parsed() {
        let form = EmployeeForm {
            affiliate_num: " 1234 ".into(),
            ..Default::default()
        };
        assert_eq!(affiliate_num(&form).ok(), Some(1234));
        let form = EmployeeForm {
            affiliate_num: "x".into(),
            ..Default::default()
        };
        assert!(matches!(affiliate_num(&form), Err(AppError::Validation(_))));
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::service::fixtures;

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn deactivation_stamps_the_end_date(pool: PgPool) {
        fixtures::schema(&pool).await;
        let id = fixtures::employee(&pool, "30111222", true).await;

        let off = toggle_active(&pool, id).await.expect("deactivate");
        assert!(!off.active);
        assert_eq!(off.end_date, Some(today()));

        let on = toggle_active(&pool, id).await.expect("activate");
        assert!(on.active);
        assert_eq!(on.end_date, None);
    }
}
