//! Rows for the database-backed tests. `sqlx::test` hands each test a fresh database, so the
//! schema and the role catalog are created here first.

use crate::migration::apply_schema;
use crate::validation::riders::TutorFields;
use sqlx::PgPool;

pub async fn schema(pool: &PgPool) {
    apply_schema(pool).await.expect("schema");
    super::users::create_permissions(pool).await.expect("permissions");
    super::users::create_roles(pool).await.expect("roles");
}

pub async fn rider(pool: &PgPool, dni: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO riders (dni, name, last_name, birthday, locality, province, province_address, \
         locality_address, street, house_num, actual_tel, emergency_contact_name, emergency_contact_tel) \
         VALUES ($1, 'Ana', 'Gomez', '2012-03-04', 'La Plata', 'Buenos Aires', 'Buenos Aires', 'La Plata', \
         '7', 1200, '2215551234', 'Marta Gomez', '2215554321') RETURNING id",
    )
    .bind(dni)
    .fetch_one(pool)
    .await
    .expect("rider")
}

pub async fn employee(pool: &PgPool, dni: &str, active: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO employees (dni, name, last_name, email, profession, address, telephone, locality, \
         job_position, start_date, emergency_contact_name, emergency_contact_num, social_insurance, \
         affiliate_num, condition, active) \
         VALUES ($1, 'Juan', 'Perez', $2, 'Docente', 'Calle 7 1200', '2215550000', 'La Plata', 'Terapeuta', \
         '2020-01-02', 'Ana Perez', '2215551111', 'IOMA', 1234, 'Personal Rentado', $3) RETURNING id",
    )
    .bind(dni)
    .bind(format!("{}@cedica.org", dni))
    .bind(active)
    .fetch_one(pool)
    .await
    .expect("employee")
}

/// An active user holding `roles`.
pub async fn user(pool: &PgPool, alias: &str, roles: &[&str]) -> i64 {
    let id: i64 = sqlx::query_scalar("INSERT INTO users (email, password, alias) VALUES ($1, NULL, $2) RETURNING id")
        .bind(format!("{}@cedica.org", alias))
        .bind(alias)
        .fetch_one(pool)
        .await
        .expect("user");
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let mut conn = pool.acquire().await.expect("connection");
    super::users::set_roles(&mut conn, id, &roles).await.expect("roles");
    id
}

/// A tutor block that passes validation.
pub fn tutor(dni: &str, kinship: &str) -> TutorFields {
    TutorFields {
        dni: dni.into(),
        parentesco: kinship.into(),
        nombre: "Marta".into(),
        apellido: "Gomez".into(),
        provincia: "Buenos Aires".into(),
        localidad: "La Plata".into(),
        calle: "Diagonal 74".into(),
        numero_calle: "1200".into(),
        piso: String::new(),
        departamento: String::new(),
        celular: "2215551234".into(),
        email: format!("tutor{}@mail.com", dni),
        escolaridad: "secundario".into(),
        ocupacion: "Docente".into(),
    }
}
