//! Schema DDL. Statements are idempotent and ordered by foreign-key dependency.

use crate::error::AppError;
use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(100) NOT NULL UNIQUE,
        password VARCHAR(255),
        alias VARCHAR(100) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        system_admin BOOLEAN NOT NULL DEFAULT FALSE,
        google_logged BOOLEAN NOT NULL DEFAULT FALSE,
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL UNIQUE,
        description VARCHAR(255)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role_id BIGINT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, role_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_permissions (
        role_id BIGINT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        permission_id BIGINT NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
        PRIMARY KEY (role_id, permission_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pending_users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(100) NOT NULL UNIQUE,
        registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGSERIAL PRIMARY KEY,
        dni VARCHAR(12) NOT NULL UNIQUE,
        name VARCHAR(50) NOT NULL,
        last_name VARCHAR(50) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        profession VARCHAR(100) NOT NULL,
        address VARCHAR(100) NOT NULL,
        telephone VARCHAR(20) NOT NULL,
        locality VARCHAR(100) NOT NULL,
        job_position VARCHAR(100) NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE,
        emergency_contact_name VARCHAR(100) NOT NULL,
        emergency_contact_num VARCHAR(20) NOT NULL,
        social_insurance VARCHAR(100) NOT NULL,
        affiliate_num BIGINT NOT NULL,
        condition VARCHAR(50) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        user_id BIGINT REFERENCES users(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee_documents (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        type VARCHAR(50) NOT NULL,
        format VARCHAR(10) NOT NULL,
        source VARCHAR(512) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        employee_id BIGINT NOT NULL REFERENCES employees(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS horses (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        birth_date DATE NOT NULL,
        gender VARCHAR(10) NOT NULL,
        breed VARCHAR(100) NOT NULL,
        fur VARCHAR(100) NOT NULL,
        acquisition_type VARCHAR(20) NOT NULL,
        entry_date DATE NOT NULL,
        sede VARCHAR(10) NOT NULL,
        rider_type VARCHAR(50) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        trainer_id BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        conductor_id BIGINT REFERENCES employees(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS horse_documents (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        type VARCHAR(50) NOT NULL,
        format VARCHAR(10) NOT NULL,
        source VARCHAR(512) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        horse_id BIGINT NOT NULL REFERENCES horses(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS disabilities (
        id BIGSERIAL PRIMARY KEY,
        disability_certificate BOOLEAN NOT NULL,
        diagnosis VARCHAR(100),
        other_diagnosis VARCHAR(100),
        mental BOOLEAN NOT NULL DEFAULT FALSE,
        motora BOOLEAN NOT NULL DEFAULT FALSE,
        sensorial BOOLEAN NOT NULL DEFAULT FALSE,
        visceral BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS benefits (
        id BIGSERIAL PRIMARY KEY,
        asignacion_familiar BOOLEAN NOT NULL,
        asignacion_por_hijo BOOLEAN NOT NULL DEFAULT FALSE,
        asignacion_por_hijo_con_discapacidad BOOLEAN NOT NULL DEFAULT FALSE,
        asignacion_por_ayuda_escolar BOOLEAN NOT NULL DEFAULT FALSE,
        beneficiario_de_pension BOOLEAN NOT NULL,
        naturaleza_pension VARCHAR(20)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS insurances (
        id BIGSERIAL PRIMARY KEY,
        insurance_name VARCHAR(50) NOT NULL,
        affiliate_number BIGINT NOT NULL,
        has_guardianship BOOLEAN NOT NULL,
        guardianship_observations VARCHAR(256)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schools (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        address VARCHAR(100) NOT NULL,
        phone_number VARCHAR(20) NOT NULL,
        grade INTEGER NOT NULL,
        school_observations VARCHAR(256),
        professionals VARCHAR(500)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS institutional_works (
        id BIGSERIAL PRIMARY KEY,
        proposal VARCHAR(50) NOT NULL,
        headquarters VARCHAR(10) NOT NULL,
        monday BOOLEAN NOT NULL DEFAULT FALSE,
        tuesday BOOLEAN NOT NULL DEFAULT FALSE,
        wednesday BOOLEAN NOT NULL DEFAULT FALSE,
        thursday BOOLEAN NOT NULL DEFAULT FALSE,
        friday BOOLEAN NOT NULL DEFAULT FALSE,
        saturday BOOLEAN NOT NULL DEFAULT FALSE,
        sunday BOOLEAN NOT NULL DEFAULT FALSE,
        teacher_therapist_id BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        horse_conductor_id BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        track_assistant_id BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        horse_id BIGINT REFERENCES horses(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS riders (
        id BIGSERIAL PRIMARY KEY,
        dni BIGINT NOT NULL UNIQUE,
        name VARCHAR(50) NOT NULL,
        last_name VARCHAR(50) NOT NULL,
        birthday DATE NOT NULL,
        locality VARCHAR(100) NOT NULL,
        province VARCHAR(100) NOT NULL,
        province_address VARCHAR(100) NOT NULL,
        locality_address VARCHAR(100) NOT NULL,
        street VARCHAR(100) NOT NULL,
        house_num BIGINT NOT NULL,
        dpto VARCHAR(3),
        actual_tel VARCHAR(20) NOT NULL,
        emergency_contact_name VARCHAR(50) NOT NULL,
        emergency_contact_tel VARCHAR(20) NOT NULL,
        scholarship_holder BOOLEAN NOT NULL DEFAULT FALSE,
        rider_observations VARCHAR(256),
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        has_debt BOOLEAN NOT NULL DEFAULT FALSE,
        condition BOOLEAN NOT NULL DEFAULT TRUE,
        disability_id BIGINT REFERENCES disabilities(id) ON DELETE SET NULL,
        benefit_id BIGINT REFERENCES benefits(id) ON DELETE SET NULL,
        insurance_id BIGINT REFERENCES insurances(id) ON DELETE SET NULL,
        school_id BIGINT REFERENCES schools(id) ON DELETE SET NULL,
        institutional_work_id BIGINT REFERENCES institutional_works(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rider_documents (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        type VARCHAR(50) NOT NULL,
        format VARCHAR(10) NOT NULL,
        source VARCHAR(512) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        rider_id BIGINT NOT NULL REFERENCES riders(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tutors (
        id BIGSERIAL PRIMARY KEY,
        dni VARCHAR(12) NOT NULL UNIQUE,
        name VARCHAR(50) NOT NULL,
        last_name VARCHAR(50) NOT NULL,
        province VARCHAR(100) NOT NULL,
        locality VARCHAR(100) NOT NULL,
        street VARCHAR(100) NOT NULL,
        street_number BIGINT NOT NULL,
        floor BIGINT,
        department_number VARCHAR(3),
        phone_number VARCHAR(20) NOT NULL,
        email VARCHAR(256) NOT NULL,
        scholarity_level VARCHAR(20) NOT NULL,
        occupation VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rider_tutors (
        rider_id BIGINT NOT NULL REFERENCES riders(id) ON DELETE CASCADE,
        tutor_id BIGINT NOT NULL REFERENCES tutors(id) ON DELETE CASCADE,
        kinship VARCHAR(30) NOT NULL,
        is_primary BOOLEAN NOT NULL,
        PRIMARY KEY (rider_id, tutor_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS charges (
        id BIGSERIAL PRIMARY KEY,
        rider_id BIGINT NOT NULL REFERENCES riders(id),
        charge_date DATE NOT NULL,
        payment_method VARCHAR(20) NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        receiver_id BIGINT NOT NULL REFERENCES employees(id),
        observations VARCHAR(256),
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id BIGSERIAL PRIMARY KEY,
        beneficiary_id BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        amount DOUBLE PRECISION NOT NULL,
        payment_date DATE NOT NULL,
        payment_type VARCHAR(50) NOT NULL,
        description VARCHAR(200) NOT NULL DEFAULT '',
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS publications (
        id BIGSERIAL PRIMARY KEY,
        publication_date TIMESTAMPTZ,
        creation_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        update_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        title VARCHAR(30) NOT NULL,
        summary VARCHAR(500) NOT NULL,
        content TEXT NOT NULL,
        author_id BIGINT NOT NULL REFERENCES users(id),
        state VARCHAR(20) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id BIGSERIAL PRIMARY KEY,
        state VARCHAR(20) NOT NULL DEFAULT 'pendiente',
        comment VARCHAR(256),
        creation_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        closed_date TIMESTAMPTZ,
        title VARCHAR(100) NOT NULL,
        full_name VARCHAR(100) NOT NULL,
        email VARCHAR(256) NOT NULL,
        message VARCHAR(500) NOT NULL
    )
    "#,
];

/// Every table, children first, for `reset`.
const TABLES: &[&str] = &[
    "contacts",
    "publications",
    "payments",
    "charges",
    "rider_tutors",
    "tutors",
    "rider_documents",
    "riders",
    "institutional_works",
    "schools",
    "insurances",
    "benefits",
    "disabilities",
    "horse_documents",
    "horses",
    "employee_documents",
    "employees",
    "pending_users",
    "role_permissions",
    "user_roles",
    "permissions",
    "roles",
    "users",
];

/// Create every table that does not exist yet.
pub async fn apply_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(tables = SCHEMA.len(), "schema applied");
    Ok(())
}

/// Drop all tables and recreate the schema.
pub async fn reset(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", table))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::warn!("all tables dropped");
    apply_schema(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_reset() {
        assert_eq!(SCHEMA.len(), TABLES.len());
        for table in TABLES {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(SCHEMA.iter().any(|ddl| ddl.contains(&needle)), "{table}");
        }
    }
}
