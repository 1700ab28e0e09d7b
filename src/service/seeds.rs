//! Development seed data: roles, sample accounts, staff, horses, riders, publications, contacts and a payment.

use crate::config::{JOB_POSITIONS, PROFESSIONS, PROPOSALS};
use crate::error::AppError;
use crate::validation::users::UserForm;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{PgConnection, PgPool};

const SEED_PASSWORD: &str = "Cedica123";

const FIRST_NAMES: &[&str] = &["Juan", "Maria", "Carlos", "Lucia", "Jose", "Sofia", "Miguel", "Ana", "Pedro", "Laura"];
const LAST_NAMES: &[&str] = &[
    "Gonzalez", "Rodriguez", "Perez", "Gomez", "Martinez", "Lopez", "Sanchez", "Diaz", "Fernandez", "Romero",
];
const RIDER_FIRST_NAMES: &[&str] = &[
    "Andres", "Valeria", "Felipe", "Isabela", "Diego", "Carolina", "Esteban", "Camila", "Victor", "Elena",
];
const RIDER_LAST_NAMES: &[&str] = &[
    "Castro", "Vasquez", "Morales", "Salazar", "Hernandez", "Mendoza", "Paredes", "Torres", "Cruz", "Salas",
];

struct SeedUser {
    email: &'static str,
    alias: &'static str,
    roles: &'static [&'static str],
    system_admin: bool,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        email: "juan@gmail.com",
        alias: "Juan_Perez",
        roles: &["Administracion"],
        system_admin: true,
    },
    SeedUser {
        email: "user2@gmail.com",
        alias: "user2",
        roles: &["Ecuestre"],
        system_admin: false,
    },
    SeedUser {
        email: "user3@gmail.com",
        alias: "user3",
        roles: &["Administracion"],
        system_admin: false,
    },
    SeedUser {
        email: "user4@gmail.com",
        alias: "user4",
        roles: &["Voluntariado", "Editor"],
        system_admin: false,
    },
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

/// Runs every seeding step. Intended for an empty schema (`reset-db` first).
pub async fn run(pool: &PgPool) -> Result<(), AppError> {
    super::users::create_permissions(pool).await?;
    super::users::create_roles(pool).await?;

    let mut editor_id = None;
    for u in USERS {
        let user = super::users::create_user(
            pool,
            UserForm {
                email: u.email.into(),
                alias: u.alias.into(),
                password: SEED_PASSWORD.into(),
                roles: u.roles.iter().map(|r| r.to_string()).collect(),
                system_admin: u.system_admin,
                active: Some(true),
            },
        )
        .await?;
        if u.roles.contains(&crate::config::EDITOR_ROLE) {
            editor_id = Some(user.id);
        }
    }
    tracing::info!(count = USERS.len(), "seed users created");

    let mut tx = pool.begin().await?;
    let staff = seed_employees(&mut tx).await?;
    let horses = seed_horses(&mut tx, staff.trainer, staff.conductor).await?;
    seed_riders(&mut tx, &staff, &horses).await?;
    seed_payment(&mut tx, staff.conductor).await?;
    if let Some(author_id) = editor_id {
        seed_publications(&mut tx, author_id).await?;
    }
    seed_contacts(&mut tx).await?;
    tx.commit().await?;
    tracing::info!("seed data loaded");
    Ok(())
}

struct Staff {
    trainer: i64,
    conductor: i64,
    teacher: i64,
    assistant: i64,
}

#[allow(clippy::too_many_arguments)]
async fn insert_employee(
    conn: &mut PgConnection,
    dni: &str,
    name: &str,
    last_name: &str,
    email: &str,
    profession: &str,
    job_position: &str,
    condition: &str,
    affiliate_num: i64,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar(
        "INSERT INTO employees (dni, name, last_name, email, profession, address, telephone, locality, job_position, \
         start_date, emergency_contact_name, emergency_contact_num, social_insurance, affiliate_num, condition) \
         VALUES ($1, $2, $3, $4, $5, '50 y 120', '2212342249', 'La Plata', $6, CURRENT_DATE, 'Pablo Diaz', \
         '2211234567', 'IOMA', $7, $8) RETURNING id",
    )
    .bind(dni)
    .bind(name)
    .bind(last_name)
    .bind(email)
    .bind(profession)
    .bind(job_position)
    .bind(affiliate_num)
    .bind(condition)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn seed_employees(conn: &mut PgConnection) -> Result<Staff, AppError> {
    let conditions = ["Voluntario", "Personal Rentado"];
    let mut dni = 76_543_210_i64;
    for i in 1..50 {
        let (name, last_name) = (pick(FIRST_NAMES), pick(LAST_NAMES));
        insert_employee(
            conn,
            &dni.to_string(),
            name,
            last_name,
            &format!("{}_{}_{}@gmail.com", name, last_name, i).to_lowercase(),
            pick(PROFESSIONS),
            pick(JOB_POSITIONS),
            pick(&conditions),
            20_123_456_00 + i,
        )
        .await?;
        dni += 1;
    }
    let staff = Staff {
        trainer: insert_employee(
            conn,
            "12345680",
            "Jose",
            "Paz",
            "user2@gmail.com",
            "Veterinario/a",
            "Entrenador de Caballos",
            "Voluntario",
            2_012_345_603,
        )
        .await?,
        conductor: insert_employee(
            conn,
            "12345682",
            "Juana",
            "Cruz",
            "juana.cruz1@gmail.com",
            "Otra",
            "Conductor",
            "Voluntario",
            2_012_345_602,
        )
        .await?,
        teacher: insert_employee(
            conn,
            "12345683",
            "Marta",
            "Rios",
            "marta.rios@gmail.com",
            "Profesor/a",
            "Profesor de Equitacion",
            "Personal Rentado",
            2_012_345_604,
        )
        .await?,
        assistant: insert_employee(
            conn,
            "12345681",
            "Luis",
            "Gomez",
            "luis.gomez@gmail.com",
            "Otra",
            "Auxiliar de pista",
            "Personal Rentado",
            2_012_345_601,
        )
        .await?,
    };
    // the seeded trainer account shares its email with user2
    sqlx::query("UPDATE employees e SET user_id = u.id FROM users u WHERE u.email = e.email")
        .execute(&mut *conn)
        .await?;
    tracing::info!("seed employees created");
    Ok(staff)
}

async fn seed_horses(conn: &mut PgConnection, trainer: i64, conductor: i64) -> Result<Vec<(i64, &'static str)>, AppError> {
    let horses = [
        ("Niamandu", "2020-05-17", "Macho", "Andaluz", "Castaño", "Compra", "2021-03-01", "CASJ", "Deporte Ecuestre Adaptado"),
        ("Tupa", "2018-07-23", "Macho", "Árabe", "Blanco", "Donacion", "2019-09-15", "HLP", "Hipoterapia"),
        ("Arasy", "2015-10-05", "Hembra", "Criollo", "Negro", "Compra", "2016-12-20", "OTRO", "Equitacion"),
    ];
    let mut ids = Vec::with_capacity(horses.len());
    for (name, birth, gender, breed, fur, acquisition, entry, sede, rider_type) in horses {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO horses (name, birth_date, gender, breed, fur, acquisition_type, entry_date, sede, rider_type, \
             trainer_id, conductor_id) VALUES ($1, $2::date, $3, $4, $5, $6, $7::date, $8, $9, $10, $11) RETURNING id",
        )
        .bind(name)
        .bind(birth)
        .bind(gender)
        .bind(breed)
        .bind(fur)
        .bind(acquisition)
        .bind(entry)
        .bind(sede)
        .bind(rider_type)
        .bind(trainer)
        .bind(conductor)
        .fetch_one(&mut *conn)
        .await?;
        ids.push((id, sede));
    }
    tracing::info!(count = ids.len(), "seed horses created");
    Ok(ids)
}

/// Riders with personal data only; every other one also gets an institutional work.
async fn seed_riders(conn: &mut PgConnection, staff: &Staff, horses: &[(i64, &str)]) -> Result<(), AppError> {
    for i in 1..10_i64 {
        let (scholarship, debt) = {
            let mut rng = rand::thread_rng();
            (rng.gen_bool(0.5), rng.gen_bool(0.5))
        };
        let work_id: Option<i64> = match horses.get((i as usize) % horses.len().max(1)) {
            Some((horse_id, sede)) if i % 2 == 0 => Some(
                sqlx::query_scalar(
                    "INSERT INTO institutional_works (proposal, headquarters, monday, thursday, teacher_therapist_id, \
                     horse_conductor_id, track_assistant_id, horse_id) VALUES ($1, $2, TRUE, TRUE, $3, $4, $5, $6) \
                     RETURNING id",
                )
                .bind(PROPOSALS[(i as usize) % PROPOSALS.len()])
                .bind(*sede)
                .bind(staff.teacher)
                .bind(staff.conductor)
                .bind(staff.assistant)
                .bind(*horse_id)
                .fetch_one(&mut *conn)
                .await?,
            ),
            _ => None,
        };
        sqlx::query(
            "INSERT INTO riders (dni, name, last_name, birthday, locality, province, province_address, locality_address, \
             street, house_num, actual_tel, emergency_contact_name, emergency_contact_tel, scholarship_holder, \
             rider_observations, has_debt, institutional_work_id) \
             VALUES ($1, $2, $3, CURRENT_DATE - INTERVAL '10 years', 'Berisso', 'Buenos Aires', 'Buenos Aires', \
             'Brandsen', 'Ferrari', $4, '2223123456', 'Pablo', '2223654321', $5, \
             'Este jinete fue hecho automáticamente', $6, $7)",
        )
        .bind(87_654_321 + i)
        .bind(pick(RIDER_FIRST_NAMES))
        .bind(pick(RIDER_LAST_NAMES))
        .bind(i)
        .bind(scholarship)
        .bind(debt)
        .bind(work_id)
        .execute(&mut *conn)
        .await?;
    }
    tracing::info!("seed riders created");
    Ok(())
}

async fn seed_payment(conn: &mut PgConnection, beneficiary_id: i64) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO payments (beneficiary_id, amount, payment_date, payment_type, description) \
         VALUES ($1, 1000, CURRENT_DATE, 'Honorarios', 'Pago del sueldo')",
    )
    .bind(beneficiary_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn seed_publications(conn: &mut PgConnection, author_id: i64) -> Result<(), AppError> {
    for i in 1..30 {
        sqlx::query(
            "INSERT INTO publications (publication_date, title, summary, content, author_id, state) \
             VALUES (NOW(), $1, $2, $3, $4, 'Publicado')",
        )
        .bind(format!("Publicacion {}", i))
        .bind(format!("Este es el resumen de la publicacion numero: {}", i))
        .bind(format!("<p>Este es el contenido de la publicacion numero {} texto texto texto</p>", i))
        .bind(author_id)
        .execute(&mut *conn)
        .await?;
    }
    tracing::info!("seed publications created");
    Ok(())
}

async fn seed_contacts(conn: &mut PgConnection) -> Result<(), AppError> {
    for i in 1..30 {
        sqlx::query(
            "INSERT INTO contacts (comment, title, full_name, email, message) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(format!("prueba {}", i))
        .bind(format!("titulo {}", i))
        .bind(format!("sujeto prueba {}", i))
        .bind(format!("prueba{}@gmail.com", i))
        .bind(format!("mensaje prueba{}", i))
        .execute(&mut *conn)
        .await?;
    }
    tracing::info!("seed contacts created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::users::validate_new_user;

    #[test]
    fn seed_accounts_pass_user_validation() {
        for u in USERS {
            let form = UserForm {
                email: u.email.into(),
                alias: u.alias.into(),
                password: SEED_PASSWORD.into(),
                roles: u.roles.iter().map(|r| r.to_string()).collect(),
                system_admin: u.system_admin,
                active: Some(true),
            };
            assert!(validate_new_user(&form).is_empty(), "{}", u.email);
        }
    }

    #[test]
    fn seed_account_roles_exist() {
        for u in USERS {
            for role in u.roles {
                assert!(crate::config::ROLES.contains(role), "{role}");
            }
        }
    }
}
