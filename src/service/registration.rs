//! The five registration sections of a rider. Each `save_*` creates the section when the
//! rider has none and updates it otherwise, so the same functions back both the first-time
//! steps and the edit endpoints. Step tokens are handled by the web layer.

use crate::config::{CONDUCTOR_POSITION, TEACHER_PROFESSION, THERAPIST_POSITION, TRACK_ASSISTANT_POSITION, YES};
use crate::error::AppError;
use crate::models::{EmployeeSummary, Horse, Rider};
use crate::validation::fields::format_name;
use crate::validation::riders::{
    check_employee_role, check_horse, parse_selection, validate_disability_and_benefits,
    validate_institutional_work_fields, validate_insurance_and_school, validate_personal_data, validate_tutors,
    DisabilityForm, InstitutionalWorkForm, InsuranceSchoolForm, PersonalDataForm, TutorsForm,
};
use crate::validation::parse_date;
use serde::Serialize;
use sqlx::PgPool;

use super::tutors::{self, TutorSlot};

pub const STEP_DISABILITY: &str = "disability";
pub const STEP_INSURANCE_AND_SCHOOL: &str = "insurance_and_school";
pub const STEP_TUTORS: &str = "tutors";
pub const STEP_INSTITUTIONAL_WORK: &str = "institutional_work";

pub const DNI_TAKEN: &str = "El DNI ingresado ya le pertenece a un jinete/amazona en el sistema";
const DNI_TAKEN_ON_UPDATE: &str = "El DNI ingresado ya le pertenece a un jinete";
pub const REGISTRATION_DONE: &str = "¡Espectacular! Se ha completado el registro";

fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

fn optional(value: &Option<String>) -> Option<String> {
    Some(text(value)).filter(|v| !v.is_empty()).map(str::to_string)
}

fn number(value: &str, label: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::invalid(format!("El campo {} debe ser un número", label)))
}

/// Validated and parsed personal data.
struct PersonalData {
    dni: i64,
    birthday: chrono::NaiveDate,
    house_num: i64,
}

fn parse_personal(form: &PersonalDataForm) -> Result<PersonalData, AppError> {
    AppError::check(validate_personal_data(form))?;
    Ok(PersonalData {
        dni: number(text(&form.dni), "D.N.I")?,
        birthday: parse_date(text(&form.birthday))
            .ok_or_else(|| AppError::invalid("La fecha de nacimiento no es válida"))?,
        house_num: number(text(&form.house_num), "Número de domicilio")?,
    })
}

/// Step one: creates the rider.
pub async fn create_personal_data(pool: &PgPool, form: &PersonalDataForm) -> Result<Rider, AppError> {
    let data = parse_personal(form)?;
    if super::riders::find_rider_by_dni(pool, data.dni).await?.is_some() {
        return Err(AppError::Conflict(DNI_TAKEN.into()));
    }
    let rider = sqlx::query_as::<_, Rider>(
        "INSERT INTO riders (dni, name, last_name, birthday, locality, province, province_address, \
         locality_address, street, house_num, dpto, actual_tel, emergency_contact_name, emergency_contact_tel, \
         scholarship_holder, rider_observations) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING *",
    )
    .bind(data.dni)
    .bind(format_name(text(&form.name)))
    .bind(format_name(text(&form.last_name)))
    .bind(data.birthday)
    .bind(text(&form.locality))
    .bind(text(&form.province))
    .bind(text(&form.province_address))
    .bind(text(&form.locality_address))
    .bind(text(&form.street))
    .bind(data.house_num)
    .bind(optional(&form.dpto))
    .bind(text(&form.actual_tel))
    .bind(text(&form.emergency_contact_name))
    .bind(text(&form.emergency_contact_tel))
    .bind(text(&form.scholarship_holder) == YES)
    .bind(optional(&form.rider_observations))
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DNI_TAKEN))?;
    tracing::info!(rider_id = rider.id, "rider created");
    Ok(rider)
}

/// Edits the personal data. The DNI is only checked for uniqueness when it changes.
pub async fn update_personal_data(pool: &PgPool, rider_id: i64, form: &PersonalDataForm) -> Result<Rider, AppError> {
    let current = super::riders::get_rider(pool, rider_id).await?;
    let data = parse_personal(form)?;
    if data.dni != current.dni && super::riders::find_rider_by_dni(pool, data.dni).await?.is_some() {
        return Err(AppError::Conflict(DNI_TAKEN_ON_UPDATE.into()));
    }
    let rider = sqlx::query_as::<_, Rider>(
        "UPDATE riders SET dni = $2, name = $3, last_name = $4, birthday = $5, locality = $6, province = $7, \
         province_address = $8, locality_address = $9, street = $10, house_num = $11, dpto = $12, actual_tel = $13, \
         emergency_contact_name = $14, emergency_contact_tel = $15, scholarship_holder = $16, \
         rider_observations = $17 WHERE id = $1 RETURNING *",
    )
    .bind(rider_id)
    .bind(data.dni)
    .bind(format_name(text(&form.name)))
    .bind(format_name(text(&form.last_name)))
    .bind(data.birthday)
    .bind(text(&form.locality))
    .bind(text(&form.province))
    .bind(text(&form.province_address))
    .bind(text(&form.locality_address))
    .bind(text(&form.street))
    .bind(data.house_num)
    .bind(optional(&form.dpto))
    .bind(text(&form.actual_tel))
    .bind(text(&form.emergency_contact_name))
    .bind(text(&form.emergency_contact_tel))
    .bind(text(&form.scholarship_holder) == YES)
    .bind(optional(&form.rider_observations))
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DNI_TAKEN_ON_UPDATE))?;
    tracing::info!(rider_id, "rider personal data updated");
    Ok(rider)
}

/// Step two: disability certificate or types, allowances and pension.
pub async fn save_disability_and_benefits(pool: &PgPool, rider_id: i64, form: &DisabilityForm) -> Result<Rider, AppError> {
    let rider = super::riders::get_rider(pool, rider_id).await?;
    AppError::check(validate_disability_and_benefits(form))?;
    let mut tx = pool.begin().await?;
    let disability_id: i64 = match rider.disability_id {
        Some(id) => sqlx::query_scalar(
            "UPDATE disabilities SET disability_certificate = $2, diagnosis = $3, other_diagnosis = $4, \
             mental = $5, motora = $6, sensorial = $7, visceral = $8 WHERE id = $1 RETURNING id",
        )
        .bind(id),
        None => sqlx::query_scalar(
            "INSERT INTO disabilities (disability_certificate, diagnosis, other_diagnosis, mental, motora, \
             sensorial, visceral) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        ),
    }
    .bind(form.has_disability())
    .bind(form.diagnosis())
    .bind(form.other_diagnosis())
    .bind(form.has_type("Mental"))
    .bind(form.has_type("Motora"))
    .bind(form.has_type("Sensorial"))
    .bind(form.has_type("Visceral"))
    .fetch_one(&mut *tx)
    .await?;
    let benefit_id: i64 = match rider.benefit_id {
        Some(id) => sqlx::query_scalar(
            "UPDATE benefits SET asignacion_familiar = $2, asignacion_por_hijo = $3, \
             asignacion_por_hijo_con_discapacidad = $4, asignacion_por_ayuda_escolar = $5, \
             beneficiario_de_pension = $6, naturaleza_pension = $7 WHERE id = $1 RETURNING id",
        )
        .bind(id),
        None => sqlx::query_scalar(
            "INSERT INTO benefits (asignacion_familiar, asignacion_por_hijo, asignacion_por_hijo_con_discapacidad, \
             asignacion_por_ayuda_escolar, beneficiario_de_pension, naturaleza_pension) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        ),
    }
    .bind(form.receives_allowance())
    .bind(form.has_benefit("asignacion_por_hijo"))
    .bind(form.has_benefit("asignacion_por_hijo_con_discapacidad"))
    .bind(form.has_benefit("asignacion_por_ayuda_escolar"))
    .bind(form.has_pension())
    .bind(form.pension_type())
    .fetch_one(&mut *tx)
    .await?;
    let rider = sqlx::query_as::<_, Rider>(
        "UPDATE riders SET disability_id = $2, benefit_id = $3 WHERE id = $1 RETURNING *",
    )
    .bind(rider_id)
    .bind(disability_id)
    .bind(benefit_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    tracing::info!(rider_id, disability_id, benefit_id, "disability and benefits saved");
    Ok(rider)
}

/// Step three: social insurance and school. The insurance name is stored in upper case.
pub async fn save_insurance_and_school(
    pool: &PgPool,
    rider_id: i64,
    form: &InsuranceSchoolForm,
) -> Result<Rider, AppError> {
    let rider = super::riders::get_rider(pool, rider_id).await?;
    AppError::check(validate_insurance_and_school(form))?;
    let affiliate_number = number(text(&form.affiliate_number), "Número de afiliado")?;
    let grade = i32::try_from(number(text(&form.rider_school_grade), "Grado")?)
        .map_err(|_| AppError::invalid("El grado debe estar entre 1 y 7"))?;
    let mut tx = pool.begin().await?;
    let insurance_id: i64 = match rider.insurance_id {
        Some(id) => sqlx::query_scalar(
            "UPDATE insurances SET insurance_name = $2, affiliate_number = $3, has_guardianship = $4, \
             guardianship_observations = $5 WHERE id = $1 RETURNING id",
        )
        .bind(id),
        None => sqlx::query_scalar(
            "INSERT INTO insurances (insurance_name, affiliate_number, has_guardianship, guardianship_observations) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        ),
    }
    .bind(text(&form.insurance_name).to_uppercase())
    .bind(affiliate_number)
    .bind(text(&form.has_guardianship) == YES)
    .bind(optional(&form.guardianship_observations))
    .fetch_one(&mut *tx)
    .await?;
    let school_id: i64 = match rider.school_id {
        Some(id) => sqlx::query_scalar(
            "UPDATE schools SET name = $2, address = $3, phone_number = $4, grade = $5, school_observations = $6, \
             professionals = $7 WHERE id = $1 RETURNING id",
        )
        .bind(id),
        None => sqlx::query_scalar(
            "INSERT INTO schools (name, address, phone_number, grade, school_observations, professionals) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        ),
    }
    .bind(text(&form.school_name))
    .bind(text(&form.school_address))
    .bind(text(&form.school_telephone))
    .bind(grade)
    .bind(optional(&form.school_observations))
    .bind(optional(&form.professionals))
    .fetch_one(&mut *tx)
    .await?;
    let rider = sqlx::query_as::<_, Rider>(
        "UPDATE riders SET insurance_id = $2, school_id = $3 WHERE id = $1 RETURNING *",
    )
    .bind(rider_id)
    .bind(insurance_id)
    .bind(school_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    tracing::info!(rider_id, insurance_id, school_id, "insurance and school saved");
    Ok(rider)
}

/// Step four: the primary tutor and, when enabled, the secondary one. A disabled secondary
/// tutor is unlinked.
pub async fn save_tutors(pool: &PgPool, rider_id: i64, form: &TutorsForm) -> Result<Rider, AppError> {
    let rider = super::riders::get_rider(pool, rider_id).await?;
    AppError::check(validate_tutors(form))?;
    let mut tx = pool.begin().await?;
    match form.second_tutor() {
        Some(secondary) => {
            // A tutor moving between slots is refused by `save_slot`, not swapped.
            tutors::save_slot(&mut tx, rider_id, TutorSlot::Primary, &form.primary).await?;
            tutors::save_slot(&mut tx, rider_id, TutorSlot::Secondary, secondary).await?;
        }
        None => {
            tutors::clear_secondary(&mut tx, rider_id).await?;
            tutors::save_slot(&mut tx, rider_id, TutorSlot::Primary, &form.primary).await?;
        }
    }
    tx.commit().await?;
    Ok(rider)
}

/// Candidates for the institutional work selectors.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOptions {
    pub teachers_therapists: Vec<EmployeeSummary>,
    pub horse_conductors: Vec<EmployeeSummary>,
    pub track_assistants: Vec<EmployeeSummary>,
    pub horses: Vec<Horse>,
}

impl WorkOptions {
    /// Message naming the missing kinds of candidates, if any.
    pub fn missing(&self) -> Option<String> {
        let mut missing = Vec::new();
        if self.teachers_therapists.is_empty() {
            missing.push("Profesor/as y/o terapeutas");
        }
        if self.horse_conductors.is_empty() {
            missing.push("Conductor@s de caballos");
        }
        if self.track_assistants.is_empty() {
            missing.push("Auxiliares de pista");
        }
        if self.horses.is_empty() {
            missing.push("Caballos");
        }
        (!missing.is_empty()).then(|| {
            format!(
                "No puede completar esta sección de trabajo institucional ya que aún no hay {} cargados en el sistema",
                missing.join(", ")
            )
        })
    }
}

/// Fails with a message when some kind of candidate is missing.
pub async fn work_options(pool: &PgPool) -> Result<WorkOptions, AppError> {
    let options = WorkOptions {
        teachers_therapists: super::team::get_teachers_and_therapists(pool).await?,
        horse_conductors: super::team::get_employees_by_job_position(pool, CONDUCTOR_POSITION).await?,
        track_assistants: super::team::get_employees_by_job_position(pool, TRACK_ASSISTANT_POSITION).await?,
        horses: super::horses::available_horses(pool, "", "").await?,
    };
    match options.missing() {
        Some(message) => Err(AppError::BadRequest(message)),
        None => Ok(options),
    }
}

struct Assignment {
    teacher_therapist_id: i64,
    horse_conductor_id: i64,
    track_assistant_id: i64,
    horse_id: i64,
}

async fn check_assignment(pool: &PgPool, form: &InstitutionalWorkForm) -> Result<Assignment, AppError> {
    let mut messages = validate_institutional_work_fields(form);
    let picks = [
        (&form.teacher_therapist, Some(TEACHER_PROFESSION), THERAPIST_POSITION, "Profesor/Terapeuta"),
        (&form.horse_conductor, None, CONDUCTOR_POSITION, "Conductor"),
        (&form.track_assistant, None, TRACK_ASSISTANT_POSITION, "Auxiliar de pista"),
    ];
    let mut ids = Vec::with_capacity(picks.len());
    for (raw, profession, position, role_name) in picks {
        match parse_selection(raw, role_name) {
            Ok(id) => {
                let employee = super::team::find_employee(pool, id).await?;
                messages.extend(check_employee_role(employee.as_ref(), profession, position, role_name));
                ids.push(id);
            }
            Err(errs) => messages.extend(errs),
        }
    }
    let horse_id = match parse_selection(&form.horse, "Caballo") {
        Ok(id) => {
            let horse = super::horses::find_horse(pool, id).await?;
            messages.extend(check_horse(horse.as_ref(), &form.headquarters, &form.proposal));
            Some(id)
        }
        Err(errs) => {
            messages.extend(errs);
            None
        }
    };
    AppError::check(messages)?;
    match (ids.as_slice(), horse_id) {
        ([teacher, conductor, assistant], Some(horse)) => Ok(Assignment {
            teacher_therapist_id: *teacher,
            horse_conductor_id: *conductor,
            track_assistant_id: *assistant,
            horse_id: horse,
        }),
        _ => Err(AppError::invalid("Selección inválida")),
    }
}

/// Step five: proposal, headquarters, days, staff and horse.
pub async fn save_institutional_work(
    pool: &PgPool,
    rider_id: i64,
    form: &InstitutionalWorkForm,
) -> Result<Rider, AppError> {
    let rider = super::riders::get_rider(pool, rider_id).await?;
    let a = check_assignment(pool, form).await?;
    let mut tx = pool.begin().await?;
    let work_id: i64 = match rider.institutional_work_id {
        Some(id) => sqlx::query_scalar(
            "UPDATE institutional_works SET proposal = $2, headquarters = $3, monday = $4, tuesday = $5, \
             wednesday = $6, thursday = $7, friday = $8, saturday = $9, sunday = $10, teacher_therapist_id = $11, \
             horse_conductor_id = $12, track_assistant_id = $13, horse_id = $14 WHERE id = $1 RETURNING id",
        )
        .bind(id),
        None => sqlx::query_scalar(
            "INSERT INTO institutional_works (proposal, headquarters, monday, tuesday, wednesday, thursday, friday, \
             saturday, sunday, teacher_therapist_id, horse_conductor_id, track_assistant_id, horse_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING id",
        ),
    }
    .bind(&form.proposal)
    .bind(&form.headquarters)
    .bind(form.works_on("monday"))
    .bind(form.works_on("tuesday"))
    .bind(form.works_on("wednesday"))
    .bind(form.works_on("thursday"))
    .bind(form.works_on("friday"))
    .bind(form.works_on("saturday"))
    .bind(form.works_on("sunday"))
    .bind(a.teacher_therapist_id)
    .bind(a.horse_conductor_id)
    .bind(a.track_assistant_id)
    .bind(a.horse_id)
    .fetch_one(&mut *tx)
    .await?;
    let rider = sqlx::query_as::<_, Rider>("UPDATE riders SET institutional_work_id = $2 WHERE id = $1 RETURNING *")
        .bind(rider_id)
        .bind(work_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!(rider_id, work_id, "institutional work saved");
    Ok(rider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_are_named() {
        let options = WorkOptions {
            teachers_therapists: vec![],
            horse_conductors: vec![],
            track_assistants: vec![EmployeeSummary {
                id: 1,
                name: "Ana".into(),
                last_name: "Paz".into(),
                dni: "30111222".into(),
                job_position: "Auxiliar de pista".into(),
            }],
            horses: vec![],
        };
        let message = options.missing().unwrap();
        assert!(message.contains("Profesor/as y/o terapeutas, Conductor@s de caballos, Caballos"));
        assert!(!message.contains("Auxiliares"));
    }

    #[test]
    fn optional_fields_trim_to_none() {
        assert_eq!(optional(&Some("  ".into())), None);
        assert_eq!(optional(&Some(" 4B ".into())).as_deref(), Some("4B"));
        assert_eq!(optional(&None), None);
    }

    #[test]
    fn numbers_report_their_label() {
        assert_eq!(number("12", "Grado").ok(), Some(12));
        assert!(matches!(
            number("doce", "Grado"),
            Err(AppError::Validation(m)) if m == vec!["El campo Grado debe ser un número"]
        ));
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::config::NO;
    use crate::service::fixtures;
    use crate::service::tutors::SAME_TUTOR_TWICE;
    use crate::validation::riders::TutorFields;

    fn tutors_form(primary: TutorFields, secondary: Option<TutorFields>) -> TutorsForm {
        TutorsForm {
            second_tutor_enabled: Some(if secondary.is_some() { YES } else { NO }.to_string()),
            primary,
            secondary,
        }
    }

    async fn linked(pool: &PgPool, rider_id: i64) -> Vec<(String, String, bool)> {
        let mut links: Vec<_> = super::super::riders::get_tutors(pool, rider_id)
            .await
            .expect("links")
            .into_iter()
            .map(|l| (l.tutor.dni, l.kinship, l.is_primary))
            .collect();
        links.sort_by_key(|l| !l.2);
        links
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn swapping_tutors_between_slots_is_refused(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let mother = fixtures::tutor("30111222", "Madre");
        let father = fixtures::tutor("28999888", "Padre");
        save_tutors(&pool, rider_id, &tutors_form(mother.clone(), Some(father.clone())))
            .await
            .expect("first save");

        let swapped = save_tutors(&pool, rider_id, &tutors_form(father.clone(), Some(mother.clone()))).await;
        assert!(matches!(swapped, Err(AppError::Conflict(m)) if m == SAME_TUTOR_TWICE));

        let aunt = fixtures::tutor("27000111", "Tia");
        let moved = save_tutors(&pool, rider_id, &tutors_form(father, Some(aunt))).await;
        assert!(matches!(moved, Err(AppError::Conflict(m)) if m == SAME_TUTOR_TWICE));

        assert_eq!(
            linked(&pool, rider_id).await,
            vec![
                ("30111222".to_string(), "Madre".to_string(), true),
                ("28999888".to_string(), "Padre".to_string(), false),
            ]
        );
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn tutors_are_relinked_and_shared_by_dni(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let sibling_id = fixtures::rider(&pool, 41222333).await;
        let mother = fixtures::tutor("30111222", "Madre");
        save_tutors(&pool, rider_id, &tutors_form(mother.clone(), Some(fixtures::tutor("28999888", "Padre"))))
            .await
            .expect("first save");

        // same DNI keeps the tutor and takes the new kinship
        let grandmother = fixtures::tutor("30111222", "Abuela");
        save_tutors(&pool, rider_id, &tutors_form(grandmother, None))
            .await
            .expect("second save");
        assert_eq!(
            linked(&pool, rider_id).await,
            vec![("30111222".to_string(), "Abuela".to_string(), true)]
        );

        save_tutors(&pool, sibling_id, &tutors_form(mother, None))
            .await
            .expect("sibling save");
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tutors WHERE dni = '30111222'")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(rows, 1);
        assert_eq!(
            linked(&pool, sibling_id).await,
            vec![("30111222".to_string(), "Madre".to_string(), true)]
        );
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres server in DATABASE_URL"]
    async fn duplicate_rider_dni_is_a_conflict(pool: PgPool) {
        fixtures::schema(&pool).await;
        let rider_id = fixtures::rider(&pool, 40111222).await;
        let copy = sqlx::query(
            "INSERT INTO riders (dni, name, last_name, birthday, locality, province, province_address, \
             locality_address, street, house_num, actual_tel, emergency_contact_name, emergency_contact_tel) \
             SELECT dni, name, last_name, birthday, locality, province, province_address, locality_address, \
             street, house_num, actual_tel, emergency_contact_name, emergency_contact_tel FROM riders WHERE id = $1",
        )
        .bind(rider_id)
        .execute(&pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, DNI_TAKEN));
        assert!(matches!(copy, Err(AppError::Conflict(m)) if m == DNI_TAKEN));
    }
}
