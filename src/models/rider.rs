use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rider {
    pub id: i64,
    pub dni: i64,
    pub name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub locality: String,
    pub province: String,
    pub province_address: String,
    pub locality_address: String,
    pub street: String,
    pub house_num: i64,
    pub dpto: Option<String>,
    pub actual_tel: String,
    pub emergency_contact_name: String,
    pub emergency_contact_tel: String,
    pub scholarship_holder: bool,
    pub rider_observations: Option<String>,
    pub inserted_at: DateTime<Utc>,
    pub has_debt: bool,
    pub condition: bool,
    pub disability_id: Option<i64>,
    pub benefit_id: Option<i64>,
    pub insurance_id: Option<i64>,
    pub school_id: Option<i64>,
    pub institutional_work_id: Option<i64>,
}

/// Listing row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RiderRow {
    pub id: i64,
    pub dni: i64,
    pub name: String,
    pub last_name: String,
    pub has_debt: bool,
    pub professionals: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Disability {
    pub id: i64,
    pub disability_certificate: bool,
    pub diagnosis: Option<String>,
    pub other_diagnosis: Option<String>,
    pub mental: bool,
    pub motora: bool,
    pub sensorial: bool,
    pub visceral: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Benefits {
    pub id: i64,
    pub asignacion_familiar: bool,
    pub asignacion_por_hijo: bool,
    pub asignacion_por_hijo_con_discapacidad: bool,
    pub asignacion_por_ayuda_escolar: bool,
    pub beneficiario_de_pension: bool,
    pub naturaleza_pension: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Insurance {
    pub id: i64,
    pub insurance_name: String,
    pub affiliate_number: i64,
    pub has_guardianship: bool,
    pub guardianship_observations: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub grade: i32,
    pub school_observations: Option<String>,
    pub professionals: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tutor {
    pub id: i64,
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub province: String,
    pub locality: String,
    pub street: String,
    pub street_number: i64,
    pub floor: Option<i64>,
    pub department_number: Option<String>,
    pub phone_number: String,
    pub email: String,
    pub scholarity_level: String,
    pub occupation: String,
}

/// A tutor as linked to one rider.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TutorLink {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub tutor: Tutor,
    pub kinship: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InstitutionalWork {
    pub id: i64,
    pub proposal: String,
    pub headquarters: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub teacher_therapist_id: Option<i64>,
    pub horse_conductor_id: Option<i64>,
    pub track_assistant_id: Option<i64>,
    pub horse_id: Option<i64>,
}

impl InstitutionalWork {
    pub fn days(&self) -> Vec<&'static str> {
        [
            (self.monday, "monday"),
            (self.tuesday, "tuesday"),
            (self.wednesday, "wednesday"),
            (self.thursday, "thursday"),
            (self.friday, "friday"),
            (self.saturday, "saturday"),
            (self.sunday, "sunday"),
        ]
        .into_iter()
        .filter_map(|(on, day)| on.then_some(day))
        .collect()
    }
}

/// Everything shown on a rider's page.
#[derive(Debug, Clone, Serialize)]
pub struct RiderDetail {
    #[serde(flatten)]
    pub rider: Rider,
    pub disability: Option<Disability>,
    pub benefits: Option<Benefits>,
    pub insurance: Option<Insurance>,
    pub school: Option<School>,
    pub tutors: Vec<TutorLink>,
    pub institutional_work: Option<InstitutionalWork>,
}

impl RiderDetail {
    pub fn primary_tutor(&self) -> Option<&TutorLink> {
        self.tutors.iter().find(|t| t.is_primary)
    }

    pub fn secondary_tutor(&self) -> Option<&TutorLink> {
        self.tutors.iter().find(|t| !t.is_primary)
    }
}
