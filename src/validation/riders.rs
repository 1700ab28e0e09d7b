//! Rider registration forms: personal data, disability and benefits, insurance and school,
//! tutors, institutional work and the listing query.

use super::general::{
    check_checkbox_selection, check_dni, check_email, check_number, check_phone, check_radio_value, check_select,
    check_valid_birthday, check_yes_no, matches, StaticRegex, Text,
};
use crate::config::{
    ARGENTINIAN_PROVINCES, DISABILITIES_IN_SYSTEM, DISABILITY_TYPES, HEADQUARTERS, OTHER_DIAGNOSIS, PENSION_TYPES,
    PROPOSALS, SCHOLARITY_LEVELS, SOCIAL_BENEFITS, WEEK_DAYS, YES,
};
use crate::models::{Employee, Horse};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::ToSchema;

static DPTO_RE: StaticRegex = Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]{1,3}$"));

const NAME_SPECIALS: &[char] = &['\'', '.'];
const ADDRESS_SPECIALS: &[char] = &['\'', '.', '&'];
const NOTE_SPECIALS: &[char] = &['\'', '.', '&', '@'];

/// Step one of the registration. Every key but `rider_observations` must be sent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PersonalDataForm {
    pub dni: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<String>,
    pub locality: Option<String>,
    pub street: Option<String>,
    pub house_num: Option<String>,
    pub dpto: Option<String>,
    pub province: Option<String>,
    pub province_address: Option<String>,
    pub locality_address: Option<String>,
    pub actual_tel: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_tel: Option<String>,
    pub scholarship_holder: Option<String>,
    pub rider_observations: Option<String>,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

impl PersonalDataForm {
    fn missing(&self) -> Vec<String> {
        let required: [(&Option<String>, &str); 15] = [
            (&self.dni, "D.N.I"),
            (&self.name, "Nombre/s"),
            (&self.last_name, "Apellido"),
            (&self.birthday, "Fecha de nacimiento"),
            (&self.locality, "Localidad de nacimiento"),
            (&self.street, "Calle"),
            (&self.house_num, "Número de domicilio"),
            (&self.dpto, "Departamento"),
            (&self.province, "Provincia de Nacimiento"),
            (&self.province_address, "Provincia del domicilio"),
            (&self.locality_address, "Localidad del domicilio"),
            (&self.actual_tel, "Teléfono actual"),
            (&self.emergency_contact_name, "Nombre de contacto de emergencia"),
            (&self.emergency_contact_tel, "Contacto de emergencia"),
            (&self.scholarship_holder, "Es becado"),
        ];
        required
            .iter()
            .filter(|(value, _)| value.is_none())
            .map(|(_, label)| format!("El campo {} no fue suministrado", label))
            .collect()
    }
}

/// Up to three letters, digits or single spaces.
pub fn check_dpto(value: &str, label: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.chars().count() > 3 {
        errors.push(format!("El campo {} no puede tener más de 3 caracteres.", label));
    }
    if !matches(&DPTO_RE, value) {
        errors.push(format!(
            "El campo {} solo puede contener letras, números y un único espacio entre caracteres.",
            label
        ));
    }
    if value.contains("  ") {
        errors.push(format!(
            "El campo {} no puede contener múltiples espacios consecutivos.",
            label
        ));
    }
    errors
}

/// Field rules for personal data. DNI uniqueness is checked by the caller against the database.
pub fn validate_personal_data(form: &PersonalDataForm) -> Vec<String> {
    let missing = form.missing();
    if !missing.is_empty() {
        return missing;
    }
    let mut m = Vec::new();
    m.extend(check_dni(field(&form.dni), "DNI"));
    m.extend(Text::new("Nombre", 50).specials(NAME_SPECIALS).spaced().check(field(&form.name)));
    m.extend(Text::new("Apellido", 50).specials(NAME_SPECIALS).spaced().check(field(&form.last_name)));
    m.extend(check_valid_birthday(field(&form.birthday), "Fecha de nacimiento"));
    m.extend(check_select(field(&form.province), "Provincia de nacimiento", ARGENTINIAN_PROVINCES));
    m.extend(
        Text::new("Localidad de nacimiento", 100)
            .numbers()
            .specials(NAME_SPECIALS)
            .spaced()
            .check(field(&form.locality)),
    );
    m.extend(check_select(field(&form.province_address), "Provincia de domicilio", ARGENTINIAN_PROVINCES));
    m.extend(
        Text::new("Localidad de domicilio", 100)
            .numbers()
            .specials(NAME_SPECIALS)
            .spaced()
            .check(field(&form.locality_address)),
    );
    m.extend(
        Text::new("Calle del domicilio", 100)
            .numbers()
            .specials(NAME_SPECIALS)
            .spaced()
            .digits_only_ok()
            .check(field(&form.street)),
    );
    m.extend(check_number(field(&form.house_num), "Número de domicilio", 0, None));
    let dpto = field(&form.dpto);
    if !dpto.is_empty() {
        m.extend(check_dpto(dpto, "Departamento de domicilio"));
    }
    m.extend(check_phone(field(&form.actual_tel), "Teléfono actual"));
    m.extend(
        Text::new("Nombre de contacto de emergencia", 50)
            .specials(NAME_SPECIALS)
            .spaced()
            .check(field(&form.emergency_contact_name)),
    );
    m.extend(check_phone(field(&form.emergency_contact_tel), "Teléfono de emergencia"));
    m.extend(check_yes_no(field(&form.scholarship_holder), "¿Es becado?"));
    m.extend(
        Text::new("Observaciones", 256)
            .numbers()
            .specials(&['\'', '.', '@', '(', ')'])
            .spaced()
            .optional()
            .check(field(&form.rider_observations)),
    );
    m
}

/// Step two: disability certificate, family allowances and pension.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DisabilityForm {
    pub has_disability: Option<String>,
    pub diagnosis: Option<String>,
    pub other_diagnosis: Option<String>,
    #[serde(default)]
    pub disability_type: Vec<String>,
    pub asignacion_familiar: Option<String>,
    #[serde(default)]
    pub beneficios_sociales: Vec<String>,
    pub has_pension: Option<String>,
    pub pension_type: Option<String>,
}

impl DisabilityForm {
    pub fn has_disability(&self) -> bool {
        field(&self.has_disability) == YES
    }

    pub fn receives_allowance(&self) -> bool {
        field(&self.asignacion_familiar) == YES
    }

    pub fn has_pension(&self) -> bool {
        field(&self.has_pension) == YES
    }

    /// The stored diagnosis text when a certificate is held.
    pub fn diagnosis(&self) -> Option<&str> {
        if self.has_disability() {
            self.diagnosis.as_deref()
        } else {
            None
        }
    }

    pub fn other_diagnosis(&self) -> Option<&str> {
        if self.has_disability() && self.diagnosis.as_deref() == Some(OTHER_DIAGNOSIS) {
            self.other_diagnosis.as_deref().map(str::trim)
        } else {
            None
        }
    }

    pub fn has_type(&self, kind: &str) -> bool {
        !self.has_disability() && self.disability_type.iter().any(|t| t == kind)
    }

    pub fn has_benefit(&self, benefit: &str) -> bool {
        self.receives_allowance() && self.beneficios_sociales.iter().any(|b| b == benefit)
    }

    pub fn pension_type(&self) -> Option<&str> {
        if self.has_pension() {
            self.pension_type.as_deref()
        } else {
            None
        }
    }
}

pub fn validate_disability_and_benefits(form: &DisabilityForm) -> Vec<String> {
    let required = [
        (&form.has_disability, "¿Posee Certificado de Discapacidad?"),
        (&form.asignacion_familiar, "¿Percibe alguna Asignación Familiar?"),
        (&form.has_pension, "¿Es beneficiario de alguna pensión?"),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(v, _)| v.is_none())
        .map(|(_, label)| *label)
        .collect();
    if !missing.is_empty() {
        return vec![format!("Faltan los siguientes campos: {}", missing.join(", "))];
    }

    let mut m = Vec::new();
    m.extend(check_yes_no(field(&form.has_disability), "¿Posee Certificado de Discapacidad?"));
    if form.has_disability() {
        match form.diagnosis.as_deref() {
            None => m.push("El campo de diagnóstico es obligatorio.".to_string()),
            Some(diagnosis) => {
                m.extend(check_select(diagnosis, "¿Con qué diagnóstico?", DISABILITIES_IN_SYSTEM));
                if diagnosis == OTHER_DIAGNOSIS {
                    match form.other_diagnosis.as_deref() {
                        None => m.push("Debe indicar qué otro diagnóstico recibió.".to_string()),
                        Some(other) => m.extend(
                            Text::new("Si es OTRO, indicar cuál", 100)
                                .numbers()
                                .specials(ADDRESS_SPECIALS)
                                .spaced()
                                .check(other),
                        ),
                    }
                }
            }
        }
    } else {
        m.extend(check_checkbox_selection(
            &form.disability_type,
            "Tipo de Discapacidad",
            DISABILITY_TYPES,
            1,
            None,
        ));
    }

    m.extend(check_yes_no(field(&form.asignacion_familiar), "¿Percibe alguna Asignación Familiar?"));
    if form.receives_allowance() {
        if form.beneficios_sociales.is_empty() {
            m.push("Debe seleccionar al menos una asignación familiar.".to_string());
        } else {
            m.extend(check_checkbox_selection(
                &form.beneficios_sociales,
                "¿Cuál asignación familiar percibe?",
                SOCIAL_BENEFITS,
                1,
                None,
            ));
        }
    }

    m.extend(check_yes_no(field(&form.has_pension), "¿Es beneficiario de alguna pensión?"));
    if form.has_pension() {
        m.extend(check_radio_value(field(&form.pension_type), "¿Cuál pensión?", PENSION_TYPES));
    }
    m
}

/// Step three: social insurance and school.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InsuranceSchoolForm {
    pub insurance_name: Option<String>,
    pub affiliate_number: Option<String>,
    pub has_guardianship: Option<String>,
    pub guardianship_observations: Option<String>,
    pub school_name: Option<String>,
    pub school_address: Option<String>,
    pub school_telephone: Option<String>,
    pub rider_school_grade: Option<String>,
    pub school_observations: Option<String>,
    pub professionals: Option<String>,
}

pub fn validate_insurance_and_school(form: &InsuranceSchoolForm) -> Vec<String> {
    let required = [
        (&form.insurance_name, "Obra Social"),
        (&form.affiliate_number, "N° de afiliado"),
        (&form.has_guardianship, "Posee Curatela"),
        (&form.school_name, "Nombre de la institución escolar"),
        (&form.school_address, "Dirección"),
        (&form.school_telephone, "Teléfono"),
        (&form.rider_school_grade, "Grado"),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(v, _)| v.is_none())
        .map(|(_, label)| *label)
        .collect();
    if !missing.is_empty() {
        return vec![format!("Faltan los siguientes campos: {}", missing.join(", "))];
    }

    let mut m = Vec::new();
    m.extend(
        Text::new("Obra social", 50)
            .specials(ADDRESS_SPECIALS)
            .spaced()
            .check(field(&form.insurance_name)),
    );
    m.extend(check_number(field(&form.affiliate_number), "Número de afiliado", 0, None));
    m.extend(check_yes_no(field(&form.has_guardianship), "Posee Curatela"));
    m.extend(
        Text::new("Observaciones de curatela", 256)
            .numbers()
            .specials(NOTE_SPECIALS)
            .spaced()
            .optional()
            .check(field(&form.guardianship_observations)),
    );
    m.extend(
        Text::new("Nombre de la institución escolar", 100)
            .numbers()
            .specials(ADDRESS_SPECIALS)
            .spaced()
            .check(field(&form.school_name)),
    );
    m.extend(
        Text::new("Dirección de la institución escolar", 100)
            .numbers()
            .specials(ADDRESS_SPECIALS)
            .spaced()
            .digits_only_ok()
            .check(field(&form.school_address)),
    );
    m.extend(check_phone(field(&form.school_telephone), "Teléfono de la institución escolar"));
    m.extend(check_number(field(&form.rider_school_grade), "Grado", 1, Some(7)));
    m.extend(
        Text::new("Observaciones de la institución escolar", 256)
            .numbers()
            .specials(NOTE_SPECIALS)
            .spaced()
            .optional()
            .check(field(&form.school_observations)),
    );
    m.extend(
        Text::new("Profesionales que lo atienden", 500)
            .numbers()
            .specials(NOTE_SPECIALS)
            .spaced()
            .optional()
            .check(field(&form.professionals)),
    );
    m
}

/// One tutor block of the tutors step.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TutorFields {
    pub dni: String,
    pub parentesco: String,
    pub nombre: String,
    pub apellido: String,
    pub provincia: String,
    pub localidad: String,
    pub calle: String,
    pub numero_calle: String,
    pub piso: String,
    pub departamento: String,
    pub celular: String,
    pub email: String,
    pub escolaridad: String,
    pub ocupacion: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TutorsForm {
    pub second_tutor_enabled: Option<String>,
    #[serde(default)]
    pub primary: TutorFields,
    pub secondary: Option<TutorFields>,
}

impl TutorsForm {
    pub fn second_tutor(&self) -> Option<&TutorFields> {
        if self.second_tutor_enabled.as_deref() == Some(YES) {
            self.secondary.as_ref()
        } else {
            None
        }
    }
}

fn validate_tutor(t: &TutorFields, slot: &str) -> Vec<String> {
    let label = |name: &str| format!("{} del tutor {}", name, slot);
    let mut m = Vec::new();
    m.extend(check_dni(&t.dni, &label("DNI")));
    m.extend(Text::new(&label("Parentesco"), 30).spaced().check(&t.parentesco));
    m.extend(Text::new(&label("Nombre"), 50).specials(&['\'']).spaced().check(&t.nombre));
    m.extend(Text::new(&label("Apellido"), 50).specials(&['\'']).spaced().check(&t.apellido));
    m.extend(check_select(&t.provincia, &label("Provincia"), ARGENTINIAN_PROVINCES));
    m.extend(
        Text::new(&label("Localidad"), 100)
            .numbers()
            .specials(ADDRESS_SPECIALS)
            .spaced()
            .check(&t.localidad),
    );
    m.extend(
        Text::new(&label("Calle"), 100)
            .numbers()
            .specials(ADDRESS_SPECIALS)
            .spaced()
            .digits_only_ok()
            .check(&t.calle),
    );
    m.extend(check_number(&t.numero_calle, &label("Número de calle"), 0, None));
    if !t.piso.is_empty() {
        m.extend(check_number(&t.piso, &label("Piso"), 0, None));
    }
    m.extend(
        Text::new(&label("Departamento"), 3)
            .numbers()
            .specials(&['°'])
            .optional()
            .digits_only_ok()
            .check(&t.departamento),
    );
    m.extend(check_phone(&t.celular, &label("Celular")));
    m.extend(check_email(&t.email, &label("Email")));
    m.extend(check_select(&t.escolaridad, &label("Nivel de escolaridad"), SCHOLARITY_LEVELS));
    m.extend(
        Text::new(&label("Ocupación"), 100)
            .specials(&['\'', '.', '-'])
            .spaced()
            .check(&t.ocupacion),
    );
    m
}

/// Form rules only; linking against existing tutors happens in the service.
pub fn validate_tutors(form: &TutorsForm) -> Vec<String> {
    let enabled = form.second_tutor_enabled.as_deref().unwrap_or("");
    let radio = check_yes_no(enabled, "Habilitar segundo tutor");
    if !radio.is_empty() {
        return radio;
    }
    let mut m = validate_tutor(&form.primary, "primario");
    if enabled == YES {
        match &form.secondary {
            Some(secondary) => {
                m.extend(validate_tutor(secondary, "secundario"));
                if secondary.dni == form.primary.dni {
                    m.push("No puede asignar dos veces el mismo tutor al mismo jinete/amazona".to_string());
                }
            }
            None => m.push("Faltan los datos del tutor secundario".to_string()),
        }
    }
    m
}

/// Step five: proposal, headquarters, days and the assigned staff and horse.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct InstitutionalWorkForm {
    pub proposal: String,
    pub headquarters: String,
    pub days_of_the_week: Vec<String>,
    pub teacher_therapist: String,
    pub horse_conductor: String,
    pub track_assistant: String,
    pub horse: String,
}

impl InstitutionalWorkForm {
    pub fn works_on(&self, day: &str) -> bool {
        self.days_of_the_week.iter().any(|d| d == day)
    }
}

pub fn validate_institutional_work_fields(form: &InstitutionalWorkForm) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(check_select(&form.proposal, "Propuesta de trabajo", PROPOSALS));
    m.extend(check_radio_value(&form.headquarters, "Sede", HEADQUARTERS));
    m.extend(check_checkbox_selection(
        &form.days_of_the_week,
        "Dias de la semana de trabajo",
        WEEK_DAYS,
        1,
        Some(7),
    ));
    m
}

/// Parses a selected id. Errors name the role being selected.
pub fn parse_selection(value: &str, role_name: &str) -> Result<i64, Vec<String>> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(vec![format!("El campo de {} no recibió lo esperado.", role_name)]);
    }
    value
        .parse::<i64>()
        .map_err(|_| vec![format!("El campo de {} recibió un formato no válido.", role_name)])
}

/// Judges a looked-up employee against the role it was selected for.
/// With both a profession and a position, either one is enough.
pub fn check_employee_role(
    employee: Option<&Employee>,
    expected_profession: Option<&str>,
    expected_job_position: &str,
    role_name: &str,
) -> Vec<String> {
    let Some(employee) = employee else {
        return vec![format!("No se seleccionó un {} real.", role_name)];
    };
    let mut m = Vec::new();
    if !employee.active {
        m.push(format!("Se seleccionó un {} no activo.", role_name));
    }
    match expected_profession {
        Some(profession) => {
            if employee.profession != profession && employee.job_position != expected_job_position {
                m.push(format!(
                    "El {} seleccionado no trabaja como {} ni como {}.",
                    role_name, profession, expected_job_position
                ));
            }
        }
        None => {
            if employee.job_position != expected_job_position {
                m.push(format!(
                    "El {} seleccionado no trabaja como {}.",
                    role_name, expected_job_position
                ));
            }
        }
    }
    m
}

pub fn check_horse(horse: Option<&Horse>, headquarters: &str, proposal: &str) -> Vec<String> {
    let Some(horse) = horse else {
        return vec!["El caballo seleccionado no corresponde a un caballo del sistema.".to_string()];
    };
    let mut m = Vec::new();
    if !horse.active {
        m.push("El caballo seleccionado no está activo".to_string());
    }
    if horse.sede != headquarters {
        m.push(format!("El caballo seleccionado no está en la sede {}", headquarters));
    }
    if horse.rider_type != proposal {
        m.push("El caballo seleccionado no participa de la actividad seleccionada".to_string());
    }
    m
}

const LISTING_KEYS: &[&str] = &["name", "last_name", "dni", "professionals", "employee", "order", "page"];
pub const RIDER_ORDERS: &[&str] = &["", "nombreA-Z", "nombreZ-A", "apellidoA-Z", "apellidoZ-A"];

pub fn validate_listing(params: &HashMap<String, String>) -> Vec<String> {
    if params.keys().any(|k| !LISTING_KEYS.contains(&k.as_str())) {
        return vec!["Ingreso parámetros no permitidos en la URL".to_string()];
    }
    let get = |k: &str| params.get(k).map(String::as_str).unwrap_or("");
    let mut m = Vec::new();
    m.extend(Text::new("Nombre", 50).specials(&['\'']).spaced().optional().check(get("name")));
    m.extend(Text::new("Apellido", 50).specials(&['\'']).spaced().optional().check(get("last_name")));
    if !get("dni").is_empty() {
        m.extend(check_dni(get("dni"), "D.N.I"));
    }
    m.extend(check_select(get("order"), "Orden", RIDER_ORDERS));
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal() -> PersonalDataForm {
        PersonalDataForm {
            dni: Some("40123456".into()),
            name: Some("juan pablo".into()),
            last_name: Some("o'neil".into()),
            birthday: Some("2012-04-10".into()),
            locality: Some("La Plata".into()),
            street: Some("7".into()),
            house_num: Some("1234".into()),
            dpto: Some("".into()),
            province: Some("Buenos Aires".into()),
            province_address: Some("Buenos Aires".into()),
            locality_address: Some("City Bell".into()),
            actual_tel: Some("2215551234".into()),
            emergency_contact_name: Some("Marta Gomez".into()),
            emergency_contact_tel: Some("2215554321".into()),
            scholarship_holder: Some("no".into()),
            rider_observations: None,
        }
    }

    #[test]
    fn personal_data_accepts_a_complete_form() {
        assert!(validate_personal_data(&personal()).is_empty());
    }

    #[test]
    fn personal_data_reports_missing_keys_only() {
        let mut form = personal();
        form.dni = None;
        form.actual_tel = None;
        form.name = Some("1".into());
        assert_eq!(
            validate_personal_data(&form),
            vec![
                "El campo D.N.I no fue suministrado",
                "El campo Teléfono actual no fue suministrado"
            ]
        );
    }

    #[test]
    fn dpto_pattern() {
        assert!(check_dpto("4B", "Depto").is_empty());
        assert!(!check_dpto("4-B", "Depto").is_empty());
        assert_eq!(check_dpto("ABCD", "Depto").len(), 2);
    }

    #[test]
    fn disability_missing_keys_are_joined() {
        let form = DisabilityForm::default();
        assert_eq!(
            validate_disability_and_benefits(&form),
            vec!["Faltan los siguientes campos: ¿Posee Certificado de Discapacidad?, ¿Percibe alguna Asignación Familiar?, ¿Es beneficiario de alguna pensión?"]
        );
    }

    #[test]
    fn other_diagnosis_required_for_otro() {
        let form = DisabilityForm {
            has_disability: Some("yes".into()),
            diagnosis: Some("OTRO".into()),
            asignacion_familiar: Some("no".into()),
            has_pension: Some("no".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_disability_and_benefits(&form),
            vec!["Debe indicar qué otro diagnóstico recibió."]
        );
    }

    #[test]
    fn allowance_needs_a_benefit_and_types_need_one() {
        let form = DisabilityForm {
            has_disability: Some("no".into()),
            asignacion_familiar: Some("yes".into()),
            has_pension: Some("yes".into()),
            pension_type: Some("Nacional".into()),
            ..Default::default()
        };
        let errs = validate_disability_and_benefits(&form);
        assert!(errs.contains(&"Debe seleccionar al menos una asignación familiar.".to_string()));
        assert!(errs.iter().any(|e| e.contains("Tipo de Discapacidad")));
        assert!(!form.has_type("Motora"));
        assert_eq!(form.pension_type(), Some("Nacional"));
    }

    #[test]
    fn insurance_and_school_grade_bounds() {
        let form = InsuranceSchoolForm {
            insurance_name: Some("IOMA".into()),
            affiliate_number: Some("123".into()),
            has_guardianship: Some("no".into()),
            guardianship_observations: Some("".into()),
            school_name: Some("Escuela 12".into()),
            school_address: Some("Calle 50 123".into()),
            school_telephone: Some("2214441234".into()),
            rider_school_grade: Some("8".into()),
            school_observations: None,
            professionals: None,
        };
        assert_eq!(
            validate_insurance_and_school(&form),
            vec!["El campo Grado supera el límite aceptable de 7. Reintente"]
        );
    }

    fn tutor(dni: &str) -> TutorFields {
        TutorFields {
            dni: dni.into(),
            parentesco: "Madre".into(),
            nombre: "Laura".into(),
            apellido: "Pérez".into(),
            provincia: "Buenos Aires".into(),
            localidad: "La Plata".into(),
            calle: "12".into(),
            numero_calle: "456".into(),
            piso: "".into(),
            departamento: "".into(),
            celular: "2215550000".into(),
            email: "laura@mail.com".into(),
            escolaridad: "secundario".into(),
            ocupacion: "Docente".into(),
        }
    }

    #[test]
    fn tutors_rejects_same_dni_twice() {
        let form = TutorsForm {
            second_tutor_enabled: Some("yes".into()),
            primary: tutor("30111222"),
            secondary: Some(tutor("30111222")),
        };
        assert_eq!(
            validate_tutors(&form),
            vec!["No puede asignar dos veces el mismo tutor al mismo jinete/amazona"]
        );
    }

    #[test]
    fn secondary_ignored_when_disabled() {
        let form = TutorsForm {
            second_tutor_enabled: Some("no".into()),
            primary: tutor("30111222"),
            secondary: Some(tutor("x")),
        };
        assert!(validate_tutors(&form).is_empty());
        assert!(form.second_tutor().is_none());
    }

    #[test]
    fn listing_rejects_unknown_keys() {
        let mut params = HashMap::new();
        params.insert("foo".to_string(), "bar".to_string());
        assert_eq!(validate_listing(&params), vec!["Ingreso parámetros no permitidos en la URL"]);
        let mut params = HashMap::new();
        params.insert("order".to_string(), "apellidoZ-A".to_string());
        assert!(validate_listing(&params).is_empty());
    }

    #[test]
    fn selection_must_be_numeric() {
        assert_eq!(parse_selection("12", "Caballo"), Ok(12));
        assert!(parse_selection("doce", "Caballo").is_err());
    }
}
