//! Employee form and team listing parameters.

use super::fields::{check_condition, check_employee_dni, check_is_valid_date, check_job_position, check_profession};
use super::general::{check_email, check_number, check_phone, parse_date, today, Text};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

pub const TEAM_SEARCH_COLUMNS: &[&str] = &["name", "last_name", "email", "dni", "profesion"];
pub const TEAM_ORDER_COLUMNS: &[&str] = &["name", "last_name", "email", "start_date"];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmployeeForm {
    pub dni: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub profession: String,
    pub locality: String,
    pub address: String,
    pub job_position: String,
    pub start_date: String,
    pub end_date: String,
    pub emergency_contact_name: String,
    pub emergency_contact_num: String,
    pub social_insurance: String,
    pub affiliate_num: String,
    pub condition: String,
    pub active: String,
}

impl EmployeeForm {
    /// Blank start date means today; email is stored lowercased.
    pub fn normalized(mut self) -> Self {
        if self.start_date.trim().is_empty() {
            self.start_date = today().format("%Y-%m-%d").to_string();
        }
        self.email = self.email.trim().to_lowercase();
        self
    }

    pub fn is_active(&self) -> bool {
        self.active == "true"
    }

    pub fn start(&self) -> Option<NaiveDate> {
        parse_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        parse_date(&self.end_date)
    }
}

pub fn validate_employee(form: &EmployeeForm) -> Vec<String> {
    validate_employee_at(form, today())
}

pub fn validate_employee_at(form: &EmployeeForm, today: NaiveDate) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(check_employee_dni(&form.dni));
    m.extend(Text::new("Nombre del empleado", 50).specials(&['\'']).spaced().check(&form.name));
    m.extend(Text::new("Apellido del empleado", 50).specials(&['\'']).spaced().check(&form.last_name));
    m.extend(check_email(&form.email, "Correo electrónico del empleado"));
    m.extend(check_phone(&form.telephone, "Número de teléfono del empleado"));
    m.extend(
        Text::new("Localidad del empleado", 100)
            .numbers()
            .specials(&['\'', '.'])
            .spaced()
            .check(&form.locality),
    );
    m.extend(
        Text::new("Dirección del empleado", 100)
            .numbers()
            .specials(&['&', '.', '\''])
            .spaced()
            .digits_only_ok()
            .check(&form.address),
    );
    m.extend(check_profession(&form.profession));
    m.extend(check_job_position(&form.job_position));

    let start_errors = check_is_valid_date(&form.start_date, "Fecha de inicio");
    let start = if start_errors.is_empty() { form.start() } else { None };
    m.extend(start_errors);
    if matches!(start, Some(s) if s > today) {
        m.push("La fecha de inicio no puede ser mayor a la fecha actual".to_string());
    }
    if !form.end_date.trim().is_empty() {
        let end_errors = check_is_valid_date(&form.end_date, "Fecha de finalización");
        if end_errors.is_empty() {
            if let (Some(s), Some(e)) = (start, form.end()) {
                if s > e {
                    m.push("La fecha de inicio no puede ser mayor a la fecha de finalización".to_string());
                }
            }
        }
        m.extend(end_errors);
    }

    m.extend(
        Text::new("Nombre del contacto de emergencia del empleado", 100)
            .specials(&['\''])
            .spaced()
            .check(&form.emergency_contact_name),
    );
    m.extend(check_phone(
        &form.emergency_contact_num,
        "Número de teléfono de contacto de emergencia del empleado",
    ));
    m.extend(
        Text::new("Obra social del empleado", 100)
            .specials(&['.', '&'])
            .spaced()
            .check(&form.social_insurance),
    );
    m.extend(check_number(&form.affiliate_num, "Número de afiliado", 1, None));
    m.extend(check_condition(&form.condition));
    if form.active != "true" && form.active != "false" {
        m.push("Error en el campo activo.".to_string());
    }
    m
}

/// Query string of the team and horse listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: i64,
    pub order: String,
    pub order_direction: String,
    pub search_by: String,
    pub search_value: String,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            page: 1,
            order: "name".into(),
            order_direction: "asc".into(),
            search_by: String::new(),
            search_value: String::new(),
        }
    }
}

pub fn check_team_order_params(params: &ListParams) -> Result<(), String> {
    if !TEAM_ORDER_COLUMNS.contains(&params.order.as_str()) {
        return Err("Columna de orden inválida".into());
    }
    if params.order_direction != "asc" && params.order_direction != "desc" {
        return Err("Dirección de orden inválida".into());
    }
    if !params.search_by.is_empty() && !TEAM_SEARCH_COLUMNS.contains(&params.search_by.as_str()) {
        return Err("Columna de búsqueda inválida".into());
    }
    if !(1..=1000).contains(&params.page) {
        return Err("Número de página inválido".into());
    }
    Ok(())
}

/// Employee document renames.
pub fn check_document_title(title: &str) -> Vec<String> {
    if title.trim().is_empty() {
        vec!["El título no puede estar vacío".to_string()]
    } else if title.chars().count() > 30 {
        vec!["El título no puede tener más de 30 caracteres".to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EmployeeForm {
        EmployeeForm {
            dni: "30123456".into(),
            name: "Carla".into(),
            last_name: "D'Angelo".into(),
            email: "Carla@Mail.com".into(),
            telephone: "2214567890".into(),
            profession: "Psicologo/a".into(),
            locality: "La Plata".into(),
            address: "Calle 7 N 123".into(),
            job_position: "Terapeuta".into(),
            start_date: "2023-03-01".into(),
            end_date: "".into(),
            emergency_contact_name: "Pedro".into(),
            emergency_contact_num: "2214567891".into(),
            social_insurance: "IOMA".into(),
            affiliate_num: "55".into(),
            condition: "Voluntario".into(),
            active: "true".into(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn valid_employee_passes() {
        assert!(validate_employee_at(&form(), day("2024-01-01")).is_empty());
    }

    #[test]
    fn start_in_future_and_after_end() {
        let mut f = form();
        f.end_date = "2023-01-01".into();
        let errs = validate_employee_at(&f, day("2023-02-01"));
        assert!(errs.contains(&"La fecha de inicio no puede ser mayor a la fecha actual".to_string()));
        assert!(errs.contains(&"La fecha de inicio no puede ser mayor a la fecha de finalización".to_string()));
    }

    #[test]
    fn normalization_fills_start_and_lowercases_email() {
        let mut f = form();
        f.start_date = " ".into();
        let f = f.normalized();
        assert_eq!(f.email, "carla@mail.com");
        assert_eq!(f.start(), Some(today()));
    }

    #[test]
    fn active_flag_must_be_boolean_text() {
        let mut f = form();
        f.active = "si".into();
        assert_eq!(validate_employee_at(&f, day("2024-01-01")), vec!["Error en el campo activo."]);
    }

    #[test]
    fn order_params() {
        assert!(check_team_order_params(&ListParams::default()).is_ok());
        let p = ListParams { page: 0, ..Default::default() };
        assert_eq!(check_team_order_params(&p), Err("Número de página inválido".to_string()));
        let p = ListParams { search_by: "telefono".into(), ..Default::default() };
        assert_eq!(check_team_order_params(&p), Err("Columna de búsqueda inválida".to_string()));
    }

    #[test]
    fn document_title_limit() {
        assert!(check_document_title("Contrato").is_empty());
        assert_eq!(check_document_title(&"x".repeat(31)), vec!["El título no puede tener más de 30 caracteres"]);
    }
}
