//! Contact messages: the public submission, the admin update and the listing filters.

use super::fields::check_name;
use super::general::{check_email, check_select, parse_date, Text};
use crate::config::CONTACT_STATES;
use serde::Deserialize;
use utoipa::ToSchema;

const MESSAGE_SPECIALS: &[char] = &['&', '-', '_', '/', ':', '(', ')', '.', ',', '#', '@', '+'];

/// Body of `POST /api/messages/`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ContactMessage {
    #[serde(rename = "recaptchaToken", default)]
    pub recaptcha_token: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

pub fn validate_contact_message(msg: &ContactMessage) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(
        Text::new("Título", 100)
            .numbers()
            .specials(MESSAGE_SPECIALS)
            .spaced()
            .digits_only_ok()
            .check(&msg.title),
    );
    m.extend(check_name(&msg.full_name));
    m.extend(check_email(&msg.email, "Formulario de contacto"));
    m.extend(
        Text::new("Cuerpo del mensaje", 500)
            .numbers()
            .specials(MESSAGE_SPECIALS)
            .spaced()
            .check(&msg.message),
    );
    m
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContactUpdateForm {
    pub state: String,
    pub comment: String,
}

pub fn validate_update_contact(form: &ContactUpdateForm) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(check_select(&form.state, "Estado de la consulta", CONTACT_STATES));
    m.extend(
        Text::new("Mensaje", 256)
            .numbers()
            .specials(&['\'', '@', '.'])
            .spaced()
            .optional()
            .digits_only_ok()
            .check(&form.comment),
    );
    m
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactFilter {
    pub page: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub estado: String,
    pub order: String,
}

impl ContactFilter {
    /// States are filtered in upper case and stored in lower case.
    pub fn state(&self) -> Option<String> {
        (!self.estado.is_empty()).then(|| self.estado.to_lowercase())
    }

    pub fn oldest_first(&self) -> bool {
        self.order == "older"
    }
}

pub fn validate_filter_params(filter: &ContactFilter) -> Vec<String> {
    let mut m = Vec::new();
    let start = (!filter.start_date.is_empty()).then(|| parse_date(&filter.start_date));
    let end = (!filter.end_date.is_empty()).then(|| parse_date(&filter.end_date));
    if matches!(start, Some(None)) {
        m.push("Fecha de inicio no válida.".to_string());
    }
    if matches!(end, Some(None)) {
        m.push("Fecha de fin no válida.".to_string());
    }
    if !m.is_empty() {
        return m;
    }
    if let (Some(Some(s)), Some(Some(e))) = (start, end) {
        if s > e {
            m.push("La fecha de inicio no puede ser mayor a la fecha de fin".to_string());
        }
    }
    if !["older", "newer", ""].contains(&filter.order.as_str()) {
        m.push("Orden no válido.".to_string());
    }
    if !["PENDIENTE", "TERMINADO", "EN PROCESO", ""].contains(&filter.estado.as_str()) {
        m.push("Estado no válido".to_string());
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            recaptcha_token: "tok".into(),
            title: "Consulta por turnos".into(),
            full_name: "Ana Gómez".into(),
            email: "ana@mail.com".into(),
            message: "Quisiera saber horarios (martes y jueves)".into(),
        }
    }

    #[test]
    fn contact_message_rules() {
        assert!(validate_contact_message(&message()).is_empty());
        let mut msg = message();
        msg.full_name = "Ana3".into();
        msg.email = "ana".into();
        let errs = validate_contact_message(&msg);
        assert_eq!(
            errs,
            vec![
                "El campo de nombre tiene caracteres no permitidos",
                "El correo electrónico de Formulario de contacto tiene un formato inválido"
            ]
        );
    }

    #[test]
    fn body_uses_camel_case_token() {
        let msg: ContactMessage = serde_json::from_str(
            r#"{"recaptchaToken":"x","title":"t","full_name":"n","email":"e","message":"m"}"#,
        )
        .unwrap();
        assert_eq!(msg.recaptcha_token, "x");
    }

    #[test]
    fn update_rules() {
        let form = ContactUpdateForm {
            state: "terminado".into(),
            comment: "Respondido por mail a ana@mail.com.".into(),
        };
        assert!(validate_update_contact(&form).is_empty());
        let form = ContactUpdateForm {
            state: "cerrado".into(),
            comment: String::new(),
        };
        assert_eq!(validate_update_contact(&form).len(), 1);
    }

    #[test]
    fn filter_rules() {
        let filter = ContactFilter {
            estado: "EN PROCESO".into(),
            order: "newer".into(),
            ..Default::default()
        };
        assert!(validate_filter_params(&filter).is_empty());
        assert_eq!(filter.state().as_deref(), Some("en proceso"));
        let filter = ContactFilter {
            start_date: "ayer".into(),
            order: "x".into(),
            ..Default::default()
        };
        assert_eq!(validate_filter_params(&filter), vec!["Fecha de inicio no válida."]);
    }
}
