//! Domain field checks: accounts, staff catalogs, money, dates, links and uploads.

use super::general::{is_digits, matches, parse_date, today, StaticRegex};
use crate::config::{
    ACCEPTED_EXTENSIONS, ACCEPTED_MIME_TYPES, CONDITIONS, JOB_POSITIONS, MAX_FILE_SIZE_BYTES, PAYMENT_TYPES,
    PROFESSIONS, ROLES,
};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: StaticRegex =
    Lazy::new(|| Regex::new(r"^[A-Za-zÁÉÍÓÚÜáéíóúüÑñ']+(?: [A-Za-zÁÉÍÓÚÜáéíóúüÑñ']+)*$"));
static AMOUNT_RE: StaticRegex = Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$"));
static URL_RE: StaticRegex = Lazy::new(|| {
    Regex::new(r"^(http://|https://)?(www\.)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,6}(/[a-zA-Z0-9@:%._+~#=/?&-]*)?$")
});
static TAG_RE: StaticRegex = Lazy::new(|| Regex::new(r"<[^>]*>"));

/// Employee DNI: exactly eight digits.
pub fn check_employee_dni(dni: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if dni.chars().count() != 8 {
        errors.push("El DNI debe consistir de 8 dígitos".to_string());
    }
    if !is_digits(dni) {
        errors.push("El DNI debe consistir de sólamente dígitos".to_string());
    }
    errors
}

/// Person name: words of letters or apostrophes separated by single spaces.
pub fn check_name(name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("El campo de nombre es obligatorio".to_string());
    }
    let len = name.chars().count();
    if len > 50 {
        errors.push(format!(
            "El campo de nombre tiene como máximo 50 caracteres. Usted proporcionó {}",
            len
        ));
    }
    if !matches(&NAME_RE, name) {
        errors.push("El campo de nombre tiene caracteres no permitidos".to_string());
    }
    errors
}

/// Letters, digits and underscores; cannot start or end with an underscore.
pub fn check_alias(alias: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if alias.is_empty() {
        errors.push("El alias no puede estar vacío.".to_string());
    }
    if alias.chars().count() > 50 {
        errors.push("El alias no puede tener más de 50 caracteres.".to_string());
    }
    let charset_ok = !alias.is_empty() && alias.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !charset_ok || alias.starts_with('_') || alias.ends_with('_') {
        errors.push(
            "El alias solo puede contener letras, números y guiones bajos, y no puede comenzar ni terminar con guion bajo."
                .to_string(),
        );
    }
    errors
}

pub fn check_password(password: &str) -> Vec<String> {
    let len = password.chars().count();
    let ok = (6..=200).contains(&len)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && !password.contains(' ');
    if ok {
        Vec::new()
    } else {
        vec![
            "La contraseña debe tener al menos 6 caracteres sin espacios en blanco, contener una mayúscula, una minúscula y un número"
                .to_string(),
        ]
    }
}

/// At least one known role unless the user is a system admin.
pub fn check_roles(roles: &[String], system_admin: bool) -> Vec<String> {
    let mut errors = Vec::new();
    if roles.is_empty() && !system_admin {
        errors.push("Debe seleccionar al menos 1 rol".to_string());
    }
    if roles.iter().any(|r| !ROLES.contains(&r.as_str())) {
        errors.push("Se suministró un rol inválido".to_string());
    }
    errors
}

pub fn check_condition(condition: &str) -> Vec<String> {
    if condition.is_empty() {
        return vec!["La condición es obligatoria".to_string()];
    }
    if !CONDITIONS.contains(&condition) {
        return vec!["La condición no es válida".to_string()];
    }
    Vec::new()
}

pub fn check_profession(profession: &str) -> Vec<String> {
    if PROFESSIONS.contains(&profession) {
        Vec::new()
    } else {
        vec!["Profesión inválida".to_string()]
    }
}

pub fn check_job_position(job_position: &str) -> Vec<String> {
    if JOB_POSITIONS.contains(&job_position) {
        Vec::new()
    } else {
        vec!["El puesto de trabajo suministrado no es válido".to_string()]
    }
}

pub fn check_payment_type(payment_type: &str) -> Vec<String> {
    if PAYMENT_TYPES.contains(&payment_type) {
        Vec::new()
    } else {
        vec!["El tipo de pago no es válido. Por favor intentelo de nuevo".to_string()]
    }
}

/// Digits with up to two decimals, dot separated.
pub fn check_amount(amount: &str) -> Vec<String> {
    if matches(&AMOUNT_RE, amount) {
        Vec::new()
    } else {
        vec!["El monto no es válido. Por favor, ingrese un número válido.".to_string()]
    }
}

/// A `YYYY-MM-DD` date with a year in 2000..=2100.
pub fn check_is_valid_date(date: &str, label: &str) -> Vec<String> {
    match parse_date(date) {
        None => vec![format!(
            "En el campo {} la fecha suministrada obtuvo un valor no válido",
            label
        )],
        Some(d) if !(2000..=2100).contains(&d.year()) => vec![format!(
            "En el campo {} el año debe ser de 4 dígitos y estar entre 2000 y 2100.",
            label
        )],
        Some(_) => Vec::new(),
    }
}

/// Like [`check_is_valid_date`] but also rejects dates after today.
pub fn check_is_valid_date_until_today(date: &str) -> Vec<String> {
    let reason = match parse_date(date) {
        None => "La fecha no tiene el formato correcto",
        Some(d) if !(2000..=2100).contains(&d.year()) => {
            "El año debe ser un número de 4 dígitos y mayor o igual a 2000."
        }
        Some(d) if d > today() => "La fecha no puede ser mayor a la fecha actual",
        Some(_) => return Vec::new(),
    };
    vec![format!("Fecha inválida: {}", reason)]
}

pub fn check_description(description: &str) -> Vec<String> {
    if description.chars().count() > 200 {
        vec!["La descripción no puede tener más de 200 caracteres".to_string()]
    } else {
        Vec::new()
    }
}

pub fn is_valid_url(url: &str) -> bool {
    matches(&URL_RE, url)
}

pub fn check_file_size(len: usize) -> bool {
    len < MAX_FILE_SIZE_BYTES
}

pub fn check_valid_format(content_type: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&content_type)
}

/// Lowercased extension including the dot, e.g. `.pdf`.
pub fn file_extension(filename: &str) -> Option<String> {
    let idx = filename.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(filename[idx..].to_lowercase())
}

pub fn check_valid_extension(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Title case: first letter of each alphabetic run upper, the rest lower.
pub fn format_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Text content with markup tags removed.
pub fn strip_tags(content: &str) -> String {
    match TAG_RE.as_ref() {
        Ok(re) => re.replace_all(content, "").into_owned(),
        Err(_) => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_edges() {
        assert!(check_alias("juan_perez").is_empty());
        assert_eq!(check_alias("_juan").len(), 1);
        assert_eq!(check_alias("juan_").len(), 1);
        assert_eq!(check_alias("juan perez").len(), 1);
        assert_eq!(check_alias("").len(), 2);
    }

    #[test]
    fn password_rules() {
        assert!(check_password("Abc123").is_empty());
        assert_eq!(check_password("abc123").len(), 1);
        assert_eq!(check_password("Abc 123").len(), 1);
        assert_eq!(check_password("Ab1").len(), 1);
    }

    #[test]
    fn roles_required_unless_sys_admin() {
        assert_eq!(check_roles(&[], false), vec!["Debe seleccionar al menos 1 rol"]);
        assert!(check_roles(&[], true).is_empty());
        assert_eq!(check_roles(&["Jefe".into()], false), vec!["Se suministró un rol inválido"]);
    }

    #[test]
    fn amount_format() {
        assert!(check_amount("1500").is_empty());
        assert!(check_amount("1500.5").is_empty());
        assert_eq!(check_amount("1500.555").len(), 1);
        assert_eq!(check_amount("-3").len(), 1);
    }

    #[test]
    fn date_year_window() {
        assert!(check_is_valid_date("2023-03-05", "Fecha").is_empty());
        assert_eq!(check_is_valid_date("1999-03-05", "Fecha").len(), 1);
        assert_eq!(check_is_valid_date("2023-02-30", "Fecha").len(), 1);
        assert_eq!(
            check_is_valid_date_until_today("2999-01-01"),
            vec!["Fecha inválida: El año debe ser un número de 4 dígitos y mayor o igual a 2000."]
        );
    }

    #[test]
    fn url_shapes() {
        assert!(is_valid_url("https://drive.google.com/file/d/abc"));
        assert!(is_valid_url("www.cedica.org"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(format_name("maría JOSÉ o'neil"), "María José O'Neil");
        assert_eq!(format_name("la plata"), "La Plata");
    }

    #[test]
    fn uploads() {
        assert!(check_file_size(1024));
        assert!(!check_file_size(MAX_FILE_SIZE_BYTES));
        assert!(check_valid_format("application/pdf"));
        assert!(!check_valid_format("text/plain"));
        assert!(check_valid_extension("informe.PDF"));
        assert!(!check_valid_extension("informe.txt"));
        assert_eq!(file_extension("a.b.docx").as_deref(), Some(".docx"));
    }

    #[test]
    fn tags_are_stripped() {
        assert_eq!(strip_tags("<p> </p>").trim(), "");
        assert_eq!(strip_tags("<b>hola</b>"), "hola");
    }

    #[test]
    fn names() {
        assert!(check_name("Ana María").is_empty());
        assert_eq!(check_name("Ana  María").len(), 1);
    }
}
