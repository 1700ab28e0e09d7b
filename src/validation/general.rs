//! Field validators shared by every form. Each returns the list of messages to show; empty means valid.

use crate::config::MAX_NUMBER_ON_DATABASE;
use chrono::{Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) type StaticRegex = Lazy<Result<Regex, regex::Error>>;

/// True when the pattern compiled and matches.
pub(crate) fn matches(re: &StaticRegex, s: &str) -> bool {
    re.as_ref().map(|r| r.is_match(s)).unwrap_or(false)
}

static EMAIL_RE: StaticRegex = Lazy::new(|| Regex::new(r"^[\w\.-]+@[a-zA-Z\d\.-]+\.[a-zA-Z]{2,}$"));

const LETTERS_EXTRA: &str = "ÁÉÍÓÚáéíóúÜüñÑ";

pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Rules for a free-text field. Defaults: required, letters only, no spaces, not all digits.
#[derive(Clone, Debug)]
pub struct Text<'a> {
    label: &'a str,
    max_length: usize,
    numbers_permitted: bool,
    special_chars: &'a [char],
    spaced: bool,
    required: bool,
    only_numbers_accepted: bool,
}

impl<'a> Text<'a> {
    pub fn new(label: &'a str, max_length: usize) -> Self {
        Text {
            label,
            max_length,
            numbers_permitted: false,
            special_chars: &[],
            spaced: false,
            required: true,
            only_numbers_accepted: false,
        }
    }

    pub fn numbers(mut self) -> Self {
        self.numbers_permitted = true;
        self
    }

    pub fn specials(mut self, chars: &'a [char]) -> Self {
        self.special_chars = chars;
        self
    }

    pub fn spaced(mut self) -> Self {
        self.spaced = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Accept a value made only of digits (street names like "7", addresses).
    pub fn digits_only_ok(mut self) -> Self {
        self.only_numbers_accepted = true;
        self
    }

    fn char_allowed(&self, c: char) -> bool {
        c.is_ascii_alphabetic()
            || LETTERS_EXTRA.contains(c)
            || (self.numbers_permitted && c.is_ascii_digit())
            || self.special_chars.contains(&c)
            || (self.spaced && c == ' ')
    }

    pub fn check(&self, s: &str) -> Vec<String> {
        let label = self.label;
        let mut errors = Vec::new();
        if s.trim().is_empty() {
            if self.required {
                errors.push(format!("El campo {} es obligatorio y no lo puede dejar vacío.", label));
            }
            return errors;
        }
        if s.chars().count() > self.max_length {
            errors.push(format!(
                "El campo {} solo permite un máximo de {} caracteres.",
                label, self.max_length
            ));
        }
        // optional fields skip the charset rule
        if self.required && !s.chars().all(|c| self.char_allowed(c)) {
            errors.push(format!("El campo {} contiene caracteres no permitidos.", label));
        }
        let chars: Vec<char> = s.chars().collect();
        if !self.special_chars.is_empty()
            && chars
                .windows(2)
                .any(|w| self.special_chars.contains(&w[0]) && self.special_chars.contains(&w[1]))
        {
            errors.push(format!(
                "El campo {} no puede tener caracteres especiales consecutivos.",
                label
            ));
        }
        if self.spaced {
            if s.contains("  ") {
                errors.push(format!(
                    "El campo {} no puede contener múltiples espacios consecutivos.",
                    label
                ));
            }
        } else if s.contains(' ') {
            errors.push(format!("El campo {} no puede contener espacios.", label));
        }
        if !self.only_numbers_accepted && is_digits(s) {
            errors.push(format!("El campo {} no puede consistir únicamente de números", label));
        }
        errors
    }
}

pub fn check_dni(dni: &str, label: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_digits(dni) {
        errors.push(format!("El campo de {} solo acepta dígitos numéricos", label));
    }
    let len = dni.chars().count();
    if len != 8 {
        errors.push(format!(
            "El campo de {} debe de ser de 8 dígitos. Usted proporcionó {} dígitos",
            label, len
        ));
    }
    errors
}

pub fn check_valid_birthday(date: &str, label: &str) -> Vec<String> {
    check_valid_birthday_at(date, label, today())
}

/// A past date no older than 100 years, relative to `today`.
pub fn check_valid_birthday_at(date: &str, label: &str, today: NaiveDate) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(birthday) = parse_date(date) else {
        errors.push(format!("El campo {} fue suministrado con un formato inválido", label));
        return errors;
    };
    if birthday > today {
        errors.push(format!("El campo {} no puede sobrepasar la fecha actual", label));
    }
    if birthday < today - Duration::days(365 * 100) {
        errors.push(format!("El campo {} no puede haber sido hace 100 años", label));
    }
    errors
}

pub fn check_phone(phone: &str, label: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_digits(phone) {
        errors.push(format!("El campo {} debe de consistir solo de dígitos", label));
    }
    let len = phone.chars().count();
    if len != 10 {
        errors.push(format!(
            "El campo {} requiere de 10 dígitos y usted proporcionó {}",
            label, len
        ));
    }
    errors
}

/// Non-negative integer within `[min, max]`; `max` defaults to the INTEGER column limit.
pub fn check_number(field: &str, label: &str, min: i64, max: Option<i64>) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_digits(field) {
        errors.push(format!("El campo {} solo permite números", label));
        return errors;
    }
    let max = max.unwrap_or(MAX_NUMBER_ON_DATABASE);
    let Ok(n) = field.parse::<i64>() else {
        errors.push(format!("El campo {} supera el límite aceptable de {}. Reintente", label, max));
        return errors;
    };
    if n < min {
        errors.push(format!("El campo {} no acepta valores menores a {}", label, min));
    }
    if n > max {
        errors.push(format!("El campo {} supera el límite aceptable de {}. Reintente", label, max));
    }
    errors
}

pub fn check_radio_value(field: &str, label: &str, permitted: &[&str]) -> Vec<String> {
    if permitted.contains(&field) {
        Vec::new()
    } else {
        vec![format!("El campo {} obtuvo un valor inesperado", label)]
    }
}

pub fn check_yes_no(field: &str, label: &str) -> Vec<String> {
    check_radio_value(field, label, crate::config::YES_NO)
}

pub fn check_select(field: &str, label: &str, permitted: &[&str]) -> Vec<String> {
    if permitted.contains(&field) {
        Vec::new()
    } else {
        vec![format!("El campo {} fue suministrado con un valor no esperado", label)]
    }
}

pub fn check_checkbox_selection(
    selected: &[String],
    label: &str,
    permitted: &[&str],
    min: usize,
    max: Option<usize>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(bad) = selected.iter().find(|v| !permitted.contains(&v.as_str())) {
        errors.push(format!(
            "El campo {} fue suministrado con un valor no esperado: {}",
            label, bad
        ));
        return errors;
    }
    if selected.len() < min {
        errors.push(format!(
            "En el campo {} debe elegir al menos {} de las opciones posibles",
            label, min
        ));
    }
    let max = max.unwrap_or(permitted.len());
    if selected.len() > max {
        errors.push(format!(
            "El campo {} debe elegir como máximo {} de las opciones posibles",
            label, max
        ));
    }
    errors
}

pub fn check_email(field: &str, label: &str) -> Vec<String> {
    check_email_max(field, label, 256)
}

pub fn check_email_max(field: &str, label: &str, max_length: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if !matches(&EMAIL_RE, field) {
        errors.push(format!("El correo electrónico de {} tiene un formato inválido", label));
    }
    if field.chars().count() > max_length {
        errors.push(format!(
            "El campo {} supera el límite de caracteres de {}",
            label, max_length
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_blank_reports_only_emptiness() {
        let errs = Text::new("Nombre", 50).check("   ");
        assert_eq!(errs, vec!["El campo Nombre es obligatorio y no lo puede dejar vacío."]);
    }

    #[test]
    fn optional_blank_is_fine() {
        assert!(Text::new("Observaciones", 256).optional().check("").is_empty());
    }

    #[test]
    fn optional_text_skips_the_charset_rule() {
        let notes = || Text::new("Observaciones", 256).specials(&['\'', '.', '@', '(', ')']).spaced();
        assert!(notes().optional().check("Usa silla de ruedas!").is_empty());
        assert_eq!(
            notes().check("Usa silla de ruedas!"),
            vec!["El campo Observaciones contiene caracteres no permitidos."]
        );
        let long = "a".repeat(257);
        assert_eq!(notes().optional().check(&long).len(), 1);
    }

    #[test]
    fn text_length_and_charset() {
        let errs = Text::new("Nombre", 3).check("Ana1");
        assert!(errs.contains(&"El campo Nombre solo permite un máximo de 3 caracteres.".to_string()));
        assert!(errs.contains(&"El campo Nombre contiene caracteres no permitidos.".to_string()));
    }

    #[test]
    fn accented_letters_are_letters() {
        assert!(Text::new("Apellido", 50).spaced().check("Muñoz Ibáñez").is_empty());
    }

    #[test]
    fn consecutive_specials_and_spaces() {
        let errs = Text::new("Nombre", 50).specials(&['\'', '.']).spaced().check("O'.Neil  Jr");
        assert!(errs.iter().any(|e| e.contains("caracteres especiales consecutivos")));
        assert!(errs.iter().any(|e| e.contains("múltiples espacios consecutivos")));
        let errs = Text::new("Departamento", 3).numbers().check("4 B");
        assert!(errs.iter().any(|e| e.ends_with("no puede contener espacios.")));
    }

    #[test]
    fn only_digits_rejected_unless_allowed() {
        let errs = Text::new("Calle", 100).numbers().check("123");
        assert_eq!(errs, vec!["El campo Calle no puede consistir únicamente de números"]);
        assert!(Text::new("Calle", 100).numbers().digits_only_ok().check("123").is_empty());
    }

    #[test]
    fn dni_rules() {
        assert!(check_dni("12345678", "DNI").is_empty());
        let errs = check_dni("12a4", "DNI");
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[1], "El campo de DNI debe de ser de 8 dígitos. Usted proporcionó 4 dígitos");
    }

    #[test]
    fn phone_rules() {
        assert!(check_phone("2214567890", "Teléfono").is_empty());
        assert_eq!(check_phone("221", "Teléfono").len(), 1);
    }

    #[test]
    fn birthday_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(check_valid_birthday_at("2010-05-04", "Nacimiento", today).is_empty());
        assert_eq!(
            check_valid_birthday_at("2030-01-01", "Nacimiento", today),
            vec!["El campo Nacimiento no puede sobrepasar la fecha actual"]
        );
        assert_eq!(
            check_valid_birthday_at("1900-01-01", "Nacimiento", today),
            vec!["El campo Nacimiento no puede haber sido hace 100 años"]
        );
        assert_eq!(
            check_valid_birthday_at("04/05/2010", "Nacimiento", today),
            vec!["El campo Nacimiento fue suministrado con un formato inválido"]
        );
    }

    #[test]
    fn number_bounds() {
        assert!(check_number("5", "Grado", 1, Some(7)).is_empty());
        assert_eq!(check_number("x", "Grado", 1, Some(7)), vec!["El campo Grado solo permite números"]);
        assert_eq!(check_number("0", "Grado", 1, Some(7)), vec!["El campo Grado no acepta valores menores a 1"]);
        assert_eq!(check_number("99999999999", "Número", 0, None).len(), 1);
    }

    #[test]
    fn checkbox_selection_bounds() {
        let permitted = ["a", "b", "c"];
        assert!(check_checkbox_selection(&["a".into()], "X", &permitted, 1, None).is_empty());
        assert_eq!(check_checkbox_selection(&[], "X", &permitted, 1, None).len(), 1);
        let errs = check_checkbox_selection(&["z".into()], "X", &permitted, 1, None);
        assert_eq!(errs, vec!["El campo X fue suministrado con un valor no esperado: z"]);
    }

    #[test]
    fn email_format() {
        assert!(check_email("ana.perez@mail.com", "Tutor").is_empty());
        assert_eq!(
            check_email("ana@mail", "Tutor"),
            vec!["El correo electrónico de Tutor tiene un formato inválido"]
        );
    }

    #[test]
    fn select_and_radio() {
        assert!(check_yes_no("yes", "Becado").is_empty());
        assert_eq!(check_yes_no("si", "Becado"), vec!["El campo Becado obtuvo un valor inesperado"]);
        assert_eq!(check_select("X", "Sede", &["CASJ"]).len(), 1);
    }
}
