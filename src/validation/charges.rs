//! Charge form and listing filters.

use super::general::{check_yes_no, parse_date, today};
use crate::config::{MAX_NUMBER_ON_DATABASE, PAYMENT_METHODS, YES};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChargeForm {
    pub rider_id: Option<String>,
    pub charge_date: Option<String>,
    pub payment_method: Option<String>,
    pub amount: Option<String>,
    pub debt: Option<String>,
    pub receiver_id: Option<String>,
    pub observations: Option<String>,
}

/// A charge form that passed validation, with parsed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCharge {
    pub rider_id: i64,
    pub charge_date: NaiveDate,
    pub payment_method: String,
    pub amount: f64,
    pub debt: bool,
    pub receiver_id: i64,
    pub observations: Option<String>,
}

fn parse_id(value: &Option<String>, missing: &str, invalid: &str, errors: &mut Vec<String>) -> Option<i64> {
    match value.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(missing.to_string());
            None
        }
        Some(v) => match v.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(invalid.to_string());
                None
            }
        },
    }
}

/// `,` is accepted as the decimal separator.
pub fn parse_amount(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Field rules. Returns the parsed charge when every field is well formed; the rider and
/// receiver still have to be checked against the database.
pub fn validate_charge_fields(form: &ChargeForm) -> Result<ValidCharge, Vec<String>> {
    validate_charge_fields_at(form, today())
}

pub fn validate_charge_fields_at(form: &ChargeForm, today: NaiveDate) -> Result<ValidCharge, Vec<String>> {
    let mut errors = Vec::new();
    let rider_id = parse_id(
        &form.rider_id,
        "El jinete/amazona es obligatorio",
        "El jinete/amazona fue suministrado de manera inválida",
        &mut errors,
    );

    let charge_date = match form.charge_date.as_deref().and_then(parse_date) {
        Some(d) if d > today => {
            errors.push("La fecha del cobro no puede ser mayor a la fecha de hoy".to_string());
            None
        }
        Some(d) => Some(d),
        None => {
            errors.push("El formato de la fecha es inválido".to_string());
            None
        }
    };

    let payment_method = match form.payment_method.as_deref() {
        None | Some("") => {
            errors.push("El método de pago es requerido".to_string());
            None
        }
        Some(pm) => {
            let upper = pm.trim().to_uppercase();
            if PAYMENT_METHODS.contains(&upper.as_str()) {
                Some(upper)
            } else {
                errors.push("Medio de cobro fue suministrado de manera inválida".to_string());
                None
            }
        }
    };

    let amount = match form.amount.as_deref() {
        None | Some("") => {
            errors.push("El monto es requerido".to_string());
            None
        }
        Some(raw) => match parse_amount(raw) {
            Some(n) if n <= 0.0 => {
                errors.push("El monto ingresado debe ser positivo".to_string());
                None
            }
            Some(n) if n > MAX_NUMBER_ON_DATABASE as f64 => {
                errors.push("El monto ingresado es excesivamente grande, reintente".to_string());
                None
            }
            Some(n) => Some(n),
            None => {
                errors.push("El monto debe ser un número válido".to_string());
                None
            }
        },
    };

    let debt = form.debt.as_deref().unwrap_or("");
    errors.extend(check_yes_no(debt, "Deudor"));

    let receiver_id = parse_id(
        &form.receiver_id,
        "El receptor es obligatorio",
        "El receptor fue suministrado de manera inválida",
        &mut errors,
    );

    let observations = form.observations.as_deref().map(str::trim).filter(|o| !o.is_empty());
    if let Some(obs) = observations {
        let len = obs.chars().count();
        if len > 256 {
            errors.push(format!(
                "Las observaciones tienen un límite máximo de 256 caracteres. Usted proporcionó {}",
                len
            ));
        }
    }

    match (rider_id, charge_date, payment_method, amount, receiver_id) {
        (Some(rider_id), Some(charge_date), Some(payment_method), Some(amount), Some(receiver_id))
            if errors.is_empty() =>
        {
            Ok(ValidCharge {
                rider_id,
                charge_date,
                payment_method,
                amount,
                debt: debt == YES,
                receiver_id,
                observations: observations.map(str::to_string),
            })
        }
        _ => Err(errors),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChargeFilter {
    pub start_date: String,
    pub end_date: String,
    pub payment_method: String,
    pub receiver_name: String,
    pub receiver_last_name: String,
    pub rider_id: String,
    pub order: String,
    pub page: Option<i64>,
}

impl ChargeFilter {
    pub fn rider(&self) -> Option<i64> {
        self.rider_id.trim().parse().ok()
    }

    pub fn ascending(&self) -> bool {
        self.order == "asc"
    }
}

/// Rider existence is checked by the caller when `rider_id` is set.
pub fn validate_filter_params(filter: &ChargeFilter) -> Vec<String> {
    let mut errors = Vec::new();
    let start = (!filter.start_date.is_empty()).then(|| parse_date(&filter.start_date));
    let end = (!filter.end_date.is_empty()).then(|| parse_date(&filter.end_date));
    if matches!(start, Some(None)) {
        errors.push("La fecha de inicio no es válida".to_string());
    }
    if matches!(end, Some(None)) {
        errors.push("La fecha de fin no es válida".to_string());
    }
    if let (Some(Some(s)), Some(Some(e))) = (start, end) {
        if s > e {
            errors.push("La fecha de inicio debe ser menor o igual a la fecha de fin".to_string());
        }
    }
    if !filter.payment_method.is_empty()
        && !PAYMENT_METHODS.contains(&filter.payment_method.to_uppercase().as_str())
    {
        errors.push("Método de pago no válido".to_string());
    }
    if filter.receiver_name.chars().count() > 50 {
        errors.push("El nombre del receptor es demasiado largo".to_string());
    }
    if filter.receiver_last_name.chars().count() > 50 {
        errors.push("El apellido del receptor es demasiado largo".to_string());
    }
    if !filter.rider_id.is_empty() && filter.rider().is_none() {
        errors.push("El ID del jinete debe ser un número válido".to_string());
    }
    if !["asc", "desc", ""].contains(&filter.order.as_str()) {
        errors.push("El orden no es válido".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn form() -> ChargeForm {
        ChargeForm {
            rider_id: Some("3".into()),
            charge_date: Some("2024-06-01".into()),
            payment_method: Some("efectivo".into()),
            amount: Some("1500,50".into()),
            debt: Some("no".into()),
            receiver_id: Some("7".into()),
            observations: Some("".into()),
        }
    }

    #[test]
    fn parses_a_valid_charge() {
        let charge = validate_charge_fields_at(&form(), day()).unwrap();
        assert_eq!(charge.payment_method, "EFECTIVO");
        assert_eq!(charge.amount, 1500.5);
        assert!(!charge.debt);
        assert_eq!(charge.observations, None);
    }

    #[test]
    fn amount_rules() {
        let mut f = form();
        f.amount = Some("-2".into());
        assert_eq!(
            validate_charge_fields_at(&f, day()).unwrap_err(),
            vec!["El monto ingresado debe ser positivo"]
        );
        f.amount = Some("9999999999".into());
        assert_eq!(
            validate_charge_fields_at(&f, day()).unwrap_err(),
            vec!["El monto ingresado es excesivamente grande, reintente"]
        );
        f.amount = Some("mil".into());
        assert_eq!(
            validate_charge_fields_at(&f, day()).unwrap_err(),
            vec!["El monto debe ser un número válido"]
        );
    }

    #[test]
    fn future_date_and_missing_rider() {
        let mut f = form();
        f.rider_id = None;
        f.charge_date = Some("2024-07-01".into());
        let errs = validate_charge_fields_at(&f, day()).unwrap_err();
        assert_eq!(
            errs,
            vec![
                "El jinete/amazona es obligatorio",
                "La fecha del cobro no puede ser mayor a la fecha de hoy"
            ]
        );
    }

    #[test]
    fn long_observations() {
        let mut f = form();
        f.observations = Some("a".repeat(300));
        assert_eq!(
            validate_charge_fields_at(&f, day()).unwrap_err(),
            vec!["Las observaciones tienen un límite máximo de 256 caracteres. Usted proporcionó 300"]
        );
    }

    #[test]
    fn filter_rules() {
        let filter = ChargeFilter {
            start_date: "2024-05-01".into(),
            end_date: "2024-04-01".into(),
            payment_method: "cheque".into(),
            order: "up".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_filter_params(&filter),
            vec![
                "La fecha de inicio debe ser menor o igual a la fecha de fin",
                "Método de pago no válido",
                "El orden no es válido"
            ]
        );
        assert!(validate_filter_params(&ChargeFilter::default()).is_empty());
    }
}
