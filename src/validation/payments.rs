//! Payment form and listing filters.

use super::fields::{check_amount, check_description, check_is_valid_date_until_today, check_payment_type};
use super::general::parse_date;
use crate::config::FEES_PAYMENT_TYPE;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PaymentForm {
    pub beneficiary_id: String,
    pub payment_type: String,
    pub payment_date: String,
    pub amount: String,
    pub description: String,
}

impl PaymentForm {
    pub fn is_fees(&self) -> bool {
        self.payment_type == FEES_PAYMENT_TYPE
    }

    /// The selected employee id; empty means none.
    pub fn beneficiary(&self) -> Option<i64> {
        self.beneficiary_id.trim().parse().ok()
    }
}

/// Field rules. Fees need a beneficiary; whether that employee exists is checked by the caller.
pub fn validate_payment_fields(form: &PaymentForm) -> Vec<String> {
    let mut m = Vec::new();
    let amount = check_amount(&form.amount);
    if amount.is_empty() && form.amount.chars().count() > 10 {
        m.push("Monto inválido".to_string());
    }
    m.extend(amount);

    let kind = check_payment_type(&form.payment_type);
    if kind.is_empty() && form.is_fees() {
        if form.beneficiary_id.trim().is_empty() {
            m.push("Debe seleccionar un empleado".to_string());
        } else if form.beneficiary().is_none() {
            m.push(BENEFICIARY_NOT_FOUND.to_string());
        }
    }
    m.extend(kind);

    m.extend(check_is_valid_date_until_today(&form.payment_date));
    m.extend(check_description(&form.description));
    m
}

pub const BENEFICIARY_NOT_FOUND: &str = "Empleado seleccionado no encontrado. Por favor vuelva a intentar.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentFilter {
    pub page: Option<i64>,
    pub order: String,
    pub search_value: String,
    pub start_date: String,
    pub end_date: String,
}

pub fn validate_payment_filter(filter: &PaymentFilter) -> Vec<String> {
    let mut m = Vec::new();
    if !["", "asc", "desc"].contains(&filter.order.as_str()) {
        m.push("Orden inválido".to_string());
    }
    let start = (!filter.start_date.is_empty()).then(|| parse_date(&filter.start_date));
    let end = (!filter.end_date.is_empty()).then(|| parse_date(&filter.end_date));
    if matches!(start, Some(None)) {
        m.push("Fecha de inicio inválida".to_string());
    }
    if matches!(end, Some(None)) {
        m.push("Fecha de fin inválida".to_string());
    }
    if let (Some(Some(s)), Some(Some(e))) = (start, end) {
        if s > e {
            m.push("La fecha de inicio no puede ser mayor a la fecha de fin".to_string());
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PaymentForm {
        PaymentForm {
            beneficiary_id: "4".into(),
            payment_type: "Honorarios".into(),
            payment_date: "2024-02-03".into(),
            amount: "25000.50".into(),
            description: "Honorarios de febrero".into(),
        }
    }

    #[test]
    fn valid_fee_payment() {
        assert!(validate_payment_fields(&form()).is_empty());
    }

    #[test]
    fn fees_require_an_employee() {
        let mut f = form();
        f.beneficiary_id = String::new();
        assert_eq!(validate_payment_fields(&f), vec!["Debe seleccionar un empleado"]);
        f.beneficiary_id = "abc".into();
        assert_eq!(validate_payment_fields(&f), vec![BENEFICIARY_NOT_FOUND]);
    }

    #[test]
    fn other_payments_skip_the_beneficiary() {
        let mut f = form();
        f.payment_type = "Proveedor".into();
        f.beneficiary_id = String::new();
        assert!(validate_payment_fields(&f).is_empty());
        assert!(!f.is_fees());
    }

    #[test]
    fn amount_length_and_type() {
        let mut f = form();
        f.amount = "12345678901".into();
        f.payment_type = "Sueldo".into();
        assert_eq!(
            validate_payment_fields(&f),
            vec![
                "Monto inválido",
                "El tipo de pago no es válido. Por favor intentelo de nuevo"
            ]
        );
    }

    #[test]
    fn filter_dates() {
        let filter = PaymentFilter {
            start_date: "2024-03-01".into(),
            end_date: "2024-02-01".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_payment_filter(&filter),
            vec!["La fecha de inicio no puede ser mayor a la fecha de fin"]
        );
    }
}
