//! Horse form and listing parameters.

use super::general::{check_radio_value, check_select, check_valid_birthday_at, parse_date, today, Text};
use super::team::ListParams;
use crate::config::{ACQUISITION_TYPES, HEADQUARTERS, HORSE_GENDERS, PROPOSALS};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

pub const HORSE_SEARCH_COLUMNS: &[&str] = &["name", "rider"];
pub const HORSE_ORDER_COLUMNS: &[&str] = &["name", "birth_date", "entry_date"];
pub const HORSE_DOCUMENT_ORDERS: &[&str] = &["newer", "older", "titleA-Z", "titleZ-A"];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct HorseForm {
    pub name: String,
    pub birth_date: String,
    pub gender: String,
    pub breed: String,
    pub fur: String,
    pub acquisition_type: String,
    pub entry_date: String,
    pub sede: String,
    pub rider_type: String,
    pub trainer_id: String,
    pub conductor_id: String,
}

impl HorseForm {
    pub fn birth(&self) -> Option<NaiveDate> {
        parse_date(&self.birth_date)
    }

    pub fn entry(&self) -> Option<NaiveDate> {
        parse_date(&self.entry_date)
    }
}

/// Field rules; the trainer and conductor are judged by the caller once looked up.
pub fn validate_horse_fields(form: &HorseForm) -> Vec<String> {
    validate_horse_fields_at(form, today())
}

pub fn validate_horse_fields_at(form: &HorseForm, today: NaiveDate) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(Text::new("Nombre del caballo", 100).specials(&['\'']).spaced().check(&form.name));
    m.extend(check_select(&form.gender, "Género del caballo", HORSE_GENDERS));
    m.extend(Text::new("Raza del caballo", 100).spaced().check(&form.breed));
    m.extend(Text::new("Pelaje del caballo", 100).spaced().check(&form.fur));
    m.extend(check_radio_value(&form.acquisition_type, "Tipo de adquisición", ACQUISITION_TYPES));

    let mut dates = check_valid_birthday_at(&form.entry_date, "Fecha de ingreso", today);
    dates.extend(check_valid_birthday_at(&form.birth_date, "Fecha de nacimiento del caballo", today));
    if dates.is_empty() {
        if let (Some(birth), Some(entry)) = (form.birth(), form.entry()) {
            if birth > entry {
                dates.push("La fecha de ingreso no puede ser menor a la fecha de nacimiento.".to_string());
            }
        }
    }
    m.extend(dates);

    m.extend(check_select(&form.sede, "Sede", HEADQUARTERS));
    m.extend(check_select(&form.rider_type, "Tipo de J&A asignado", PROPOSALS));
    m
}

pub fn check_horse_order_params(params: &ListParams) -> bool {
    HORSE_ORDER_COLUMNS.contains(&params.order.as_str())
        && (params.order_direction == "asc" || params.order_direction == "desc")
        && (params.search_by.is_empty() || HORSE_SEARCH_COLUMNS.contains(&params.search_by.as_str()))
        && (params.search_by != "rider" || PROPOSALS.contains(&params.search_value.as_str()))
        && (1..=1000).contains(&params.page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> HorseForm {
        HorseForm {
            name: "Tormenta".into(),
            birth_date: "2015-10-02".into(),
            gender: "Hembra".into(),
            breed: "Criollo".into(),
            fur: "Tostado".into(),
            acquisition_type: "Donacion".into(),
            entry_date: "2018-01-15".into(),
            sede: "CASJ".into(),
            rider_type: "Hipoterapia".into(),
            trainer_id: "1".into(),
            conductor_id: "2".into(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn valid_horse() {
        assert!(validate_horse_fields_at(&form(), day()).is_empty());
    }

    #[test]
    fn entry_before_birth_is_rejected() {
        let mut f = form();
        f.entry_date = "2014-01-01".into();
        assert_eq!(
            validate_horse_fields_at(&f, day()),
            vec!["La fecha de ingreso no puede ser menor a la fecha de nacimiento."]
        );
    }

    #[test]
    fn breed_is_letters_only() {
        let mut f = form();
        f.breed = "Criollo 2".into();
        assert_eq!(validate_horse_fields_at(&f, day()).len(), 1);
    }

    #[test]
    fn rider_search_needs_a_proposal() {
        let mut p = ListParams {
            search_by: "rider".into(),
            search_value: "Polo".into(),
            ..Default::default()
        };
        assert!(!check_horse_order_params(&p));
        p.search_value = "Equitacion".into();
        assert!(check_horse_order_params(&p));
    }
}
