//! Publication form, admin listing and public API parameters. These stop at the first problem.

use super::fields::strip_tags;
use super::general::parse_date;
use crate::sql::page_offset;
use crate::config::PUBLICATION_STATES;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

pub const PUBLICATION_ORDER_COLUMNS: &[&str] = &["title", "creation_date", "publication_date"];
pub const PUBLICATION_SEARCH_COLUMNS: &[&str] =
    &["", "title", "author_id", "creation_date", "publication_date", "author_alias"];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct PublicationForm {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub state: String,
    pub author_id: String,
}

impl PublicationForm {
    pub fn author(&self) -> Option<i64> {
        let id = self.author_id.trim();
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            id.parse().ok()
        } else {
            None
        }
    }
}

/// Text and state rules; the author is checked by the caller.
pub fn check_publication_fields(form: &PublicationForm) -> Result<(), String> {
    if form.title.trim().is_empty() {
        return Err("El título no puede estar vacío".into());
    }
    if form.title.chars().count() > 30 {
        return Err("El título no puede tener más de 30 caracteres".into());
    }
    if form.summary.chars().count() > 500 {
        return Err("El copete no puede tener más de 500 caracteres".into());
    }
    if form.summary.trim().is_empty() {
        return Err("El copete no puede estar vacío".into());
    }
    if strip_tags(&form.content).trim().is_empty() {
        return Err("El contenido no puede estar vacío".into());
    }
    if !PUBLICATION_STATES.contains(&form.state.as_str()) {
        return Err("El estado de la publicación no es válido".into());
    }
    if form.author().is_none() {
        return Err(AUTHOR_MISSING.into());
    }
    Ok(())
}

pub const AUTHOR_MISSING: &str = "El autor no existe";
pub const AUTHOR_NOT_EDITOR: &str = "El autor no es un editor";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicationListParams {
    pub page: i64,
    pub order: String,
    pub order_by: String,
    pub search_by: String,
    pub search_value: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for PublicationListParams {
    fn default() -> Self {
        PublicationListParams {
            page: 1,
            order: "desc".into(),
            order_by: "creation_date".into(),
            search_by: String::new(),
            search_value: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

impl PublicationListParams {
    pub fn start(&self) -> Option<NaiveDate> {
        parse_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        parse_date(&self.end_date)
    }
}

pub fn check_order_params(p: &PublicationListParams) -> Result<(), String> {
    if p.order != "asc" && p.order != "desc" {
        return Err("Dirección de orden inválida".into());
    }
    if !PUBLICATION_ORDER_COLUMNS.contains(&p.order_by.as_str()) {
        return Err("Parámetro de orden inválido".into());
    }
    if !PUBLICATION_SEARCH_COLUMNS.contains(&p.search_by.as_str()) {
        return Err("Parámetro de búsqueda inválido".into());
    }
    if !p.start_date.is_empty() {
        let start = p.start().ok_or("Fecha de inicio inválida")?;
        if !p.end_date.is_empty() {
            match p.end() {
                Some(end) if end >= start => {}
                _ => return Err("Fecha de fin inválida".into()),
            }
        }
    }
    if p.page < 1 {
        return Err("Número de página inválido".into());
    }
    Ok(())
}

/// Query of `GET /api/publications/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPublicationParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub author: Option<String>,
    pub published_from: Option<String>,
    pub published_to: Option<String>,
}

/// Parsed and checked API parameters. The author alias is looked up by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiPublicationQuery {
    pub page: i64,
    pub per_page: i64,
    pub author: Option<String>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
}

pub const DEFAULT_API_PER_PAGE: i64 = 10;
pub const MAX_API_PER_PAGE: i64 = 100;

pub fn check_api_params(p: &ApiPublicationParams) -> Result<ApiPublicationQuery, String> {
    let page = match p.page.as_deref() {
        None | Some("") => 1,
        Some(v) => v.parse::<i64>().map_err(|_| "Número de página inválido".to_string())?,
    };
    if page < 1 {
        return Err("Número de página inválido".into());
    }
    let published_from = match p.published_from.as_deref() {
        None | Some("") => None,
        Some(v) => Some(parse_date(v).ok_or("Fecha de inicio inválida")?),
    };
    let published_to = match p.published_to.as_deref() {
        None | Some("") => None,
        Some(v) => {
            let to = parse_date(v).ok_or("Fecha de fin inválida")?;
            if matches!(published_from, Some(from) if to < from) {
                return Err("Fecha de fin inválida".into());
            }
            Some(to)
        }
    };
    let per_page = match p.per_page.as_deref() {
        None | Some("") => DEFAULT_API_PER_PAGE,
        Some(v) => v.parse::<i64>().unwrap_or(0),
    };
    if per_page <= 0 || per_page > MAX_API_PER_PAGE {
        return Err("Número de elementos por página inválido".into());
    }
    if page_offset(page, per_page).is_none() {
        return Err("Número de página inválido".into());
    }
    Ok(ApiPublicationQuery {
        page,
        per_page,
        author: p.author.clone().filter(|a| !a.is_empty()),
        published_from,
        published_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PublicationForm {
        PublicationForm {
            title: "Jornada abierta".into(),
            summary: "Invitamos a la comunidad".into(),
            content: "<p>Detalles</p>".into(),
            state: "Borrador".into(),
            author_id: "2".into(),
        }
    }

    #[test]
    fn first_problem_wins() {
        assert!(check_publication_fields(&form()).is_ok());
        let mut f = form();
        f.title = " ".into();
        f.state = "Otro".into();
        assert_eq!(check_publication_fields(&f), Err("El título no puede estar vacío".into()));
    }

    #[test]
    fn markup_only_content_is_empty() {
        let mut f = form();
        f.content = "<p> </p><br>".into();
        assert_eq!(check_publication_fields(&f), Err("El contenido no puede estar vacío".into()));
    }

    #[test]
    fn list_dates_must_be_ordered() {
        let p = PublicationListParams {
            start_date: "2024-05-01".into(),
            end_date: "2024-04-01".into(),
            ..Default::default()
        };
        assert_eq!(check_order_params(&p), Err("Fecha de fin inválida".into()));
        assert!(check_order_params(&PublicationListParams::default()).is_ok());
    }

    #[test]
    fn api_params_defaults_and_errors() {
        let p = ApiPublicationParams {
            page: None,
            per_page: None,
            author: Some(String::new()),
            published_from: None,
            published_to: None,
        };
        let q = check_api_params(&p).unwrap();
        assert_eq!((q.page, q.per_page, q.author), (1, DEFAULT_API_PER_PAGE, None));

        let p = ApiPublicationParams {
            per_page: Some("0".into()),
            ..p
        };
        assert_eq!(check_api_params(&p), Err("Número de elementos por página inválido".into()));

        let p = ApiPublicationParams {
            per_page: Some(i64::MAX.to_string()),
            ..p
        };
        assert_eq!(check_api_params(&p), Err("Número de elementos por página inválido".into()));

        let p = ApiPublicationParams {
            page: Some(i64::MAX.to_string()),
            per_page: Some(MAX_API_PER_PAGE.to_string()),
            ..p
        };
        assert_eq!(check_api_params(&p), Err("Número de página inválido".into()));
    }
}
