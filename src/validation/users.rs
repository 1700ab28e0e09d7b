//! User account forms, user listing parameters and the pending-user listing.

use super::fields::{check_alias, check_password, check_roles};
use super::general::{check_email, check_select};
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub const USER_SEARCH_COLUMNS: &[&str] = &["email", "active", "rol"];
pub const USER_ORDER_COLUMNS: &[&str] = &["email", "inserted_at"];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserForm {
    pub email: String,
    pub alias: String,
    pub password: String,
    pub roles: Vec<String>,
    pub system_admin: bool,
    pub active: Option<bool>,
}

impl UserForm {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self.alias = self.alias.trim().to_string();
        self
    }
}

/// Format rules for a new user. Uniqueness is checked by the caller.
pub fn validate_new_user(form: &UserForm) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(check_email(&form.email, "Correo electrónico del usuario"));
    m.extend(check_alias(&form.alias));
    m.extend(check_roles(&form.roles, form.system_admin));
    m.extend(check_password(&form.password));
    m
}

/// Format rules for an edit; the password only when a new one is sent.
pub fn validate_user_update(form: &UserForm) -> Vec<String> {
    let mut m = Vec::new();
    m.extend(check_email(&form.email, "usuario"));
    m.extend(check_alias(&form.alias));
    m.extend(check_roles(&form.roles, form.system_admin));
    if !form.password.is_empty() {
        m.extend(check_password(&form.password));
    }
    m
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserListParams {
    pub page: i64,
    pub search_by: String,
    pub search_value: String,
    pub order_by: String,
    pub order: String,
}

impl Default for UserListParams {
    fn default() -> Self {
        UserListParams {
            page: 1,
            search_by: String::new(),
            search_value: String::new(),
            order_by: "email".into(),
            order: "asc".into(),
        }
    }
}

pub fn check_user_list_params(p: &UserListParams) -> Result<(), String> {
    if !p.search_by.is_empty() && !USER_SEARCH_COLUMNS.contains(&p.search_by.as_str()) {
        return Err("Parámetro de búsqueda inválido".into());
    }
    if !USER_ORDER_COLUMNS.contains(&p.order_by.as_str()) {
        return Err("Parámetro de orden inválido".into());
    }
    if p.order != "asc" && p.order != "desc" {
        return Err("Dirección de orden inválida".into());
    }
    if p.page < 1 {
        return Err("Número de página inválido".into());
    }
    Ok(())
}

const PENDING_KEYS: &[&str] = &["email", "order", "page"];
pub const PENDING_ORDERS: &[&str] = &["", "emailA-Z", "emailZ-A", "newer", "older"];

pub fn check_search_pending_user_params(params: &HashMap<String, String>) -> Vec<String> {
    if params.keys().any(|k| !PENDING_KEYS.contains(&k.as_str())) {
        return vec!["Ingreso parámetros no permitidos en la URL".to_string()];
    }
    let order = params.get("order").map(String::as_str).unwrap_or("");
    check_select(order, "Orden", PENDING_ORDERS)
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AcceptPendingForm {
    pub alias: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> UserForm {
        UserForm {
            email: " Juan@Gmail.com".into(),
            alias: "Juan_Perez".into(),
            password: "Clave123".into(),
            roles: vec!["Administracion".into()],
            system_admin: false,
            active: None,
        }
        .normalized()
    }

    #[test]
    fn new_user_rules() {
        assert_eq!(form().email, "juan@gmail.com");
        assert!(validate_new_user(&form()).is_empty());
        let mut f = form();
        f.roles.clear();
        f.password = "abc".into();
        assert_eq!(validate_new_user(&f).len(), 2);
    }

    #[test]
    fn update_allows_blank_password() {
        let mut f = form();
        f.password = String::new();
        assert!(validate_user_update(&f).is_empty());
    }

    #[test]
    fn listing_params() {
        assert!(check_user_list_params(&UserListParams::default()).is_ok());
        let p = UserListParams {
            search_by: "alias".into(),
            ..Default::default()
        };
        assert!(check_user_list_params(&p).is_err());
    }

    #[test]
    fn pending_listing_keys() {
        let mut params = HashMap::new();
        params.insert("order".to_string(), "emailZ-A".to_string());
        assert!(check_search_pending_user_params(&params).is_empty());
        params.insert("rol".to_string(), "x".to_string());
        assert_eq!(
            check_search_pending_user_params(&params),
            vec!["Ingreso parámetros no permitidos en la URL"]
        );
    }
}
