//! Google OpenID Connect: discovery, the authorization URL, code exchange and userinfo.

use crate::config::{GoogleSettings, Settings};
use crate::error::AppError;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthFlow {
    Login,
    Register,
}

impl OAuthFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthFlow::Login => "login",
            OAuthFlow::Register => "register",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Discovery {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

pub fn redirect_uri(base_url: &str, flow: OAuthFlow) -> String {
    format!("{}/callback/{}", base_url, flow.as_str())
}

fn external(e: impl std::fmt::Display) -> AppError {
    AppError::External(format!("Google: {}", e))
}

pub async fn discover(http: &reqwest::Client, google: &GoogleSettings) -> Result<Discovery, AppError> {
    http.get(&google.discovery_url)
        .send()
        .await
        .map_err(external)?
        .json()
        .await
        .map_err(external)
}

pub fn authorization_url(
    discovery: &Discovery,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String, AppError> {
    let url = reqwest::Url::parse_with_params(
        &discovery.authorization_endpoint,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", "openid email"),
            ("state", state),
        ],
    )
    .map_err(external)?;
    Ok(url.to_string())
}

/// Exchanges `code` for an access token and returns the verified email of the account.
pub async fn verified_email(
    http: &reqwest::Client,
    settings: &Settings,
    flow: OAuthFlow,
    code: &str,
) -> Result<String, AppError> {
    let google = &settings.google;
    let discovery = discover(http, google).await?;
    let redirect = redirect_uri(&settings.public_base_url, flow);
    let token: TokenResponse = http
        .post(&discovery.token_endpoint)
        .basic_auth(&google.client_id, Some(&google.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect.as_str()),
        ])
        .send()
        .await
        .map_err(external)?
        .error_for_status()
        .map_err(external)?
        .json()
        .await
        .map_err(external)?;
    let info: UserInfo = http
        .get(&discovery.userinfo_endpoint)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .map_err(external)?
        .json()
        .await
        .map_err(external)?;
    match info.email {
        Some(email) if info.email_verified => Ok(email.to_lowercase()),
        _ => Err(AppError::BadRequest(
            "El correo del usuario no esta disponible o no fue verificado por Google".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_scope_and_state() {
        let discovery = Discovery {
            authorization_endpoint: "https://accounts.example.com/o/oauth2/auth".into(),
            token_endpoint: "https://oauth2.example.com/token".into(),
            userinfo_endpoint: "https://openidconnect.example.com/v1/userinfo".into(),
        };
        let redirect = redirect_uri("http://localhost:5000", OAuthFlow::Login);
        assert_eq!(redirect, "http://localhost:5000/callback/login");
        let url = authorization_url(&discovery, "client-1", &redirect, "xyz").unwrap();
        assert!(url.starts_with("https://accounts.example.com/o/oauth2/auth?response_type=code"));
        assert!(url.contains("scope=openid+email"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fcallback%2Flogin"));
    }
}
