//! reCAPTCHA v2 verification for the public contact form.

use crate::error::AppError;
use serde::Deserialize;

pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Deserialize)]
struct SiteVerify {
    #[serde(default)]
    success: bool,
}

/// Asks Google whether `response` solves the challenge. Without a secret nothing can pass.
pub async fn verify(http: &reqwest::Client, secret: &str, response: &str) -> Result<bool, AppError> {
    if secret.is_empty() || response.is_empty() {
        return Ok(false);
    }
    let result: SiteVerify = http
        .post(SITEVERIFY_URL)
        .form(&[("secret", secret), ("response", response)])
        .send()
        .await
        .map_err(|e| AppError::External(format!("reCAPTCHA: {}", e)))?
        .json()
        .await
        .map_err(|e| AppError::External(format!("reCAPTCHA: {}", e)))?;
    if !result.success {
        tracing::warn!("reCAPTCHA rejected");
    }
    Ok(result.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_secret_never_passes() {
        let http = reqwest::Client::new();
        assert!(!verify(&http, "", "token").await.unwrap());
        assert!(!verify(&http, "secret", "").await.unwrap());
    }
}
