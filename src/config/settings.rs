//! Settings loaded from environment variables (after `dotenvy::dotenv()` in the binary).

use std::env;

/// Object storage (S3-compatible, MinIO in deployment).
#[derive(Clone, Debug)]
pub struct StorageSettings {
    /// host:port of the S3 endpoint. Empty selects the in-memory store.
    pub server: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
    pub bucket: String,
}

impl StorageSettings {
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.server)
    }
}

#[derive(Clone, Debug)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub discovery_url: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Base URL the browser reaches us on; OAuth redirect URIs hang off it.
    pub public_base_url: String,
    pub storage: StorageSettings,
    pub google: GoogleSettings,
    pub recaptcha_secret: String,
    pub cookie_secure: bool,
    /// Idle minutes before a session is dropped; also the cookie's `Max-Age`.
    pub session_ttl_minutes: i64,
    /// TrueType font for chart labels. Charts are drawn without text when it cannot be read.
    pub chart_font: String,
}

pub const DEFAULT_DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
pub const DEFAULT_BUCKET: &str = "grupo13";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 8 * 60;
pub const DEFAULT_CHART_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// A positive number from `key`, or `default` when unset or unusable.
fn positive_or(key: &str, default: i64) -> i64 {
    match env::var(key).map(|v| v.trim().parse::<i64>()) {
        Ok(Ok(n)) if n > 0 => n,
        Ok(_) => {
            tracing::warn!(key, default, "ignoring invalid value");
            default
        }
        Err(_) => default,
    }
}

/// DATABASE_URL, or one assembled from DB_USER / DB_PASSWORD / DB_HOST / DB_NAME.
fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }
    match (env::var("DB_USER"), env::var("DB_HOST"), env::var("DB_NAME")) {
        (Ok(user), Ok(host), Ok(name)) => {
            let password = env::var("DB_PASSWORD").unwrap_or_default();
            format!("postgres://{}:{}@{}/{}", user, password, host, name)
        }
        _ => "postgres://localhost/cedica".into(),
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            database_url: database_url(),
            bind_addr: var_or("BIND_ADDR", "127.0.0.1:5000"),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:5000")
                .trim_end_matches('/')
                .to_string(),
            storage: StorageSettings {
                server: var_or("MINIO_SERVER", "localhost:9000"),
                access_key: var_or("MINIO_ACCESS_KEY", ""),
                secret_key: var_or("MINIO_SECRET_KEY", ""),
                secure: flag("MINIO_SECURE"),
                bucket: var_or("STORAGE_BUCKET", DEFAULT_BUCKET),
            },
            google: GoogleSettings {
                client_id: var_or("GOOGLE_CLIENT_ID", ""),
                client_secret: var_or("GOOGLE_CLIENT_SECRET", ""),
                discovery_url: var_or("GOOGLE_DISCOVERY_URL", DEFAULT_DISCOVERY_URL),
            },
            recaptcha_secret: var_or("GCAPTCHA_SECRET_KEY", ""),
            cookie_secure: flag("SESSION_COOKIE_SECURE"),
            session_ttl_minutes: positive_or("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES),
            chart_font: var_or("CHART_FONT", DEFAULT_CHART_FONT),
        }
    }

    /// Settings for tests and local tooling: nothing external configured.
    pub fn local() -> Self {
        Settings {
            database_url: "postgres://localhost/cedica".into(),
            bind_addr: "127.0.0.1:5000".into(),
            public_base_url: "http://localhost:5000".into(),
            storage: StorageSettings {
                server: String::new(),
                access_key: String::new(),
                secret_key: String::new(),
                secure: false,
                bucket: DEFAULT_BUCKET.into(),
            },
            google: GoogleSettings {
                client_id: String::new(),
                client_secret: String::new(),
                discovery_url: DEFAULT_DISCOVERY_URL.into(),
            },
            recaptcha_secret: String::new(),
            cookie_secure: false,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            chart_font: DEFAULT_CHART_FONT.into(),
        }
    }

    pub fn session_max_age_secs(&self) -> i64 {
        self.session_ttl_minutes.saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_scheme_follows_secure_flag() {
        let mut s = Settings::local().storage;
        s.server = "minio:9000".into();
        assert_eq!(s.endpoint_url(), "http://minio:9000");
        s.secure = true;
        assert_eq!(s.endpoint_url(), "https://minio:9000");
    }

    #[test]
    fn session_ttl_defaults_when_unusable() {
        assert_eq!(positive_or("CEDICA_TEST_UNSET_TTL", 30), 30);
        env::set_var("CEDICA_TEST_BAD_TTL", "-5");
        assert_eq!(positive_or("CEDICA_TEST_BAD_TTL", 30), 30);
        env::set_var("CEDICA_TEST_GOOD_TTL", "45");
        assert_eq!(positive_or("CEDICA_TEST_GOOD_TTL", 30), 45);
        assert_eq!(Settings::local().session_max_age_secs(), 8 * 60 * 60);
    }
}
