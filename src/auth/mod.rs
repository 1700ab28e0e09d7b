//! Login: server-side sessions, password hashing, Google sign-in and reCAPTCHA checks.

pub mod google;
pub mod password;
pub mod recaptcha;
pub mod session;

pub use google::OAuthFlow;
pub use session::{Session, SessionStore, SESSION_COOKIE};
