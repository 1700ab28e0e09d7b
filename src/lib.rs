//! CEDICA Admin: administrative backend of a therapeutic-riding nonprofit. Riders and their
//! registration, staff, horses, charges, payments, publications and contact messages over a
//! JSON HTTP API backed by PostgreSQL and an S3-compatible document store.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::Settings;
pub use error::AppError;
pub use migration::{apply_schema, reset};
pub use response::{success_many, success_one};
pub use routes::{app, ApiDoc};
pub use state::AppState;
pub use store::ensure_database_exists;
