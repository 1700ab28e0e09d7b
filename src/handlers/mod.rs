//! HTTP handlers, one module per area. Every admin handler takes a [`CurrentUser`] and checks
//! its permission before touching the database.
//!
//! [`CurrentUser`]: crate::extractors::CurrentUser

pub mod api;
pub mod auth;
pub mod charges;
pub mod contacts;
pub mod documents;
pub mod horses;
pub mod options;
pub mod payments;
pub mod publications;
pub mod reports;
pub mod riders;
pub mod team;
pub mod users;
