//! Domain services. Each module validates its input, talks to Postgres through sqlx and logs mutations.

pub mod charges;
pub mod contacts;
pub mod documents;
pub mod exports;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod horses;
pub mod payments;
pub mod pending_users;
pub mod publications;
pub mod registration;
pub mod reports;
pub mod riders;
pub mod seeds;
pub mod team;
pub mod tutors;
pub mod users;
