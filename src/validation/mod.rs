//! Form validation. Validators are pure and return Spanish messages; an empty list means valid.

pub mod charges;
pub mod contacts;
pub mod documents;
pub mod fields;
pub mod general;
pub mod horses;
pub mod payments;
pub mod publications;
pub mod riders;
pub mod team;
pub mod users;

pub use general::{parse_date, today, Text};
