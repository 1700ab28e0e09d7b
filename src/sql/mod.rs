//! Listing queries: a small parameterized builder plus helpers to run it.

mod builder;
mod exec;
pub mod params;

pub use builder::*;
pub use exec::*;
pub use params::PgBindValue;
