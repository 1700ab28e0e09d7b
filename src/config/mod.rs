//! Runtime settings from the environment and the fixed catalogs used by validation.

pub mod catalog;
pub mod settings;

pub use catalog::*;
pub use settings::{GoogleSettings, Settings, StorageSettings};
