// Configuration loading

pub mod ai;
pub mod company_store;
pub mod settings;

pub use company_store::{JsonFileStore, COMPANY_CONFIG_FILE};
