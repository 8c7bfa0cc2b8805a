pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod pharmacy;

pub use app_config::{AppConfig, Environment};
pub use cart::{requirement_from_cart, CartLine};
pub use catalog::{load_catalog, parse_catalog, Catalog, Medicine};
pub use config::{load_app_config, load_app_config_from_env};
pub use pharmacy::{
    Inventory, ItemId, Pharmacy, PharmacyDraft, PharmacyId, DEFAULT_RATING, STARTER_STOCK,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid item id '{0}': expected a non-negative integer")]
    InvalidItemId(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
