//! Read-only seed catalog: the medicine list and the pharmacies the registry
//! starts with.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pharmacy::{ItemId, Pharmacy};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// Unit price in whole currency units.
    pub price: u32,
    #[serde(default)]
    pub requires_prescription: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub pharmacies: Vec<Pharmacy>,
}

impl Catalog {
    #[must_use]
    pub fn medicine(&self, id: ItemId) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.id == id)
    }

    /// Display name for `id`, falling back to `item #<id>` for unknown items.
    #[must_use]
    pub fn medicine_name(&self, id: ItemId) -> String {
        self.medicine(id)
            .map_or_else(|| format!("item #{id}"), |m| m.name.clone())
    }
}

/// Load and validate the seed catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog(&content)
}

/// Parse and validate a catalog from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::CatalogFileParse`] on malformed YAML and
/// [`ConfigError::Validation`] when the records are inconsistent.
pub fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    let mut medicine_ids = HashSet::new();
    for medicine in &catalog.medicines {
        if medicine.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "medicine {} has an empty name",
                medicine.id
            )));
        }
        if !medicine_ids.insert(medicine.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate medicine id: {}",
                medicine.id
            )));
        }
    }

    let mut pharmacy_ids = HashSet::new();
    for pharmacy in &catalog.pharmacies {
        pharmacy.validate().map_err(|e| {
            ConfigError::Validation(format!("pharmacy '{}': {e}", pharmacy.id))
        })?;

        if !pharmacy_ids.insert(pharmacy.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate pharmacy id: '{}'",
                pharmacy.id
            )));
        }

        if let Some((item, _)) = pharmacy
            .inventory
            .iter()
            .find(|(item, _)| !medicine_ids.contains(item))
        {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' stocks unknown item {item}",
                pharmacy.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
