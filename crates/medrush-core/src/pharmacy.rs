//! Pharmacy records, their inventory, and the draft submitted at onboarding.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Rating given to every newly registered pharmacy.
pub const DEFAULT_RATING: f32 = 4.5;

/// Stock every newly registered pharmacy starts with, as `(item id, quantity)`.
pub const STARTER_STOCK: &[(u32, u32)] = &[
    (1, 50),
    (2, 40),
    (3, 30),
    (4, 30),
    (5, 25),
    (6, 20),
    (7, 20),
    (8, 15),
];

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PharmacyId(String);

impl PharmacyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identifier for a registration, e.g. `ph_3f2a...`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("ph_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PharmacyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PharmacyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Medicine identifier shared by the catalog, carts, and pharmacy inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(ItemId)
            .map_err(|_| CoreError::InvalidItemId(s.to_string()))
    }
}

/// Per-item stock counts. A missing key means zero stock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<ItemId, u32>);

impl Inventory {
    #[must_use]
    pub fn starter() -> Self {
        STARTER_STOCK
            .iter()
            .map(|&(item, quantity)| (ItemId(item), quantity))
            .collect()
    }

    #[must_use]
    pub fn quantity(&self, item: ItemId) -> u32 {
        self.0.get(&item).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_stock(&self, item: ItemId) -> bool {
        self.quantity(item) > 0
    }

    /// `true` when every item in `items` has strictly positive stock.
    pub fn covers<'a, I>(&self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        items.into_iter().all(|item| self.has_stock(*item))
    }

    pub fn set(&mut self, item: ItemId, quantity: u32) {
        self.0.insert(item, quantity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.0.iter().map(|(item, quantity)| (*item, *quantity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ItemId, u32)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A delivery-capable pharmacy as held in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: PharmacyId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub license_number: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Authoritative open flag; opening/closing times are informational.
    pub is_open: bool,
    /// `HH:MM`, 24-hour clock.
    pub opening_time: String,
    pub closing_time: String,
    pub is_verified: bool,
    /// Flat fee charged per delivery, in whole currency units.
    pub delivery_fee: u32,
    pub rating: f32,
    pub review_count: u32,
    #[serde(default)]
    pub inventory: Inventory,
}

impl Pharmacy {
    /// Checks the fields a catalog-loaded record shares with a draft.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CoreError::Validation(
                "pharmacy id must be non-empty".to_string(),
            ));
        }
        validate_profile(
            &self.name,
            &self.address,
            &self.phone,
            &self.license_number,
        )?;
        validate_coordinates(self.latitude, self.longitude)?;
        validate_hours(&self.opening_time, &self.closing_time)
    }
}

fn default_open() -> bool {
    true
}

/// Onboarding submission: everything except the system-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub license_number: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_open")]
    pub is_open: bool,
    pub opening_time: String,
    pub closing_time: String,
    pub delivery_fee: u32,
}

impl PharmacyDraft {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when a required text field is blank,
    /// the coordinates are out of range, or the hours are not `HH:MM`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_profile(
            &self.name,
            &self.address,
            &self.phone,
            &self.license_number,
        )?;
        validate_coordinates(self.latitude, self.longitude)?;
        validate_hours(&self.opening_time, &self.closing_time)
    }

    /// Completes the draft with the registration defaults: default rating,
    /// no reviews, unverified, starter stock.
    #[must_use]
    pub fn into_pharmacy(self, id: PharmacyId) -> Pharmacy {
        Pharmacy {
            id,
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            license_number: self.license_number.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            is_open: self.is_open,
            opening_time: self.opening_time.trim().to_string(),
            closing_time: self.closing_time.trim().to_string(),
            is_verified: false,
            delivery_fee: self.delivery_fee,
            rating: DEFAULT_RATING,
            review_count: 0,
            inventory: Inventory::starter(),
        }
    }
}

fn validate_profile(
    name: &str,
    address: &str,
    phone: &str,
    license_number: &str,
) -> Result<(), CoreError> {
    for (field, value) in [
        ("name", name),
        ("address", address),
        ("phone", phone),
        ("license_number", license_number),
    ] {
        if value.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "{field} must be non-empty"
            )));
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns [`CoreError::Validation`] when either coordinate is non-finite or
/// outside the WGS84 range.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "latitude must be within [-90, 90], got {latitude}"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "longitude must be within [-180, 180], got {longitude}"
        )));
    }
    Ok(())
}

fn validate_hours(opening_time: &str, closing_time: &str) -> Result<(), CoreError> {
    for (field, value) in [("opening_time", opening_time), ("closing_time", closing_time)] {
        NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
            CoreError::Validation(format!("{field} must be HH:MM, got '{value}'"))
        })?;
    }
    Ok(())
}
