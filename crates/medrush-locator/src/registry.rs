//! The pharmacy registry and its two queries: rank-by-distance and
//! nearest-with-stock.

use std::collections::{BTreeSet, HashSet};

use medrush_core::{Catalog, ItemId, Pharmacy, PharmacyDraft, PharmacyId};
use serde::Serialize;

use crate::error::LocatorError;
use crate::geo::{
    estimate_delivery_minutes, format_delivery_time, format_distance, haversine_km, GeoPoint,
};
use crate::notify::{NotifyReport, SubscriberResult, Subscribers, SubscriptionToken};

/// A pharmacy annotated with per-query distance and delivery estimate.
///
/// The annotations are computed for one origin and never written back to the
/// registry record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPharmacy {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    pub distance_km: f64,
    pub delivery_time_minutes: u32,
}

impl NearbyPharmacy {
    fn from_origin(pharmacy: &Pharmacy, origin: GeoPoint) -> Self {
        let distance_km = haversine_km(origin, location_of(pharmacy));
        Self {
            pharmacy: pharmacy.clone(),
            distance_km,
            delivery_time_minutes: estimate_delivery_minutes(distance_km),
        }
    }

    #[must_use]
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_km)
    }

    #[must_use]
    pub fn delivery_time_label(&self) -> String {
        format_delivery_time(self.delivery_time_minutes)
    }
}

fn location_of(pharmacy: &Pharmacy) -> GeoPoint {
    GeoPoint::new(pharmacy.latitude, pharmacy.longitude)
}

fn is_eligible(pharmacy: &Pharmacy, required: &BTreeSet<ItemId>) -> bool {
    pharmacy.is_open && pharmacy.inventory.covers(required)
}

/// In-memory registry of pharmacies.
///
/// Reads take `&self`, writes take `&mut self`; callers sharing one locator
/// across threads wrap it in a lock.
#[derive(Debug, Default)]
pub struct PharmacyLocator {
    pharmacies: Vec<Pharmacy>,
    subscribers: Subscribers,
}

impl PharmacyLocator {
    /// Build a registry from seed records, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Validation`] if two records share an id or a
    /// record is malformed.
    pub fn new(initial: Vec<Pharmacy>) -> Result<Self, LocatorError> {
        let mut seen = HashSet::new();
        for pharmacy in &initial {
            pharmacy.validate()?;
            if !seen.insert(pharmacy.id.clone()) {
                return Err(LocatorError::Validation(format!(
                    "duplicate pharmacy id: '{}'",
                    pharmacy.id
                )));
            }
        }
        tracing::debug!(count = initial.len(), "pharmacy registry initialized");
        Ok(Self {
            pharmacies: initial,
            subscribers: Subscribers::default(),
        })
    }

    /// # Errors
    ///
    /// See [`PharmacyLocator::new`].
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, LocatorError> {
        Self::new(catalog.pharmacies.clone())
    }

    /// Registry contents in insertion order.
    #[must_use]
    pub fn pharmacies(&self) -> &[Pharmacy] {
        &self.pharmacies
    }

    #[must_use]
    pub fn get(&self, id: &PharmacyId) -> Option<&Pharmacy> {
        self.pharmacies.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pharmacies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pharmacies.is_empty()
    }

    /// Register `handler` to run after every successful [`register`](Self::register).
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: Fn() -> SubscriberResult + Send + Sync + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.subscribers.unsubscribe(token)
    }

    pub fn notify_all(&self) -> NotifyReport {
        self.subscribers.notify_all()
    }

    /// Validate `draft`, assign an id and the registration defaults, append
    /// the record, then notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Validation`] for an incomplete draft; nothing is
    /// appended and no subscriber runs.
    pub fn register(&mut self, draft: PharmacyDraft) -> Result<Pharmacy, LocatorError> {
        draft.validate()?;

        let mut id = PharmacyId::generate();
        while self.get(&id).is_some() {
            id = PharmacyId::generate();
        }

        let pharmacy = draft.into_pharmacy(id);
        self.pharmacies.push(pharmacy.clone());
        tracing::info!(
            pharmacy_id = %pharmacy.id,
            name = %pharmacy.name,
            "pharmacy registered"
        );

        let report = self.subscribers.notify_all();
        if report.failed > 0 {
            tracing::warn!(
                failed = report.failed,
                delivered = report.delivered,
                "some registration subscribers failed"
            );
        }

        Ok(pharmacy)
    }

    /// Every pharmacy annotated for `origin`, nearest first.
    ///
    /// Equal distances keep registry order. No open or stock filtering.
    #[must_use]
    pub fn with_distances(&self, origin: GeoPoint) -> Vec<NearbyPharmacy> {
        let mut ranked: Vec<NearbyPharmacy> = self
            .pharmacies
            .iter()
            .map(|p| NearbyPharmacy::from_origin(p, origin))
            .collect();
        // sort_by is stable, which gives the insertion-order tie-break.
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        tracing::debug!(
            lat = origin.lat,
            lng = origin.lng,
            count = ranked.len(),
            "ranked pharmacies by distance"
        );
        ranked
    }

    /// Nearest open pharmacy with positive stock of every item in `required`.
    ///
    /// An empty `required` set applies only the open filter. Returns `None`
    /// when nothing qualifies.
    #[must_use]
    pub fn find_nearest_with_stock(
        &self,
        origin: GeoPoint,
        required: &BTreeSet<ItemId>,
    ) -> Option<NearbyPharmacy> {
        let mut best: Option<(&Pharmacy, f64)> = None;
        for pharmacy in self.pharmacies.iter().filter(|p| is_eligible(p, required)) {
            let distance = haversine_km(origin, location_of(pharmacy));
            // Strict comparison keeps the earlier pharmacy on exact ties.
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((pharmacy, distance));
            }
        }

        let found = best.map(|(pharmacy, _)| NearbyPharmacy::from_origin(pharmacy, origin));
        match &found {
            Some(nearby) => tracing::debug!(
                pharmacy_id = %nearby.pharmacy.id,
                distance_km = nearby.distance_km,
                required = required.len(),
                "nearest stocked pharmacy selected"
            ),
            None => tracing::debug!(
                required = required.len(),
                "no open pharmacy stocks every required item"
            ),
        }
        found
    }

    /// Replace the stock count of `item` at `pharmacy_id`.
    ///
    /// Subscribers are not notified.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Validation`] for a negative or oversized
    /// quantity and [`LocatorError::NotFound`] for an unknown pharmacy. The
    /// registry is unchanged in both cases.
    pub fn update_inventory(
        &mut self,
        pharmacy_id: &PharmacyId,
        item: ItemId,
        new_quantity: i64,
    ) -> Result<(), LocatorError> {
        let quantity = u32::try_from(new_quantity).map_err(|_| {
            LocatorError::Validation(format!(
                "quantity must be between 0 and {}, got {new_quantity}",
                u32::MAX
            ))
        })?;

        let pharmacy = self
            .pharmacies
            .iter_mut()
            .find(|p| &p.id == pharmacy_id)
            .ok_or_else(|| LocatorError::NotFound {
                pharmacy_id: pharmacy_id.clone(),
            })?;

        pharmacy.inventory.set(item, quantity);
        tracing::info!(
            pharmacy_id = %pharmacy_id,
            item = %item,
            quantity,
            "inventory updated"
        );
        Ok(())
    }
}

/// Parse a raw quantity string (form field, CLI argument) without coercing
/// bad input to zero.
///
/// # Errors
///
/// Returns [`LocatorError::Validation`] for anything that is not an integer.
pub fn parse_quantity(raw: &str) -> Result<i64, LocatorError> {
    raw.trim().parse::<i64>().map_err(|_| {
        LocatorError::Validation(format!("quantity must be an integer, got '{raw}'"))
    })
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
