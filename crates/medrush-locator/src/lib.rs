//! Pharmacy registry with distance ranking and stock-aware selection.

pub mod error;
pub mod geo;
pub mod notify;
pub mod registry;

pub use error::LocatorError;
pub use geo::{
    estimate_delivery_minutes, format_delivery_time, format_distance, haversine_km, GeoPoint,
};
pub use notify::{NotifyReport, SubscriberResult, SubscriptionToken};
pub use registry::{parse_quantity, NearbyPharmacy, PharmacyLocator};
