//! Locator behaviour against the shipped seed catalog.

use std::collections::BTreeSet;
use std::path::Path;

use medrush_core::{load_catalog, requirement_from_cart, CartLine, Catalog, ItemId, PharmacyId};
use medrush_locator::{GeoPoint, PharmacyLocator};
use proptest::prelude::*;

const CONNAUGHT_PLACE: GeoPoint = GeoPoint::new(28.6139, 77.2090);

fn seed_catalog() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("catalog.yaml");
    load_catalog(&path).expect("seed catalog should load")
}

fn seed_locator() -> PharmacyLocator {
    PharmacyLocator::from_catalog(&seed_catalog()).expect("seed catalog has unique ids")
}

#[test]
fn seed_ranking_puts_connaught_place_first() {
    let locator = seed_locator();
    let ranked = locator.with_distances(CONNAUGHT_PLACE);
    assert_eq!(ranked.len(), locator.len());
    assert_eq!(ranked[0].pharmacy.id.as_str(), "p1");
    assert_eq!(ranked[0].distance_label(), "0.0 km");
    assert_eq!(ranked[0].delivery_time_label(), "5 min");
}

#[test]
fn seed_cart_skips_closed_saket_store() {
    let locator = seed_locator();
    // Only p3 (open) and p4 (closed) stock Digital Thermometer (10) and
    // Azithromycin (9) together.
    let cart = [
        CartLine {
            item_id: ItemId(9),
            quantity: 1,
        },
        CartLine {
            item_id: ItemId(10),
            quantity: 1,
        },
    ];
    let nearest = locator
        .find_nearest_with_stock(CONNAUGHT_PLACE, &requirement_from_cart(&cart))
        .expect("p3 stocks both items");
    assert_eq!(nearest.pharmacy.id.as_str(), "p3");
    assert!(nearest.pharmacy.is_open);
}

#[test]
fn seed_cart_with_out_of_stock_vitamin_skips_p1() {
    let locator = seed_locator();
    // p1 lists Vitamin D3 (5) at zero.
    let required: BTreeSet<ItemId> = [ItemId(1), ItemId(5)].into_iter().collect();
    let nearest = locator
        .find_nearest_with_stock(CONNAUGHT_PLACE, &required)
        .expect("another open pharmacy stocks both");
    assert_ne!(nearest.pharmacy.id, PharmacyId::new("p1"));
    assert!(nearest.pharmacy.inventory.covers(&required));
}

fn origin() -> impl Strategy<Value = GeoPoint> {
    (28.40f64..28.90, 76.90f64..77.50).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
}

fn requirement() -> impl Strategy<Value = BTreeSet<ItemId>> {
    proptest::collection::btree_set((1u32..=10).prop_map(ItemId), 0..4)
}

proptest! {
    /// Rankings are monotonically non-decreasing in distance.
    #[test]
    fn ranking_is_monotonic(o in origin()) {
        let ranked = seed_locator().with_distances(o);
        prop_assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    /// A selected pharmacy is open, stocks every item, and no eligible
    /// pharmacy is strictly closer.
    #[test]
    fn selection_is_eligible_and_minimal(o in origin(), required in requirement()) {
        let locator = seed_locator();
        let eligible: Vec<_> = locator
            .with_distances(o)
            .into_iter()
            .filter(|r| r.pharmacy.is_open && r.pharmacy.inventory.covers(&required))
            .collect();

        match locator.find_nearest_with_stock(o, &required) {
            Some(chosen) => {
                prop_assert!(chosen.pharmacy.is_open);
                prop_assert!(chosen.pharmacy.inventory.covers(&required));
                for other in &eligible {
                    prop_assert!(chosen.distance_km <= other.distance_km);
                }
            }
            None => prop_assert!(eligible.is_empty()),
        }
    }

    /// Closing every pharmacy always yields no match.
    #[test]
    fn all_closed_never_matches(o in origin(), required in requirement()) {
        let mut catalog = seed_catalog();
        for pharmacy in &mut catalog.pharmacies {
            pharmacy.is_open = false;
        }
        let locator = PharmacyLocator::from_catalog(&catalog).unwrap();
        prop_assert!(locator.find_nearest_with_stock(o, &required).is_none());
    }
}
