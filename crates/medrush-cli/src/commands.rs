//! Command handlers. Each builds a fresh locator from the seed catalog; the
//! CLI never mutates state.

use std::collections::BTreeSet;
use std::io::Write;

use medrush_core::{pharmacy::validate_coordinates, Catalog, ItemId};
use medrush_locator::{GeoPoint, PharmacyLocator};

fn origin(lat: f64, lng: f64) -> anyhow::Result<GeoPoint> {
    validate_coordinates(lat, lng)?;
    Ok(GeoPoint::new(lat, lng))
}

/// Print every pharmacy ranked by distance from `(lat, lng)`.
///
/// # Errors
///
/// Returns an error for out-of-range coordinates, an inconsistent catalog, or
/// a failed write.
pub(crate) fn run_rank(
    catalog: &Catalog,
    lat: f64,
    lng: f64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let origin = origin(lat, lng)?;
    let locator = PharmacyLocator::from_catalog(catalog)?;

    for (rank, nearby) in locator.with_distances(origin).iter().enumerate() {
        let status = if nearby.pharmacy.is_open { "open" } else { "closed" };
        writeln!(
            out,
            "{:>2}. {:<40} {:>9}  {:>7}  {:<6} fee {}",
            rank + 1,
            nearby.pharmacy.name,
            nearby.distance_label(),
            nearby.delivery_time_label(),
            status,
            nearby.pharmacy.delivery_fee,
        )?;
    }
    Ok(())
}

/// Print the nearest open pharmacy stocking every item in `items`.
///
/// # Errors
///
/// Returns an error for out-of-range coordinates, unknown item ids, an
/// inconsistent catalog, or a failed write. No match is not an error.
pub(crate) fn run_nearest(
    catalog: &Catalog,
    lat: f64,
    lng: f64,
    items: &[ItemId],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let origin = origin(lat, lng)?;
    if let Some(unknown) = items.iter().find(|id| catalog.medicine(**id).is_none()) {
        anyhow::bail!("item {unknown} is not in the medicine catalog");
    }
    let required: BTreeSet<ItemId> = items.iter().copied().collect();
    let locator = PharmacyLocator::from_catalog(catalog)?;

    match locator.find_nearest_with_stock(origin, &required) {
        Some(nearby) => {
            writeln!(
                out,
                "{} ({}) is {} away, about {}",
                nearby.pharmacy.name,
                nearby.pharmacy.id,
                nearby.distance_label(),
                nearby.delivery_time_label(),
            )?;
            for item in &required {
                writeln!(
                    out,
                    "  {:<28} {} in stock",
                    catalog.medicine_name(*item),
                    nearby.pharmacy.inventory.quantity(*item)
                )?;
            }
        }
        None => {
            writeln!(out, "no pharmacy currently has all items in stock near you")?;
        }
    }
    Ok(())
}

/// Print a one-line summary of a catalog that passed validation.
///
/// # Errors
///
/// Returns an error if the seed pharmacies cannot form a registry or the
/// write fails.
pub(crate) fn run_catalog_check(catalog: &Catalog, out: &mut impl Write) -> anyhow::Result<()> {
    let locator = PharmacyLocator::from_catalog(catalog)?;
    let open = locator.pharmacies().iter().filter(|p| p.is_open).count();
    writeln!(
        out,
        "catalog ok: {} medicines, {} pharmacies ({open} open)",
        catalog.medicines.len(),
        locator.len(),
    )?;
    Ok(())
}
