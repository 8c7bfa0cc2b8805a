use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pharmacy::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// The set of items a pharmacy must stock to fulfil `lines`.
///
/// Lines with a zero quantity are ignored; repeated items collapse to one entry.
#[must_use]
pub fn requirement_from_cart(lines: &[CartLine]) -> BTreeSet<ItemId> {
    lines
        .iter()
        .filter(|line| line.quantity > 0)
        .map(|line| line.item_id)
        .collect()
}
