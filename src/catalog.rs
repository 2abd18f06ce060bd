//! Ordering and selection over the enriched inventory.
use crate::enrich::DerivedItem;
use rand::seq::SliceRandom;
use rand::Rng;

/// Stable sort by make, then model, compared as plain strings.
pub fn sort_items(items: &mut [DerivedItem]) {
    items.sort_by_cached_key(|item| (item.text("merk"), item.text("model")));
}

/// Pick up to `count` unsold cars for the home page. When more qualify, the
/// pick is a uniform sample without replacement drawn from `rng`.
pub fn select_featured<'a, R: Rng + ?Sized>(
    items: &'a [DerivedItem],
    count: usize,
    rng: &mut R,
) -> Vec<&'a DerivedItem> {
    let unsold: Vec<&DerivedItem> = items.iter().filter(|item| !item.sold).collect();
    if unsold.len() <= count {
        return unsold;
    }
    unsold.choose_multiple(rng, count).copied().collect()
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
