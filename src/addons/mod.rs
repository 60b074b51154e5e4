//! Add-ons

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::ids::{AddonId, ProductId};

pub mod selection;

/// An add-on offered with a product, e.g. a sauce or a size upgrade.
#[derive(Debug, Clone)]
pub struct ProductAddon<'a> {
    /// Add-on id
    pub id: AddonId,

    /// Product the add-on belongs to
    pub product: ProductId,

    /// Add-on name
    pub name: String,

    /// Full (undiscounted) add-on price
    pub price: Money<'a, Currency>,

    /// Whether the add-on belongs to the product's required group
    pub is_required: bool,

    /// Position within its group
    pub display_order: u32,
}

impl<'a> ProductAddon<'a> {
    /// Create an optional add-on at display position zero.
    pub fn new(
        id: AddonId,
        product: ProductId,
        name: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id,
            product,
            name: name.into(),
            price,
            is_required: false,
            display_order: 0,
        }
    }

    /// Mark the add-on as part of the required group.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Set the display position.
    #[must_use]
    pub fn with_display_order(mut self, display_order: u32) -> Self {
        self.display_order = display_order;
        self
    }
}

/// A sorted, de-duplicated set of add-on ids.
///
/// Selection order never matters, so two sets built from the same ids in any
/// order compare equal and hash identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AddonIdSet {
    ids: SmallVec<[AddonId; 4]>,
}

impl AddonIdSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id, keeping the set sorted. Returns `false` if it was already present.
    pub fn insert(&mut self, id: AddonId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, id);
                true
            }
        }
    }

    /// Remove an id. Returns `false` if it was not present.
    pub fn remove(&mut self, id: AddonId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether the set contains the id.
    #[must_use]
    pub fn contains(&self, id: AddonId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Iterate over the ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = AddonId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[AddonId] {
        &self.ids
    }
}

impl FromIterator<AddonId> for AddonIdSet {
    fn from_iter<I: IntoIterator<Item = AddonId>>(iter: I) -> Self {
        let mut ids: SmallVec<[AddonId; 4]> = iter.into_iter().collect();

        ids.sort_unstable();
        ids.dedup();

        Self { ids }
    }
}

impl<const N: usize> From<[AddonId; N]> for AddonIdSet {
    fn from(ids: [AddonId; N]) -> Self {
        ids.into_iter().collect()
    }
}

impl<'s> IntoIterator for &'s AddonIdSet {
    type Item = AddonId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, AddonId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

impl Extend<AddonId> for AddonIdSet {
    fn extend<I: IntoIterator<Item = AddonId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}
