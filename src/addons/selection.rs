//! Add-on Selection
//!
//! Tracks the add-ons a customer has picked for one product and decides
//! whether those picks satisfy the product's required-group policy.

use crate::{
    addons::AddonIdSet,
    ids::AddonId,
    menu::Menu,
    products::{AddonRequirement, Product},
};

/// Whether `selection` satisfies the product's add-on requirement.
///
/// Only ids that appear in `required_group` count towards the requirement.
/// Optional add-ons never participate.
pub fn is_selection_valid(
    product: &Product<'_>,
    required_group: &[AddonId],
    selection: &AddonIdSet,
) -> bool {
    let chosen = required_group
        .iter()
        .filter(|id| selection.contains(**id))
        .count();

    match product.addon_requirement {
        AddonRequirement::None => true,
        AddonRequirement::Single => chosen == 1,
        AddonRequirement::All => chosen == required_group.len(),
        AddonRequirement::AtLeast(min) => {
            usize::try_from(min).is_ok_and(|min| chosen >= min)
        }
    }
}

/// In-progress add-on choices for a single product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonSelection {
    required: AddonIdSet,
    optional: AddonIdSet,
}

impl AddonSelection {
    /// Start with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split already-chosen ids into required and optional picks.
    ///
    /// Ids the menu marks as required join the required picks as-is, without
    /// single-choice replacement. Anything else, including ids unknown to the
    /// menu, is kept as an optional pick.
    #[must_use]
    pub fn from_ids(menu: &Menu<'_>, ids: impl IntoIterator<Item = AddonId>) -> Self {
        let mut selection = Self::new();

        for id in ids {
            if menu.addon(id).is_some_and(|addon| addon.is_required) {
                selection.required.insert(id);
            } else {
                selection.optional.insert(id);
            }
        }

        selection
    }

    /// Pick a required add-on.
    ///
    /// For single-choice products the new pick replaces any previous one;
    /// otherwise it is added to the current picks.
    pub fn select_required(&mut self, product: &Product<'_>, id: AddonId) {
        if product.addon_requirement == AddonRequirement::Single {
            self.required = AddonIdSet::from([id]);
        } else {
            self.required.insert(id);
        }
    }

    /// Toggle a required add-on, as a checkbox would.
    ///
    /// Single-choice products behave like radio buttons: picking an already
    /// selected add-on keeps it selected.
    pub fn toggle_required(&mut self, product: &Product<'_>, id: AddonId) {
        if product.addon_requirement != AddonRequirement::Single && self.required.contains(id) {
            self.required.remove(id);
        } else {
            self.select_required(product, id);
        }
    }

    /// Toggle an optional add-on. Optional picks are unconstrained.
    pub fn toggle_optional(&mut self, id: AddonId) {
        if !self.optional.remove(id) {
            self.optional.insert(id);
        }
    }

    /// Required picks.
    #[must_use]
    pub fn required(&self) -> &AddonIdSet {
        &self.required
    }

    /// Optional picks.
    #[must_use]
    pub fn optional(&self) -> &AddonIdSet {
        &self.optional
    }

    /// Every pick, required and optional, as one identity set.
    #[must_use]
    pub fn addon_ids(&self) -> AddonIdSet {
        self.required.iter().chain(self.optional.iter()).collect()
    }

    /// Whether the required picks satisfy the product's policy on this menu.
    #[must_use]
    pub fn is_valid(&self, menu: &Menu<'_>, product: &Product<'_>) -> bool {
        is_selection_valid(product, &menu.required_group(product.id), &self.required)
    }
}
