//! Products

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::ids::{ProductId, RestaurantId};

/// Errors raised while interpreting a product's catalog fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// The add-on minimum was below the `-1` "all required" sentinel.
    #[error("invalid add-on minimum {0}; expected -1 or a non-negative count")]
    InvalidAddonMinimum(i32),
}

/// How many add-ons from a product's required group must be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddonRequirement {
    /// No required choice; the product can be added as-is.
    #[default]
    None,

    /// Exactly one required add-on, chosen radio-style.
    Single,

    /// Every add-on in the required group.
    All,

    /// At least this many distinct add-ons from the required group.
    AtLeast(u32),
}

impl AddonRequirement {
    /// Sentinel used by the catalog for "all required add-ons".
    pub const ALL_SENTINEL: i32 = -1;

    /// Interpret the catalog's `addon_required` flag and `addon_required_min` value.
    ///
    /// A missing minimum on a product that requires add-ons behaves like a
    /// minimum of one.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidAddonMinimum`] for minimums below `-1`.
    pub fn from_catalog(required: bool, min: Option<i32>) -> Result<Self, ProductError> {
        if !required {
            return Ok(Self::None);
        }

        match min {
            None | Some(1) => Ok(Self::Single),
            Some(Self::ALL_SENTINEL) => Ok(Self::All),
            Some(0) => Ok(Self::None),
            Some(n) if n > 1 => Ok(Self::AtLeast(n.unsigned_abs())),
            Some(n) => Err(ProductError::InvalidAddonMinimum(n)),
        }
    }

    /// Whether the product needs any add-on choice before it can be added.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product id
    pub id: ProductId,

    /// Restaurant selling the product
    pub restaurant: RestaurantId,

    /// Product name
    pub name: String,

    /// Full (undiscounted) product price
    pub price: Money<'a, Currency>,

    /// Whether the restaurant currently sells the product
    pub is_available: bool,

    /// Required add-on policy
    pub addon_requirement: AddonRequirement,
}

impl<'a> Product<'a> {
    /// Create an available product with no add-on requirement.
    pub fn new(
        id: ProductId,
        restaurant: RestaurantId,
        name: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id,
            restaurant,
            name: name.into(),
            price,
            is_available: true,
            addon_requirement: AddonRequirement::None,
        }
    }

    /// Set the add-on requirement.
    #[must_use]
    pub fn with_addon_requirement(mut self, requirement: AddonRequirement) -> Self {
        self.addon_requirement = requirement;
        self
    }

    /// Set the availability flag.
    #[must_use]
    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;

    use super::*;

    #[test]
    fn not_required_ignores_minimum() {
        assert_eq!(
            AddonRequirement::from_catalog(false, Some(3)),
            Ok(AddonRequirement::None)
        );
    }

    #[test]
    fn minimum_of_one_is_single_choice() {
        assert_eq!(
            AddonRequirement::from_catalog(true, Some(1)),
            Ok(AddonRequirement::Single)
        );
        assert_eq!(
            AddonRequirement::from_catalog(true, None),
            Ok(AddonRequirement::Single)
        );
    }

    #[test]
    fn sentinel_means_all() {
        assert_eq!(
            AddonRequirement::from_catalog(true, Some(-1)),
            Ok(AddonRequirement::All)
        );
    }

    #[test]
    fn larger_minimum_is_at_least() {
        assert_eq!(
            AddonRequirement::from_catalog(true, Some(3)),
            Ok(AddonRequirement::AtLeast(3))
        );
    }

    #[test]
    fn zero_minimum_constrains_nothing() {
        assert_eq!(
            AddonRequirement::from_catalog(true, Some(0)),
            Ok(AddonRequirement::None)
        );
    }

    #[test]
    fn below_sentinel_is_rejected() {
        assert_eq!(
            AddonRequirement::from_catalog(true, Some(-4)),
            Err(ProductError::InvalidAddonMinimum(-4))
        );
    }

    #[test]
    fn builder_sets_policy_and_availability() {
        let product = Product::new(
            ProductId::new(1),
            RestaurantId::new(5),
            "Burger",
            Money::from_minor(1000, GBP),
        )
        .with_addon_requirement(AddonRequirement::All)
        .with_availability(false);

        assert_eq!(product.addon_requirement, AddonRequirement::All);
        assert!(product.addon_requirement.is_required());
        assert!(!product.is_available);
    }
}
