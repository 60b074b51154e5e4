//! Offers
//!
//! Restaurant promotions as delivered by the offer feed. An [`OfferSnapshot`]
//! is a point-in-time copy of that feed; it is never refreshed in place.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::ids::{AddonId, OfferId, ProductId, RestaurantId};

pub mod resolver;

/// A discount expressed in percent points, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// Create a discount from percent points. Returns `None` outside `0..=100`.
    #[must_use]
    pub fn new(points: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&points)
            .then_some(Self(points))
    }

    /// Percent points, e.g. `20` for 20% off.
    #[must_use]
    pub fn points(self) -> Decimal {
        self.0
    }

    /// The discount as a fraction of the price.
    #[must_use]
    pub fn fraction(self) -> Percentage {
        Percentage::from(self.0 / Decimal::ONE_HUNDRED)
    }

    /// Apply the discount to an amount without rounding.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        amount - self.fraction() * amount
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// What an offer does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferKind {
    /// Percentage off the item price.
    PercentOff {
        /// Percent points as published, e.g. `20` for 20% off.
        value: Decimal,
    },

    /// A feed offer type this engine does not price. Never applied.
    Unsupported {
        /// The feed's `offer_type` value.
        offer_type: String,
    },
}

impl OfferKind {
    /// Feed name for percentage offers.
    pub const PERCENT_OFF: &'static str = "percent_off";

    /// Interpret a feed `offer_type` / `value` pair.
    #[must_use]
    pub fn from_feed(offer_type: &str, value: Decimal) -> Self {
        if offer_type.eq_ignore_ascii_case(Self::PERCENT_OFF) {
            Self::PercentOff { value }
        } else {
            Self::Unsupported {
                offer_type: offer_type.to_string(),
            }
        }
    }
}

/// Which items an offer covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OfferScope {
    /// Every product and add-on of the restaurant.
    #[default]
    AllItems,

    /// Only the listed products and add-ons.
    ///
    /// The lists are independent: listing a product does not cover its add-ons.
    SelectedItems {
        /// Covered products
        product_ids: SmallVec<[ProductId; 8]>,

        /// Covered add-ons
        addon_ids: SmallVec<[AddonId; 8]>,
    },
}

/// The item an offer is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferTarget {
    /// A product price.
    Product(ProductId),

    /// An add-on price.
    Addon(AddonId),
}

/// Offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// Offer id
    pub id: OfferId,

    /// Restaurant running the offer
    pub restaurant: RestaurantId,

    /// What the offer does
    pub kind: OfferKind,

    /// Which items it covers
    pub scope: OfferScope,

    /// First day the offer is valid
    pub valid_from: Option<Date>,

    /// Last day the offer is valid
    pub valid_until: Option<Date>,
}

impl Offer {
    /// Create an undated percentage offer covering all items.
    #[must_use]
    pub fn percent_off(id: OfferId, restaurant: RestaurantId, value: Decimal) -> Self {
        Self {
            id,
            restaurant,
            kind: OfferKind::PercentOff { value },
            scope: OfferScope::AllItems,
            valid_from: None,
            valid_until: None,
        }
    }

    /// Restrict the offer to the given products and add-ons.
    #[must_use]
    pub fn for_selected(
        mut self,
        product_ids: impl IntoIterator<Item = ProductId>,
        addon_ids: impl IntoIterator<Item = AddonId>,
    ) -> Self {
        self.scope = OfferScope::SelectedItems {
            product_ids: product_ids.into_iter().collect(),
            addon_ids: addon_ids.into_iter().collect(),
        };
        self
    }

    /// Set the validity window.
    #[must_use]
    pub fn valid_between(mut self, from: Date, until: Date) -> Self {
        self.valid_from = Some(from);
        self.valid_until = Some(until);
        self
    }

    /// Whether the validity window includes `today`.
    ///
    /// The window is only enforced when both bounds are published.
    #[must_use]
    pub fn is_active_on(&self, today: Date) -> bool {
        match (self.valid_from, self.valid_until) {
            (Some(from), Some(until)) => from <= today && today <= until,
            _ => true,
        }
    }

    /// Whether the offer's scope covers the target.
    #[must_use]
    pub fn covers(&self, target: OfferTarget) -> bool {
        match (&self.scope, target) {
            (OfferScope::AllItems, _) => true,
            (OfferScope::SelectedItems { product_ids, .. }, OfferTarget::Product(id)) => {
                product_ids.contains(&id)
            }
            (OfferScope::SelectedItems { addon_ids, .. }, OfferTarget::Addon(id)) => {
                addon_ids.contains(&id)
            }
        }
    }

    /// The discount this offer grants, if it is a usable percentage offer.
    ///
    /// Zero, negative and above-100 values never grant a discount.
    #[must_use]
    pub fn discount(&self) -> Option<DiscountPercent> {
        match &self.kind {
            OfferKind::PercentOff { value } if *value > Decimal::ZERO => {
                DiscountPercent::new(*value)
            }
            OfferKind::PercentOff { .. } | OfferKind::Unsupported { .. } => None,
        }
    }
}

/// Offers fetched for a restaurant, evaluated as of a fixed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSnapshot {
    offers: Vec<Offer>,
    as_of: Date,
}

impl OfferSnapshot {
    /// Wrap a fetched offer list.
    #[must_use]
    pub fn new(offers: Vec<Offer>, as_of: Date) -> Self {
        Self { offers, as_of }
    }

    /// Wrap a fetched offer list, keeping only one restaurant's offers.
    #[must_use]
    pub fn for_restaurant(restaurant: RestaurantId, mut offers: Vec<Offer>, as_of: Date) -> Self {
        offers.retain(|offer| offer.restaurant == restaurant);

        Self { offers, as_of }
    }

    /// A snapshot with no offers; everything is full price.
    #[must_use]
    pub fn empty(as_of: Date) -> Self {
        Self::new(Vec::new(), as_of)
    }

    /// Offers in the snapshot.
    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Date offer validity is evaluated against.
    #[must_use]
    pub fn as_of(&self) -> Date {
        self.as_of
    }

    /// Best discount for the target; see [`resolver::best_discount_percent`].
    #[must_use]
    pub fn best_discount_percent(&self, target: OfferTarget) -> Option<DiscountPercent> {
        resolver::best_discount_percent(&self.offers, target, self.as_of)
    }
}
