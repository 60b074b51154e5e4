//! Offer fixtures

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    ids::{AddonId, OfferId, ProductId, RestaurantId},
    offers::{Offer, OfferKind, OfferScope},
};

/// Offer scope as published by the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFixture {
    /// Every item
    #[default]
    AllItems,

    /// Only the listed products and add-ons
    SelectedItems,
}

/// Offer entry in a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct OfferFixture {
    /// Offer id
    pub id: OfferId,

    /// Restaurant running the offer
    pub restaurant_id: RestaurantId,

    /// Feed offer type, e.g. `percent_off`
    pub offer_type: String,

    /// Offer value; percent points for percentage offers
    pub value: Decimal,

    /// Which items the offer covers
    #[serde(default)]
    pub scope: ScopeFixture,

    /// Covered products for selected-item offers
    #[serde(default)]
    pub product_ids: Vec<ProductId>,

    /// Covered add-ons for selected-item offers
    #[serde(default)]
    pub addon_ids: Vec<AddonId>,

    /// First valid day
    #[serde(default)]
    pub valid_from: Option<Date>,

    /// Last valid day
    #[serde(default)]
    pub valid_until: Option<Date>,
}

impl From<&OfferFixture> for Offer {
    fn from(fixture: &OfferFixture) -> Self {
        let scope = match fixture.scope {
            ScopeFixture::AllItems => OfferScope::AllItems,
            ScopeFixture::SelectedItems => OfferScope::SelectedItems {
                product_ids: fixture.product_ids.iter().copied().collect(),
                addon_ids: fixture.addon_ids.iter().copied().collect(),
            },
        };

        Offer {
            id: fixture.id,
            restaurant: fixture.restaurant_id,
            kind: OfferKind::from_feed(&fixture.offer_type, fixture.value),
            scope,
            valid_from: fixture.valid_from,
            valid_until: fixture.valid_until,
        }
    }
}
