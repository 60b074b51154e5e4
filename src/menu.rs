//! Menu
//!
//! A point-in-time snapshot of one restaurant's products and add-ons.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    addons::ProductAddon,
    ids::{AddonId, ProductId, RestaurantId},
    products::Product,
};

/// Errors raised while assembling a menu snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    /// A product belongs to a different restaurant than the menu.
    #[error("product {product} belongs to restaurant {actual}, menu is for restaurant {expected}")]
    RestaurantMismatch {
        /// Offending product
        product: ProductId,
        /// Menu restaurant
        expected: RestaurantId,
        /// Product restaurant
        actual: RestaurantId,
    },

    /// A price is in a different currency than the menu.
    #[error("price has currency {0}, but menu has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An add-on references a product that is not on the menu.
    #[error("add-on {addon} references unknown product {product}")]
    UnknownProduct {
        /// Offending add-on
        addon: AddonId,
        /// Missing product
        product: ProductId,
    },
}

/// Group ids listed in display order.
pub type AddonGroup = SmallVec<[AddonId; 8]>;

/// Product and add-on catalog for a single restaurant.
#[derive(Debug, Clone)]
pub struct Menu<'a> {
    restaurant: RestaurantId,
    currency: &'static Currency,
    products: FxHashMap<ProductId, Product<'a>>,
    addons: FxHashMap<AddonId, ProductAddon<'a>>,
    product_addons: FxHashMap<ProductId, SmallVec<[AddonId; 8]>>,
}

impl<'a> Menu<'a> {
    /// Create an empty menu for a restaurant.
    #[must_use]
    pub fn new(restaurant: RestaurantId, currency: &'static Currency) -> Self {
        Self {
            restaurant,
            currency,
            products: FxHashMap::default(),
            addons: FxHashMap::default(),
            product_addons: FxHashMap::default(),
        }
    }

    /// Add or replace a product.
    ///
    /// # Errors
    ///
    /// Returns a [`MenuError`] if the product belongs to another restaurant or
    /// is priced in another currency.
    pub fn insert_product(&mut self, product: Product<'a>) -> Result<(), MenuError> {
        if product.restaurant != self.restaurant {
            return Err(MenuError::RestaurantMismatch {
                product: product.id,
                expected: self.restaurant,
                actual: product.restaurant,
            });
        }

        self.check_currency(product.price.currency())?;
        self.products.insert(product.id, product);

        Ok(())
    }

    /// Add or replace an add-on. Its product must already be on the menu.
    ///
    /// # Errors
    ///
    /// Returns a [`MenuError`] if the product is unknown or the add-on is priced
    /// in another currency.
    pub fn insert_addon(&mut self, addon: ProductAddon<'a>) -> Result<(), MenuError> {
        if !self.products.contains_key(&addon.product) {
            return Err(MenuError::UnknownProduct {
                addon: addon.id,
                product: addon.product,
            });
        }

        self.check_currency(addon.price.currency())?;

        if let Some(previous) = self.addons.get(&addon.id)
            && let Some(ids) = self.product_addons.get_mut(&previous.product)
        {
            ids.retain(|id| *id != addon.id);
        }

        self.product_addons
            .entry(addon.product)
            .or_default()
            .push(addon.id);

        self.addons.insert(addon.id, addon);

        Ok(())
    }

    fn check_currency(&self, currency: &Currency) -> Result<(), MenuError> {
        if currency == self.currency {
            Ok(())
        } else {
            Err(MenuError::CurrencyMismatch(
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }

    /// Restaurant the menu belongs to.
    #[must_use]
    pub fn restaurant(&self) -> RestaurantId {
        self.restaurant
    }

    /// Currency every price on the menu uses.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Look up a product.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product<'a>> {
        self.products.get(&id)
    }

    /// Look up an add-on.
    #[must_use]
    pub fn addon(&self, id: AddonId) -> Option<&ProductAddon<'a>> {
        self.addons.get(&id)
    }

    /// All add-ons for a product in display order.
    pub fn addons_for(&self, product: ProductId) -> SmallVec<[&ProductAddon<'a>; 8]> {
        let mut addons: SmallVec<[&ProductAddon<'a>; 8]> = self
            .product_addons
            .get(&product)
            .into_iter()
            .flatten()
            .filter_map(|id| self.addons.get(id))
            .collect();

        addons.sort_by_key(|addon| (addon.display_order, addon.id));

        addons
    }

    /// Ids of the product's required add-ons in display order.
    #[must_use]
    pub fn required_group(&self, product: ProductId) -> AddonGroup {
        self.addons_for(product)
            .into_iter()
            .filter(|addon| addon.is_required)
            .map(|addon| addon.id)
            .collect()
    }

    /// Ids of the product's optional add-ons in display order.
    #[must_use]
    pub fn optional_group(&self, product: ProductId) -> AddonGroup {
        self.addons_for(product)
            .into_iter()
            .filter(|addon| !addon.is_required)
            .map(|addon| addon.id)
            .collect()
    }
}
