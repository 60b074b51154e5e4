//! Cart
//!
//! The lines a customer intends to order, all from one restaurant.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    addons::AddonIdSet,
    cart::line::{CartLine, LineIdentity, NewLine},
    ids::{ProductId, RestaurantId},
    menu::Menu,
    offers::OfferSnapshot,
    pricing::{PricingError, cart_total},
};

pub mod guard;
pub mod line;

/// An add was rejected because the cart holds another restaurant's items.
///
/// The rejected request is handed back so the caller can ask the customer
/// whether to start a new cart with it.
#[derive(Debug, Error, PartialEq)]
#[error("cart holds items from restaurant {current}, cannot add items from restaurant {requested}")]
pub struct CartConflict<'a> {
    /// Restaurant the cart currently belongs to
    pub current: RestaurantId,

    /// Restaurant of the rejected add
    pub requested: RestaurantId,

    /// The rejected add
    pub line: Box<NewLine<'a>>,
}

/// What an accepted add did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended at this index.
    Added(usize),

    /// An existing line at this index had its quantity increased.
    Merged(usize),
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart<'a> {
    restaurant: Option<RestaurantId>,
    lines: Vec<CartLine<'a>>,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product, merging with an existing line of the same identity.
    ///
    /// A merge only increases the quantity: the existing line keeps the prices
    /// frozen when it was first added.
    ///
    /// # Errors
    ///
    /// Returns a [`CartConflict`] without touching the cart when it is
    /// non-empty and belongs to a different restaurant.
    pub fn add_line(
        &mut self,
        restaurant: RestaurantId,
        line: NewLine<'a>,
    ) -> Result<LineChange, CartConflict<'a>> {
        if let Some(current) = self.restaurant
            && current != restaurant
            && !self.lines.is_empty()
        {
            debug!(%current, requested = %restaurant, product = %line.product, "cart conflict");

            return Err(CartConflict {
                current,
                requested: restaurant,
                line: Box::new(line),
            });
        }

        let identity = line.identity();

        if let Some(idx) = self.position(&identity)
            && let Some(existing) = self.lines.get_mut(idx)
        {
            existing.add_quantity(line.quantity);

            debug!(
                product = %identity.product,
                quantity = existing.quantity(),
                "merged cart line"
            );

            return Ok(LineChange::Merged(idx));
        }

        let idx = self.lines.len();

        self.restaurant = Some(restaurant);
        self.lines.push(CartLine::from_new(line));

        debug!(%restaurant, product = %identity.product, lines = idx + 1, "added cart line");

        Ok(LineChange::Added(idx))
    }

    /// Set a line's quantity; zero or less removes it. Absent lines are ignored.
    pub fn update_quantity(&mut self, product: ProductId, addons: &AddonIdSet, quantity: i64) {
        let identity = LineIdentity::new(product, addons.clone());

        let Some(idx) = self.position(&identity) else {
            return;
        };

        if quantity <= 0 {
            self.remove_at(idx);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(line) = self.lines.get_mut(idx) {
            line.set_quantity(quantity);
            debug!(%product, quantity, "updated cart line quantity");
        }
    }

    /// Remove a line. Absent lines are ignored.
    pub fn remove_line(&mut self, product: ProductId, addons: &AddonIdSet) {
        let identity = LineIdentity::new(product, addons.clone());

        if let Some(idx) = self.position(&identity) {
            self.remove_at(idx);
        }
    }

    fn remove_at(&mut self, idx: usize) {
        if idx < self.lines.len() {
            let removed = self.lines.remove(idx);
            debug!(product = %removed.product(), "removed cart line");
        }

        if self.lines.is_empty() {
            self.restaurant = None;
        }
    }

    /// Remove every line and forget the restaurant.
    pub fn clear(&mut self) {
        debug!(lines = self.lines.len(), "cleared cart");

        self.lines.clear();
        self.restaurant = None;
    }

    fn position(&self, identity: &LineIdentity) -> Option<usize> {
        self.lines.iter().position(|line| line.identity() == identity)
    }

    /// Quantity of the first line for a product, ignoring add-ons.
    ///
    /// Only meaningful for products without add-on variants; products with
    /// add-ons can have several lines and only the first is reported.
    #[must_use]
    pub fn quantity_of(&self, product: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product() == product)
            .map_or(0, CartLine::quantity)
    }

    /// The line with the given identity.
    #[must_use]
    pub fn line(&self, product: ProductId, addons: &AddonIdSet) -> Option<&CartLine<'a>> {
        self.lines
            .iter()
            .find(|line| line.product() == product && line.addons() == addons)
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Restaurant the cart belongs to, `None` when empty.
    #[must_use]
    pub fn current_restaurant(&self) -> Option<RestaurantId> {
        self.restaurant
    }

    /// Discounted cart total, rounded once.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line references something missing from the menu.
    pub fn total(
        &self,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<Money<'a, Currency>, PricingError> {
        cart_total(self, menu, offers)
    }
}

impl<'c, 'a> IntoIterator for &'c Cart<'a> {
    type Item = &'c CartLine<'a>;
    type IntoIter = std::slice::Iter<'c, CartLine<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
