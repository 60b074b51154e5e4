//! Order Session
//!
//! One customer's ordering session: a cart, the conflict guard in front of it
//! and the pricing policy applied when lines are added. Callers own the
//! session and pass it the menu and offer snapshots they fetched.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    addons::{AddonIdSet, selection::AddonSelection},
    cart::{
        Cart, LineChange,
        guard::{ConflictGuard, GuardError, GuardOutcome, PendingAdd},
        line::{FrozenPrice, NewLine},
    },
    ids::{AddonId, ProductId},
    menu::Menu,
    offers::OfferSnapshot,
    orders::OrderRequest,
    pricing::{PricingError, cart_total},
};

/// How a line is priced after it has been added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Capture the discounted prices at add time and keep them.
    #[default]
    Freeze,

    /// Re-resolve prices against the current offers on every read.
    Float,
}

/// Session configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pricing policy for new lines
    pub price_policy: PricePolicy,
}

/// Errors raised by session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The product is not on the menu.
    #[error("product {0} is not on the menu")]
    UnknownProduct(ProductId),

    /// The product cannot currently be ordered.
    #[error("product {0} is unavailable")]
    ProductUnavailable(ProductId),

    /// A selected add-on does not belong to the product.
    #[error("add-on {addon} is not offered with product {product}")]
    ForeignAddon {
        /// Selected add-on
        addon: AddonId,
        /// Product being added
        product: ProductId,
    },

    /// The required add-on picks do not satisfy the product's policy.
    #[error("add-on selection for product {0} does not meet its requirement")]
    InvalidAddonSelection(ProductId),

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Conflict guard refused the transition.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A customer's ordering session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSession<'a> {
    config: SessionConfig,
    cart: Cart<'a>,
    guard: ConflictGuard<'a>,
}

impl<'a> OrderSession<'a> {
    /// Start a session with an empty cart.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cart: Cart::new(),
            guard: ConflictGuard::new(),
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// The cart.
    #[must_use]
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The add awaiting a conflict decision, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingAdd<'a>> {
        self.guard.pending()
    }

    /// Validate and add a product to the cart.
    ///
    /// Under [`PricePolicy::Freeze`] the discounted prices are captured now and
    /// kept for the line's lifetime. An add from another restaurant is held as
    /// a pending conflict and reported as [`GuardOutcome::ConflictPending`].
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] without touching the cart if the product is
    /// unknown or unavailable, the selection is invalid, a conflict is already
    /// pending, or the prices cannot be captured.
    #[tracing::instrument(
        name = "session.add_to_cart",
        skip_all,
        fields(restaurant = %menu.restaurant(), product = %product, quantity = quantity),
        err
    )]
    pub fn add_to_cart(
        &mut self,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
        product: ProductId,
        selection: &AddonSelection,
        quantity: u32,
    ) -> Result<GuardOutcome, SessionError> {
        let item = menu
            .product(product)
            .ok_or(SessionError::UnknownProduct(product))?;

        if !item.is_available {
            return Err(SessionError::ProductUnavailable(product));
        }

        let addons = selection.addon_ids();
        check_addons(menu, product, &addons)?;

        if !selection.is_valid(menu, item) {
            return Err(SessionError::InvalidAddonSelection(product));
        }

        if self.guard.is_pending() {
            return Err(GuardError::DecisionPending.into());
        }

        let frozen = match self.config.price_policy {
            PricePolicy::Freeze => Some(FrozenPrice::capture(item, &addons, menu, offers)?),
            PricePolicy::Float => None,
        };

        let mut line = NewLine::new(product).with_quantity(quantity);
        line.addons = addons;
        line.frozen = frozen;

        let outcome = self.guard.add_line(&mut self.cart, menu.restaurant(), line)?;

        info!(?outcome, items = self.cart.item_count(), "added to cart");

        Ok(outcome)
    }

    /// Replace the cart with the pending add.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Guard`] when no conflict is pending.
    #[tracing::instrument(name = "session.confirm_clear_and_add", skip(self), err)]
    pub fn confirm_clear_and_add(&mut self) -> Result<LineChange, SessionError> {
        Ok(self.guard.confirm_clear_and_add(&mut self.cart)?)
    }

    /// Discard the pending add, keeping the cart as it is.
    pub fn cancel_pending(&mut self) -> Option<PendingAdd<'a>> {
        self.guard.cancel()
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn update_quantity(&mut self, product: ProductId, addons: &AddonIdSet, quantity: i64) {
        self.cart.update_quantity(product, addons, quantity);
    }

    /// Remove a line.
    pub fn remove_line(&mut self, product: ProductId, addons: &AddonIdSet) {
        self.cart.remove_line(product, addons);
    }

    /// Empty the cart and drop any pending add.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.reset_guard();
    }

    /// Discounted cart total.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError::Pricing`] if a line cannot be priced.
    pub fn total(
        &self,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<Money<'a, Currency>, SessionError> {
        Ok(cart_total(&self.cart, menu, offers)?)
    }

    /// Build the order payload for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyCart`] for an empty cart, or a pricing
    /// error if the total cannot be computed.
    pub fn order_request(
        &self,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<OrderRequest, SessionError> {
        if self.cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }

        let total = self.total(menu, offers)?;

        Ok(OrderRequest::new(&self.cart, total))
    }

    /// Record a successful checkout: the cart is emptied and any pending add
    /// is dropped.
    #[tracing::instrument(name = "session.complete_checkout", skip(self))]
    pub fn complete_checkout(&mut self) {
        info!(items = self.cart.item_count(), "checkout completed");

        self.cart.clear();
        self.reset_guard();
    }

    fn reset_guard(&mut self) {
        if let Some(pending) = self.guard.cancel() {
            debug!(
                restaurant = %pending.restaurant(),
                product = %pending.product(),
                "discarded pending add"
            );
        }
    }
}

fn check_addons(menu: &Menu<'_>, product: ProductId, addons: &AddonIdSet) -> Result<(), SessionError> {
    for addon in addons {
        match menu.addon(addon) {
            Some(found) if found.product == product => {}
            _ => return Err(SessionError::ForeignAddon { addon, product }),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        addons::ProductAddon,
        ids::{OfferId, RestaurantId},
        menu::MenuError,
        offers::Offer,
        products::{AddonRequirement, Product},
    };

    use super::*;

    const FIVE: RestaurantId = RestaurantId::new(5);
    const SEVEN: RestaurantId = RestaurantId::new(7);

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, GBP)
    }

    fn burger_bar() -> Result<Menu<'static>, MenuError> {
        let mut menu = Menu::new(FIVE, GBP);

        menu.insert_product(
            Product::new(ProductId::new(1), FIVE, "Burger", gbp(1000))
                .with_addon_requirement(AddonRequirement::Single),
        )?;
        menu.insert_product(
            Product::new(ProductId::new(2), FIVE, "Special", gbp(1200)).with_availability(false),
        )?;
        menu.insert_addon(
            ProductAddon::new(AddonId::new(10), ProductId::new(1), "Brioche", gbp(0)).required(),
        )?;
        menu.insert_addon(
            ProductAddon::new(AddonId::new(11), ProductId::new(1), "Seeded", gbp(50)).required(),
        )?;
        menu.insert_addon(ProductAddon::new(
            AddonId::new(20),
            ProductId::new(1),
            "Cheese",
            gbp(100),
        ))?;

        Ok(menu)
    }

    fn noodle_bar() -> Result<Menu<'static>, MenuError> {
        let mut menu = Menu::new(SEVEN, GBP);
        menu.insert_product(Product::new(ProductId::new(70), SEVEN, "Ramen", gbp(1100)))?;

        Ok(menu)
    }

    fn offers(points: i64) -> OfferSnapshot {
        OfferSnapshot::new(
            vec![Offer::percent_off(OfferId::new(1), FIVE, Decimal::from(points))],
            date(2026, 10, 18),
        )
    }

    fn brioche(menu: &Menu<'_>) -> Result<AddonSelection, &'static str> {
        let product = menu.product(ProductId::new(1)).ok_or("missing burger")?;
        let mut selection = AddonSelection::new();
        selection.select_required(product, AddonId::new(10));

        Ok(selection)
    }

    #[test]
    fn freeze_policy_keeps_add_time_prices() -> TestResult {
        let menu = burger_bar()?;
        let mut session = OrderSession::new(SessionConfig::default());

        session.add_to_cart(&menu, &offers(20), ProductId::new(1), &brioche(&menu)?, 2)?;

        assert_eq!(session.total(&menu, &offers(50))?, gbp(1600));

        Ok(())
    }

    #[test]
    fn float_policy_follows_current_offers() -> TestResult {
        let menu = burger_bar()?;
        let config = SessionConfig {
            price_policy: PricePolicy::Float,
        };
        let mut session = OrderSession::new(config);

        session.add_to_cart(&menu, &offers(20), ProductId::new(1), &brioche(&menu)?, 2)?;

        assert_eq!(session.total(&menu, &offers(50))?, gbp(1000));

        Ok(())
    }

    #[test]
    fn invalid_selection_is_rejected_without_mutation() -> TestResult {
        let menu = burger_bar()?;
        let mut session = OrderSession::new(SessionConfig::default());

        let result = session.add_to_cart(
            &menu,
            &offers(0),
            ProductId::new(1),
            &AddonSelection::new(),
            1,
        );

        assert_eq!(
            result,
            Err(SessionError::InvalidAddonSelection(ProductId::new(1)))
        );
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn unavailable_and_unknown_products_are_rejected() -> TestResult {
        let menu = burger_bar()?;
        let mut session = OrderSession::new(SessionConfig::default());
        let selection = AddonSelection::new();

        assert_eq!(
            session.add_to_cart(&menu, &offers(0), ProductId::new(2), &selection, 1),
            Err(SessionError::ProductUnavailable(ProductId::new(2)))
        );
        assert_eq!(
            session.add_to_cart(&menu, &offers(0), ProductId::new(99), &selection, 1),
            Err(SessionError::UnknownProduct(ProductId::new(99)))
        );
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn addons_from_other_products_are_rejected() -> TestResult {
        let mut menu = burger_bar()?;
        menu.insert_product(Product::new(ProductId::new(3), FIVE, "Fries", gbp(300)))?;
        menu.insert_addon(ProductAddon::new(AddonId::new(30), ProductId::new(3), "Salt", gbp(0)))?;

        let mut selection = brioche(&menu)?;
        selection.toggle_optional(AddonId::new(30));

        let mut session = OrderSession::new(SessionConfig::default());

        assert_eq!(
            session.add_to_cart(&menu, &offers(0), ProductId::new(1), &selection, 1),
            Err(SessionError::ForeignAddon {
                addon: AddonId::new(30),
                product: ProductId::new(1),
            })
        );

        Ok(())
    }

    #[test]
    fn conflict_can_be_confirmed() -> TestResult {
        let burgers = burger_bar()?;
        let noodles = noodle_bar()?;
        let none = OfferSnapshot::empty(date(2026, 10, 18));
        let mut session = OrderSession::new(SessionConfig::default());

        session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1)?;

        let outcome =
            session.add_to_cart(&noodles, &none, ProductId::new(70), &AddonSelection::new(), 2)?;

        assert_eq!(
            outcome,
            GuardOutcome::ConflictPending {
                current: FIVE,
                requested: SEVEN
            }
        );
        assert_eq!(session.cart().current_restaurant(), Some(FIVE));
        assert_eq!(
            session.pending().and_then(PendingAdd::unit_price),
            Some(gbp(1100))
        );

        assert_eq!(
            session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1),
            Err(SessionError::Guard(GuardError::DecisionPending))
        );

        session.confirm_clear_and_add()?;

        assert_eq!(session.cart().current_restaurant(), Some(SEVEN));
        assert_eq!(session.cart().quantity_of(ProductId::new(70)), 2);
        assert_eq!(session.total(&noodles, &none)?, gbp(2200));

        Ok(())
    }

    #[test]
    fn conflict_can_be_cancelled() -> TestResult {
        let burgers = burger_bar()?;
        let noodles = noodle_bar()?;
        let none = OfferSnapshot::empty(date(2026, 10, 18));
        let mut session = OrderSession::new(SessionConfig::default());

        session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1)?;
        session.add_to_cart(&noodles, &none, ProductId::new(70), &AddonSelection::new(), 1)?;

        assert!(session.cancel_pending().is_some());
        assert!(session.pending().is_none());
        assert_eq!(session.cart().current_restaurant(), Some(FIVE));
        assert_eq!(session.cart().len(), 1);

        Ok(())
    }

    #[test]
    fn checkout_builds_payload_then_empties_cart() -> TestResult {
        let menu = burger_bar()?;
        let offers = offers(10);
        let mut session = OrderSession::new(SessionConfig::default());

        let mut selection = brioche(&menu)?;
        selection.toggle_optional(AddonId::new(20));

        session.add_to_cart(&menu, &offers, ProductId::new(1), &selection, 2)?;

        let request = session.order_request(&menu, &offers)?;

        // (9.00 + 0.90) * 2
        assert_eq!(request.total_amount, "19.80");
        assert_eq!(request.items.len(), 1);

        session.complete_checkout();

        assert!(session.cart().is_empty());
        assert_eq!(
            session.order_request(&menu, &offers),
            Err(SessionError::EmptyCart)
        );

        Ok(())
    }

    #[test]
    fn checkout_drops_a_pending_conflict() -> TestResult {
        let burgers = burger_bar()?;
        let noodles = noodle_bar()?;
        let none = OfferSnapshot::empty(date(2026, 10, 18));
        let mut session = OrderSession::new(SessionConfig::default());

        session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1)?;
        session.add_to_cart(&noodles, &none, ProductId::new(70), &AddonSelection::new(), 1)?;

        session.complete_checkout();

        assert!(session.pending().is_none());

        let outcome =
            session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1)?;

        assert_eq!(outcome, GuardOutcome::Applied(LineChange::Added(0)));
        assert_eq!(
            session.confirm_clear_and_add(),
            Err(SessionError::Guard(GuardError::NothingPending))
        );
        assert_eq!(session.cart().current_restaurant(), Some(FIVE));

        Ok(())
    }

    #[test]
    fn clear_drops_a_pending_conflict() -> TestResult {
        let burgers = burger_bar()?;
        let noodles = noodle_bar()?;
        let none = OfferSnapshot::empty(date(2026, 10, 18));
        let mut session = OrderSession::new(SessionConfig::default());

        session.add_to_cart(&burgers, &none, ProductId::new(1), &brioche(&burgers)?, 1)?;
        session.add_to_cart(&noodles, &none, ProductId::new(70), &AddonSelection::new(), 1)?;

        session.clear();

        assert!(session.pending().is_none());
        assert!(session.cart().is_empty());

        session.add_to_cart(&noodles, &none, ProductId::new(70), &AddonSelection::new(), 2)?;

        assert_eq!(session.cart().current_restaurant(), Some(SEVEN));
        assert_eq!(session.cart().quantity_of(ProductId::new(70)), 2);

        Ok(())
    }

    #[test]
    fn freeze_and_float_agree_at_the_same_snapshot() -> TestResult {
        let menu = burger_bar()?;
        let offers = OfferSnapshot::new(
            vec![Offer::percent_off(OfferId::new(1), FIVE, Decimal::new(3333, 2))],
            date(2026, 10, 18),
        );

        let mut frozen = OrderSession::new(SessionConfig {
            price_policy: PricePolicy::Freeze,
        });
        let mut floating = OrderSession::new(SessionConfig {
            price_policy: PricePolicy::Float,
        });

        frozen.add_to_cart(&menu, &offers, ProductId::new(1), &brioche(&menu)?, 3)?;
        floating.add_to_cart(&menu, &offers, ProductId::new(1), &brioche(&menu)?, 3)?;

        // 666.7 * 3 = 2000.1; a unit captured as 6.67 would total 20.01
        assert_eq!(frozen.total(&menu, &offers)?, gbp(2000));
        assert_eq!(floating.total(&menu, &offers)?, gbp(2000));

        Ok(())
    }

    #[test]
    fn config_deserializes_with_defaults() -> TestResult {
        let empty: SessionConfig = serde_norway::from_str("{}")?;
        let float: SessionConfig = serde_norway::from_str("price_policy: float")?;

        assert_eq!(empty.price_policy, PricePolicy::Freeze);
        assert_eq!(float.price_policy, PricePolicy::Float);

        Ok(())
    }
}
