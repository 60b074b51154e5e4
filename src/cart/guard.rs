//! Cart Conflict Guard
//!
//! Sits in front of [`Cart::add_line`] and turns a cross-restaurant add into
//! a pending decision. The cart is only replaced once the customer confirms.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    addons::AddonIdSet,
    cart::{
        Cart, CartConflict, LineChange,
        line::{FrozenPrice, NewLine},
    },
    ids::{ProductId, RestaurantId},
};

/// Errors raised by the guard's transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    /// A conflict is awaiting confirmation or cancellation.
    #[error("a cart conflict is awaiting a decision")]
    DecisionPending,

    /// There is no pending add to confirm.
    #[error("no pending cart conflict to confirm")]
    NothingPending,
}

/// An add held back until the customer decides what to do with the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdd<'a> {
    restaurant: RestaurantId,
    line: NewLine<'a>,
}

impl<'a> PendingAdd<'a> {
    /// Restaurant of the held add.
    #[must_use]
    pub fn restaurant(&self) -> RestaurantId {
        self.restaurant
    }

    /// Product to add.
    #[must_use]
    pub fn product(&self) -> ProductId {
        self.line.product
    }

    /// Units to add.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.line.quantity
    }

    /// Frozen unit price, if the add carried one.
    #[must_use]
    pub fn unit_price(&self) -> Option<Money<'a, Currency>> {
        self.line.frozen.as_ref().and_then(FrozenPrice::unit_price)
    }

    /// Selected add-ons.
    #[must_use]
    pub fn addons(&self) -> &AddonIdSet {
        &self.line.addons
    }

    /// The full held request.
    #[must_use]
    pub fn line(&self) -> &NewLine<'a> {
        &self.line
    }
}

impl<'a> From<CartConflict<'a>> for PendingAdd<'a> {
    fn from(conflict: CartConflict<'a>) -> Self {
        Self {
            restaurant: conflict.requested,
            line: *conflict.line,
        }
    }
}

/// Guard state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GuardState<'a> {
    /// Adds go straight to the cart.
    #[default]
    Idle,

    /// An add from another restaurant is waiting for a decision.
    PendingConflict(PendingAdd<'a>),
}

/// Result of routing an add through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The cart accepted the add.
    Applied(LineChange),

    /// The add conflicts with the cart and is now pending.
    ConflictPending {
        /// Restaurant the cart belongs to
        current: RestaurantId,

        /// Restaurant of the pending add
        requested: RestaurantId,
    },
}

/// Single-restaurant conflict guard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictGuard<'a> {
    state: GuardState<'a>,
}

impl<'a> ConflictGuard<'a> {
    /// Create an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &GuardState<'a> {
        &self.state
    }

    /// The add awaiting a decision, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingAdd<'a>> {
        match &self.state {
            GuardState::Idle => None,
            GuardState::PendingConflict(pending) => Some(pending),
        }
    }

    /// Whether a decision is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Route an add to the cart, holding it back on a restaurant conflict.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::DecisionPending`] without touching the cart while
    /// an earlier conflict is unresolved.
    pub fn add_line(
        &mut self,
        cart: &mut Cart<'a>,
        restaurant: RestaurantId,
        line: NewLine<'a>,
    ) -> Result<GuardOutcome, GuardError> {
        if self.is_pending() {
            return Err(GuardError::DecisionPending);
        }

        match cart.add_line(restaurant, line) {
            Ok(change) => Ok(GuardOutcome::Applied(change)),
            Err(conflict) => {
                let outcome = GuardOutcome::ConflictPending {
                    current: conflict.current,
                    requested: conflict.requested,
                };

                info!(
                    current = %conflict.current,
                    requested = %conflict.requested,
                    "holding add until cart conflict is resolved"
                );

                self.state = GuardState::PendingConflict(conflict.into());

                Ok(outcome)
            }
        }
    }

    /// Empty the cart and apply the pending add.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::NothingPending`] when no conflict is pending.
    pub fn confirm_clear_and_add(&mut self, cart: &mut Cart<'a>) -> Result<LineChange, GuardError> {
        let GuardState::PendingConflict(pending) = std::mem::take(&mut self.state) else {
            return Err(GuardError::NothingPending);
        };

        info!(restaurant = %pending.restaurant, "replacing cart after confirmed conflict");

        cart.clear();

        // The cart is empty, so the replayed add cannot conflict.
        cart.add_line(pending.restaurant, pending.line)
            .map_err(|conflict| {
                self.state = GuardState::PendingConflict(conflict.into());
                GuardError::DecisionPending
            })
    }

    /// Drop the pending add and leave the cart untouched.
    ///
    /// Returns the discarded add, or `None` if nothing was pending.
    pub fn cancel(&mut self) -> Option<PendingAdd<'a>> {
        match std::mem::take(&mut self.state) {
            GuardState::Idle => None,
            GuardState::PendingConflict(pending) => {
                debug!(product = %pending.product(), "cancelled pending add");
                Some(pending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    const FIVE: RestaurantId = RestaurantId::new(5);
    const SEVEN: RestaurantId = RestaurantId::new(7);

    fn cart_from_five<'a>() -> Result<Cart<'a>, CartConflict<'a>> {
        let mut cart = Cart::new();
        cart.add_line(FIVE, NewLine::new(ProductId::new(1)))?;

        Ok(cart)
    }

    #[test]
    fn same_restaurant_adds_pass_through() -> TestResult {
        let mut cart = cart_from_five()?;
        let mut guard = ConflictGuard::new();

        let outcome = guard.add_line(&mut cart, FIVE, NewLine::new(ProductId::new(2)))?;

        assert_eq!(outcome, GuardOutcome::Applied(LineChange::Added(1)));
        assert_eq!(guard.state(), &GuardState::Idle);

        Ok(())
    }

    #[test]
    fn conflict_moves_to_pending_without_touching_cart() -> TestResult {
        let mut cart = cart_from_five()?;
        let before = cart.clone();
        let mut guard = ConflictGuard::new();

        let frozen = FrozenPrice::new(Money::from_minor(450, GBP));
        let line = NewLine::new(ProductId::new(9))
            .with_quantity(2)
            .with_frozen(frozen);

        let outcome = guard.add_line(&mut cart, SEVEN, line)?;

        assert_eq!(
            outcome,
            GuardOutcome::ConflictPending {
                current: FIVE,
                requested: SEVEN
            }
        );
        assert_eq!(cart, before);

        let pending = guard.pending().ok_or("expected pending add")?;

        assert_eq!(pending.restaurant(), SEVEN);
        assert_eq!(pending.product(), ProductId::new(9));
        assert_eq!(pending.quantity(), 2);
        assert_eq!(pending.unit_price(), Some(Money::from_minor(450, GBP)));
        assert!(pending.addons().is_empty());

        Ok(())
    }

    #[test]
    fn adds_are_refused_while_pending() -> TestResult {
        let mut cart = cart_from_five()?;
        let mut guard = ConflictGuard::new();

        guard.add_line(&mut cart, SEVEN, NewLine::new(ProductId::new(9)))?;
        let before = cart.clone();

        assert_eq!(
            guard.add_line(&mut cart, FIVE, NewLine::new(ProductId::new(2))),
            Err(GuardError::DecisionPending)
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn confirm_replaces_cart_with_pending_add() -> TestResult {
        let mut cart = cart_from_five()?;
        let mut guard = ConflictGuard::new();

        guard.add_line(&mut cart, SEVEN, NewLine::new(ProductId::new(9)).with_quantity(2))?;

        let change = guard.confirm_clear_and_add(&mut cart)?;

        assert_eq!(change, LineChange::Added(0));
        assert_eq!(guard.state(), &GuardState::Idle);
        assert_eq!(cart.current_restaurant(), Some(SEVEN));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(9)), 2);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 0);

        Ok(())
    }

    #[test]
    fn cancel_discards_pending_add() -> TestResult {
        let mut cart = cart_from_five()?;
        let before = cart.clone();
        let mut guard = ConflictGuard::new();

        guard.add_line(&mut cart, SEVEN, NewLine::new(ProductId::new(9)))?;

        let discarded = guard.cancel();

        assert_eq!(discarded.map(|pending| pending.product()), Some(ProductId::new(9)));
        assert_eq!(guard.state(), &GuardState::Idle);
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn confirm_and_cancel_need_a_pending_add() {
        let mut cart = Cart::new();
        let mut guard = ConflictGuard::new();

        assert_eq!(
            guard.confirm_clear_and_add(&mut cart),
            Err(GuardError::NothingPending)
        );
        assert_eq!(guard.cancel(), None);
    }
}
