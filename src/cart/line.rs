//! Cart Lines

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::{
    addons::AddonIdSet,
    ids::{AddonId, ProductId},
};

/// Identity of a cart line: the product plus its add-on selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineIdentity {
    /// Product id
    pub product: ProductId,

    /// Selected add-ons, order-insensitive
    pub addons: AddonIdSet,
}

impl LineIdentity {
    /// Create a line identity.
    #[must_use]
    pub fn new(product: ProductId, addons: AddonIdSet) -> Self {
        Self { product, addons }
    }
}

/// Prices captured when a line was added, kept for the line's lifetime.
///
/// Amounts are unrounded minor units, so a frozen line totals exactly what the
/// same line priced live at capture time would.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenPrice<'a> {
    currency: &'a Currency,
    unit: Decimal,
    addons: FxHashMap<AddonId, Decimal>,
}

impl<'a> FrozenPrice<'a> {
    /// Freeze a unit price with no add-on prices.
    #[must_use]
    pub fn new(unit: Money<'a, Currency>) -> Self {
        Self::from_minor_units(Decimal::from(unit.to_minor_units()), unit.currency())
    }

    /// Freeze an unrounded unit amount given in minor units.
    #[must_use]
    pub fn from_minor_units(unit: Decimal, currency: &'a Currency) -> Self {
        Self {
            currency,
            unit,
            addons: FxHashMap::default(),
        }
    }

    /// Freeze an add-on amount, in minor units of the frozen currency.
    #[must_use]
    pub fn with_addon(mut self, addon: AddonId, minor_units: Decimal) -> Self {
        self.addons.insert(addon, minor_units);
        self
    }

    /// Currency the amounts are in.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Unrounded per-unit product amount in minor units.
    #[must_use]
    pub fn unit_minor_units(&self) -> Decimal {
        self.unit
    }

    /// Unrounded per-unit amount for one add-on.
    #[must_use]
    pub fn addon_minor_units(&self, addon: AddonId) -> Option<Decimal> {
        self.addons.get(&addon).copied()
    }

    /// Unrounded per-unit amounts of every frozen add-on.
    pub fn addons_minor_units(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.addons.values().copied()
    }

    /// Unit price rounded half away from zero, `None` if it does not fit.
    #[must_use]
    pub fn unit_price(&self) -> Option<Money<'a, Currency>> {
        self.unit
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(|minor| Money::from_minor(minor, self.currency))
    }
}

/// A request to add a product to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLine<'a> {
    /// Product to add
    pub product: ProductId,

    /// Units to add; zero is treated as one
    pub quantity: u32,

    /// Selected add-ons
    pub addons: AddonIdSet,

    /// Add-time prices, if the caller froze them
    pub frozen: Option<FrozenPrice<'a>>,
}

impl<'a> NewLine<'a> {
    /// Add one unit of a product with no add-ons at the live price.
    #[must_use]
    pub fn new(product: ProductId) -> Self {
        Self {
            product,
            quantity: 1,
            addons: AddonIdSet::new(),
            frozen: None,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the add-on selection.
    #[must_use]
    pub fn with_addons(mut self, addons: impl IntoIterator<Item = AddonId>) -> Self {
        self.addons = addons.into_iter().collect();
        self
    }

    /// Freeze the line's prices.
    #[must_use]
    pub fn with_frozen(mut self, frozen: FrozenPrice<'a>) -> Self {
        self.frozen = Some(frozen);
        self
    }

    /// Identity the new line will merge under.
    #[must_use]
    pub fn identity(&self) -> LineIdentity {
        LineIdentity::new(self.product, self.addons.clone())
    }
}

/// One distinct product and add-on combination in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    identity: LineIdentity,
    quantity: u32,
    frozen: Option<FrozenPrice<'a>>,
}

impl<'a> CartLine<'a> {
    pub(crate) fn from_new(line: NewLine<'a>) -> Self {
        Self {
            identity: LineIdentity::new(line.product, line.addons),
            quantity: line.quantity.max(1),
            frozen: line.frozen,
        }
    }

    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity.max(1));
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    /// Line identity.
    #[must_use]
    pub fn identity(&self) -> &LineIdentity {
        &self.identity
    }

    /// Product id.
    #[must_use]
    pub fn product(&self) -> ProductId {
        self.identity.product
    }

    /// Selected add-ons.
    #[must_use]
    pub fn addons(&self) -> &AddonIdSet {
        &self.identity.addons
    }

    /// Units on the line, always at least one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Add-time prices, if frozen.
    #[must_use]
    pub fn frozen(&self) -> Option<&FrozenPrice<'a>> {
        self.frozen.as_ref()
    }
}
