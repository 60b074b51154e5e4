//! Pricing
//!
//! Line subtotals, cart totals and display prices. All arithmetic runs on
//! unrounded minor units; amounts are rounded half away from zero to whole
//! minor units only when they become [`Money`].

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    addons::AddonIdSet,
    cart::{
        Cart,
        line::{CartLine, FrozenPrice},
    },
    ids::{AddonId, ProductId},
    menu::Menu,
    offers::{DiscountPercent, OfferSnapshot, OfferTarget},
    products::Product,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The product passed in is not the one on the line.
    #[error("line is for product {line}, but product {product} was supplied")]
    ProductMismatch {
        /// Product on the line
        line: ProductId,
        /// Product supplied
        product: ProductId,
    },

    /// A line references a product missing from the menu.
    #[error("product {0} is not on the menu")]
    UnknownProduct(ProductId),

    /// A line references an add-on missing from the menu.
    #[error("add-on {0} is not on the menu")]
    UnknownAddon(AddonId),

    /// A price is in a different currency than the menu.
    #[error("price has currency {0}, but menu has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An amount does not fit in minor units.
    #[error("amount overflowed while pricing")]
    Overflow,
}

/// Priced cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSubtotal<'a> {
    /// What the customer pays for the line
    pub discounted: Money<'a, Currency>,

    /// Undiscounted price, present only when strictly above `discounted`
    pub original: Option<Money<'a, Currency>>,
}

/// Price shown for a bare product on the menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPrice<'a> {
    /// Price after the best discount
    pub display: Money<'a, Currency>,

    /// Struck-through price, present only when a discount lowers the price
    pub original: Option<Money<'a, Currency>>,

    /// Discount applied, if any
    pub discount: Option<DiscountPercent>,
}

/// Unrounded line amounts in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineAmounts {
    discounted: Decimal,
    original: Decimal,
}

/// Price a cart line.
///
/// Lines with a frozen price charge the frozen amounts; the original is
/// recomputed from live menu prices. Other lines resolve the product and each
/// add-on discount independently against `offers`.
///
/// # Errors
///
/// Returns a [`PricingError`] if `product` is not the line's product, an
/// add-on is missing from the menu, or a price is in the wrong currency.
pub fn line_subtotal<'a>(
    line: &CartLine<'a>,
    product: &Product<'a>,
    menu: &Menu<'a>,
    offers: &OfferSnapshot,
) -> Result<LineSubtotal<'a>, PricingError> {
    let amounts = line_amounts(line, product, menu, offers)?;

    let discounted = finalise(amounts.discounted, menu.currency())?;
    let original = finalise(amounts.original, menu.currency())?;

    Ok(LineSubtotal {
        discounted,
        original: (original.to_minor_units() > discounted.to_minor_units()).then_some(original),
    })
}

/// Discounted cart total. Line amounts are summed unrounded and rounded once.
///
/// An empty cart totals zero in the menu currency.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line cannot be priced.
pub fn cart_total<'a>(
    cart: &Cart<'a>,
    menu: &Menu<'a>,
    offers: &OfferSnapshot,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = sum_lines(cart, menu, offers, |amounts| amounts.discounted)?;

    finalise(total, menu.currency())
}

/// Undiscounted cart total, rounded once.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line cannot be priced.
pub fn cart_original_total<'a>(
    cart: &Cart<'a>,
    menu: &Menu<'a>,
    offers: &OfferSnapshot,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = sum_lines(cart, menu, offers, |amounts| amounts.original)?;

    finalise(total, menu.currency())
}

/// Menu price of a product: one unit, no add-ons, best live discount.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the price cannot be represented.
pub fn display_price<'a>(
    product: &Product<'a>,
    offers: &OfferSnapshot,
) -> Result<DisplayPrice<'a>, PricingError> {
    let currency = product.price.currency();
    let discount = offers.best_discount_percent(OfferTarget::Product(product.id));
    let amount = minor(&product.price);

    let display = finalise(apply(discount, amount), currency)?;

    Ok(DisplayPrice {
        display,
        original: (product.price.to_minor_units() > display.to_minor_units())
            .then_some(product.price),
        discount,
    })
}

impl<'a> FrozenPrice<'a> {
    /// Capture the current discounted unit and add-on prices for a line.
    ///
    /// Amounts are captured unrounded; rounding happens once the line is
    /// totalled, exactly as for a line priced live.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an add-on is missing from the menu or a
    /// price is in the wrong currency.
    pub fn capture(
        product: &Product<'a>,
        addons: &AddonIdSet,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<Self, PricingError> {
        let currency = menu.currency();

        check_currency(product.price.currency(), currency)?;

        let unit = discounted_amount(&product.price, OfferTarget::Product(product.id), offers);
        let mut frozen = Self::from_minor_units(unit, currency);

        for id in addons {
            let addon = menu.addon(id).ok_or(PricingError::UnknownAddon(id))?;
            check_currency(addon.price.currency(), currency)?;

            let price = discounted_amount(&addon.price, OfferTarget::Addon(id), offers);
            frozen = frozen.with_addon(id, price);
        }

        Ok(frozen)
    }
}

fn sum_lines(
    cart: &Cart<'_>,
    menu: &Menu<'_>,
    offers: &OfferSnapshot,
    pick: impl Fn(LineAmounts) -> Decimal,
) -> Result<Decimal, PricingError> {
    cart.iter().try_fold(Decimal::ZERO, |acc, line| {
        let product = menu
            .product(line.product())
            .ok_or(PricingError::UnknownProduct(line.product()))?;

        let amounts = line_amounts(line, product, menu, offers)?;

        acc.checked_add(pick(amounts)).ok_or(PricingError::Overflow)
    })
}

fn line_amounts(
    line: &CartLine<'_>,
    product: &Product<'_>,
    menu: &Menu<'_>,
    offers: &OfferSnapshot,
) -> Result<LineAmounts, PricingError> {
    if line.product() != product.id {
        return Err(PricingError::ProductMismatch {
            line: line.product(),
            product: product.id,
        });
    }

    let currency = menu.currency();
    check_currency(product.price.currency(), currency)?;

    let mut original_unit = minor(&product.price);
    let mut discounted_unit = match line.frozen() {
        Some(frozen) => {
            check_currency(frozen.currency(), currency)?;
            frozen.unit_minor_units()
        }
        None => discounted_amount(&product.price, OfferTarget::Product(product.id), offers),
    };

    for id in line.addons() {
        let addon = menu.addon(id).ok_or(PricingError::UnknownAddon(id))?;
        check_currency(addon.price.currency(), currency)?;

        original_unit = checked_add(original_unit, minor(&addon.price))?;

        if line.frozen().is_none() {
            let discounted = discounted_amount(&addon.price, OfferTarget::Addon(id), offers);
            discounted_unit = checked_add(discounted_unit, discounted)?;
        }
    }

    if let Some(frozen) = line.frozen() {
        for price in frozen.addons_minor_units() {
            discounted_unit = checked_add(discounted_unit, price)?;
        }
    }

    let quantity = Decimal::from(line.quantity());

    Ok(LineAmounts {
        discounted: discounted_unit
            .checked_mul(quantity)
            .ok_or(PricingError::Overflow)?,
        original: original_unit
            .checked_mul(quantity)
            .ok_or(PricingError::Overflow)?,
    })
}

fn discounted_amount(
    price: &Money<'_, Currency>,
    target: OfferTarget,
    offers: &OfferSnapshot,
) -> Decimal {
    apply(offers.best_discount_percent(target), minor(price))
}

fn apply(discount: Option<DiscountPercent>, amount: Decimal) -> Decimal {
    discount.map_or(amount, |pct| pct.apply(amount))
}

fn checked_add(left: Decimal, right: Decimal) -> Result<Decimal, PricingError> {
    left.checked_add(right).ok_or(PricingError::Overflow)
}

fn check_currency(actual: &Currency, currency: &Currency) -> Result<(), PricingError> {
    if actual == currency {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch(
            actual.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

/// Amount in minor units.
fn minor(money: &Money<'_, Currency>) -> Decimal {
    Decimal::from(money.to_minor_units())
}

/// Round minor units half away from zero and build the money value.
fn finalise(amount: Decimal, currency: &Currency) -> Result<Money<'_, Currency>, PricingError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(|minor| Money::from_minor(minor, currency))
        .ok_or(PricingError::Overflow)
}
