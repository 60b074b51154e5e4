//! Product and add-on fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    addons::ProductAddon,
    fixtures::FixtureError,
    ids::{AddonId, ProductId, RestaurantId},
    products::{AddonRequirement, Product},
};

/// Product entry in a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Price as a decimal string, e.g. "10.00"
    pub price: String,

    /// Whether the product can be ordered
    #[serde(default = "available")]
    pub available: bool,

    /// Whether the product has a required add-on group
    #[serde(default)]
    pub addon_required: bool,

    /// Minimum required picks; `-1` means all of them
    #[serde(default)]
    pub addon_required_min: Option<i32>,
}

fn available() -> bool {
    true
}

impl ProductFixture {
    /// Build the product in the fixture currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the price or add-on minimum is invalid.
    pub fn to_product(
        &self,
        restaurant: RestaurantId,
        currency: &'static Currency,
    ) -> Result<Product<'static>, FixtureError> {
        let requirement =
            AddonRequirement::from_catalog(self.addon_required, self.addon_required_min)?;

        Ok(
            Product::new(self.id, restaurant, self.name.clone(), parse_amount(&self.price, currency)?)
                .with_availability(self.available)
                .with_addon_requirement(requirement),
        )
    }
}

/// Add-on entry in a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct AddonFixture {
    /// Add-on id
    pub id: AddonId,

    /// Product the add-on belongs to
    pub product_id: ProductId,

    /// Add-on name
    pub name: String,

    /// Price as a decimal string, e.g. "1.00"
    pub price: String,

    /// Whether the add-on is part of the required group
    #[serde(default)]
    pub required: bool,

    /// Position in the product's add-on list
    #[serde(default)]
    pub display_order: u32,
}

impl AddonFixture {
    /// Build the add-on in the fixture currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is invalid.
    pub fn to_addon(&self, currency: &'static Currency) -> Result<ProductAddon<'static>, FixtureError> {
        let addon = ProductAddon::new(
            self.id,
            self.product_id,
            self.name.clone(),
            parse_amount(&self.price, currency)?,
        )
        .with_display_order(self.display_order);

        Ok(if self.required { addon.required() } else { addon })
    }
}

/// Parse a currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything but GBP, USD or EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a decimal amount string (e.g. "2.99") into money.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] if the amount is malformed, negative
/// or more precise than the currency's minor unit.
pub fn parse_amount(s: &str, currency: &'static Currency) -> Result<Money<'static, Currency>, FixtureError> {
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let mut scaled = amount.normalize();

    if scaled.is_sign_negative() || scaled.scale() > currency.exponent {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    scaled.rescale(currency.exponent);

    let minor_units =
        i64::try_from(scaled.mantissa()).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_amount_reads_decimal_strings() -> TestResult {
        assert_eq!(parse_amount("10.00", GBP)?, Money::from_minor(1000, GBP));
        assert_eq!(parse_amount(" 2.5 ", USD)?, Money::from_minor(250, USD));
        assert_eq!(parse_amount("0", EUR)?, Money::from_minor(0, EUR));
        assert_eq!(parse_amount("1.500", GBP)?, Money::from_minor(150, GBP));

        Ok(())
    }

    #[test]
    fn parse_amount_rejects_bad_input() {
        assert!(matches!(parse_amount("ten", GBP), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_amount("-1.00", GBP), Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_amount_rejects_sub_minor_precision() {
        assert!(matches!(parse_amount("0.125", GBP), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_amount("0.135", USD), Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_currency_rejects_unknown_codes() {
        assert!(matches!(
            parse_currency("ABC"),
            Err(FixtureError::UnknownCurrency(code)) if code == "ABC"
        ));
    }

    #[test]
    fn product_fixture_parses_addon_policy() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            "{ id: 1, name: Burger, price: \"10.00\", addon_required: true, addon_required_min: -1 }",
        )?;

        let product = fixture.to_product(RestaurantId::new(5), GBP)?;

        assert_eq!(product.addon_requirement, AddonRequirement::All);
        assert!(product.is_available);
        assert_eq!(product.price, Money::from_minor(1000, GBP));

        Ok(())
    }

    #[test]
    fn invalid_addon_minimum_is_an_error() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            "{ id: 1, name: Burger, price: \"10.00\", addon_required: true, addon_required_min: -4 }",
        )?;

        assert!(matches!(
            fixture.to_product(RestaurantId::new(5), GBP),
            Err(FixtureError::Product(_))
        ));

        Ok(())
    }
}
