//! Fixtures
//!
//! Menu, offer and cart snapshots for one restaurant, loaded from
//! `<base>/<name>.yml`.

use std::{fs, path::Path};

use jiff::civil::Date;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{
    addons::selection::AddonSelection,
    fixtures::{
        offers::OfferFixture,
        products::{AddonFixture, ProductFixture, parse_currency},
    },
    ids::{AddonId, ProductId, RestaurantId},
    menu::{Menu, MenuError},
    offers::{Offer, OfferSnapshot},
    products::ProductError,
    session::{OrderSession, SessionConfig, SessionError},
};

pub mod offers;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid product data
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Products and add-ons do not form a valid menu
    #[error(transparent)]
    Menu(#[from] MenuError),
}

/// Cart entry in a fixture file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartEntryFixture {
    /// Product to add
    pub product_id: ProductId,

    /// Units to add
    #[serde(default = "one")]
    pub quantity: u32,

    /// Chosen add-ons
    #[serde(default)]
    pub addons: Vec<AddonId>,
}

fn one() -> u32 {
    1
}

impl CartEntryFixture {
    /// The entry's add-on picks, split into required and optional by the menu.
    #[must_use]
    pub fn selection(&self, menu: &Menu<'_>) -> AddonSelection {
        AddonSelection::from_ids(menu, self.addons.iter().copied())
    }
}

/// A restaurant's menu, offers and a cart to replay against them.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuFixture {
    /// Restaurant the menu belongs to
    pub restaurant: RestaurantId,

    /// ISO currency code for every price
    pub currency: String,

    /// Date offers are evaluated on
    pub as_of: Date,

    /// Session configuration
    #[serde(default)]
    pub config: SessionConfig,

    /// Products
    #[serde(default)]
    pub products: Vec<ProductFixture>,

    /// Add-ons
    #[serde(default)]
    pub addons: Vec<AddonFixture>,

    /// Offer feed
    #[serde(default)]
    pub offers: Vec<OfferFixture>,

    /// Cart to replay
    #[serde(default)]
    pub cart: Vec<CartEntryFixture>,
}

impl MenuFixture {
    /// Load `<base_path>/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        let file_path = base_path.as_ref().join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture = Self::from_yaml(&contents)?;

        info!(
            path = %file_path.display(),
            restaurant = %fixture.restaurant,
            products = fixture.products.len(),
            offers = fixture.offers.len(),
            "loaded fixture"
        );

        Ok(fixture)
    }

    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Currency every price is in.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported currency codes.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        parse_currency(&self.currency)
    }

    /// Build the menu snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a price, add-on policy or menu reference is invalid.
    pub fn menu(&self) -> Result<Menu<'static>, FixtureError> {
        let currency = self.currency()?;
        let mut menu = Menu::new(self.restaurant, currency);

        for product in &self.products {
            menu.insert_product(product.to_product(self.restaurant, currency)?)?;
        }

        for addon in &self.addons {
            menu.insert_addon(addon.to_addon(currency)?)?;
        }

        Ok(menu)
    }

    /// Build the offer snapshot, keeping only this restaurant's offers.
    #[must_use]
    pub fn offers(&self) -> OfferSnapshot {
        let offers = self.offers.iter().map(Offer::from).collect();

        OfferSnapshot::for_restaurant(self.restaurant, offers, self.as_of)
    }

    /// Replay the fixture cart through a fresh session.
    ///
    /// # Errors
    ///
    /// Returns the first [`SessionError`] an entry raises.
    pub fn replay<'a>(
        &self,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<OrderSession<'a>, SessionError> {
        let mut session = OrderSession::new(self.config);

        for entry in &self.cart {
            session.add_to_cart(
                menu,
                offers,
                entry.product_id,
                &entry.selection(menu),
                entry.quantity,
            )?;
        }

        Ok(session)
    }
}
