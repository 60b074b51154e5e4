//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    menu::Menu,
    offers::OfferSnapshot,
    pricing::{PricingError, cart_original_total, cart_total, line_subtotal},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A cart line could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name
    pub name: String,

    /// Names of the selected add-ons, in display order
    pub addons: SmallVec<[String; 4]>,

    /// Units on the line
    pub quantity: u32,

    /// Undiscounted line price, when a discount applies
    pub original: Option<Money<'a, Currency>>,

    /// What the customer pays for the line
    pub discounted: Money<'a, Currency>,
}

impl<'a> ReceiptLine<'a> {
    /// Amount saved on the line.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        match self.original {
            Some(original) => original.sub(self.discounted),
            None => Ok(Money::from_minor(0, self.discounted.currency())),
        }
    }
}

/// Priced snapshot of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    lines: Vec<ReceiptLine<'a>>,

    /// Total cost before any discounts
    subtotal: Money<'a, Currency>,

    /// Total amount payable after discounts
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Price every line of a cart against the menu and offers.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line cannot be priced.
    pub fn from_cart(
        cart: &Cart<'a>,
        menu: &Menu<'a>,
        offers: &OfferSnapshot,
    ) -> Result<Self, ReceiptError> {
        let mut lines = Vec::with_capacity(cart.len());

        for line in cart {
            let product = menu
                .product(line.product())
                .ok_or(PricingError::UnknownProduct(line.product()))?;

            let priced = line_subtotal(line, product, menu, offers)?;

            let addons = menu
                .addons_for(product.id)
                .into_iter()
                .filter(|addon| line.addons().contains(addon.id))
                .map(|addon| addon.name.clone())
                .collect();

            lines.push(ReceiptLine {
                name: product.name.clone(),
                addons,
                quantity: line.quantity(),
                original: priced.original,
                discounted: priced.discounted,
            });
        }

        Ok(Self {
            lines,
            subtotal: cart_original_total(cart, menu, offers)?,
            total: cart_total(cart, menu, offers)?,
        })
    }

    /// Priced lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before any discounts
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount payable after discounts
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Amount saved by discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Savings as a fraction of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        Ok(Percentage::from(
            Decimal::from(savings_minor) / Decimal::from(subtotal_minor),
        ))
    }

    /// Writes the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "", "Item", "Add-ons", "Qty", "Price", "Discounted", "Savings",
        ]);

        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = SmallVec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            let row = idx + 1;

            let (price, discounted, savings) = match line.original {
                Some(original) => (
                    original.to_string(),
                    line.discounted.to_string(),
                    format!("-{}", line.savings()?),
                ),
                None => (line.discounted.to_string(), String::new(), String::new()),
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.addons.join("\n"),
                line.quantity.to_string(),
                price,
                discounted,
                savings,
            ]);

            color_ops.push((row, 2, color_dark_grey()));

            if line.original.is_some() {
                color_ops.push((row, 4, color_dark_grey()));
                color_ops.push((row, 5, Color::FG_GREEN));
            }
        }

        write_table(&mut out, builder, self.lines.len(), color_ops)?;
        write_summary(&mut out, self)
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    rows: usize,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();

    for row in 1..=rows {
        theme.insert_horizontal_line(row, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let savings = receipt.savings()?;
    let savings_points = percent_points(receipt.savings_percent()?);

    let rows = [
        (" Subtotal:".to_string(), format!("{}  ", receipt.subtotal())),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}\x1b[0m  ", receipt.total()),
        ),
        (
            " Savings:".to_string(),
            format!("({savings_points:.2}%) {savings}  "),
        ),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        let label_pad = label_width.saturating_sub(visible_width(label));
        let value_pad = value_width.saturating_sub(visible_width(value));

        writeln!(
            out,
            "{:>label_pad$}{label}  {:>value_pad$}{value}",
            "", ""
        )
        .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    (percentage * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
