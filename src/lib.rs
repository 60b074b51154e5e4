//! Menucart
//!
//! Cart state and promotional pricing for ordering from a single restaurant:
//! add-on selection rules, best-offer resolution, line and cart pricing, and a
//! cart that only ever holds one restaurant's items.

pub mod addons;
pub mod cart;
pub mod cli;
pub mod fixtures;
pub mod ids;
pub mod menu;
pub mod offers;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
