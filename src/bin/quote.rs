//! Quote
//!
//! Loads a fixture set, replays its cart through an order session and prints
//! the receipt followed by the order payload.
//!
//! Use `-f` to load a fixture set by name
//! Use `-b` to read fixture sets from another directory

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use menucart::{
    cli::{QuoteArgs, init_tracing},
    fixtures::MenuFixture,
    receipt::Receipt,
};
use tracing::info;

fn main() -> Result<()> {
    let args = QuoteArgs::parse();

    init_tracing(&args)?;

    let fixture = MenuFixture::load(&args.base_path, &args.fixture)?;
    let menu = fixture.menu()?;
    let offers = fixture.offers();

    let session = fixture.replay(&menu, &offers)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::from_cart(session.cart(), &menu, &offers)?.write_to(&mut handle)?;

    let request = session.order_request(&menu, &offers)?;

    serde_json::to_writer_pretty(&mut handle, &request)?;
    writeln!(handle)?;

    info!(total = %request.total_amount, items = request.items.len(), "quoted fixture cart");

    Ok(())
}
