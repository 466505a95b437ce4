//! Almajo Cart CLI

use std::io;

use anyhow::Context;
use clap::Parser;

use almajo_cart::{commands, config::Cli, events::LoggingObserver, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.logging)?;

    let catalog = cli
        .cart
        .load_catalog()
        .context("failed to load product catalog")?;

    let mut store = cli.cart.open_store();
    store.subscribe(LoggingObserver);

    tracing::debug!(
        data_dir = %cli.cart.data_dir.display(),
        key = %cli.cart.storage_key,
        entries = store.len(),
        "cart opened"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    commands::run(cli.command, &catalog, &mut store, &mut handle)?;

    Ok(())
}
