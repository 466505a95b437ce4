//! Integration tests driving the cart through parsed CLI commands.

use clap::Parser;
use testresult::TestResult;

use almajo_cart::{
    commands,
    config::Cli,
    prelude::{CartEntry, CartStore, Catalog, MemorySnapshotStore, TransactionType},
};

fn run(args: &[&str], catalog: &Catalog, store: &mut CartStore) -> TestResult<String> {
    let cli = Cli::try_parse_from(std::iter::once("almajo-cart").chain(args.iter().copied()))?;
    let mut out = Vec::new();

    commands::run(cli.command, catalog, store, &mut out)?;

    Ok(String::from_utf8(out)?)
}

#[test]
fn mixed_session_reaches_checkout() -> TestResult {
    let catalog = Catalog::storefront()?;
    let mut store = CartStore::open(MemorySnapshotStore::new());

    run(&["add", "product-1", "compra", "M"], &catalog, &mut store)?;
    run(&["add", "product-1", "compra", "L"], &catalog, &mut store)?;
    run(&["add", "rental-2", "alquiler", "S"], &catalog, &mut store)?;

    let total = run(&["total"], &catalog, &mut store)?;
    assert!(total.contains("287"), "unexpected total: {total}");

    let shown = run(&["show"], &catalog, &mut store)?;
    assert!(shown.ends_with("Items in cart: 3\n"));

    let checkout = run(&["checkout"], &catalog, &mut store)?;
    assert!(checkout.contains("Vestido Elegante Noir"));
    assert!(store.is_empty());

    Ok(())
}

#[test]
fn days_and_negative_quantity() -> TestResult {
    let catalog = Catalog::storefront()?;
    let mut store = CartStore::open(MemorySnapshotStore::new());
    let cocktail = catalog.product("rental-2")?;

    run(&["add", "rental-2", "alquiler", "M"], &catalog, &mut store)?;
    run(&["days", "rental-2", "4"], &catalog, &mut store)?;

    assert_eq!(
        store
            .get(&cocktail.id, TransactionType::Rental)
            .map(CartEntry::days),
        Some(4)
    );

    let output = run(&["update", "rental-2", "alquiler", "-1"], &catalog, &mut store)?;

    assert_eq!(output, "Items in cart: 0\n");
    assert!(store.is_empty());

    Ok(())
}

#[test]
fn clear_then_checkout_reports_empty_cart() -> TestResult {
    let catalog = Catalog::storefront()?;
    let mut store = CartStore::open(MemorySnapshotStore::new());

    run(&["add", "product-3", "purchase"], &catalog, &mut store)?;
    assert_eq!(run(&["clear"], &catalog, &mut store)?, "Cart emptied\n");
    assert_eq!(
        run(&["checkout"], &catalog, &mut store)?,
        "Your cart is empty\n"
    );

    Ok(())
}
