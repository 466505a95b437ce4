//! Commands
//!
//! Runs CLI operations against a cart and writes user-facing output.

use std::io;

use rust_decimal::Decimal;
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

use crate::{
    cart::{CartStore, CheckoutOutcome, TransactionType},
    catalog::{Catalog, CatalogError},
    config::Command,
    pricing::money,
    products::{Product, ProductId},
    receipt::{Receipt, ReceiptError},
    snapshot::SnapshotStore,
};

/// Errors running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Catalog lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Receipt could not be written
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Output could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    /// `--days` given for a purchase
    #[error("--days only applies to rentals (alquiler)")]
    DaysOnPurchase,

    /// Product declares no sizes and none was given
    #[error("Product {0} has no sizes; pass one explicitly")]
    NoSize(String),
}

/// Runs `command` against `store`, writing messages to `out`.
///
/// # Errors
///
/// Returns a [`CommandError`] if a product is not in the catalog or output
/// cannot be written.
pub fn run<S: SnapshotStore>(
    command: Command,
    catalog: &Catalog,
    store: &mut CartStore<S>,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    match command {
        Command::Products => write_products(catalog, out)?,
        Command::Add {
            product,
            transaction_type,
            size,
            days,
        } => {
            let product = catalog.product(&product)?;
            let size = resolve_size(product, size)?;

            match (transaction_type, days) {
                (TransactionType::Rental, Some(days)) => store.add_rental(product, &size, days),
                (TransactionType::Purchase, Some(_)) => return Err(CommandError::DaysOnPurchase),
                (_, None) => store.add_to_cart(product, transaction_type, &size),
            }

            let cart_name = match transaction_type {
                TransactionType::Purchase => "purchase",
                TransactionType::Rental => "rental",
            };

            writeln!(out, "Added {} to the {cart_name} cart", product.name)?;
        }
        Command::Remove {
            product,
            transaction_type,
        } => {
            let product_id = ProductId::new(product);

            if store.get(&product_id, transaction_type).is_some() {
                store.remove_from_cart(&product_id, transaction_type);
                writeln!(out, "Removed from cart")?;
            } else {
                writeln!(out, "{product_id} ({transaction_type}) is not in the cart")?;
            }
        }
        Command::Update {
            product,
            transaction_type,
            quantity,
        } => {
            store.update_quantity(&ProductId::new(product), transaction_type, quantity);
            write_count(store, out)?;
        }
        Command::Days { product, days } => {
            store.set_days(&ProductId::new(product), days);
            write_count(store, out)?;
        }
        Command::Clear => {
            store.clear_cart();
            writeln!(out, "Cart emptied")?;
        }
        Command::Total => {
            let totals = store.totals().to_money(catalog.currency());
            writeln!(out, "{}", totals.total)?;
        }
        Command::Show => {
            Receipt::from_store(store, catalog.currency()).write_to(&mut *out)?;
            write_count(store, out)?;
        }
        Command::Checkout => match store.checkout() {
            CheckoutOutcome::EmptyCart => writeln!(out, "Your cart is empty")?,
            outcome => {
                if let Some(receipt) = Receipt::from_checkout(outcome, catalog.currency()) {
                    receipt.write_to(&mut *out)?;
                }

                writeln!(out, "Order placed. Thank you for your purchase!")?;
            }
        },
    }

    Ok(())
}

/// Picks the requested size, or the product's first size.
///
/// Sizes outside the product's list are accepted with a warning.
fn resolve_size(product: &Product, size: Option<String>) -> Result<String, CommandError> {
    let Some(size) = size else {
        return product
            .default_size()
            .map(str::to_string)
            .ok_or_else(|| CommandError::NoSize(product.id.to_string()));
    };

    if !product.has_size(&size) {
        tracing::warn!(product = %product.id, size = %size, "size not offered for product");
    }

    Ok(size)
}

fn write_count<S: SnapshotStore>(
    store: &CartStore<S>,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    writeln!(out, "Items in cart: {}", store.item_count())?;

    Ok(())
}

fn write_products(catalog: &Catalog, out: &mut impl io::Write) -> Result<(), CommandError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Sizes", "Price", "Rental / day"]);

    let price = |amount: Option<Decimal>| {
        amount.map_or_else(String::new, |amount| {
            format!("{}", money(amount, catalog.currency()))
        })
    };

    for product in catalog.iter() {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            product.sizes.join(" "),
            price(product.sale_price),
            price(product.rental_price),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "{table}")?;

    Ok(())
}
