//! Receipt

use std::io;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartEntry, CartStore, CheckoutOutcome, TransactionType},
    pricing::{CartTotals, line_total, money},
    snapshot::SnapshotStore,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("Failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Printable summary of a cart's entries and totals.
#[derive(Debug, Clone)]
pub struct Receipt {
    entries: Vec<CartEntry>,
    totals: CartTotals,
    currency: &'static Currency,
}

impl Receipt {
    /// Create a receipt for the given entries.
    pub fn new(entries: Vec<CartEntry>, currency: &'static Currency) -> Self {
        let totals = CartTotals::from_entries(&entries);

        Self {
            entries,
            totals,
            currency,
        }
    }

    /// Create a receipt for the current contents of a cart.
    pub fn from_store<S: SnapshotStore>(store: &CartStore<S>, currency: &'static Currency) -> Self {
        Self::new(store.entries().to_vec(), currency)
    }

    /// Create a receipt for a completed checkout.
    ///
    /// Returns `None` for an empty-cart checkout.
    pub fn from_checkout(outcome: CheckoutOutcome, currency: &'static Currency) -> Option<Self> {
        match outcome {
            CheckoutOutcome::EmptyCart => None,
            CheckoutOutcome::Completed {
                entries, totals, ..
            } => Some(Self {
                entries,
                totals,
                currency,
            }),
        }
    }

    /// Entries on the receipt
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Subtotals and total
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Currency used for all monetary values
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Writes the receipt table and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.entries.is_empty() {
            writeln!(out, "Cart is empty")?;
            return Ok(());
        }

        let mut builder = Builder::default();

        push_receipt_header(&mut builder);

        for (idx, entry) in self.entries.iter().enumerate() {
            builder.push_record(self.entry_row(idx, entry));
        }

        write_receipt_table(&mut out, builder)?;
        self.write_summary(&mut out)?;

        Ok(())
    }

    fn entry_row(&self, idx: usize, entry: &CartEntry) -> [String; 8] {
        let unit_price = entry.price().map_or_else(
            || "-".to_string(),
            |price| match entry.transaction_type() {
                TransactionType::Purchase => format!("{}", money(price, self.currency)),
                TransactionType::Rental => format!("{}/day", money(price, self.currency)),
            },
        );

        let days = match entry.transaction_type() {
            TransactionType::Purchase => String::new(),
            TransactionType::Rental => entry.days().to_string(),
        };

        [
            format!("#{:<3}", idx + 1),
            entry.name().to_string(),
            entry.size().to_string(),
            entry.transaction_type().to_string(),
            unit_price,
            days,
            entry.quantity().to_string(),
            format!("{}", money(line_total(entry), self.currency)),
        ]
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = self.totals.to_money(self.currency);

        let lines = [
            (" Purchases:", format!("{}  ", totals.purchase)),
            (" Rentals:", format!("{}  ", totals.rental)),
            (" Total:", format!("{}  ", totals.total)),
        ];

        let label_width = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let value_width = lines.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);

        for (label, value) in &lines {
            writeln!(out, "{label:>label_width$}  {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record([
        "", "Item", "Size", "Type", "Unit Price", "Days", "Qty", "Total",
    ]);
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Columns::new(4..8), Alignment::right());
    table.modify(Rows::first(), Alignment::left());

    writeln!(out, "\n{table}")?;

    Ok(())
}
