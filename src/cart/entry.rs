//! Cart entries

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{Product, ProductId};

/// How a product is being acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum TransactionType {
    /// Outright purchase, priced per unit.
    #[serde(rename = "compra", alias = "purchase")]
    #[value(name = "compra", alias = "purchase")]
    Purchase,

    /// Timed rental, priced per unit per day.
    #[serde(rename = "alquiler", alias = "rental")]
    #[value(name = "alquiler", alias = "rental")]
    Rental,
}

impl TransactionType {
    /// Storefront label for the transaction type.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Purchase => "compra",
            TransactionType::Rental => "alquiler",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unique key of a cart entry.
///
/// The size is not part of the key: one product has at most one purchase row
/// and one rental row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    /// Product identifier
    pub product_id: ProductId,

    /// Transaction type
    pub transaction_type: TransactionType,
}

impl EntryKey {
    /// Creates a new entry key.
    pub fn new(product_id: impl Into<ProductId>, transaction_type: TransactionType) -> Self {
        Self {
            product_id: product_id.into(),
            transaction_type,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.transaction_type)
    }
}

fn default_days() -> u32 {
    1
}

/// One line item in the cart.
///
/// Product fields needed for display are copied in when the entry is
/// created, so a restored cart renders without a catalog lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    product_id: ProductId,
    #[serde(alias = "type")]
    transaction_type: TransactionType,
    size: String,
    quantity: u32,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default = "default_days")]
    days: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    category: String,
}

impl CartEntry {
    /// Creates an entry with quantity 1 for `product`.
    ///
    /// `days` below 1 is raised to 1. Purchases always carry a single day.
    pub fn new(
        product: &Product,
        transaction_type: TransactionType,
        size: impl Into<String>,
        days: u32,
    ) -> Self {
        let days = match transaction_type {
            TransactionType::Purchase => 1,
            TransactionType::Rental => days.max(1),
        };

        Self {
            product_id: product.id.clone(),
            transaction_type,
            size: size.into(),
            quantity: 1,
            price: product.price_for(transaction_type),
            days,
            name: product.name.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }

    /// Returns the key identifying this entry.
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.product_id.clone(), self.transaction_type)
    }

    /// Whether this entry has the given product and transaction type.
    pub fn matches(&self, product_id: &ProductId, transaction_type: TransactionType) -> bool {
        self.product_id == *product_id && self.transaction_type == transaction_type
    }

    /// Product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Transaction type
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Size chosen when the entry was first added
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Quantity, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price (per day for rentals), if the product had one
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Rental day-count, 1 for purchases
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product image reference
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Product category
    pub fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Folds the quantity of a repeated record for the same key into this one.
    pub(crate) fn absorb(&mut self, other: &CartEntry) {
        self.quantity = self.quantity.saturating_add(other.quantity);
    }

    /// Sets a positive quantity. Callers remove the entry instead of passing 0.
    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity > 0, "entry quantity must stay positive");

        self.quantity = quantity.max(1);
    }

    pub(crate) fn set_days(&mut self, days: u32) {
        self.days = days.max(1);
    }

    /// Brings a restored record back within the entry invariants.
    ///
    /// Returns `None` for records that should not exist (zero quantity).
    pub(crate) fn normalized(mut self) -> Option<Self> {
        if self.quantity == 0 {
            return None;
        }

        self.days = match self.transaction_type {
            TransactionType::Purchase => 1,
            TransactionType::Rental => self.days.max(1),
        };

        Some(self)
    }
}
