//! Products

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::TransactionType;

/// Product identifier, e.g. `product-1` or `rental-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category (e.g. "fiesta", "novia")
    pub category: String,

    /// Garment kind shown under the name (e.g. "Vestido")
    pub kind: Option<String>,

    /// Product description
    pub description: Option<String>,

    /// Sizes the product is offered in
    pub sizes: Vec<String>,

    /// Unit sale price, absent for rental-only products
    pub sale_price: Option<Decimal>,

    /// Rental price per day, absent for purchase-only products
    pub rental_price: Option<Decimal>,

    /// Image reference
    pub image: String,
}

impl Product {
    /// Returns the unit price the product carries for a transaction type.
    ///
    /// Purchases use the sale price and rentals use the daily rental price.
    pub fn price_for(&self, transaction_type: TransactionType) -> Option<Decimal> {
        match transaction_type {
            TransactionType::Purchase => self.sale_price,
            TransactionType::Rental => self.rental_price,
        }
    }

    /// Whether the product can be bought or rented.
    pub fn offers(&self, transaction_type: TransactionType) -> bool {
        self.price_for(transaction_type).is_some()
    }

    /// Whether `size` is one of the declared sizes.
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// The size a product card preselects: the first declared size.
    pub fn default_size(&self) -> Option<&str> {
        self.sizes.first().map(String::as_str)
    }
}
