//! Catalog
//!
//! Read-only product data, loaded from YAML.

use std::{collections::BTreeMap, fs, path::Path};

use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::products::{Product, ProductId};

/// Built-in storefront catalog.
const STOREFRONT_YAML: &str = include_str!("../fixtures/catalog.yml");

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Catalog Parsing Errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
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

    /// Price currency differs from the catalog currency
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product has neither a sale nor a rental price
    #[error("Product has no price: {0}")]
    NoPrice(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

/// Catalog file layout
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    /// ISO currency code every price is expressed in
    currency: String,

    /// Map of product id -> product fixture
    products: BTreeMap<String, ProductFixture>,
}

/// Product entry in a catalog file
#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    category: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sizes: Vec<String>,
    /// Sale price (e.g., "89.99 EUR")
    #[serde(default)]
    sale_price: Option<String>,
    /// Rental price per day (e.g., "108.00 EUR")
    #[serde(default)]
    rental_price: Option<String>,
    #[serde(default)]
    image: String,
}

/// Products available in the storefront, keyed by identifier.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    keys: FxHashMap<ProductId, ProductKey>,
    currency: &'static Currency,
}

impl Catalog {
    /// Creates an empty catalog priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            currency,
        }
    }

    /// The storefront catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails to parse.
    pub fn storefront() -> Result<Self, CatalogError> {
        Self::from_yaml_str(STOREFRONT_YAML)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a price is
    /// invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, a price is malformed or in a
    /// different currency than the catalog, or a product has no price at all.
    pub fn from_yaml_str(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;
        let currency = parse_currency(&fixture.currency)?;
        let mut catalog = Self::new(currency);

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(ProductId::new(id), currency)?;

            catalog.insert(product);
        }

        Ok(catalog)
    }

    /// Adds a product, replacing any product with the same identifier.
    pub fn insert(&mut self, product: Product) -> ProductKey {
        if let Some(&key) = self.keys.get(&product.id) {
            if let Some(slot) = self.products.get_mut(key) {
                *slot = product;
                return key;
            }
        }

        let id = product.id.clone();
        let key = self.products.insert(product);
        self.keys.insert(id, key);

        key
    }

    /// Get a product by identifier
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.keys.get(id).and_then(|&key| self.products.get(key))
    }

    /// Get a product by identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product, CatalogError> {
        self.get(&ProductId::new(id))
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every price is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl ProductFixture {
    fn into_product(
        self,
        id: ProductId,
        currency: &'static Currency,
    ) -> Result<Product, CatalogError> {
        let sale_price = self
            .sale_price
            .as_deref()
            .map(|price| parse_price_in(price, currency))
            .transpose()?;

        let rental_price = self
            .rental_price
            .as_deref()
            .map(|price| parse_price_in(price, currency))
            .transpose()?;

        if sale_price.is_none() && rental_price.is_none() {
            return Err(CatalogError::NoPrice(id.to_string()));
        }

        Ok(Product {
            id,
            name: self.name,
            category: self.category,
            kind: self.kind,
            description: self.description,
            sizes: self.sizes,
            sale_price,
            rental_price,
            image: self.image,
        })
    }
}

fn parse_price_in(s: &str, currency: &'static Currency) -> Result<Decimal, CatalogError> {
    let (amount, price_currency) = parse_price(s)?;

    if price_currency != currency {
        return Err(CatalogError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            price_currency.iso_alpha_code.to_string(),
        ));
    }

    Ok(amount)
}

/// Parse price string (e.g., "89.99 EUR") into an amount and currency
///
/// The amount is rounded to the currency's minor unit.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    let currency = parse_currency(currency_code)?;
    let amount = amount.round_dp_with_strategy(
        currency.exponent,
        RoundingStrategy::MidpointAwayFromZero,
    );

    Ok((amount, currency))
}

fn parse_currency(code: &str) -> Result<&'static Currency, CatalogError> {
    match code {
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        other => Err(CatalogError::UnknownCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn storefront_catalog_loads() -> TestResult {
        let catalog = Catalog::storefront()?;

        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.currency(), EUR);

        let noir = catalog.product("product-1")?;
        assert_eq!(noir.name, "Vestido Elegante Noir");
        assert_eq!(noir.sale_price, Some(Decimal::new(8999, 2)));
        assert_eq!(noir.rental_price, None);

        let cocktail = catalog.product("rental-2")?;
        assert_eq!(cocktail.rental_price, Some(Decimal::new(108, 0)));
        assert_eq!(cocktail.sale_price, None);

        Ok(())
    }

    #[test]
    fn iter_is_sorted_by_id() -> TestResult {
        let catalog = Catalog::storefront()?;

        let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();

        assert_eq!(ids, sorted);

        Ok(())
    }

    #[test]
    fn missing_product_errors() -> TestResult {
        let catalog = Catalog::storefront()?;

        assert!(matches!(
            catalog.product("product-4"),
            Err(CatalogError::ProductNotFound(id)) if id == "product-4"
        ));

        Ok(())
    }

    #[test]
    fn product_without_price_is_rejected() {
        let yaml = "currency: EUR\nproducts:\n  p:\n    name: P\n    category: c\n";

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::NoPrice(id)) if id == "p"
        ));
    }

    #[test]
    fn price_in_other_currency_is_rejected() {
        let yaml = "currency: EUR\nproducts:\n  p:\n    name: P\n    category: c\n    sale_price: \"10.00 GBP\"\n";

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::CurrencyMismatch(expected, found)) if expected == "EUR" && found == "GBP"
        ));
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(matches!(
            Catalog::from_yaml_str("products: ["),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[test]
    fn from_path_reads_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.yml");
        fs::write(
            &path,
            "currency: GBP\nproducts:\n  coat:\n    name: Coat\n    category: winter\n    sizes: [M]\n    sale_price: \"99.50 GBP\"\n",
        )?;

        let catalog = Catalog::from_path(&path)?;

        assert_eq!(catalog.currency(), GBP);
        assert_eq!(
            catalog.product("coat")?.sale_price,
            Some(Decimal::new(9950, 2))
        );

        Ok(())
    }

    #[test]
    fn insert_replaces_same_id() -> TestResult {
        let mut catalog = Catalog::storefront()?;
        let mut noir = catalog.product("product-1")?.clone();
        noir.sale_price = Some(Decimal::new(7999, 2));

        catalog.insert(noir);

        assert_eq!(catalog.len(), 12);
        assert_eq!(
            catalog.product("product-1")?.sale_price,
            Some(Decimal::new(7999, 2))
        );

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99EUR");

        assert!(matches!(result, Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        assert!(matches!(
            parse_price("-1.00 EUR"),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rounds_to_minor_units() -> TestResult {
        let (amount, currency) = parse_price("10.005 USD")?;

        assert_eq!(amount, Decimal::new(1001, 2));
        assert_eq!(currency, USD);

        Ok(())
    }
}
