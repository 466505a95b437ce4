//! Command-line & Environment Config

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    cart::{CartStore, TransactionType},
    catalog::{Catalog, CatalogError},
    snapshot::{DEFAULT_STORAGE_KEY, FileSnapshotStore},
};

/// Storefront cart
#[derive(Debug, Parser)]
#[command(name = "almajo-cart", version, about)]
pub struct Cli {
    /// Cart storage settings
    #[command(flatten)]
    pub cart: CartConfig,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Where the cart and catalog live.
#[derive(Debug, Clone, Args)]
pub struct CartConfig {
    /// Directory holding cart snapshots
    #[arg(long, env = "ALMAJO_CART_DIR", default_value = ".almajo")]
    pub data_dir: PathBuf,

    /// Storage key the cart is saved under
    #[arg(long, env = "ALMAJO_CART_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Catalog YAML file (defaults to the built-in storefront catalog)
    #[arg(long, env = "ALMAJO_CATALOG")]
    pub catalog: Option<PathBuf>,
}

impl CartConfig {
    /// Loads the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the catalog cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::from_path(path),
            None => Catalog::storefront(),
        }
    }

    /// Opens the cart persisted in the data directory.
    pub fn open_store(&self) -> CartStore<FileSnapshotStore> {
        CartStore::open_with_key(FileSnapshotStore::new(&self.data_dir), &self.storage_key)
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Cart operations
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List catalog products
    Products,

    /// Add one unit of a product
    Add {
        /// Product identifier
        product: String,

        /// compra or alquiler
        #[arg(value_enum)]
        transaction_type: TransactionType,

        /// Size (defaults to the product's first size)
        size: Option<String>,

        /// Rental days for a new rental entry
        #[arg(long)]
        days: Option<u32>,
    },

    /// Remove a product from the cart
    Remove {
        /// Product identifier
        product: String,

        /// compra or alquiler
        #[arg(value_enum)]
        transaction_type: TransactionType,
    },

    /// Set the quantity of a cart entry; zero or less removes it
    Update {
        /// Product identifier
        product: String,

        /// compra or alquiler
        #[arg(value_enum)]
        transaction_type: TransactionType,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Set the number of days a rental lasts
    Days {
        /// Product identifier
        product: String,

        /// Number of days
        #[arg(allow_negative_numbers = true)]
        days: i64,
    },

    /// Empty the cart
    Clear,

    /// Print the cart total
    Total,

    /// Print the cart contents
    Show,

    /// Place the order and empty the cart
    Checkout,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_storefront_type_names() -> TestResult {
        let cli = Cli::try_parse_from([
            "almajo-cart",
            "add",
            "rental-2",
            "alquiler",
            "M",
            "--days",
            "3",
        ])?;

        assert_eq!(
            cli.command,
            Command::Add {
                product: "rental-2".to_string(),
                transaction_type: TransactionType::Rental,
                size: Some("M".to_string()),
                days: Some(3),
            }
        );

        Ok(())
    }

    #[test]
    fn parses_english_aliases_and_negative_quantities() -> TestResult {
        let cli = Cli::try_parse_from(["almajo-cart", "update", "product-1", "purchase", "-1"])?;

        assert_eq!(
            cli.command,
            Command::Update {
                product: "product-1".to_string(),
                transaction_type: TransactionType::Purchase,
                quantity: -1,
            }
        );

        Ok(())
    }

    #[test]
    fn storage_flags_override_defaults() -> TestResult {
        let cli = Cli::try_parse_from([
            "almajo-cart",
            "--data-dir",
            "/tmp/carts",
            "--storage-key",
            "guest",
            "--log-format",
            "json",
            "show",
        ])?;

        assert_eq!(cli.cart.data_dir, PathBuf::from("/tmp/carts"));
        assert_eq!(cli.cart.storage_key, "guest");
        assert_eq!(cli.logging.log_format, LogFormat::Json);
        assert_eq!(cli.command, Command::Show);

        Ok(())
    }

    #[test]
    fn rejects_unknown_transaction_type() {
        let result = Cli::try_parse_from(["almajo-cart", "remove", "product-1", "trueque"]);

        assert!(result.is_err());
    }

    #[test]
    fn load_catalog_defaults_to_storefront() -> TestResult {
        let config = CartConfig {
            data_dir: PathBuf::from(".almajo"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            catalog: None,
        };

        assert_eq!(config.load_catalog()?.len(), 12);

        Ok(())
    }

    #[test]
    fn open_store_persists_under_data_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = CartConfig {
            data_dir: dir.path().to_path_buf(),
            storage_key: "guest".to_string(),
            catalog: None,
        };
        let catalog = config.load_catalog()?;

        let mut store = config.open_store();
        store.add_to_cart(catalog.product("product-2")?, TransactionType::Purchase, "M");

        assert!(dir.path().join("guest.json").exists());
        assert_eq!(config.open_store().len(), 1);

        Ok(())
    }
}
