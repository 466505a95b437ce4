//! Almajo Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartEntry, CartStore, CheckoutOutcome, EntryKey, SubscriptionKey, TransactionType},
    catalog::{Catalog, CatalogError, ProductKey},
    events::{CartEvent, CartObserver, LoggingObserver},
    pricing::{CartTotals, MoneyTotals, line_total},
    products::{Product, ProductId},
    receipt::{Receipt, ReceiptError},
    snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore},
};
