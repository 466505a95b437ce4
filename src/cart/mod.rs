//! Cart
//!
//! [`CartStore`] owns the cart entries, applies every operation to them,
//! writes a snapshot after each operation and notifies subscribers.

use std::fmt;

use rust_decimal::Decimal;
use slotmap::{SlotMap, new_key_type};

use crate::{
    events::{CartEvent, CartObserver},
    pricing::CartTotals,
    products::{Product, ProductId},
    snapshot::{self, DEFAULT_STORAGE_KEY, MemorySnapshotStore, SnapshotError, SnapshotStore},
};

mod entry;

pub use entry::{CartEntry, EntryKey, TransactionType};

new_key_type! {
    /// Subscription Key
    pub struct SubscriptionKey;
}

/// Result of [`CartStore::checkout`].
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The cart had nothing in it; nothing changed.
    EmptyCart,

    /// The cart was emptied.
    Completed {
        /// Entries that were in the cart
        entries: Vec<CartEntry>,
        /// Totals of those entries
        totals: CartTotals,
        /// Units across those entries
        item_count: u64,
    },
}

/// Cart state plus the snapshot backend it persists to.
pub struct CartStore<S: SnapshotStore = MemorySnapshotStore> {
    entries: Vec<CartEntry>,
    snapshots: S,
    key: String,
    observers: SlotMap<SubscriptionKey, Box<dyn CartObserver>>,
}

impl<S: SnapshotStore + fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("entries", &self.entries)
            .field("snapshots", &self.snapshots)
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: SnapshotStore> CartStore<S> {
    /// Opens the cart stored under the default key.
    ///
    /// A missing, unreadable or malformed snapshot gives an empty cart.
    pub fn open(snapshots: S) -> Self {
        Self::open_with_key(snapshots, DEFAULT_STORAGE_KEY)
    }

    /// Opens the cart stored under `key`.
    ///
    /// A missing, unreadable or malformed snapshot gives an empty cart.
    pub fn open_with_key(snapshots: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = restore(&snapshots, &key);

        Self {
            entries,
            snapshots,
            key,
            observers: SlotMap::with_key(),
        }
    }

    /// Adds one unit of `product`.
    ///
    /// If the product is already in the cart with the same transaction type its
    /// quantity goes up by one and `size` is ignored. Otherwise a new entry is
    /// appended with quantity 1 and a single day.
    pub fn add_to_cart(&mut self, product: &Product, transaction_type: TransactionType, size: &str) {
        self.add(product, transaction_type, size, 1);
    }

    /// Adds one unit of `product` for rental over `days` days.
    ///
    /// `days` only applies when a new entry is created; an existing rental
    /// entry is incremented and keeps its day-count.
    pub fn add_rental(&mut self, product: &Product, size: &str, days: u32) {
        self.add(product, TransactionType::Rental, size, days);
    }

    fn add(&mut self, product: &Product, transaction_type: TransactionType, size: &str, days: u32) {
        let quantity = if let Some(entry) = self.find_mut(&product.id, transaction_type) {
            if entry.size() != size {
                tracing::debug!(
                    product = %product.id,
                    kept = entry.size(),
                    requested = size,
                    "entry exists, keeping original size"
                );
            }

            entry.increment();
            entry.quantity()
        } else {
            let entry = CartEntry::new(product, transaction_type, size, days);
            let quantity = entry.quantity();
            self.entries.push(entry);
            quantity
        };

        self.commit(CartEvent::Added {
            key: EntryKey::new(product.id.clone(), transaction_type),
            quantity,
        });
    }

    /// Removes the entry for `product_id` and `transaction_type`, if any.
    pub fn remove_from_cart(&mut self, product_id: &ProductId, transaction_type: TransactionType) {
        let key = EntryKey::new(product_id.clone(), transaction_type);
        let before = self.entries.len();

        self.entries
            .retain(|entry| !entry.matches(product_id, transaction_type));

        let event = if self.entries.len() < before {
            CartEvent::Removed { key }
        } else {
            CartEvent::Unchanged { key }
        };

        self.commit(event);
    }

    /// Sets the quantity of an entry.
    ///
    /// A quantity of zero or less removes the entry. Quantities beyond
    /// `u32::MAX` are capped.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        transaction_type: TransactionType,
        quantity: i64,
    ) {
        if quantity <= 0 {
            self.remove_from_cart(product_id, transaction_type);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let key = EntryKey::new(product_id.clone(), transaction_type);

        let event = match self.find_mut(product_id, transaction_type) {
            Some(entry) => {
                entry.set_quantity(quantity);
                CartEvent::QuantityChanged { key, quantity }
            }
            None => CartEvent::Unchanged { key },
        };

        self.commit(event);
    }

    /// Sets how many days the rental of `product_id` lasts.
    ///
    /// Values below 1 become 1. Purchases have no day-count, so only the
    /// rental entry is affected.
    pub fn set_days(&mut self, product_id: &ProductId, days: i64) {
        let days = u32::try_from(days.max(1)).unwrap_or(u32::MAX);
        let key = EntryKey::new(product_id.clone(), TransactionType::Rental);

        let event = match self.find_mut(product_id, TransactionType::Rental) {
            Some(entry) => {
                entry.set_days(days);
                CartEvent::DaysChanged { key, days }
            }
            None => CartEvent::Unchanged { key },
        };

        self.commit(event);
    }

    /// Removes every entry.
    pub fn clear_cart(&mut self) {
        self.entries.clear();
        self.commit(CartEvent::Cleared);
    }

    /// Empties the cart as a completed order.
    ///
    /// No order is placed anywhere; this only resets the cart. Checking out an
    /// empty cart changes nothing and notifies nobody.
    pub fn checkout(&mut self) -> CheckoutOutcome {
        if self.entries.is_empty() {
            tracing::debug!("checkout on empty cart");
            return CheckoutOutcome::EmptyCart;
        }

        let totals = self.totals();
        let item_count = self.item_count();
        let entries = std::mem::take(&mut self.entries);

        self.commit(CartEvent::CheckedOut { totals, item_count });

        CheckoutOutcome::Completed {
            entries,
            totals,
            item_count,
        }
    }

    /// Purchase subtotal plus rental subtotal.
    pub fn total(&self) -> Decimal {
        self.totals().total()
    }

    /// Subtotals by transaction type.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_entries(&self.entries)
    }

    /// Number of units across all entries.
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity())).sum()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Purchase entries in insertion order.
    pub fn purchase_entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries_of(TransactionType::Purchase)
    }

    /// Rental entries in insertion order.
    pub fn rental_entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries_of(TransactionType::Rental)
    }

    fn entries_of(&self, transaction_type: TransactionType) -> impl Iterator<Item = &CartEntry> {
        self.entries
            .iter()
            .filter(move |e| e.transaction_type() == transaction_type)
    }

    /// Looks up the entry for `product_id` and `transaction_type`.
    pub fn get(
        &self,
        product_id: &ProductId,
        transaction_type: TransactionType,
    ) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(product_id, transaction_type))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers an observer notified after each operation.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.observers.insert(Box::new(observer))
    }

    /// Drops a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.observers.remove(key).is_some()
    }

    /// Writes the current entries to the snapshot backend.
    ///
    /// Operations call this themselves and only log failures; use it directly
    /// when the caller needs to know whether the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the entries cannot be encoded or saved.
    pub fn persist(&mut self) -> Result<(), SnapshotError> {
        let contents = snapshot::encode(&self.entries)?;

        self.snapshots.save(&self.key, &contents)
    }

    /// Storage key the cart persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot backend.
    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    /// Consumes the store, returning its snapshot backend.
    pub fn into_snapshots(self) -> S {
        self.snapshots
    }

    fn find_mut(
        &mut self,
        product_id: &ProductId,
        transaction_type: TransactionType,
    ) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.matches(product_id, transaction_type))
    }

    fn commit(&mut self, event: CartEvent) {
        tracing::debug!(key = %self.key, entries = self.entries.len(), "{event}");

        if let Err(err) = self.persist() {
            tracing::warn!(key = %self.key, "failed to persist cart: {err}");
        }

        for observer in self.observers.values_mut() {
            observer.on_cart_changed(&event, &self.entries);
        }
    }
}

fn restore<S: SnapshotStore>(snapshots: &S, key: &str) -> Vec<CartEntry> {
    let contents = match snapshots.load(key) {
        Ok(Some(contents)) => contents,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(key, "failed to read cart snapshot, starting empty: {err}");
            return Vec::new();
        }
    };

    match snapshot::decode(&contents) {
        Ok(entries) => {
            tracing::debug!(key, entries = entries.len(), "restored cart");
            entries
        }
        Err(err) => {
            tracing::warn!(key, "discarding malformed cart snapshot: {err}");
            Vec::new()
        }
    }
}
