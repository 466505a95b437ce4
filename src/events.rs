//! Cart events and observers
//!
//! The store notifies its subscribers after every operation, handing them
//! the event and a read-only view of the resulting entries. Presentation
//! layers re-render from that view instead of being called back by the store
//! logic directly.

use std::fmt;

use crate::{
    cart::{CartEntry, EntryKey},
    pricing::CartTotals,
};

/// What an operation did to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// An entry was created or its quantity incremented.
    Added {
        /// Entry key
        key: EntryKey,
        /// Quantity after the add
        quantity: u32,
    },

    /// An entry was removed.
    Removed {
        /// Entry key
        key: EntryKey,
    },

    /// An entry's quantity was set.
    QuantityChanged {
        /// Entry key
        key: EntryKey,
        /// New quantity
        quantity: u32,
    },

    /// A rental entry's day-count was set.
    DaysChanged {
        /// Entry key
        key: EntryKey,
        /// New day-count
        days: u32,
    },

    /// The operation targeted an entry that is not in the cart.
    Unchanged {
        /// Entry key
        key: EntryKey,
    },

    /// All entries were removed.
    Cleared,

    /// The cart was checked out and emptied.
    CheckedOut {
        /// Totals of the cart at checkout
        totals: CartTotals,
        /// Number of units at checkout
        item_count: u64,
    },
}

impl fmt::Display for CartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartEvent::Added { key, quantity } => write!(f, "added {key} (x{quantity})"),
            CartEvent::Removed { key } => write!(f, "removed {key}"),
            CartEvent::QuantityChanged { key, quantity } => {
                write!(f, "set {key} quantity to {quantity}")
            }
            CartEvent::DaysChanged { key, days } => write!(f, "set {key} days to {days}"),
            CartEvent::Unchanged { key } => write!(f, "{key} not in cart"),
            CartEvent::Cleared => f.write_str("cleared cart"),
            CartEvent::CheckedOut { item_count, .. } => {
                write!(f, "checked out {item_count} item(s)")
            }
        }
    }
}

/// Receives a notification after each cart operation.
pub trait CartObserver {
    /// Called once the operation has been applied and persisted.
    fn on_cart_changed(&mut self, event: &CartEvent, entries: &[CartEntry]);
}

impl<F> CartObserver for F
where
    F: FnMut(&CartEvent, &[CartEntry]),
{
    fn on_cart_changed(&mut self, event: &CartEvent, entries: &[CartEntry]) {
        self(event, entries);
    }
}

/// Observer that emits a `tracing` event per operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl CartObserver for LoggingObserver {
    fn on_cart_changed(&mut self, event: &CartEvent, entries: &[CartEntry]) {
        let units: u64 = entries.iter().map(|e| u64::from(e.quantity())).sum();

        tracing::info!(entries = entries.len(), units, "{event}");
    }
}
