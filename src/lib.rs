//! Almajo Cart
//!
//! Shopping cart for an apparel storefront where every product can be bought
//! (`compra`) or rented by the day (`alquiler`). Purchases and rentals of the
//! same product are tracked as separate entries, and the cart survives
//! restarts through a pluggable snapshot store.

pub mod cart;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod events;
pub mod logging;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod snapshot;
