//! Orders domain module.
//!
//! Business rules for delivery orders, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod datetime;
pub mod order;

pub use order::{NewOrder, Order, OrderFilter, OrderLine, OrderPatch, OrderStatus};
