//! `medisupply-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult};
pub use id::{ClientId, CountryId, OrderId, PlanId, ProductId, UserId, VehicleId, VendorId};
pub use page::Page;
