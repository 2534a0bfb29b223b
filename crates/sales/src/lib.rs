//! Sales plans domain module.
//!
//! Quarterly sales targets per vendor, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage). Who may touch a plan is decided by the
//! caller using `created_by`; this crate only enforces the business rules.

pub mod audit;
pub mod plan;

pub use audit::{AuditOperation, AuditOrigin, PlanAuditEntry};
pub use plan::{NewPlan, Period, PlanPatch, PlanSlot, PlanStatus, SalesPlan};
