//! Institutional clients domain module.
//!
//! Registration rules for the pharmacies and hospitals that place orders:
//! field validation, NIT normalisation and the validation flag. No IO.

pub mod client;

pub use client::{Client, ClientPatch, NewClient, normalize_nit};
