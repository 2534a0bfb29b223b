//! Infrastructure layer: configuration, external service clients, storage.

pub mod config;
pub mod identity;
pub mod store;

pub use config::{AppEnv, ServiceConfig};
pub use identity::{UserServiceVerifier, build_auth_delegate};
pub use store::{InMemoryStore, Store};
