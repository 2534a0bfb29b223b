//! `medisupply-auth` — delegated authentication boundary.
//!
//! Services in the mesh never hold user credentials. A request is trusted when
//! exactly one of these holds:
//!
//! - the process runs with auth disabled (test/dev only),
//! - it carries the shared internal-service key,
//! - its bearer token is confirmed by the user-service.
//!
//! This crate owns that decision. It knows about HTTP headers but not about
//! any particular HTTP client or server; the network-backed verifier lives in
//! `medisupply-infra`.

pub mod authorize;
pub mod config;
pub mod delegate;
pub mod internal_key;
pub mod principal;
pub mod roles;
pub mod verifier;

pub use authorize::{AuthzError, require_any_role, require_owner_or_role};
pub use config::{AuthConfig, AuthMode, ConfigError};
pub use delegate::{AuthDelegate, Caller, RejectReason, Rejected, INTERNAL_SERVICE_KEY_HEADER};
pub use internal_key::{InternalKeyGate, InternalServiceKey};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
pub use verifier::{CredentialVerifier, IdentityPayload, VerificationError};
