//! Credential verification contract.
//!
//! The identity-owning service is the only source of truth for whether a
//! token is valid, expired or revoked. Nothing here inspects the token itself.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::{Principal, PrincipalId, Role};

/// Why a token could not be turned into a [`Principal`].
///
/// The variants exist for logs and alerting. Callers of the delegate only ever
/// see a generic rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("empty token")]
    EmptyToken,

    #[error("identity service unreachable: {0}")]
    Transport(String),

    #[error("identity service timed out")]
    Timeout,

    #[error("identity service answered with status {0}")]
    Status(u16),

    #[error("malformed identity payload: {0}")]
    MalformedPayload(String),

    #[error("principal is not active")]
    Inactive,
}

impl VerificationError {
    /// True when the failure says nothing about the token, only about reaching
    /// the identity service.
    pub fn is_transport(&self) -> bool {
        matches!(self, VerificationError::Transport(_) | VerificationError::Timeout)
    }
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Exchange an opaque bearer token for the principal it belongs to.
    async fn verify(&self, token: &str) -> Result<Principal, VerificationError>;
}

/// Success body of the identity service's `GET /api/v1/users/me`.
///
/// `id` and `email` are required. Extra fields the user-service sends
/// (`created_at`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityPayload {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl IdentityPayload {
    /// Parse and validate a raw response body.
    pub fn parse(body: &[u8]) -> Result<Self, VerificationError> {
        let payload: IdentityPayload = serde_json::from_slice(body)
            .map_err(|e| VerificationError::MalformedPayload(e.to_string()))?;
        if payload.email.trim().is_empty() {
            return Err(VerificationError::MalformedPayload("empty email".to_string()));
        }
        Ok(payload)
    }

    /// Turn a validated payload into a principal.
    ///
    /// A user explicitly reported as inactive is refused; a payload without
    /// `is_active` is taken as active.
    pub fn into_principal(self) -> Result<Principal, VerificationError> {
        if self.is_active == Some(false) {
            return Err(VerificationError::Inactive);
        }

        let mut principal = Principal::new(PrincipalId::new(self.id), self.email);
        principal.name = self.name;
        principal.role = self
            .role
            .filter(|r| !r.trim().is_empty())
            .map(Role::new);
        Ok(principal)
    }
}
