//! Shared-secret gate for service-to-service calls.

use subtle::ConstantTimeEq;

/// The static secret shared by services in the mesh.
///
/// Never printed: `Debug` is redacted so the value cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct InternalServiceKey(String);

impl InternalServiceKey {
    /// Returns `None` for an empty (or whitespace-only) secret.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for InternalServiceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("InternalServiceKey(<redacted>)")
    }
}

/// Binary trust decision: the presented key either is the secret or it isn't.
///
/// - No IO
/// - Constant-time with respect to the key contents
#[derive(Debug, Clone)]
pub struct InternalKeyGate {
    secret: InternalServiceKey,
}

impl InternalKeyGate {
    pub fn new(secret: InternalServiceKey) -> Self {
        Self { secret }
    }

    pub fn check(&self, presented_key: &str) -> bool {
        presented_key
            .as_bytes()
            .ct_eq(self.secret.expose().as_bytes())
            .into()
    }
}
