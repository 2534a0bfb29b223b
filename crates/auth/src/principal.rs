use serde::{Deserialize, Serialize};

use medisupply_core::UserId;

use crate::Role;

/// Numeric identity assigned by the user-service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(i64);

impl PrincipalId {
    /// Id carried by the synthetic principal used when auth is disabled.
    pub const SYNTHETIC: PrincipalId = PrincipalId(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PrincipalId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for UserId {
    fn from(value: PrincipalId) -> Self {
        UserId::new(value.0)
    }
}

impl From<UserId> for PrincipalId {
    fn from(value: UserId) -> Self {
        PrincipalId(value.get())
    }
}

/// An authenticated end user.
///
/// Rebuilt on every request from the verification result; never stored by the
/// consuming service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl Principal {
    pub const SYNTHETIC_EMAIL: &'static str = "test@local";
    pub const SYNTHETIC_NAME: &'static str = "test-user";

    pub fn new(id: PrincipalId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: None,
            role: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// The fixed identity every request resolves to while auth is disabled.
    pub fn synthetic() -> Self {
        Self::new(PrincipalId::SYNTHETIC, Self::SYNTHETIC_EMAIL).with_name(Self::SYNTHETIC_NAME)
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref().is_some_and(|r| r.matches(role))
    }
}
