use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role label reported by the user-service (`role` field of `/users/me`).
///
/// Labels are compared case-insensitively. The user-service also seeds
/// `Cliente` and `Conductor`; services here only gate on the two below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("Admin"));
    pub const VENDOR: Role = Role(Cow::Borrowed("Vendedor"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &Role) -> bool {
        self.as_str().trim().eq_ignore_ascii_case(other.as_str().trim())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
