//! Immutable auth configuration, built once at startup.

use std::time::Duration;

use thiserror::Error;

use crate::InternalServiceKey;

/// Process-wide auth switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Enforced,
    Disabled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when auth is enforced")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("auth cannot be disabled in a production environment")]
    DisabledInProduction,
}

/// What the auth delegate needs to know about its surroundings.
///
/// An enforced configuration cannot exist without both the identity-service
/// URL and the internal secret, so a half-configured service fails at startup
/// instead of silently accepting requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Enforced {
        identity_base_url: String,
        internal_key: InternalServiceKey,
        verify_timeout: Duration,
    },
    Disabled,
}

impl AuthConfig {
    pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(3);
    pub const MAX_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn enforced(
        identity_base_url: impl Into<String>,
        internal_key: impl Into<String>,
        verify_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let identity_base_url = identity_base_url.into().trim().trim_end_matches('/').to_string();
        if identity_base_url.is_empty() {
            return Err(ConfigError::Missing("USER_SERVICE_URL"));
        }
        if !(identity_base_url.starts_with("http://") || identity_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "USER_SERVICE_URL",
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let internal_key = InternalServiceKey::new(internal_key)
            .ok_or(ConfigError::Missing("INTERNAL_SERVICE_KEY"))?;

        if verify_timeout.is_zero() || verify_timeout > Self::MAX_VERIFY_TIMEOUT {
            return Err(ConfigError::Invalid {
                name: "AUTH_VERIFY_TIMEOUT_MS",
                reason: format!(
                    "must be between 1 and {} milliseconds",
                    Self::MAX_VERIFY_TIMEOUT.as_millis()
                ),
            });
        }

        Ok(Self::Enforced {
            identity_base_url,
            internal_key,
            verify_timeout,
        })
    }

    pub fn mode(&self) -> AuthMode {
        match self {
            AuthConfig::Enforced { .. } => AuthMode::Enforced,
            AuthConfig::Disabled => AuthMode::Disabled,
        }
    }
}
