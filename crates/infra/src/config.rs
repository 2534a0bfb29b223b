//! Service configuration, read once from the environment at startup.
//!
//! Request handling never looks at the environment; everything it needs is
//! in the immutable [`ServiceConfig`] built here.

use std::str::FromStr;
use std::time::Duration;

use medisupply_auth::{AuthConfig, ConfigError};

/// Deployment environment (`APP_ENV`). Unset means production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
    Test,
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnv::Production),
            "development" | "dev" => Ok(AppEnv::Development),
            "test" | "testing" => Ok(AppEnv::Test),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
    pub env: AppEnv,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

impl ServiceConfig {
    pub const DEFAULT_SERVICE_NAME: &'static str = "medisupply-order-service";
    pub const DEFAULT_PORT: u16 = 8000;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(v) => v.parse()?,
            None => AppEnv::Production,
        };

        let auth_disabled = match lookup("AUTH_DISABLED") {
            Some(v) => parse_flag("AUTH_DISABLED", &v)?,
            None => false,
        };

        let auth = if auth_disabled {
            if env == AppEnv::Production {
                return Err(ConfigError::DisabledInProduction);
            }
            AuthConfig::Disabled
        } else {
            let verify_timeout = match lookup("AUTH_VERIFY_TIMEOUT_MS") {
                Some(v) => Duration::from_millis(parse_number("AUTH_VERIFY_TIMEOUT_MS", &v)?),
                None => AuthConfig::DEFAULT_VERIFY_TIMEOUT,
            };
            AuthConfig::enforced(
                lookup("USER_SERVICE_URL").unwrap_or_default(),
                lookup("INTERNAL_SERVICE_KEY").unwrap_or_default(),
                verify_timeout,
            )?
        };

        let port = match lookup("PORT") {
            Some(v) => parse_number("PORT", &v)?,
            None => Self::DEFAULT_PORT,
        };

        Ok(Self {
            service_name: lookup("SERVICE_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_SERVICE_NAME.to_string()),
            env,
            host: lookup("HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            auth,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use medisupply_auth::AuthMode;

    fn load(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn enforced_by_default_and_requires_identity_settings() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("USER_SERVICE_URL"));
        assert_eq!(
            load(&[("USER_SERVICE_URL", "http://users:8000")]).unwrap_err(),
            ConfigError::Missing("INTERNAL_SERVICE_KEY")
        );

        let cfg = load(&[
            ("USER_SERVICE_URL", "http://users:8000"),
            ("INTERNAL_SERVICE_KEY", "k"),
        ])
        .unwrap();
        assert_eq!(cfg.auth.mode(), AuthMode::Enforced);
        assert_eq!(cfg.env, AppEnv::Production);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn auth_cannot_be_disabled_in_production() {
        assert_eq!(
            load(&[("AUTH_DISABLED", "true")]).unwrap_err(),
            ConfigError::DisabledInProduction
        );
        assert_eq!(
            load(&[("AUTH_DISABLED", "TRUE"), ("APP_ENV", "prod")]).unwrap_err(),
            ConfigError::DisabledInProduction
        );
    }

    #[test]
    fn auth_can_be_disabled_for_tests_without_identity_settings() {
        let cfg = load(&[("AUTH_DISABLED", "true"), ("APP_ENV", "test")]).unwrap();
        assert_eq!(cfg.auth, AuthConfig::Disabled);
    }

    #[test]
    fn malformed_values_are_reported_by_name() {
        assert!(matches!(
            load(&[("AUTH_DISABLED", "maybe")]),
            Err(ConfigError::Invalid { name: "AUTH_DISABLED", .. })
        ));
        assert!(matches!(
            load(&[("APP_ENV", "staging")]),
            Err(ConfigError::Invalid { name: "APP_ENV", .. })
        ));
        assert!(matches!(
            load(&[
                ("USER_SERVICE_URL", "http://users"),
                ("INTERNAL_SERVICE_KEY", "k"),
                ("AUTH_VERIFY_TIMEOUT_MS", "soon"),
            ]),
            Err(ConfigError::Invalid { name: "AUTH_VERIFY_TIMEOUT_MS", .. })
        ));
        assert!(matches!(
            load(&[
                ("USER_SERVICE_URL", "http://users"),
                ("INTERNAL_SERVICE_KEY", "k"),
                ("PORT", "99999"),
            ]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn custom_timeout_and_bind_address() {
        let cfg = load(&[
            ("USER_SERVICE_URL", "http://users"),
            ("INTERNAL_SERVICE_KEY", "k"),
            ("AUTH_VERIFY_TIMEOUT_MS", "1500"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9001"),
            ("SERVICE_NAME", "medisupply-supplier-service"),
        ])
        .unwrap();

        match &cfg.auth {
            AuthConfig::Enforced { verify_timeout, .. } => {
                assert_eq!(*verify_timeout, Duration::from_millis(1500))
            }
            AuthConfig::Disabled => panic!("expected enforced auth"),
        }
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9001");
        assert_eq!(cfg.service_name, "medisupply-supplier-service");
    }
}
