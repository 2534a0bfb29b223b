//! Client for the user-service, the identity owner of the mesh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header::ACCEPT, redirect};

use medisupply_auth::{
    AuthConfig, AuthDelegate, CredentialVerifier, IdentityPayload, InternalKeyGate, Principal,
    VerificationError,
};

/// Verifies bearer tokens by asking the user-service who they belong to.
///
/// One `GET {base}/api/v1/users/me` per call, bounded by the configured
/// timeout, no retries. Dropping the returned future aborts the request.
#[derive(Debug, Clone)]
pub struct UserServiceVerifier {
    client: reqwest::Client,
    me_url: String,
}

impl UserServiceVerifier {
    pub const ME_PATH: &'static str = "/api/v1/users/me";

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            // A redirect would forward the user's token somewhere we did not configure.
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            me_url: format!("{}{}", base_url.trim_end_matches('/'), Self::ME_PATH),
        })
    }

    pub fn me_url(&self) -> &str {
        &self.me_url
    }
}

fn classify(err: reqwest::Error) -> VerificationError {
    if err.is_timeout() {
        VerificationError::Timeout
    } else {
        VerificationError::Transport(err.without_url().to_string())
    }
}

#[async_trait]
impl CredentialVerifier for UserServiceVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, VerificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::EmptyToken);
        }

        let res = self
            .client
            .get(&self.me_url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(VerificationError::Status(status.as_u16()));
        }

        let body = res.bytes().await.map_err(classify)?;
        IdentityPayload::parse(&body)?.into_principal()
    }
}

/// Wire the auth delegate for a service from its startup configuration.
pub fn build_auth_delegate(config: &AuthConfig) -> Result<AuthDelegate, reqwest::Error> {
    match config {
        AuthConfig::Disabled => {
            tracing::warn!("authentication is DISABLED; every request runs as the synthetic test principal");
            Ok(AuthDelegate::disabled())
        }
        AuthConfig::Enforced {
            identity_base_url,
            internal_key,
            verify_timeout,
        } => {
            let verifier = UserServiceVerifier::new(identity_base_url, *verify_timeout)?;
            tracing::info!(
                identity_url = verifier.me_url(),
                timeout_ms = verify_timeout.as_millis() as u64,
                "token verification delegated to user-service"
            );
            Ok(AuthDelegate::enforced(
                InternalKeyGate::new(internal_key.clone()),
                Arc::new(verifier),
            ))
        }
    }
}
