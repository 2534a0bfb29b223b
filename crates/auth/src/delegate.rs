//! Per-request authentication gate.
//!
//! Decision order, first match wins:
//!
//! 1. auth disabled → synthetic principal, headers not inspected;
//! 2. `X-Internal-Service-Key` accepted by the gate → internal caller;
//! 3. no usable `Authorization: Bearer` → reject, no network call;
//! 4. token confirmed by the credential verifier → that principal, else reject.
//!
//! The delegate keeps no state between calls. Every protected request is
//! verified on its own; nothing is cached.

use std::sync::Arc;

use http::{HeaderMap, header::AUTHORIZATION};
use thiserror::Error;

use crate::{AuthMode, CredentialVerifier, InternalKeyGate, Principal, PrincipalId, VerificationError};

/// Header carrying the shared secret on service-to-service calls.
pub const INTERNAL_SERVICE_KEY_HEADER: &str = "x-internal-service-key";

/// Who is behind an accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Auth is disabled for this process; always the fixed test principal.
    Synthetic(Principal),
    /// Another service in the mesh, authenticated by the shared key.
    Internal,
    /// An end user whose token the user-service confirmed.
    User(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Synthetic(p) | Caller::User(p) => Some(p),
            Caller::Internal => None,
        }
    }

    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.principal().map(|p| p.id)
    }

    /// Internal and synthetic callers skip per-user role and ownership checks.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Caller::Synthetic(_) | Caller::Internal)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Caller::Synthetic(_) => "synthetic",
            Caller::Internal => "internal",
            Caller::User(_) => "user",
        }
    }
}

/// Internal reason for a rejection. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingCredentials,
    MalformedAuthorization,
    InvalidCredential,
    InactivePrincipal,
    IdentityServiceUnavailable,
    InternalKeyRequired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingCredentials => "missing_credentials",
            RejectReason::MalformedAuthorization => "malformed_authorization",
            RejectReason::InvalidCredential => "invalid_credential",
            RejectReason::InactivePrincipal => "inactive_principal",
            RejectReason::IdentityServiceUnavailable => "identity_service_unavailable",
            RejectReason::InternalKeyRequired => "internal_key_required",
        }
    }
}

/// A refused request.
///
/// `Display` is the same for every reason so nothing about the identity
/// service's state reaches the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unauthorized")]
pub struct Rejected {
    reason: RejectReason,
}

impl Rejected {
    pub fn new(reason: RejectReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> RejectReason {
        self.reason
    }
}

impl From<&VerificationError> for Rejected {
    fn from(err: &VerificationError) -> Self {
        let reason = match err {
            VerificationError::EmptyToken => RejectReason::MalformedAuthorization,
            VerificationError::Transport(_) | VerificationError::Timeout => {
                RejectReason::IdentityServiceUnavailable
            }
            VerificationError::Status(_) | VerificationError::MalformedPayload(_) => {
                RejectReason::InvalidCredential
            }
            VerificationError::Inactive => RejectReason::InactivePrincipal,
        };
        Self::new(reason)
    }
}

#[derive(Clone)]
enum Policy {
    Disabled,
    Enforced {
        gate: InternalKeyGate,
        verifier: Arc<dyn CredentialVerifier>,
    },
}

#[derive(Clone)]
pub struct AuthDelegate {
    policy: Policy,
}

impl core::fmt::Debug for AuthDelegate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthDelegate").field("mode", &self.mode()).finish()
    }
}

impl AuthDelegate {
    /// Accept everything as the synthetic principal. Test/dev only.
    pub fn disabled() -> Self {
        Self {
            policy: Policy::Disabled,
        }
    }

    pub fn enforced(gate: InternalKeyGate, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            policy: Policy::Enforced { gate, verifier },
        }
    }

    pub fn mode(&self) -> AuthMode {
        match self.policy {
            Policy::Disabled => AuthMode::Disabled,
            Policy::Enforced { .. } => AuthMode::Enforced,
        }
    }

    /// Resolve the caller of a protected endpoint.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Caller, Rejected> {
        let (gate, verifier) = match &self.policy {
            Policy::Disabled => return Ok(Caller::Synthetic(Principal::synthetic())),
            Policy::Enforced { gate, verifier } => (gate, verifier),
        };

        if accepts_internal_key(gate, headers) {
            tracing::debug!(caller = "internal", "request authorized by internal service key");
            return Ok(Caller::Internal);
        }

        let token = extract_bearer(headers).inspect_err(|rejected| {
            tracing::debug!(reason = rejected.reason().as_str(), "request rejected before verification");
        })?;

        match verifier.verify(token).await {
            Ok(principal) => {
                tracing::debug!(principal_id = %principal.id, "bearer token verified");
                Ok(Caller::User(principal))
            }
            Err(err) => {
                let rejected = Rejected::from(&err);
                if err.is_transport() {
                    tracing::warn!(error = %err, reason = rejected.reason().as_str(), "identity service unavailable");
                } else {
                    tracing::warn!(error = %err, reason = rejected.reason().as_str(), "bearer token rejected");
                }
                Err(rejected)
            }
        }
    }

    /// Gate for internal-only routes: a user token is never enough here.
    pub fn authorize_internal(&self, headers: &HeaderMap) -> Result<Caller, Rejected> {
        match &self.policy {
            Policy::Disabled => Ok(Caller::Synthetic(Principal::synthetic())),
            Policy::Enforced { gate, .. } if accepts_internal_key(gate, headers) => Ok(Caller::Internal),
            Policy::Enforced { .. } => {
                tracing::warn!(reason = RejectReason::InternalKeyRequired.as_str(), "internal route refused");
                Err(Rejected::new(RejectReason::InternalKeyRequired))
            }
        }
    }
}

fn accepts_internal_key(gate: &InternalKeyGate, headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(INTERNAL_SERVICE_KEY_HEADER) else {
        return false;
    };

    let accepted = value.to_str().map(|key| gate.check(key)).unwrap_or(false);
    if !accepted {
        tracing::warn!("internal service key presented but not accepted");
    }
    accepted
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; anything other than exactly one
/// scheme and one token is malformed.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, Rejected> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(Rejected::new(RejectReason::MissingCredentials))?;

    let header = header
        .to_str()
        .map_err(|_| Rejected::new(RejectReason::MalformedAuthorization))?;

    let mut parts = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Rejected::new(RejectReason::MalformedAuthorization));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Rejected::new(RejectReason::MalformedAuthorization));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use http::HeaderValue;
    use proptest::prelude::*;

    use super::*;
    use crate::{InternalServiceKey, Role};

    const SECRET: &str = "medisupply-internal-secret";

    /// Verifier stub that counts calls and replays a fixed outcome.
    struct StubVerifier {
        calls: AtomicUsize,
        outcome: Result<Principal, VerificationError>,
    }

    impl StubVerifier {
        fn returning(outcome: Result<Principal, VerificationError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialVerifier for StubVerifier {
        async fn verify(&self, _token: &str) -> Result<Principal, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn enforced(verifier: Arc<StubVerifier>) -> AuthDelegate {
        let gate = InternalKeyGate::new(InternalServiceKey::new(SECRET).unwrap());
        AuthDelegate::enforced(gate, verifier)
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn test_user() -> Principal {
        Principal::new(PrincipalId::new(1), "u@test")
    }

    #[tokio::test]
    async fn disabled_mode_returns_synthetic_principal_without_headers() {
        let caller = AuthDelegate::disabled().authorize(&HeaderMap::new()).await.unwrap();
        assert_eq!(caller, Caller::Synthetic(Principal::synthetic()));

        let p = caller.principal().unwrap();
        assert_eq!(p.id, PrincipalId::new(0));
        assert_eq!(p.email, "test@local");
    }

    #[tokio::test]
    async fn internal_key_skips_verification() {
        let verifier = StubVerifier::returning(Ok(test_user()));
        let delegate = enforced(verifier.clone());

        let caller = delegate
            .authorize(&headers(&[
                (INTERNAL_SERVICE_KEY_HEADER, SECRET),
                ("authorization", "Bearer whatever"),
            ]))
            .await
            .unwrap();

        assert_eq!(caller, Caller::Internal);
        assert!(caller.principal().is_none());
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn wrong_internal_key_falls_through_to_bearer_token() {
        let verifier = StubVerifier::returning(Ok(test_user()));
        let delegate = enforced(verifier.clone());

        let caller = delegate
            .authorize(&headers(&[
                (INTERNAL_SERVICE_KEY_HEADER, "guess"),
                ("authorization", "Bearer tok"),
            ]))
            .await
            .unwrap();
        assert_eq!(caller, Caller::User(test_user()));
        assert_eq!(verifier.calls(), 1);

        let rejected = delegate
            .authorize(&headers(&[(INTERNAL_SERVICE_KEY_HEADER, "guess")]))
            .await
            .unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::MissingCredentials);
        assert_eq!(verifier.calls(), 1);
    }

    #[tokio::test]
    async fn missing_authorization_rejects_without_network_call() {
        let verifier = StubVerifier::returning(Ok(test_user()));
        let delegate = enforced(verifier.clone());

        let rejected = delegate.authorize(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::MissingCredentials);
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_authorization_rejects_without_network_call() {
        let verifier = StubVerifier::returning(Ok(test_user()));
        let delegate = enforced(verifier.clone());

        for value in ["Bearer", "Bearer   ", "Basic dXNlcjpwYXNz", "Bearer a b", "token"] {
            let rejected = delegate
                .authorize(&headers(&[("authorization", value)]))
                .await
                .unwrap_err();
            assert_eq!(rejected.reason(), RejectReason::MalformedAuthorization, "{value}");
        }
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn verified_token_yields_principal_from_verifier() {
        let verifier = StubVerifier::returning(Ok(test_user().with_role(Role::VENDOR)));
        let delegate = enforced(verifier.clone());

        let caller = delegate
            .authorize(&headers(&[("authorization", "bearer some-opaque-token")]))
            .await
            .unwrap();

        let p = caller.principal().unwrap();
        assert_eq!(p.id, PrincipalId::new(1));
        assert_eq!(p.email, "u@test");
        assert!(!caller.is_privileged());
        assert_eq!(verifier.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_indistinguishable_from_invalid_token() {
        let down = enforced(StubVerifier::returning(Err(VerificationError::Timeout)));
        let invalid = enforced(StubVerifier::returning(Err(VerificationError::Status(401))));
        let h = headers(&[("authorization", "Bearer tok")]);

        let a = down.authorize(&h).await.unwrap_err();
        let b = invalid.authorize(&h).await.unwrap_err();

        assert_eq!(a.reason(), RejectReason::IdentityServiceUnavailable);
        assert_eq!(b.reason(), RejectReason::InvalidCredential);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn repeated_invalid_token_is_verified_every_time() {
        let verifier = StubVerifier::returning(Err(VerificationError::Status(401)));
        let delegate = enforced(verifier.clone());
        let h = headers(&[("authorization", "Bearer expired")]);

        assert!(delegate.authorize(&h).await.is_err());
        assert!(delegate.authorize(&h).await.is_err());
        assert_eq!(verifier.calls(), 2);
    }

    #[test]
    fn internal_routes_require_the_key() {
        let verifier = StubVerifier::returning(Ok(test_user()));
        let delegate = enforced(verifier.clone());

        let rejected = delegate
            .authorize_internal(&headers(&[("authorization", "Bearer tok")]))
            .unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::InternalKeyRequired);

        let caller = delegate
            .authorize_internal(&headers(&[(INTERNAL_SERVICE_KEY_HEADER, SECRET)]))
            .unwrap();
        assert_eq!(caller, Caller::Internal);
        assert_eq!(verifier.calls(), 0);

        assert!(matches!(
            AuthDelegate::disabled().authorize_internal(&HeaderMap::new()),
            Ok(Caller::Synthetic(_))
        ));
    }

    #[test]
    fn every_reject_reason_displays_the_same() {
        let reasons = [
            RejectReason::MissingCredentials,
            RejectReason::MalformedAuthorization,
            RejectReason::InvalidCredential,
            RejectReason::InactivePrincipal,
            RejectReason::IdentityServiceUnavailable,
            RejectReason::InternalKeyRequired,
        ];
        for reason in reasons {
            assert_eq!(Rejected::new(reason).to_string(), "unauthorized");
        }
    }

    proptest! {
        /// Whatever the headers say, a disabled delegate answers with the
        /// synthetic principal.
        #[test]
        fn disabled_mode_ignores_headers(auth in "[ -~]{0,40}", key in "[ -~]{0,40}") {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let h = headers(&[("authorization", auth.as_str()), (INTERNAL_SERVICE_KEY_HEADER, key.as_str())]);
            let caller = rt.block_on(AuthDelegate::disabled().authorize(&h)).unwrap();
            prop_assert_eq!(caller, Caller::Synthetic(Principal::synthetic()));
        }

        /// With auth enforced, the verifier is consulted only when there is a
        /// well-formed bearer token and no valid internal key.
        #[test]
        fn verifier_called_only_for_bearer_tokens(token in "[A-Za-z0-9._-]{1,32}", use_key in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let verifier = StubVerifier::returning(Ok(test_user()));
            let delegate = enforced(verifier.clone());

            let bearer = format!("Bearer {token}");
            let mut pairs = vec![("authorization", bearer.as_str())];
            if use_key {
                pairs.push((INTERNAL_SERVICE_KEY_HEADER, SECRET));
            }

            let caller = rt.block_on(delegate.authorize(&headers(&pairs))).unwrap();
            if use_key {
                prop_assert_eq!(caller, Caller::Internal);
                prop_assert_eq!(verifier.calls(), 0);
            } else {
                prop_assert_eq!(caller, Caller::User(test_user()));
                prop_assert_eq!(verifier.calls(), 1);
            }
        }
    }
}
