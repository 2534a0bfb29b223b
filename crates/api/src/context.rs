use medisupply_auth::{AuthzError, Caller, Role, require_any_role, require_owner_or_role};
use medisupply_core::UserId;
use medisupply_sales::AuditOrigin;

/// Caller context for a request (who passed the auth delegate).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    caller: Caller,
}

impl CallerContext {
    pub fn new(caller: Caller) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// User id to record as author of a change, if there is one.
    pub fn user_id(&self) -> Option<UserId> {
        self.caller.principal_id().map(UserId::from)
    }

    /// Label for log lines: the principal's email, or `internal`.
    pub fn actor(&self) -> &str {
        match self.caller.principal() {
            Some(principal) => principal.email.as_str(),
            None => "internal",
        }
    }

    pub fn audit_origin(&self) -> AuditOrigin {
        match self.caller {
            Caller::Internal => AuditOrigin::Internal,
            Caller::Synthetic(_) | Caller::User(_) => AuditOrigin::Manual,
        }
    }

    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), AuthzError> {
        require_any_role(&self.caller, roles)
    }

    pub fn require_owner_or_role(&self, owner: Option<UserId>, roles: &[Role]) -> Result<(), AuthzError> {
        require_owner_or_role(&self.caller, owner.map(Into::into), roles)
    }
}
