//! Role and ownership checks applied after authentication.
//!
//! - No IO
//! - No panics
//! - Internal and synthetic callers are never refused here

use thiserror::Error;

use crate::{Caller, PrincipalId, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires one of the roles {0}")]
    MissingRole(String),

    #[error("forbidden: resource belongs to another user")]
    NotOwner,
}

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

/// Allow the caller if it holds any of `roles`.
pub fn require_any_role(caller: &Caller, roles: &[Role]) -> Result<(), AuthzError> {
    if caller.is_privileged() {
        return Ok(());
    }

    match caller.principal() {
        Some(p) if roles.iter().any(|r| p.has_role(r)) => Ok(()),
        _ => Err(AuthzError::MissingRole(role_list(roles))),
    }
}

/// Allow the owner of a resource, or anyone holding one of `override_roles`.
///
/// Resources without a recorded owner can only be touched through an
/// override role.
pub fn require_owner_or_role(
    caller: &Caller,
    owner: Option<PrincipalId>,
    override_roles: &[Role],
) -> Result<(), AuthzError> {
    if require_any_role(caller, override_roles).is_ok() {
        return Ok(());
    }

    match (caller.principal_id(), owner) {
        (Some(id), Some(owner)) if id == owner => Ok(()),
        _ => Err(AuthzError::NotOwner),
    }
}
