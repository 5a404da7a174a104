// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server role checks.

use tracing::debug;

use crate::context::AuthContext;
use crate::error::{AuthzError, Result};
use crate::registry::RoleRegistry;

/// Checks that the actor holds at least `minimum` on this deployment.
///
/// Fails with [`AuthzError::Forbidden`] for unauthenticated actors, with
/// [`AuthzError::InvalidServerRole`] when either the held or the required
/// role is not a known server role (the requirement is validated even when
/// the actor's role is fine), and with [`AuthzError::InsufficientServerRole`]
/// when the held role ranks lower.
pub fn validate_server_role(actor: &AuthContext, minimum: &str) -> Result<()> {
	if !actor.auth {
		return Err(AuthzError::forbidden("You do not have the required privileges"));
	}

	let required = RoleRegistry::server_role(minimum)?;
	let held = match actor.server_role.as_deref() {
		Some(name) => RoleRegistry::server_role(name)?,
		None => return Err(AuthzError::InvalidServerRole(String::new())),
	};

	if held.has_permission_of(&required) {
		Ok(())
	} else {
		debug!(held = %held, required = %required, "server role too low");
		Err(AuthzError::InsufficientServerRole)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scope::ScopeSet;
	use crate::types::UserId;

	fn actor(role: &str) -> AuthContext {
		AuthContext::authenticated(UserId::generate(), Some(role.to_string()), ScopeSet::new())
	}

	#[test]
	fn user_below_admin_is_rejected() {
		assert_eq!(
			validate_server_role(&actor("server:user"), "server:admin"),
			Err(AuthzError::InsufficientServerRole)
		);
	}

	#[test]
	fn unknown_held_and_required_roles_are_invalid() {
		let err = validate_server_role(&actor("HACZOR"), "133TCR3w").unwrap_err();
		assert_eq!(err.to_string(), "Invalid server role specified");
	}

	#[test]
	fn unknown_requirement_is_invalid_even_for_admin() {
		let err = validate_server_role(&actor("server:admin"), "133TCR3w").unwrap_err();
		assert!(matches!(err, AuthzError::InvalidServerRole(_)));
	}

	#[test]
	fn stream_role_is_not_a_server_role() {
		let err = validate_server_role(&actor("server:admin"), "stream:owner").unwrap_err();
		assert!(matches!(err, AuthzError::InvalidServerRole(_)));
	}

	#[test]
	fn admin_satisfies_user() {
		assert_eq!(validate_server_role(&actor("server:admin"), "server:user"), Ok(()));
		assert_eq!(validate_server_role(&actor("server:user"), "server:user"), Ok(()));
	}

	#[test]
	fn anonymous_is_forbidden_before_role_validation() {
		let err = validate_server_role(&AuthContext::anonymous(), "nonsense").unwrap_err();
		assert!(matches!(err, AuthzError::Forbidden(_)));
	}

	#[test]
	fn authenticated_without_role_is_invalid() {
		let ctx = AuthContext::authenticated(UserId::generate(), None, ScopeSet::new());
		let err = validate_server_role(&ctx, "server:user").unwrap_err();
		assert!(matches!(err, AuthzError::InvalidServerRole(_)));
	}
}
