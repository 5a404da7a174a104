// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The catalog of known roles.
//!
//! Roles arrive as strings from tokens, ACL rows and resolver arguments.
//! [`RoleRegistry`] is the single gate that turns those strings into
//! [`ServerRole`] / [`StreamRole`] values. Once parsed, a role cannot be
//! unknown, so every rank comparison in the crate happens on typed values.
//!
//! Unknown names are always a hard failure. They are never ranked as
//! "lowest".

use crate::error::{AuthzError, Result};
use crate::types::{RoleDomain, ServerRole, StreamRole};

/// A role from any domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Server(ServerRole),
	Stream(StreamRole),
}

impl Role {
	pub const fn name(&self) -> &'static str {
		match self {
			Role::Server(role) => role.as_str(),
			Role::Stream(role) => role.as_str(),
		}
	}

	pub const fn rank(&self) -> u16 {
		match self {
			Role::Server(role) => role.rank(),
			Role::Stream(role) => role.rank(),
		}
	}

	pub const fn domain(&self) -> RoleDomain {
		match self {
			Role::Server(_) => RoleDomain::Server,
			Role::Stream(_) => RoleDomain::Stream,
		}
	}
}

const CATALOG: &[Role] = &[
	Role::Server(ServerRole::User),
	Role::Server(ServerRole::Admin),
	Role::Stream(StreamRole::Reviewer),
	Role::Stream(StreamRole::Contributor),
	Role::Stream(StreamRole::Owner),
];

/// Immutable lookup over every role the deployment knows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleRegistry;

impl RoleRegistry {
	/// Finds a role by its wire name.
	pub fn lookup(name: &str) -> Option<Role> {
		CATALOG.iter().copied().find(|role| role.name() == name)
	}

	pub fn is_known(name: &str) -> bool {
		Self::lookup(name).is_some()
	}

	/// Returns the rank of a role, failing with [`AuthzError::UnknownRole`]
	/// for names outside the catalog.
	pub fn rank(name: &str) -> Result<u16> {
		Self::lookup(name)
			.map(|role| role.rank())
			.ok_or_else(|| AuthzError::UnknownRole(name.to_string()))
	}

	/// Iterates the roles of one domain, lowest rank first.
	pub fn roles(domain: RoleDomain) -> impl Iterator<Item = Role> {
		CATALOG
			.iter()
			.copied()
			.filter(move |role| role.domain() == domain)
	}

	/// Parses a stream role name.
	pub fn stream_role(name: &str) -> Result<StreamRole> {
		match Self::lookup(name) {
			Some(Role::Stream(role)) => Ok(role),
			_ => Err(AuthzError::UnknownRole(name.to_string())),
		}
	}

	/// Parses a server role name.
	pub fn server_role(name: &str) -> Result<ServerRole> {
		match Self::lookup(name) {
			Some(Role::Server(role)) => Ok(role),
			_ => Err(AuthzError::InvalidServerRole(name.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn catalog_covers_every_enum_variant() {
		for role in ServerRole::all() {
			assert_eq!(RoleRegistry::lookup(role.as_str()), Some(Role::Server(*role)));
		}
		for role in StreamRole::all() {
			assert_eq!(RoleRegistry::lookup(role.as_str()), Some(Role::Stream(*role)));
		}
	}

	#[test]
	fn rank_of_unknown_role_fails() {
		assert_eq!(
			RoleRegistry::rank("streams:read"),
			Err(AuthzError::UnknownRole("streams:read".to_string()))
		);
		assert!(!RoleRegistry::is_known("bar"));
	}

	#[test]
	fn rank_of_known_role() {
		assert_eq!(RoleRegistry::rank("stream:owner"), Ok(1000));
		assert_eq!(RoleRegistry::rank("server:user"), Ok(100));
	}

	#[test]
	fn roles_are_grouped_by_domain() {
		let stream: Vec<_> = RoleRegistry::roles(RoleDomain::Stream).collect();
		assert_eq!(stream.len(), 3);
		assert!(stream.iter().all(|r| r.domain() == RoleDomain::Stream));
		assert!(stream.windows(2).all(|w| w[0].rank() < w[1].rank()));

		let server: Vec<_> = RoleRegistry::roles(RoleDomain::Server).collect();
		assert_eq!(server, vec![Role::Server(ServerRole::User), Role::Server(ServerRole::Admin)]);
	}

	#[test]
	fn names_are_case_sensitive() {
		assert!(RoleRegistry::lookup("Stream:Owner").is_none());
		assert!(RoleRegistry::lookup(" stream:owner").is_none());
	}

	proptest! {
			#[test]
			fn arbitrary_strings_outside_catalog_are_unknown(name in "[a-z:]{0,24}") {
					prop_assume!(CATALOG.iter().all(|r| r.name() != name));
					prop_assert!(RoleRegistry::rank(&name).is_err());
					prop_assert!(RoleRegistry::stream_role(&name).is_err());
					prop_assert!(RoleRegistry::server_role(&name).is_err());
			}
	}
}
