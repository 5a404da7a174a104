// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token scopes.
//!
//! A scope names a capability granted to a credential, independent of the
//! holder's role. The only valid question about scopes is "does the granted
//! set contain every required scope". There is no prefix or wildcard
//! matching.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AuthzError, Result};

/// Read access to streams and their comments.
pub const STREAMS_READ: &str = "streams:read";
/// Write access to streams and their comments.
pub const STREAMS_WRITE: &str = "streams:write";
/// Read access to the caller's own profile.
pub const PROFILE_READ: &str = "profile:read";
/// Read access to other users' public profiles.
pub const USERS_READ: &str = "users:read";

/// A single named capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Scope {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

/// An unordered set of scopes without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|s| s.as_str() == scope)
	}

	pub fn insert(&mut self, scope: impl Into<Scope>) -> bool {
		self.0.insert(scope.into())
	}

	pub fn iter(&self) -> impl Iterator<Item = &Scope> {
		self.0.iter()
	}

	/// Returns true if every scope in `required` is present here.
	pub fn is_superset(&self, required: &ScopeSet) -> bool {
		self.0.is_superset(&required.0)
	}

	/// Scopes in `required` that this set lacks.
	pub fn missing<'a>(&'a self, required: &'a ScopeSet) -> Vec<&'a Scope> {
		required.0.difference(&self.0).collect()
	}
}

impl<S: Into<Scope>> FromIterator<S> for ScopeSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// Checks that `granted` covers every scope in `required`.
///
/// An empty requirement always passes, even without a credential. A
/// non-empty requirement fails with [`AuthzError::InsufficientScope`] when
/// nothing was granted or any scope is missing.
pub fn validate_scopes(granted: Option<&ScopeSet>, required: &ScopeSet) -> Result<()> {
	if required.is_empty() {
		return Ok(());
	}

	match granted {
		Some(granted) if granted.is_superset(required) => Ok(()),
		_ => Err(AuthzError::InsufficientScope),
	}
}
