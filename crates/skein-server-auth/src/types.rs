// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for stream authorization.
//!
//! - **ID newtypes**: [`UserId`], [`StreamId`] and [`CommentId`] wrap UUIDs so
//!   an actor can never be passed where a stream is expected
//! - **Role enums**: [`ServerRole`] (deployment-wide standing) and
//!   [`StreamRole`] (standing on one stream), each totally ordered by rank
//! - **Stream attributes**: [`StreamAttrs`], the only stream facts the
//!   authorizer ever looks at
//!
//! Role names on the wire are `domain:name` strings (`server:admin`,
//! `stream:owner`). Parsing goes through [`crate::RoleRegistry`], which is the
//! only place an unknown name can surface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AuthzError;
use crate::registry::RoleRegistry;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(StreamId, "Unique identifier for a stream.");
define_id_type!(CommentId, "Unique identifier for a comment.");

// =============================================================================
// Role Domains
// =============================================================================

/// The family a role belongs to. Ranks are only comparable within a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDomain {
	Server,
	Stream,
}

impl fmt::Display for RoleDomain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleDomain::Server => write!(f, "server"),
			RoleDomain::Stream => write!(f, "stream"),
		}
	}
}

// =============================================================================
// Server Roles
// =============================================================================

/// Deployment-wide roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerRole {
	/// Regular account.
	#[serde(rename = "server:user")]
	User,
	/// Operator account; may satisfy stream checks when the admin override is on.
	#[serde(rename = "server:admin")]
	Admin,
}

impl ServerRole {
	/// Returns all server roles, lowest rank first.
	pub fn all() -> &'static [ServerRole] {
		&[ServerRole::User, ServerRole::Admin]
	}

	/// The wire name of this role.
	pub const fn as_str(&self) -> &'static str {
		match self {
			ServerRole::User => "server:user",
			ServerRole::Admin => "server:admin",
		}
	}

	pub const fn rank(&self) -> u16 {
		match self {
			ServerRole::User => 100,
			ServerRole::Admin => 1000,
		}
	}

	/// Returns true if this role has at least the permissions of the given role.
	pub fn has_permission_of(&self, other: &ServerRole) -> bool {
		self.rank() >= other.rank()
	}
}

impl fmt::Display for ServerRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ServerRole {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RoleRegistry::server_role(s)
	}
}

// =============================================================================
// Stream Roles
// =============================================================================

/// Roles an actor can hold on a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamRole {
	/// May read a private stream and comment on it.
	#[serde(rename = "stream:reviewer")]
	Reviewer,
	/// May push data to the stream.
	#[serde(rename = "stream:contributor")]
	Contributor,
	/// Full control, including sharing and deletion.
	#[serde(rename = "stream:owner")]
	Owner,
}

impl StreamRole {
	/// Returns all stream roles, lowest rank first.
	pub fn all() -> &'static [StreamRole] {
		&[StreamRole::Reviewer, StreamRole::Contributor, StreamRole::Owner]
	}

	/// The wire name of this role.
	pub const fn as_str(&self) -> &'static str {
		match self {
			StreamRole::Reviewer => "stream:reviewer",
			StreamRole::Contributor => "stream:contributor",
			StreamRole::Owner => "stream:owner",
		}
	}

	pub const fn rank(&self) -> u16 {
		match self {
			StreamRole::Reviewer => 100,
			StreamRole::Contributor => 500,
			StreamRole::Owner => 1000,
		}
	}

	/// Returns true if this role has at least the permissions of the given role.
	pub fn has_permission_of(&self, other: &StreamRole) -> bool {
		self.rank() >= other.rank()
	}
}

impl fmt::Display for StreamRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StreamRole {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RoleRegistry::stream_role(s)
	}
}

// =============================================================================
// Stream Attributes
// =============================================================================

/// The authorization-relevant facts about a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamAttrs {
	pub id: StreamId,
	pub is_public: bool,
	pub owner_id: Option<UserId>,
}

impl StreamAttrs {
	/// A private stream owned by `owner_id`.
	pub fn private(id: StreamId, owner_id: UserId) -> Self {
		Self {
			id,
			is_public: false,
			owner_id: Some(owner_id),
		}
	}

	/// A public stream owned by `owner_id`.
	pub fn public(id: StreamId, owner_id: UserId) -> Self {
		Self {
			id,
			is_public: true,
			owner_id: Some(owner_id),
		}
	}

	pub fn is_owned_by(&self, user_id: UserId) -> bool {
		self.owner_id == Some(user_id)
	}
}
