// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for authorization decisions.

use serde::Serialize;
use thiserror::Error;

use crate::types::UserId;

/// Reasons an authorization check can fail.
///
/// Every check fails fast with exactly one of these. Callers translate them
/// into transport responses; use [`AuthzError::kind`] to get the coarse
/// category without matching on messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
	/// A requested or stored resource role is not in the role registry.
	#[error("Unknown role: {0}")]
	UnknownRole(String),

	/// A requested or held server role is not in the role registry.
	#[error("Invalid server role specified")]
	InvalidServerRole(String),

	/// The actor lacks the role, or is anonymous against a private stream.
	#[error("{0}")]
	Forbidden(String),

	/// The credential's scopes do not cover the requested capabilities.
	#[error("You do not have the required privileges.")]
	InsufficientScope,

	/// The actor's server role ranks below the required one.
	#[error("You do not have the required server role")]
	InsufficientServerRole,

	/// The resource does not exist.
	#[error("{0}")]
	NotFound(String),

	/// The actor id is no longer known to the directory.
	#[error("actor {0} no longer exists")]
	ActorNotFound(UserId),

	/// A collaborator lookup failed.
	#[error("directory error: {0}")]
	Directory(String),
}

/// Coarse category of an [`AuthzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthzErrorKind {
	UnknownRole,
	Forbidden,
	InsufficientScope,
	InsufficientServerRole,
	NotFound,
	Unavailable,
}

impl AuthzError {
	pub(crate) fn forbidden(message: impl Into<String>) -> Self {
		Self::Forbidden(message.into())
	}

	pub(crate) fn stream_not_found() -> Self {
		Self::NotFound("Stream not found".to_string())
	}

	/// Returns the category this error belongs to.
	pub fn kind(&self) -> AuthzErrorKind {
		match self {
			Self::UnknownRole(_) | Self::InvalidServerRole(_) => AuthzErrorKind::UnknownRole,
			Self::Forbidden(_) | Self::ActorNotFound(_) => AuthzErrorKind::Forbidden,
			Self::InsufficientScope => AuthzErrorKind::InsufficientScope,
			Self::InsufficientServerRole => AuthzErrorKind::InsufficientServerRole,
			Self::NotFound(_) => AuthzErrorKind::NotFound,
			Self::Directory(_) => AuthzErrorKind::Unavailable,
		}
	}

	/// Returns true if repeating the same check can never succeed.
	///
	/// Live subscriptions end on a terminal error and skip the event on any
	/// other failure.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			Self::UnknownRole(_) | Self::InvalidServerRole(_) | Self::ActorNotFound(_)
		)
	}
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
