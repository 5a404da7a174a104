// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use skein_server_auth::{AuthzError, AuthzErrorKind, CommentId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
	#[error(transparent)]
	Authz(#[from] AuthzError),

	#[error("Comment not found")]
	CommentNotFound(CommentId),

	#[error("You do not have access to this comment.")]
	CommentStreamMismatch,

	#[error("comment store error: {0}")]
	Store(String),
}

impl ActivityError {
	/// Collapses the error into the authorization taxonomy so callers can map
	/// it to a transport response the same way as a bare [`AuthzError`].
	pub fn kind(&self) -> AuthzErrorKind {
		match self {
			ActivityError::Authz(e) => e.kind(),
			ActivityError::CommentNotFound(_) => AuthzErrorKind::NotFound,
			ActivityError::CommentStreamMismatch => AuthzErrorKind::Forbidden,
			ActivityError::Store(_) => AuthzErrorKind::Unavailable,
		}
	}
}

pub type Result<T> = std::result::Result<T, ActivityError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn authz_errors_keep_their_kind() {
		let err: ActivityError = AuthzError::InsufficientScope.into();
		assert_eq!(err.kind(), AuthzErrorKind::InsufficientScope);
		assert_eq!(err.to_string(), "You do not have the required privileges.");
	}

	#[test]
	fn stream_mismatch_is_forbidden() {
		assert_eq!(
			ActivityError::CommentStreamMismatch.kind(),
			AuthzErrorKind::Forbidden
		);
	}
}
