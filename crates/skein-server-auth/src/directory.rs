// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lookups the authorizer needs from persistence.
//!
//! Implementations are expected to be cheap (cached rows); the authorizer
//! calls them on every check, including once per delivered event for live
//! subscriptions.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ServerRole, StreamAttrs, StreamId, UserId};

/// Read-only view of streams, actors and stream ACLs.
#[async_trait]
pub trait AuthzDirectory: Send + Sync {
	/// Returns the stream, or `None` if it does not exist.
	async fn get_stream(&self, stream_id: StreamId) -> Result<Option<StreamAttrs>>;

	/// Returns the actor's server role, or `None` if the actor does not exist.
	async fn get_actor_server_role(&self, user_id: UserId) -> Result<Option<ServerRole>>;

	/// Returns the raw role name stored in the actor's ACL entry for the
	/// stream, or `None` if the actor has no entry.
	///
	/// The name is validated by the caller, so a corrupt row surfaces as
	/// [`crate::AuthzError::UnknownRole`] rather than being trusted.
	async fn get_actor_stream_role(
		&self,
		user_id: UserId,
		stream_id: StreamId,
	) -> Result<Option<String>>;
}
