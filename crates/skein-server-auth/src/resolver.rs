// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective stream role resolution.
//!
//! Evaluation order for `resolve(actor, stream, required)`:
//!
//! ```text
//! stream exists? ──no──> NotFound
//!      │
//! actor present? ──no──> Forbidden
//!      │
//! actor known?   ──no──> ActorNotFound
//!      │
//! server:admin && override on ──> Ok(required)
//!      │
//! owner of stream ──> Ok(stream:owner)
//!      │
//! ACL entry ──none──> Forbidden
//!      │   └─unknown name──> UnknownRole
//!      │
//! rank(held) >= rank(required) ──> Ok(held), else Forbidden
//! ```
//!
//! The existence check comes first: a missing stream never reveals anything
//! about roles. The override grants exactly the requested role, not
//! `stream:owner`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::directory::AuthzDirectory;
use crate::error::{AuthzError, Result};
use crate::policy::AdminOverridePolicy;
use crate::registry::RoleRegistry;
use crate::types::{ServerRole, StreamAttrs, StreamId, StreamRole, UserId};

/// Resolves an actor's effective role on a stream.
#[derive(Clone)]
pub struct RoleResolver {
	directory: Arc<dyn AuthzDirectory>,
	policy: Arc<dyn AdminOverridePolicy>,
}

impl RoleResolver {
	pub fn new(directory: Arc<dyn AuthzDirectory>, policy: Arc<dyn AdminOverridePolicy>) -> Self {
		Self { directory, policy }
	}

	/// Looks up a stream, failing with [`AuthzError::NotFound`] if it is absent.
	pub async fn stream(&self, stream_id: StreamId) -> Result<StreamAttrs> {
		self
			.directory
			.get_stream(stream_id)
			.await?
			.ok_or_else(AuthzError::stream_not_found)
	}

	/// Resolves the actor's effective role on `stream_id`.
	pub async fn resolve(
		&self,
		actor: Option<UserId>,
		stream_id: StreamId,
		required: StreamRole,
	) -> Result<StreamRole> {
		let stream = self.stream(stream_id).await?;
		self.resolve_for(actor, &stream, required).await
	}

	/// Resolves the actor's effective role on an already loaded stream.
	pub async fn resolve_for(
		&self,
		actor: Option<UserId>,
		stream: &StreamAttrs,
		required: StreamRole,
	) -> Result<StreamRole> {
		let Some(user_id) = actor else {
			return Err(AuthzError::forbidden("You are not authorized."));
		};

		let server_role = self
			.directory
			.get_actor_server_role(user_id)
			.await?
			.ok_or(AuthzError::ActorNotFound(user_id))?;

		if server_role == ServerRole::Admin && self.policy.admin_override_enabled() {
			info!(
				user_id = %user_id,
				stream_id = %stream.id,
				required_role = %required,
				"admin override granted requested role"
			);
			return Ok(required);
		}

		if stream.is_owned_by(user_id) {
			return Ok(StreamRole::Owner);
		}

		let held = match self.directory.get_actor_stream_role(user_id, stream.id).await? {
			Some(name) => RoleRegistry::stream_role(&name)?,
			None => {
				debug!(user_id = %user_id, stream_id = %stream.id, "no acl entry");
				return Err(AuthzError::forbidden("You do not have access to this resource."));
			}
		};

		if held.has_permission_of(&required) {
			Ok(held)
		} else {
			debug!(
				user_id = %user_id,
				stream_id = %stream.id,
				held_role = %held,
				required_role = %required,
				"stream role too low"
			);
			Err(AuthzError::forbidden("You are not authorized."))
		}
	}
}
