// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization entry point used by resolvers, routes and live
//! subscription filters.
//!
//! [`Authorizer`] holds no mutable state of its own. Clones share the same
//! directory and override policy, so it can be handed to every request and
//! subscription task and called concurrently.

use std::sync::Arc;

use tracing::instrument;

use crate::context::AuthContext;
use crate::directory::AuthzDirectory;
use crate::error::{AuthzError, Result};
use crate::policy::AdminOverridePolicy;
use crate::registry::RoleRegistry;
use crate::resolver::RoleResolver;
use crate::types::{StreamId, StreamRole, UserId};

/// Role required to read a private stream.
pub const STREAM_VIEWER_ROLE: StreamRole = StreamRole::Reviewer;

#[derive(Clone)]
pub struct Authorizer {
	resolver: RoleResolver,
}

impl Authorizer {
	pub fn new(directory: Arc<dyn AuthzDirectory>, policy: Arc<dyn AdminOverridePolicy>) -> Self {
		Self {
			resolver: RoleResolver::new(directory, policy),
		}
	}

	/// Checks that `actor` holds at least `required_role` on `stream_id`.
	///
	/// `required_role` is validated against the registry before anything is
	/// looked up. On success returns the effective role: the role the actor
	/// actually holds, or exactly `required_role` when granted through the
	/// admin override.
	#[instrument(
		level = "debug",
		skip_all,
		fields(actor = ?actor, stream_id = %stream_id, required_role = %required_role)
	)]
	pub async fn authorize(
		&self,
		actor: Option<UserId>,
		stream_id: StreamId,
		required_role: &str,
	) -> Result<StreamRole> {
		let required = RoleRegistry::stream_role(required_role)?;
		self.resolver.resolve(actor, stream_id, required).await
	}

	/// Typed form of [`Authorizer::authorize`].
	pub async fn authorize_role(
		&self,
		actor: Option<UserId>,
		stream_id: StreamId,
		required: StreamRole,
	) -> Result<StreamRole> {
		self.resolver.resolve(actor, stream_id, required).await
	}

	/// Checks read access to a stream that may be public.
	///
	/// Missing streams fail with [`AuthzError::NotFound`]. Public streams are
	/// readable by anyone, including anonymous callers. Private streams need
	/// an authenticated actor holding at least [`STREAM_VIEWER_ROLE`].
	#[instrument(
		level = "debug",
		skip_all,
		fields(actor = ?actor, stream_id = %stream_id, authenticated = authenticated)
	)]
	pub async fn authorize_stream_access(
		&self,
		stream_id: StreamId,
		actor: Option<UserId>,
		authenticated: bool,
	) -> Result<()> {
		let stream = self.resolver.stream(stream_id).await?;

		if stream.is_public {
			return Ok(());
		}

		if !authenticated {
			return Err(AuthzError::forbidden("You are not authorized."));
		}

		self
			.resolver
			.resolve_for(actor, &stream, STREAM_VIEWER_ROLE)
			.await
			.map(|_| ())
	}

	/// [`Authorizer::authorize_role`] for the actor in `ctx`.
	pub async fn authorize_context(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
		required: StreamRole,
	) -> Result<StreamRole> {
		self.authorize_role(ctx.user_id, stream_id, required).await
	}

	/// [`Authorizer::authorize_stream_access`] for the actor in `ctx`.
	pub async fn authorize_stream_access_context(
		&self,
		ctx: &AuthContext,
		stream_id: StreamId,
	) -> Result<()> {
		self.authorize_stream_access(stream_id, ctx.user_id, ctx.auth).await
	}
}
