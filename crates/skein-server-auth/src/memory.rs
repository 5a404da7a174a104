// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators.
//!
//! Used by tests across the workspace and by single-process deployments that
//! keep the ACL in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::context::{TokenClaims, TokenValidator};
use crate::directory::AuthzDirectory;
use crate::error::{AuthzError, Result};
use crate::types::{ServerRole, StreamAttrs, StreamId, StreamRole, UserId};

/// An [`AuthzDirectory`] backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
	users: RwLock<HashMap<UserId, ServerRole>>,
	streams: RwLock<HashMap<StreamId, StreamAttrs>>,
	acl: RwLock<HashMap<(UserId, StreamId), String>>,
	unavailable: AtomicBool,
}

impl InMemoryDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new user and returns its id.
	pub fn add_user(&self, role: ServerRole) -> UserId {
		let user_id = UserId::generate();
		self.set_server_role(user_id, role);
		user_id
	}

	pub fn set_server_role(&self, user_id: UserId, role: ServerRole) {
		self
			.users
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(user_id, role);
	}

	/// Deletes a user and every ACL entry it holds.
	pub fn remove_user(&self, user_id: UserId) {
		self
			.users
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.remove(&user_id);
		self
			.acl
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.retain(|(user, _), _| *user != user_id);
	}

	/// Creates a stream owned by `owner` and returns its id.
	///
	/// The owner also receives a `stream:owner` ACL entry.
	pub fn add_stream(&self, owner: UserId, is_public: bool) -> StreamId {
		let stream_id = StreamId::generate();
		let attrs = StreamAttrs {
			id: stream_id,
			is_public,
			owner_id: Some(owner),
		};
		self.insert_stream(attrs);
		self.grant(owner, stream_id, StreamRole::Owner.as_str());
		stream_id
	}

	pub fn insert_stream(&self, attrs: StreamAttrs) {
		self
			.streams
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(attrs.id, attrs);
	}

	pub fn set_public(&self, stream_id: StreamId, is_public: bool) {
		if let Some(stream) = self
			.streams
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.get_mut(&stream_id)
		{
			stream.is_public = is_public;
		}
	}

	pub fn remove_stream(&self, stream_id: StreamId) {
		self
			.streams
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.remove(&stream_id);
	}

	/// Stores a raw role name for the user on the stream. The name is not
	/// validated here.
	pub fn grant(&self, user_id: UserId, stream_id: StreamId, role: &str) {
		self
			.acl
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert((user_id, stream_id), role.to_string());
	}

	pub fn revoke(&self, user_id: UserId, stream_id: StreamId) {
		self
			.acl
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.remove(&(user_id, stream_id));
	}

	/// Makes every lookup fail with [`AuthzError::Directory`].
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::Relaxed);
	}

	fn check_available(&self) -> Result<()> {
		if self.unavailable.load(Ordering::Relaxed) {
			Err(AuthzError::Directory("directory unavailable".to_string()))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl AuthzDirectory for InMemoryDirectory {
	async fn get_stream(&self, stream_id: StreamId) -> Result<Option<StreamAttrs>> {
		self.check_available()?;
		Ok(self
			.streams
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.get(&stream_id)
			.cloned())
	}

	async fn get_actor_server_role(&self, user_id: UserId) -> Result<Option<ServerRole>> {
		self.check_available()?;
		Ok(self
			.users
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.get(&user_id)
			.copied())
	}

	async fn get_actor_stream_role(
		&self,
		user_id: UserId,
		stream_id: StreamId,
	) -> Result<Option<String>> {
		self.check_available()?;
		Ok(self
			.acl
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.get(&(user_id, stream_id))
			.cloned())
	}
}

/// A [`TokenValidator`] over a fixed token table.
#[derive(Debug, Default)]
pub struct StaticTokenValidator {
	tokens: RwLock<HashMap<String, TokenClaims>>,
}

impl StaticTokenValidator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, token: impl Into<String>, claims: TokenClaims) {
		self
			.tokens
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(token.into(), claims);
	}

	pub fn revoke(&self, token: &str) {
		self
			.tokens
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.remove(token);
	}
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
	async fn validate(&self, token: &str) -> Option<TokenClaims> {
		self
			.tokens
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.get(token)
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn add_stream_grants_owner_entry() {
		let directory = InMemoryDirectory::new();
		let owner = directory.add_user(ServerRole::User);
		let stream = directory.add_stream(owner, false);

		assert_eq!(
			directory.get_actor_stream_role(owner, stream).await.unwrap().as_deref(),
			Some("stream:owner")
		);
		assert!(!directory.get_stream(stream).await.unwrap().unwrap().is_public);
	}

	#[tokio::test]
	async fn remove_user_drops_acl_entries() {
		let directory = InMemoryDirectory::new();
		let owner = directory.add_user(ServerRole::User);
		let stream = directory.add_stream(owner, false);
		directory.remove_user(owner);

		assert_eq!(directory.get_actor_server_role(owner).await.unwrap(), None);
		assert_eq!(directory.get_actor_stream_role(owner, stream).await.unwrap(), None);
	}

	#[tokio::test]
	async fn unavailable_directory_fails_lookups() {
		let directory = InMemoryDirectory::new();
		directory.set_unavailable(true);
		assert!(directory.get_stream(StreamId::generate()).await.is_err());
		directory.set_unavailable(false);
		assert!(directory.get_stream(StreamId::generate()).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn revoked_token_no_longer_validates() {
		let validator = StaticTokenValidator::new();
		let claims = TokenClaims {
			user_id: UserId::generate(),
			server_role: None,
			scopes: Default::default(),
		};
		validator.insert("t", claims.clone());
		assert_eq!(validator.validate("t").await, Some(claims));
		validator.revoke("t");
		assert_eq!(validator.validate("t").await, None);
	}
}
