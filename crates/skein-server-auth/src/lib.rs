// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based authorization for skein streams.
//!
//! Two independent axes decide whether a caller may act:
//!
//! - **Scopes** granted to the caller's token ([`validate_scopes`])
//! - **Roles** held by the actor, either deployment-wide
//!   ([`validate_server_role`]) or on a specific stream ([`Authorizer`])
//!
//! Neither axis widens the other: a token with every scope still needs the
//! stream role, and an owner's token still needs the scope.
//!
//! [`Authorizer`] is the entry point for stream checks. It is used at request
//! time by resolvers and again for every event a live subscription receives,
//! so a revoked role takes effect on the next event rather than on reconnect.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skein_server_auth::{Authorizer, InMemoryDirectory, ServerRole, StaticOverridePolicy, StreamRole};
//!
//! # tokio_test::block_on(async {
//! let directory = Arc::new(InMemoryDirectory::new());
//! let owner = directory.add_user(ServerRole::User);
//! let stream = directory.add_stream(owner, false);
//!
//! let authorizer = Authorizer::new(directory, Arc::new(StaticOverridePolicy(false)));
//! let role = authorizer.authorize(Some(owner), stream, "stream:contributor").await?;
//! assert_eq!(role, StreamRole::Owner);
//! # Ok::<_, skein_server_auth::AuthzError>(())
//! # }).unwrap();
//! ```

pub mod authorizer;
pub mod context;
pub mod directory;
pub mod error;
pub mod memory;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod server_role;
pub mod types;

pub use authorizer::{Authorizer, STREAM_VIEWER_ROLE};
pub use context::{
	build_context, build_context_from_token, extract_bearer_token, AuthContext, TokenClaims,
	TokenValidator,
};
pub use directory::AuthzDirectory;
pub use error::{AuthzError, AuthzErrorKind, Result};
pub use memory::{InMemoryDirectory, StaticTokenValidator};
pub use policy::{
	AdminOverridePolicy, AtomicOverridePolicy, EnvOverridePolicy, StaticOverridePolicy,
	ADMIN_OVERRIDE_ENV_VAR,
};
pub use registry::{Role, RoleRegistry};
pub use resolver::RoleResolver;
pub use scope::{validate_scopes, Scope, ScopeSet};
pub use server_role::validate_server_role;
pub use types::{CommentId, RoleDomain, ServerRole, StreamAttrs, StreamId, StreamRole, UserId};
