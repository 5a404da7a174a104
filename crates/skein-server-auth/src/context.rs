// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request and per-connection authentication context.
//!
//! ```text
//! Authorization: Bearer <token> ──> TokenValidator ──> AuthContext { auth: true, .. }
//!          │                              │
//!          └─ missing / malformed         └─ rejected
//!                       └──────────────┬──────────┘
//!                                      ▼
//!                          AuthContext::anonymous()
//! ```
//!
//! Building a context never fails: a bad credential simply yields an
//! anonymous context, and the authorization checks downstream decide what an
//! anonymous caller may do. Token values are never logged.

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::scope::{validate_scopes, ScopeSet};
use crate::server_role::validate_server_role;
use crate::types::UserId;

/// What a validated token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	pub user_id: UserId,
	/// Raw server role name as stored for the user.
	pub server_role: Option<String>,
	pub scopes: ScopeSet,
}

/// Resolves bearer tokens into claims.
#[async_trait]
pub trait TokenValidator: Send + Sync {
	/// Returns the claims for a valid token, or `None` if the token is
	/// unknown, expired or revoked.
	async fn validate(&self, token: &str) -> Option<TokenClaims>;
}

/// The actor on whose behalf a request or subscription runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
	/// Whether a valid credential was presented.
	pub auth: bool,
	pub user_id: Option<UserId>,
	/// Raw server role name; validated when a server role check runs.
	pub server_role: Option<String>,
	pub scopes: ScopeSet,
}

impl AuthContext {
	/// A context with no credentials.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn authenticated(user_id: UserId, server_role: Option<String>, scopes: ScopeSet) -> Self {
		Self {
			auth: true,
			user_id: Some(user_id),
			server_role,
			scopes,
		}
	}

	pub fn from_claims(claims: TokenClaims) -> Self {
		Self::authenticated(claims.user_id, claims.server_role, claims.scopes)
	}

	/// Checks the context's scopes against `required`.
	///
	/// Anonymous contexts carry no scopes, so any non-empty requirement fails.
	pub fn require_scopes(&self, required: &ScopeSet) -> Result<()> {
		let granted = self.auth.then_some(&self.scopes);
		validate_scopes(granted, required)
	}

	/// Checks the context's server role against `minimum`.
	pub fn require_server_role(&self, minimum: &str) -> Result<()> {
		validate_server_role(self, minimum)
	}
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`. Returns `None` when
/// the header is missing, not valid UTF-8, or uses another scheme.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()
		.and_then(strip_bearer)
}

fn strip_bearer(value: &str) -> Option<&str> {
	value
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
}

/// Builds a context from request headers.
#[instrument(level = "trace", skip_all)]
pub async fn build_context(headers: &HeaderMap, validator: &dyn TokenValidator) -> AuthContext {
	match extract_bearer_token(headers) {
		Some(token) => context_for_token(token, validator).await,
		None => AuthContext::anonymous(),
	}
}

/// Builds a context from a raw `Bearer <token>` value, as sent in a
/// subscription's connection parameters.
#[instrument(level = "trace", skip_all)]
pub async fn build_context_from_token(
	value: Option<&str>,
	validator: &dyn TokenValidator,
) -> AuthContext {
	match value.and_then(strip_bearer) {
		Some(token) => context_for_token(token, validator).await,
		None => AuthContext::anonymous(),
	}
}

async fn context_for_token(token: &str, validator: &dyn TokenValidator) -> AuthContext {
	match validator.validate(token).await {
		Some(claims) => AuthContext::from_claims(claims),
		None => {
			debug!("bearer token rejected");
			AuthContext::anonymous()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::AuthzError;
	use crate::memory::StaticTokenValidator;
	use crate::scope::{STREAMS_READ, STREAMS_WRITE};
	use http::header::HeaderValue;

	fn validator_with(token: &str, claims: TokenClaims) -> StaticTokenValidator {
		let validator = StaticTokenValidator::new();
		validator.insert(token, claims);
		validator
	}

	fn claims() -> TokenClaims {
		TokenClaims {
			user_id: UserId::generate(),
			server_role: Some("server:user".to_string()),
			scopes: [STREAMS_READ].into_iter().collect(),
		}
	}

	mod bearer_extraction {
		use super::*;

		#[test]
		fn extracts_token() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
			assert_eq!(extract_bearer_token(&headers), Some("abc123"));
		}

		#[test]
		fn ignores_other_schemes() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
			assert_eq!(extract_bearer_token(&headers), None);
		}

		#[test]
		fn ignores_empty_token() {
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
			assert_eq!(extract_bearer_token(&headers), None);
		}

		#[test]
		fn missing_header() {
			assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
		}
	}

	mod build {
		use super::*;

		#[tokio::test]
		async fn bogus_header_is_anonymous() {
			let validator = StaticTokenValidator::new();
			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer BS"));

			let ctx = build_context(&headers, &validator).await;
			assert!(!ctx.auth);
			assert_eq!(ctx, AuthContext::anonymous());
		}

		#[tokio::test]
		async fn missing_header_is_anonymous() {
			let validator = StaticTokenValidator::new();
			let ctx = build_context(&HeaderMap::new(), &validator).await;
			assert!(!ctx.auth);
		}

		#[tokio::test]
		async fn bogus_or_missing_token_is_anonymous() {
			let validator = StaticTokenValidator::new();
			for value in [Some("Bearer BS"), Some(""), Some("BS"), None] {
				let ctx = build_context_from_token(value, &validator).await;
				assert!(!ctx.auth, "value={value:?}");
			}
		}

		#[tokio::test]
		async fn valid_token_is_authenticated() {
			let claims = claims();
			let validator = validator_with("good", claims.clone());

			let mut headers = HeaderMap::new();
			headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer good"));
			let ctx = build_context(&headers, &validator).await;

			assert!(ctx.auth);
			assert_eq!(ctx.user_id, Some(claims.user_id));
			assert_eq!(ctx.server_role.as_deref(), Some("server:user"));
			assert!(ctx.scopes.contains(STREAMS_READ));

			let ctx = build_context_from_token(Some("Bearer good"), &validator).await;
			assert!(ctx.auth);
		}
	}

	mod requirements {
		use super::*;

		#[test]
		fn scopes_come_from_the_token() {
			let ctx = AuthContext::from_claims(claims());
			assert_eq!(ctx.require_scopes(&[STREAMS_READ].into_iter().collect()), Ok(()));
			assert_eq!(
				ctx.require_scopes(&[STREAMS_WRITE].into_iter().collect()),
				Err(AuthzError::InsufficientScope)
			);
		}

		#[test]
		fn anonymous_has_no_scopes() {
			let ctx = AuthContext::anonymous();
			assert_eq!(ctx.require_scopes(&ScopeSet::new()), Ok(()));
			assert_eq!(
				ctx.require_scopes(&[STREAMS_READ].into_iter().collect()),
				Err(AuthzError::InsufficientScope)
			);
		}

		#[test]
		fn server_role_comes_from_the_token() {
			let ctx = AuthContext::from_claims(claims());
			assert_eq!(ctx.require_server_role("server:user"), Ok(()));
			assert_eq!(
				ctx.require_server_role("server:admin"),
				Err(AuthzError::InsufficientServerRole)
			);
		}
	}
}
