// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin override policy.
//!
//! When the override is on, a `server:admin` satisfies any stream role check
//! as if holding exactly the requested role. The flag is process-wide and may
//! flip at any moment; the authorizer reads the current value on every check
//! and promises nothing beyond that. Reads are relaxed atomics: a check racing
//! a toggle may see either value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use skein_server_config::AuthzConfig;
pub use skein_server_config::ADMIN_OVERRIDE_ENV_VAR;
use tracing::info;

/// Source of the admin override flag.
pub trait AdminOverridePolicy: Send + Sync {
	fn admin_override_enabled(&self) -> bool;
}

impl<T: AdminOverridePolicy + ?Sized> AdminOverridePolicy for Arc<T> {
	fn admin_override_enabled(&self) -> bool {
		(**self).admin_override_enabled()
	}
}

/// A fixed flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticOverridePolicy(pub bool);

impl AdminOverridePolicy for StaticOverridePolicy {
	fn admin_override_enabled(&self) -> bool {
		self.0
	}
}

/// A flag operators can toggle while the process runs.
#[derive(Debug, Default)]
pub struct AtomicOverridePolicy {
	enabled: AtomicBool,
}

impl AtomicOverridePolicy {
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled: AtomicBool::new(enabled),
		}
	}

	/// Seeds the flag from the `authz` configuration section.
	pub fn from_config(config: &AuthzConfig) -> Self {
		Self::new(config.admin_override_enabled)
	}

	pub fn set_enabled(&self, enabled: bool) {
		let previous = self.enabled.swap(enabled, Ordering::Relaxed);
		if previous != enabled {
			info!(enabled, "admin override toggled");
		}
	}

	/// Applies a reloaded `authz` configuration section.
	pub fn apply_config(&self, config: &AuthzConfig) {
		self.set_enabled(config.admin_override_enabled);
	}
}

impl AdminOverridePolicy for AtomicOverridePolicy {
	fn admin_override_enabled(&self) -> bool {
		self.enabled.load(Ordering::Relaxed)
	}
}

/// Reads the flag from an environment variable on every check.
///
/// `true` and `1` (case-insensitive) enable the override; anything else,
/// including an unset variable, disables it.
#[derive(Debug, Clone)]
pub struct EnvOverridePolicy {
	var: String,
}

impl EnvOverridePolicy {
	pub fn new(var: impl Into<String>) -> Self {
		Self { var: var.into() }
	}
}

impl Default for EnvOverridePolicy {
	fn default() -> Self {
		Self::new(ADMIN_OVERRIDE_ENV_VAR)
	}
}

impl AdminOverridePolicy for EnvOverridePolicy {
	fn admin_override_enabled(&self) -> bool {
		std::env::var(&self.var)
			.map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
			.unwrap_or(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn static_policy_reports_its_value() {
		assert!(StaticOverridePolicy(true).admin_override_enabled());
		assert!(!StaticOverridePolicy::default().admin_override_enabled());
	}

	#[test]
	fn atomic_policy_toggles() {
		let policy = AtomicOverridePolicy::new(false);
		assert!(!policy.admin_override_enabled());
		policy.set_enabled(true);
		assert!(policy.admin_override_enabled());
		policy.set_enabled(false);
		assert!(!policy.admin_override_enabled());
	}

	#[test]
	fn atomic_policy_follows_config() {
		let mut config = AuthzConfig::default();
		let policy = AtomicOverridePolicy::from_config(&config);
		assert!(!policy.admin_override_enabled());

		config.admin_override_enabled = true;
		policy.apply_config(&config);
		assert!(policy.admin_override_enabled());
	}

	#[test]
	fn shared_policy_sees_toggles_through_arc() {
		let policy = Arc::new(AtomicOverridePolicy::new(false));
		let shared: Arc<dyn AdminOverridePolicy> = policy.clone();
		policy.set_enabled(true);
		assert!(shared.admin_override_enabled());
	}

	#[test]
	fn default_env_policy_reads_the_config_variable() {
		assert_eq!(EnvOverridePolicy::default().var, skein_server_config::ADMIN_OVERRIDE_ENV_VAR);
		assert_eq!(ADMIN_OVERRIDE_ENV_VAR, "SKEIN_SERVER_ADMIN_OVERRIDE_ENABLED");
	}

	#[test]
	fn env_policy_reads_current_value() {
		let var = "SKEIN_TEST_ADMIN_OVERRIDE_ENV_POLICY";
		let policy = EnvOverridePolicy::new(var);

		std::env::remove_var(var);
		assert!(!policy.admin_override_enabled());

		std::env::set_var(var, "TRUE");
		assert!(policy.admin_override_enabled());

		std::env::set_var(var, "1");
		assert!(policy.admin_override_enabled());

		std::env::set_var(var, "false");
		assert!(!policy.admin_override_enabled());

		std::env::remove_var(var);
	}
}
