// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfigLayer {
	pub admin_override_enabled: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.admin_override_enabled.is_some() {
			self.admin_override_enabled = other.admin_override_enabled;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			admin_override_enabled: self.admin_override_enabled.unwrap_or(false),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfig {
	/// Lets `server:admin` actors satisfy stream role checks with exactly the
	/// requested role. Seeds the runtime toggle; it is not read per check.
	pub admin_override_enabled: bool,
}
