// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as read from one source.

use serde::{Deserialize, Serialize};

use crate::sections::{ActivityConfigLayer, AuthzConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration. Unset fields defer to
/// lower-precedence sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfigLayer {
	pub authz: Option<AuthzConfigLayer>,
	pub activity: Option<ActivityConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlays `other` on top of `self`.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.authz, other.authz, AuthzConfigLayer::merge);
		merge_section(&mut self.activity, other.activity, ActivityConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (target.as_mut(), other) {
		(Some(existing), Some(other)) => merge(existing, other),
		(None, Some(other)) => *target = Some(other),
		(_, None) => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn later_layer_overrides_set_fields_only() {
		let mut base = ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				admin_override_enabled: Some(true),
			}),
			activity: Some(ActivityConfigLayer {
				channel_capacity: Some(64),
			}),
			logging: None,
		};

		base.merge(ServerConfigLayer {
			authz: Some(AuthzConfigLayer {
				admin_override_enabled: None,
			}),
			activity: Some(ActivityConfigLayer {
				channel_capacity: Some(512),
			}),
			logging: Some(LoggingConfigLayer {
				level: Some("debug".to_string()),
				format: None,
			}),
		});

		assert_eq!(base.authz.unwrap().admin_override_enabled, Some(true));
		assert_eq!(base.activity.unwrap().channel_capacity, Some(512));
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
