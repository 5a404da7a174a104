// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for skein server crates.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Consistent environment variable naming (`SKEIN_SERVER_*`)
//! - Tracing subscriber setup driven by the `logging` section
//!
//! # Usage
//!
//! ```ignore
//! use skein_server_config::{load_config, logging::init_tracing};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, ADMIN_OVERRIDE_ENV_VAR,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub authz: AuthzConfig,
	pub activity: ActivityConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SKEIN_SERVER_*`)
/// 2. Config file (`/etc/skein/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	Ok(finalize(merged))
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	Ok(finalize(merged))
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> ServerConfig {
	let authz = layer.authz.unwrap_or_default().finalize();
	let activity = layer.activity.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		admin_override_enabled = authz.admin_override_enabled,
		channel_capacity = activity.channel_capacity,
		log_level = %logging.level,
		"Server configuration loaded"
	);

	ServerConfig {
		authz,
		activity,
		logging,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn empty_layer_finalizes_to_defaults() {
		let config = finalize(ServerConfigLayer::default());
		assert_eq!(config, ServerConfig::default());
		assert!(!config.authz.admin_override_enabled);
		assert_eq!(config.activity.channel_capacity, 256);
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.logging.format, LogFormat::Plain);
	}

	#[test]
	fn missing_config_file_is_not_an_error() {
		let config = load_config_with_file("/nonexistent/skein.toml");
		assert!(config.is_ok());
	}

	proptest! {
			#[test]
			fn higher_layer_wins_when_set(base in any::<Option<bool>>(), top in any::<Option<bool>>()) {
					let mut layer = ServerConfigLayer {
							authz: Some(AuthzConfigLayer { admin_override_enabled: base }),
							..Default::default()
					};
					layer.merge(ServerConfigLayer {
							authz: Some(AuthzConfigLayer { admin_override_enabled: top }),
							..Default::default()
					});

					let expected = top.or(base).unwrap_or(false);
					prop_assert_eq!(finalize(layer).authz.admin_override_enabled, expected);
			}
	}
}
