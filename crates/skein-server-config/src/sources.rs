// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{ActivityConfigLayer, AuthzConfigLayer, LogFormat, LoggingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/skein/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SKEIN_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			authz: Some(load_authz_from_env()),
			activity: Some(load_activity_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

/// Environment variable that enables the admin override.
pub const ADMIN_OVERRIDE_ENV_VAR: &str = "SKEIN_SERVER_ADMIN_OVERRIDE_ENABLED";
const CHANNEL_CAPACITY_VAR: &str = "SKEIN_SERVER_ACTIVITY_CHANNEL_CAPACITY";
const LOG_LEVEL_VAR: &str = "SKEIN_SERVER_LOG_LEVEL";
const LOG_FORMAT_VAR: &str = "SKEIN_SERVER_LOG_FORMAT";

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_authz_from_env() -> AuthzConfigLayer {
	AuthzConfigLayer {
		admin_override_enabled: env_bool(ADMIN_OVERRIDE_ENV_VAR),
	}
}

fn load_activity_from_env() -> Result<ActivityConfigLayer, ConfigError> {
	Ok(ActivityConfigLayer {
		channel_capacity: env_usize(CHANNEL_CAPACITY_VAR)?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = env_var(LOG_FORMAT_VAR)
		.map(|v| parse_log_format(LOG_FORMAT_VAR, &v))
		.transpose()?;

	Ok(LoggingConfigLayer {
		level: env_var(LOG_LEVEL_VAR),
		format,
	})
}

fn parse_log_format(key: &str, value: &str) -> Result<LogFormat, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"plain" | "text" => Ok(LogFormat::Plain),
		"json" => Ok(LogFormat::Json),
		other => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("unknown log format '{other}', expected 'plain' or 'json'"),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.authz.is_none());
		assert!(layer.activity.is_none());
		assert!(layer.logging.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/config.toml");
		let layer = source.load().unwrap();
		assert!(layer.authz.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[authz]
admin_override_enabled = true

[activity]
channel_capacity = 32

[logging]
format = "json"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.authz.unwrap().admin_override_enabled, Some(true));
		assert_eq!(layer.activity.unwrap().channel_capacity, Some(32));
		let logging = layer.logging.unwrap();
		assert_eq!(logging.format, Some(LogFormat::Json));
		assert_eq!(logging.level, None);
	}

	#[test]
	fn test_toml_source_reports_parse_errors_with_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[authz\nadmin_override_enabled = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		match err {
			ConfigError::TomlParse { path, .. } => assert_eq!(path, file.path()),
			other => panic!("expected TomlParse, got {other:?}"),
		}
	}

	#[test]
	fn test_parse_log_format() {
		assert_eq!(parse_log_format("k", "JSON").unwrap(), LogFormat::Json);
		assert_eq!(parse_log_format("k", "plain").unwrap(), LogFormat::Plain);
		assert!(matches!(
			parse_log_format("k", "yaml"),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
