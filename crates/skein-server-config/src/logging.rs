// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::{LogFormat, LoggingConfig};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into());

	let result = match config.format {
		LogFormat::Plain => tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer())
			.try_init(),
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json())
			.try_init(),
	};

	result.map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_install_is_an_error_not_a_panic() {
		let config = LoggingConfig {
			level: "debug".to_string(),
			format: LogFormat::Json,
		};

		// Whichever call installs first, the next one must report the conflict.
		let _ = init_tracing(&config);
		let err = init_tracing(&LoggingConfig::default()).unwrap_err();
		assert!(matches!(err, ConfigError::Logging(_)));
		assert!(err.to_string().starts_with("failed to initialize logging"));
	}
}
