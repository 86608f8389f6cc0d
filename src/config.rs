//! Configuration for the in-memory [`SortedMap`](crate::mem::SortedMap) backend.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SERIESCURSOR_ALLOW_OUT_OF_ORDER` | Accept inserts at or before the last key (`true`/`false`) | `true` |
//! | `SERIESCURSOR_OOO_HISTORY` | Number of out-of-order writes remembered for recovery payloads | `1024` |
//!
//! # Example
//!
//! ```rust
//! use seriescursor::config::MapConfig;
//!
//! let config: MapConfig = serde_json::from_str(r#"{ "allow_out_of_order": false }"#).unwrap();
//! assert!(!config.allow_out_of_order);
//! assert_eq!(config.out_of_order_history, MapConfig::DEFAULT_OUT_OF_ORDER_HISTORY);
//! ```

use std::env;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable toggling out-of-order inserts.
pub const ENV_ALLOW_OUT_OF_ORDER: &str = "SERIESCURSOR_ALLOW_OUT_OF_ORDER";

/// Environment variable setting the out-of-order history length.
pub const ENV_OOO_HISTORY: &str = "SERIESCURSOR_OOO_HISTORY";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	/// An environment variable held a value that could not be parsed.
	#[error("invalid value for {var}: {value:?}")]
	InvalidValue {
		/// The variable name.
		var: &'static str,
		/// The rejected value.
		value: String,
	},
	/// The out-of-order history must remember at least one write.
	#[error("out-of-order history must be at least 1")]
	ZeroHistory,
}

/// Tuning knobs for an in-memory series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
	/// Accept inserts whose key is at or before the current last key.
	///
	/// When `false`, such inserts are rejected with an out-of-order error and
	/// the map behaves as an append-only series.
	pub allow_out_of_order: bool,

	/// How many out-of-order writes are remembered.
	///
	/// A cursor that last synchronized before the oldest remembered write
	/// receives an out-of-order payload whose new key is unknown, unless every
	/// forgotten write was ahead of the cursor. Only the smallest forgotten key
	/// is kept, so a forgotten write that predates the cursor's last
	/// synchronization can still cause such a payload.
	pub out_of_order_history: usize,
}

impl MapConfig {
	/// Default length of the out-of-order history.
	pub const DEFAULT_OUT_OF_ORDER_HISTORY: usize = 1024;

	/// An append-only configuration.
	pub fn append_only() -> Self {
		MapConfig {
			allow_out_of_order: false,
			..Self::default()
		}
	}

	/// Loads the configuration from environment variables, falling back to
	/// defaults for variables that are not set.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed,
	/// or [`ConfigError::ZeroHistory`] if the history length is zero.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut config = MapConfig::default();
		if let Ok(value) = env::var(ENV_ALLOW_OUT_OF_ORDER) {
			config.allow_out_of_order = parse_bool(ENV_ALLOW_OUT_OF_ORDER, &value)?;
		}
		if let Ok(value) = env::var(ENV_OOO_HISTORY) {
			config.out_of_order_history =
				value.trim().parse().map_err(|_| ConfigError::InvalidValue {
					var: ENV_OOO_HISTORY,
					value: value.clone(),
				})?;
		}
		config.validate()?;
		Ok(config)
	}

	/// Checks that the configuration is usable.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.out_of_order_history == 0 {
			return Err(ConfigError::ZeroHistory);
		}
		Ok(())
	}
}

impl Default for MapConfig {
	fn default() -> Self {
		MapConfig {
			allow_out_of_order: true,
			out_of_order_history: Self::DEFAULT_OUT_OF_ORDER_HISTORY,
		}
	}
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			var,
			value: value.to_string(),
		}),
	}
}
