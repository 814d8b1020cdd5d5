//! Gate configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use navlock_core::Decision;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a [`GateConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A zero wait bound would abandon every navigation before it is dispatched.
	#[error("timeout_ms must be greater than zero")]
	ZeroTimeout,
}

/// Wait bound and fallback for intercepted navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
	/// Maximum time a waiter blocks for the authority's answer, in milliseconds.
	pub timeout_ms: u64,
	/// Decision used when the wait is abandoned.
	pub default_decision: Decision,
}

/// Returns the default wait bound in milliseconds.
fn default_timeout_ms() -> u64 {
	3_000
}

impl Default for GateConfig {
	fn default() -> Self {
		Self {
			timeout_ms: default_timeout_ms(),
			default_decision: Decision::DoNotOverride,
		}
	}
}

impl GateConfig {
	/// Returns the wait bound.
	#[must_use]
	pub const fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Returns a copy with a different wait bound.
	#[must_use]
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Returns a copy with a different fallback decision.
	#[must_use]
	pub const fn with_default_decision(mut self, decision: Decision) -> Self {
		self.default_decision = decision;
		self
	}

	/// Checks field invariants.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::ZeroTimeout`] when `timeout_ms` is zero.
	pub fn validate(self) -> Result<Self, ConfigError> {
		if self.timeout_ms == 0 {
			return Err(ConfigError::ZeroTimeout);
		}
		Ok(self)
	}

	/// Parses and validates a configuration from TOML text. Missing fields use defaults.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Parse`] on malformed TOML or unknown fields, and
	/// [`ConfigError::ZeroTimeout`] on an invalid bound.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()
	}

	/// Reads, parses and validates a configuration file.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
	/// [`from_toml_str`](Self::from_toml_str).
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&input)?;
		tracing::debug!(path = %path.display(), timeout_ms = config.timeout_ms, "navlock.config.loaded");
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		assert_eq!(GateConfig::from_toml_str("").unwrap(), GateConfig::default());
		assert_eq!(GateConfig::default().timeout(), Duration::from_secs(3));
	}

	#[test]
	fn parses_all_fields() {
		let config = GateConfig::from_toml_str("timeout_ms = 250\ndefault_decision = \"should_override\"\n").unwrap();
		assert_eq!(
			config,
			GateConfig {
				timeout_ms: 250,
				default_decision: Decision::ShouldOverride,
			}
		);
	}

	#[test]
	fn rejects_zero_timeout() {
		assert!(matches!(GateConfig::from_toml_str("timeout_ms = 0"), Err(ConfigError::ZeroTimeout)));
	}

	#[test]
	fn rejects_unknown_fields() {
		assert!(matches!(GateConfig::from_toml_str("poll_ms = 5"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn rejects_unknown_decision() {
		assert!(matches!(
			GateConfig::from_toml_str("default_decision = \"maybe\""),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "timeout_ms = 1500").unwrap();
		let config = GateConfig::load(file.path()).unwrap();
		assert_eq!(config.timeout(), Duration::from_millis(1500));
		assert_eq!(config.default_decision, Decision::DoNotOverride);
	}

	#[test]
	fn missing_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.toml");
		match GateConfig::load(&path) {
			Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected Io error, got {other:?}"),
		}
	}

	#[test]
	fn builder_overrides() {
		let config = GateConfig::default()
			.with_timeout(Duration::from_millis(40))
			.with_default_decision(Decision::ShouldOverride);
		assert_eq!(config.timeout_ms, 40);
		assert_eq!(config.default_decision, Decision::ShouldOverride);
	}
}
