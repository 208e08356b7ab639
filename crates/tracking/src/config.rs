//! Engine configuration.
//!
//! Configuration is format-neutral: [`TrackingConfig`] is a plain struct with
//! serde defaults, and [`TrackingConfig::from_toml_str`] is the one loader the
//! host needs.
//!
//! ```toml
//! retention = "retain"
//! preview = "inline"
//! overlap = "apply-in-order"
//!
//! [diff]
//! granularity = "word"
//! max-input-chars = 50000
//! ```

use scribe_primitives::CharLen;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default size guard for the diff engine, in characters per input.
pub const DEFAULT_MAX_DIFF_CHARS: CharLen = 100_000;

/// What happens to a change once it is accepted or rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Retention {
	/// Drop resolved changes from the registry.
	#[default]
	Remove,
	/// Keep resolved changes with their terminal status as an audit trail.
	Retain,
}

/// What the host document currently shows inside a pending change's span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewMode {
	/// The document holds the original text; suggestions are only markers.
	#[default]
	Off,
	/// The document already shows the suggested text inside each span.
	Inline,
}

/// How bulk resolution treats pending changes whose spans overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
	/// Apply the higher-positioned change; leave any change overlapping an
	/// already applied span pending and report it.
	#[default]
	SkipOverlapping,
	/// Apply every change in descending order, clamping spans to the
	/// document. The result depends on processing order.
	ApplyInOrder,
}

/// Token granularity used to align the two texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
	/// Align individual characters.
	#[default]
	Char,
	/// Align Unicode word-boundary segments.
	Word,
}

/// Diff engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiffOptions {
	/// Alignment granularity.
	pub granularity: Granularity,
	/// Inputs longer than this many characters are refused.
	pub max_input_chars: CharLen,
}

impl Default for DiffOptions {
	fn default() -> Self {
		Self {
			granularity: Granularity::Char,
			max_input_chars: DEFAULT_MAX_DIFF_CHARS,
		}
	}
}

/// Resolution engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
	/// Audit-trail policy.
	pub retention: Retention,
	/// What the content holds inside pending spans.
	pub preview: PreviewMode,
	/// Bulk overlap handling.
	pub overlap: OverlapPolicy,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrackingConfig {
	/// Audit-trail policy.
	pub retention: Retention,
	/// What the content holds inside pending spans.
	pub preview: PreviewMode,
	/// Bulk overlap handling.
	pub overlap: OverlapPolicy,
	/// Diff engine options.
	pub diff: DiffOptions,
}

impl TrackingConfig {
	/// Parses and validates a TOML configuration document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects values the engine cannot operate with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.diff.max_input_chars == 0 {
			return Err(ConfigError::Invalid {
				field: "diff.max-input-chars",
				reason: "must be greater than zero".to_string(),
			});
		}
		Ok(())
	}

	/// Options consumed by the resolution engine.
	pub fn resolve_options(&self) -> ResolveOptions {
		ResolveOptions {
			retention: self.retention,
			preview: self.preview,
			overlap: self.overlap,
		}
	}

	/// Options consumed by the diff engine.
	pub fn diff_options(&self) -> DiffOptions {
		self.diff
	}
}
