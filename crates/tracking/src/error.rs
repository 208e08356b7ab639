//! Error types for the tracking engine.
//!
//! Stale spans and overlapping suggestions are not errors; they are reported
//! as data through [`SpanHealth`](crate::SpanHealth) and
//! [`OverlapWarning`](crate::OverlapWarning).

use scribe_primitives::{CharLen, Span, SpanError};
use thiserror::Error;

use crate::change::ChangeId;

/// Registry structural errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// A change with this id is already tracked.
	#[error("duplicate change id: {0}")]
	DuplicateId(ChangeId),
}

/// Diff computation failures. No partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
	/// One of the inputs exceeds the configured size guard.
	#[error("diff input too large: {len} characters (limit {limit})")]
	InputTooLarge {
		/// Character length of the larger input.
		len: CharLen,
		/// Configured limit.
		limit: CharLen,
	},
}

/// Failures while resolving a single change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// No change with this id is tracked.
	#[error("change not found: {0}")]
	NotFound(ChangeId),
	/// The change already reached a terminal status.
	#[error("change {0} is already resolved")]
	AlreadyResolved(ChangeId),
	/// The change's span no longer fits the document.
	#[error("change {id} cannot be applied: {source}")]
	OutOfRange {
		/// The stale change.
		id: ChangeId,
		/// Bounds violation.
		#[source]
		source: SpanError,
	},
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed.
	#[error("config parse error: {0}")]
	Parse(#[from] toml::de::Error),
	/// A field holds a value the engine cannot use.
	#[error("invalid value for '{field}': {reason}")]
	Invalid {
		/// Field name.
		field: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}

/// Errors raised while ingesting suggestions from the AI collaborator.
#[derive(Debug, Error)]
pub enum IngestError {
	/// The response payload is not valid JSON for a suggestion response.
	#[error("malformed suggestion response: {0}")]
	Json(#[from] serde_json::Error),
	/// A suggestion's position does not fit the current document.
	#[error("suggestion position {span} is invalid for a document of {len} characters")]
	InvalidPosition {
		/// Position supplied by the collaborator.
		span: Span,
		/// Current document length.
		len: CharLen,
	},
	/// Diffing a rewrite failed.
	#[error(transparent)]
	Diff(#[from] DiffError),
	/// Registry rejected a generated change.
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
	/// See [`RegistryError`].
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// See [`DiffError`].
	#[error(transparent)]
	Diff(#[from] DiffError),
	/// See [`ResolveError`].
	#[error(transparent)]
	Resolve(#[from] ResolveError),
	/// See [`ConfigError`].
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// See [`IngestError`].
	#[error(transparent)]
	Ingest(#[from] IngestError),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
