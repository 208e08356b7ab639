//! The tracked change model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scribe_primitives::{RopeSlice, Span, span_matches};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PreviewMode;

/// Opaque, stable identifier of a tracked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(Uuid);

impl ChangeId {
	/// Generates a fresh random id.
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	/// Wraps an existing UUID, e.g. one assigned by the suggestion source.
	pub const fn from_uuid(uuid: Uuid) -> Self {
		Self(uuid)
	}

	/// Returns the underlying UUID.
	pub const fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for ChangeId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for ChangeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

/// What a change does to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
	/// Inserts text at a zero-width span.
	Addition,
	/// Removes the text in its span.
	Deletion,
	/// Replaces the text in its span.
	Replacement,
	/// Leaves the text as is and changes its formatting.
	Formatting,
}

impl ChangeKind {
	/// Infers the kind from the before/after texts.
	pub fn infer(original: &str, suggested: &str) -> Self {
		match (original.is_empty(), suggested.is_empty()) {
			(true, _) => Self::Addition,
			(false, true) => Self::Deletion,
			(false, false) if original == suggested => Self::Formatting,
			(false, false) => Self::Replacement,
		}
	}
}

impl std::fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Addition => "addition",
			Self::Deletion => "deletion",
			Self::Replacement => "replacement",
			Self::Formatting => "formatting",
		})
	}
}

/// Resolution status.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
	/// Awaiting a decision.
	#[default]
	Pending,
	/// The suggestion was applied.
	Accepted,
	/// The suggestion was discarded.
	Rejected,
}

impl ChangeStatus {
	/// Returns true for accepted and rejected.
	pub fn is_terminal(self) -> bool {
		!matches!(self, Self::Pending)
	}
}

/// A user decision on a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	/// Apply the suggestion.
	Accept,
	/// Discard the suggestion.
	Reject,
}

impl Decision {
	/// Terminal status this decision moves a change into.
	pub fn status(self) -> ChangeStatus {
		match self {
			Self::Accept => ChangeStatus::Accepted,
			Self::Reject => ChangeStatus::Rejected,
		}
	}
}

impl From<bool> for Decision {
	fn from(accept: bool) -> Self {
		if accept { Self::Accept } else { Self::Reject }
	}
}

/// Why a change no longer lines up with the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
	/// The span ends past the end of the document.
	OutOfRange {
		/// Document length in characters.
		len: usize,
	},
	/// The text under the span differs from what the change expects there.
	TextMismatch,
}

/// Derived validity of a change against the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanHealth {
	/// The span still covers the expected text.
	Valid,
	/// The span needs user re-validation.
	Stale(StaleReason),
}

impl SpanHealth {
	/// Returns true for any stale state.
	pub fn is_stale(&self) -> bool {
		matches!(self, Self::Stale(_))
	}
}

/// A single tracked edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
	/// Stable identifier.
	pub id: ChangeId,
	/// Position in the current document.
	pub span: Span,
	/// Text the change removes or replaces.
	pub original_text: String,
	/// Text the change inserts.
	pub suggested_text: String,
	/// Closed change kind.
	pub kind: ChangeKind,
	/// Resolution status.
	pub status: ChangeStatus,
	/// Human-readable rationale.
	pub explanation: String,
	/// Provenance bag (template, chat turn, ...).
	pub metadata: BTreeMap<String, String>,
	/// Creation timestamp.
	pub created_at: DateTime<Utc>,
}

impl Change {
	/// Creates a pending change, inferring its kind from the two texts.
	pub fn new(span: Span, original_text: impl Into<String>, suggested_text: impl Into<String>) -> Self {
		let original_text = original_text.into();
		let suggested_text = suggested_text.into();
		Self {
			id: ChangeId::new(),
			span,
			kind: ChangeKind::infer(&original_text, &suggested_text),
			original_text,
			suggested_text,
			status: ChangeStatus::Pending,
			explanation: String::new(),
			metadata: BTreeMap::new(),
			created_at: Utc::now(),
		}
	}

	/// Creates a pure addition at `at`.
	pub fn addition(at: usize, text: impl Into<String>) -> Self {
		Self::new(Span::point(at), String::new(), text)
	}

	/// Creates a pure deletion of `span`, which must currently hold `original`.
	pub fn deletion(span: Span, original: impl Into<String>) -> Self {
		Self::new(span, original, String::new())
	}

	/// Creates a replacement of `span`.
	pub fn replacement(span: Span, original: impl Into<String>, suggested: impl Into<String>) -> Self {
		Self::new(span, original, suggested)
	}

	/// Sets the id.
	pub fn with_id(mut self, id: ChangeId) -> Self {
		self.id = id;
		self
	}

	/// Overrides the inferred kind.
	pub fn with_kind(mut self, kind: ChangeKind) -> Self {
		self.kind = kind;
		self
	}

	/// Sets the explanation.
	pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
		self.explanation = explanation.into();
		self
	}

	/// Adds a metadata entry.
	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}

	/// Returns true while awaiting a decision.
	pub fn is_pending(&self) -> bool {
		self.status == ChangeStatus::Pending
	}

	/// Text the document is expected to hold inside the span.
	pub fn expected_text(&self, preview: PreviewMode) -> &str {
		match preview {
			PreviewMode::Off => &self.original_text,
			PreviewMode::Inline => &self.suggested_text,
		}
	}

	/// Checks the span against the live document.
	///
	/// This is derived on every call and never stored: a change whose span
	/// degenerated under remapping, or whose text was edited by the user, is
	/// reported stale but stays tracked.
	pub fn health(&self, content: RopeSlice, preview: PreviewMode) -> SpanHealth {
		let len = content.len_chars();
		if !self.span.in_bounds(len) {
			return SpanHealth::Stale(StaleReason::OutOfRange { len });
		}
		if span_matches(content, self.span, self.expected_text(preview)) {
			SpanHealth::Valid
		} else {
			SpanHealth::Stale(StaleReason::TextMismatch)
		}
	}
}
