use std::collections::BTreeMap;

use scribe_primitives::{CharIdx, Span};
use serde::{Deserialize, Serialize};

use crate::change::{Change, ChangeKind};
use crate::error::IngestError;

/// A completed reply from the suggestion source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
	/// Positioned suggestions, in any order.
	#[serde(default)]
	pub suggestions: Vec<SuggestedEdit>,
}

impl SuggestionResponse {
	/// Parses a JSON payload. Both `snake_case` and `camelCase` field names
	/// are accepted.
	pub fn from_json(payload: &str) -> Result<Self, IngestError> {
		Ok(serde_json::from_str(payload)?)
	}
}

/// Character range a suggestion applies to, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
	/// Start offset (inclusive).
	pub start: CharIdx,
	/// End offset (exclusive).
	pub end: CharIdx,
}

impl From<Position> for Span {
	fn from(position: Position) -> Self {
		Span::new(position.start, position.end)
	}
}

/// One positioned suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedEdit {
	/// Text currently in the document at `position`.
	#[serde(alias = "originalText")]
	pub original_text: String,
	/// Proposed replacement text.
	#[serde(alias = "suggestedText")]
	pub suggested_text: String,
	/// Character range of `original_text` in the document.
	pub position: Position,
	/// Why the change is proposed; may be empty.
	#[serde(default)]
	pub explanation: String,
	/// Overrides the kind inferred from the two texts.
	#[serde(default)]
	pub kind: Option<ChangeKind>,
	/// Free-form tags copied onto the tracked change.
	#[serde(default)]
	pub metadata: BTreeMap<String, String>,
}

impl SuggestedEdit {
	/// Builds a pending change with a fresh id.
	pub fn to_change(&self) -> Change {
		let mut change = Change::new(
			self.position.into(),
			self.original_text.clone(),
			self.suggested_text.clone(),
		)
		.with_explanation(self.explanation.clone());
		if let Some(kind) = self.kind {
			change = change.with_kind(kind);
		}
		change.metadata.extend(self.metadata.clone());
		change
	}
}
