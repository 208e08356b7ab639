//! Presentation-neutral markers derived from a registry snapshot.
//!
//! Markers hold no state of their own; recompute them whenever the registry
//! or the content changes.

use scribe_primitives::{RopeSlice, Span};
use serde::Serialize;

use crate::change::{Change, ChangeId, ChangeKind};
use crate::config::PreviewMode;
use crate::registry::ChangeRegistry;

/// Longest excerpt of change text quoted in a generated title.
const TITLE_EXCERPT_CHARS: usize = 40;

/// Visual treatment of a marker, one per [`ChangeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualKind {
	/// Inserted text.
	Underline,
	/// Removed text.
	Strikethrough,
	/// Removed text shown next to its replacement.
	StrikethroughWithInsertion,
	/// Text whose formatting changes.
	Highlight,
}

impl From<ChangeKind> for VisualKind {
	fn from(kind: ChangeKind) -> Self {
		match kind {
			ChangeKind::Addition => Self::Underline,
			ChangeKind::Deletion => Self::Strikethrough,
			ChangeKind::Replacement => Self::StrikethroughWithInsertion,
			ChangeKind::Formatting => Self::Highlight,
		}
	}
}

/// One change as the UI should draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
	/// Change this marker belongs to.
	pub change_id: ChangeId,
	/// Range to decorate.
	pub span: Span,
	/// Visual treatment.
	pub visual_kind: VisualKind,
	/// Tooltip text.
	pub title: String,
	/// Overlaps another pending change.
	pub overlapping: bool,
	/// No longer lines up with the document. Only filled by
	/// [`project_with_content`].
	pub stale: bool,
}

/// Markers for every pending change, in span order.
pub fn project(registry: &ChangeRegistry) -> Vec<Marker> {
	let overlapping = registry.overlapping_ids();
	registry
		.pending()
		.into_iter()
		.map(|change| marker(change, overlapping.binary_search(&change.id).is_ok(), false))
		.collect()
}

/// Like [`project`], with staleness checked against `content`.
pub fn project_with_content(registry: &ChangeRegistry, content: RopeSlice, preview: PreviewMode) -> Vec<Marker> {
	let overlapping = registry.overlapping_ids();
	registry
		.pending()
		.into_iter()
		.map(|change| {
			marker(
				change,
				overlapping.binary_search(&change.id).is_ok(),
				change.health(content, preview).is_stale(),
			)
		})
		.collect()
}

fn marker(change: &Change, overlapping: bool, stale: bool) -> Marker {
	Marker {
		change_id: change.id,
		span: change.span,
		visual_kind: change.kind.into(),
		title: title(change),
		overlapping,
		stale,
	}
}

/// Tooltip: the explanation when there is one, otherwise a description of
/// the edit.
pub fn title(change: &Change) -> String {
	if !change.explanation.trim().is_empty() {
		return change.explanation.clone();
	}
	let original = excerpt(&change.original_text);
	let suggested = excerpt(&change.suggested_text);
	match change.kind {
		ChangeKind::Addition => format!("Insert \"{suggested}\""),
		ChangeKind::Deletion => format!("Delete \"{original}\""),
		ChangeKind::Replacement => format!("Replace \"{original}\" with \"{suggested}\""),
		ChangeKind::Formatting => format!("Reformat \"{original}\""),
	}
}

fn excerpt(text: &str) -> String {
	let mut chars = text.chars();
	let head: String = chars.by_ref().take(TITLE_EXCERPT_CHARS).collect();
	if chars.next().is_some() { format!("{head}…") } else { head }
}
