//! Applies accept/reject decisions to the document content and the registry.
//!
//! Content is never mutated in place: every call returns a [`Resolution`]
//! holding the new content, the new registry snapshot, and the
//! [`TextEdit`]s the host must apply to its own document store.
//!
//! Bulk resolution consumes changes in descending span order, so an applied
//! edit only ever touches text above every change still waiting. Each edit is
//! therefore valid in the coordinates of the content passed in.

#[cfg(test)]
mod tests;

use scribe_primitives::{Bias, Mutation, PositionMap, Rope, Span, TextEdit, check_span, span_text};
use tracing::{debug, warn};

use crate::change::{Change, ChangeId, ChangeKind, ChangeStatus, Decision};
use crate::config::{OverlapPolicy, PreviewMode, ResolveOptions, Retention};
use crate::error::ResolveError;
use crate::registry::ChangeRegistry;

/// What happened to one change during a resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The change reached a terminal status.
	Applied {
		/// Resolved change.
		id: ChangeId,
		/// Its new status.
		status: ChangeStatus,
		/// Content edit applied for it, if the content had to change.
		edit: Option<TextEdit>,
	},
	/// Left pending: its span overlaps a change applied earlier in the pass.
	SkippedOverlap {
		/// Skipped change.
		id: ChangeId,
	},
	/// Left pending: its span does not fit the document.
	SkippedOutOfRange {
		/// Skipped change.
		id: ChangeId,
	},
}

impl Outcome {
	/// The change this outcome is about.
	pub fn id(&self) -> ChangeId {
		match self {
			Self::Applied { id, .. } | Self::SkippedOverlap { id } | Self::SkippedOutOfRange { id } => *id,
		}
	}

	/// Returns true if the change was resolved.
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied { .. })
	}
}

/// Result of a resolution call.
#[derive(Debug, Clone)]
pub struct Resolution {
	/// Content after every edit was applied.
	pub content: Rope,
	/// Registry after status transitions, retention and span shifts.
	pub registry: ChangeRegistry,
	/// Edits in application order, each in the coordinates of the content
	/// passed in. Applying them in order to that content yields
	/// [`content`](Self::content).
	pub edits: Vec<TextEdit>,
	/// Edits undoing [`edits`](Self::edits), in the coordinates of the new
	/// content and in descending order.
	pub inverse_edits: Vec<TextEdit>,
	/// One entry per change the call looked at.
	pub outcomes: Vec<Outcome>,
}

impl Resolution {
	/// Ids of resolved changes.
	pub fn applied(&self) -> impl Iterator<Item = ChangeId> + '_ {
		self.outcomes.iter().filter(|o| o.is_applied()).map(Outcome::id)
	}

	/// Ids of changes left pending.
	pub fn skipped(&self) -> impl Iterator<Item = ChangeId> + '_ {
		self.outcomes.iter().filter(|o| !o.is_applied()).map(Outcome::id)
	}

	/// Returns true if the content did not change.
	pub fn is_content_unchanged(&self) -> bool {
		self.edits.is_empty()
	}
}

/// Content edit needed to resolve `change`, if any.
///
/// Without preview the content holds the original text, so only acceptance
/// touches it. With inline preview the content already shows the suggestion,
/// so only rejection does. Formatting changes never alter characters.
fn content_edit(change: &Change, decision: Decision, preview: PreviewMode) -> Option<TextEdit> {
	let text = match (decision, preview) {
		(Decision::Accept, PreviewMode::Off) => &change.suggested_text,
		(Decision::Reject, PreviewMode::Inline) => &change.original_text,
		(Decision::Accept, PreviewMode::Inline) | (Decision::Reject, PreviewMode::Off) => return None,
	};
	match change.kind {
		ChangeKind::Addition | ChangeKind::Deletion | ChangeKind::Replacement => {
			let edit = TextEdit::new(change.span, text.as_str());
			(!edit.is_noop()).then_some(edit)
		}
		ChangeKind::Formatting => None,
	}
}

/// Descending application order: larger start first, then larger end, then
/// later insertion.
fn order_key(registry: &ChangeRegistry, change: &Change) -> (usize, usize, usize) {
	(
		change.span.from,
		change.span.to,
		registry.insertion_rank(change.id).unwrap_or_default(),
	)
}

/// Maps a surviving span through an applied edit.
///
/// A non-empty span ending where the edit starts keeps its end; it must not
/// absorb the new text.
fn shift_survivor(map: &PositionMap, span: Span, from_bias: Bias) -> Span {
	let to_bias = if span.is_empty() { from_bias } else { Bias::Left };
	Span::new(map.map_pos(span.from, from_bias), map.map_pos(span.to, to_bias))
}

/// Resolves one pending change.
///
/// Surviving changes are shifted by the applied edit, so the host does not
/// need to report the edit back through [`remap`](crate::mapper::remap).
pub fn resolve_one(
	registry: &ChangeRegistry,
	content: &Rope,
	id: ChangeId,
	decision: Decision,
	options: &ResolveOptions,
) -> Result<Resolution, ResolveError> {
	let change = registry.get(id).ok_or(ResolveError::NotFound(id))?;
	if !change.is_pending() {
		return Err(ResolveError::AlreadyResolved(id));
	}
	check_span(content.slice(..), change.span).map_err(|source| {
		warn!(change = %id, span = %change.span, "resolve.out_of_range");
		ResolveError::OutOfRange { id, source }
	})?;

	let mut new_content = content.clone();
	let mut inverse_edits = Vec::new();
	let edit = content_edit(change, decision, options.preview);
	if let Some(edit) = &edit {
		let out_of_range = |source| ResolveError::OutOfRange { id, source };
		let removed = span_text(content.slice(..), edit.span).map_err(out_of_range)?;
		edit.apply(&mut new_content).map_err(out_of_range)?;
		inverse_edits.push(TextEdit::new(edit.applied_span(), removed));
	}

	let mut survivors = Vec::new();
	if let Some(edit) = &edit {
		let map = PositionMap::from_mutation(&Mutation::from_edit(edit));
		let key = order_key(registry, change);
		for other in registry.iter().filter(|other| other.id != id) {
			// Changes at the same start that bulk resolution would process
			// after this one stay in front of its text.
			let other_key = order_key(registry, other);
			let from_bias = if other.span.from == change.span.from && other_key < key {
				Bias::Left
			} else {
				Bias::Right
			};
			let span = shift_survivor(&map, other.span, from_bias);
			if span != other.span {
				let mut other = other.clone();
				other.span = span;
				survivors.push(other);
			}
		}
	}

	let status = decision.status();
	let registry = match options.retention {
		Retention::Remove => registry.replace_all(survivors).remove(id),
		Retention::Retain => {
			let mut resolved = change.clone();
			resolved.status = status;
			if let Some(edit) = &edit {
				resolved.span = edit.applied_span();
			}
			survivors.push(resolved);
			registry.replace_all(survivors)
		}
	};

	debug!(
		change = %id,
		?decision,
		content_changed = edit.is_some(),
		"resolve.one"
	);
	Ok(Resolution {
		content: new_content,
		registry,
		edits: edit.iter().cloned().collect(),
		inverse_edits,
		outcomes: vec![Outcome::Applied { id, status, edit }],
	})
}

/// An edit applied during a bulk pass.
struct Applied {
	id: ChangeId,
	edit: TextEdit,
	removed: String,
	final_span: Span,
}

/// Resolves every pending change with the same decision.
///
/// Changes are consumed in descending span order. Changes left pending by
/// the overlap policy or by an out-of-range span are reported in
/// [`Resolution::outcomes`] and shifted like any other survivor.
pub fn resolve_all(
	registry: &ChangeRegistry,
	content: &Rope,
	decision: Decision,
	options: &ResolveOptions,
) -> Resolution {
	let mut pending = registry.pending();
	pending.sort_by(|a, b| order_key(registry, b).cmp(&order_key(registry, a)));

	let len = content.len_chars();
	let status = decision.status();
	let mut new_content = content.clone();
	let mut applied: Vec<Applied> = Vec::new();
	let mut outcomes = Vec::with_capacity(pending.len());
	let mut resolved: Vec<ChangeId> = Vec::new();
	// Lowest start touched so far; content above it is already rewritten.
	let mut low_water = len;

	for change in pending {
		let id = change.id;
		if !change.span.in_bounds(len) {
			warn!(change = %id, span = %change.span, len, "resolve.out_of_range");
			outcomes.push(Outcome::SkippedOutOfRange { id });
			continue;
		}

		let Some(mut edit) = content_edit(change, decision, options.preview) else {
			resolved.push(id);
			outcomes.push(Outcome::Applied { id, status, edit: None });
			continue;
		};

		if applied.iter().any(|a| a.edit.span.overlaps(&edit.span)) {
			match options.overlap {
				OverlapPolicy::SkipOverlapping => {
					warn!(change = %id, span = %change.span, "resolve.skipped_overlap");
					outcomes.push(Outcome::SkippedOverlap { id });
					continue;
				}
				OverlapPolicy::ApplyInOrder => {}
			}
		}
		if edit.span.to > low_water {
			debug!(change = %id, span = %edit.span, low_water, "resolve.clamped");
			edit.span = Span::new(edit.span.from, low_water);
		}

		let removed = match span_text(new_content.slice(..), edit.span) {
			Ok(removed) => removed,
			Err(_) => {
				outcomes.push(Outcome::SkippedOutOfRange { id });
				continue;
			}
		};
		if edit.apply(&mut new_content).is_err() {
			outcomes.push(Outcome::SkippedOutOfRange { id });
			continue;
		}

		low_water = low_water.min(edit.span.from);
		resolved.push(id);
		outcomes.push(Outcome::Applied {
			id,
			status,
			edit: Some(edit.clone()),
		});
		applied.push(Applied {
			id,
			edit,
			removed,
			final_span: Span::default(),
		});
	}

	// Edits applied later sit at or below earlier ones and shift their text.
	let mut shift: isize = 0;
	for entry in applied.iter_mut().rev() {
		let from = entry.edit.span.from.saturating_add_signed(shift);
		entry.final_span = Span::with_len(from, entry.edit.char_len());
		shift += entry.edit.char_len() as isize - entry.edit.span.len() as isize;
	}

	let edits: Vec<TextEdit> = applied.iter().map(|a| a.edit.clone()).collect();
	let map = PositionMap::from_mutation(&Mutation::from_edits(&edits));

	let mut updated = Vec::new();
	for change in registry.iter() {
		let is_resolved = resolved.contains(&change.id);
		if is_resolved && options.retention == Retention::Remove {
			continue;
		}
		let mut change = change.clone();
		change.span = match applied.iter().find(|a| a.id == change.id) {
			Some(entry) => entry.final_span,
			None => shift_survivor(&map, change.span, Bias::Right),
		};
		if is_resolved {
			change.status = status;
		}
		updated.push(change);
	}

	let registry = match options.retention {
		Retention::Remove => registry.replace_all(updated).remove_all(&resolved),
		Retention::Retain => registry.replace_all(updated),
	};

	let skipped = outcomes.len() - resolved.len();
	debug!(
		?decision,
		resolved = resolved.len(),
		edits = edits.len(),
		skipped,
		"resolve.all"
	);

	Resolution {
		content: new_content,
		registry,
		inverse_edits: applied
			.into_iter()
			.map(|a| TextEdit::new(a.final_span, a.removed))
			.collect(),
		edits,
		outcomes,
	}
}
