//! Keeps tracked spans attached to their text across document mutations.
//!
//! Call [`remap`] for every mutation that did not come from the resolution
//! engine (typed edits, external changes). Resolution updates the registry
//! itself.

use scribe_primitives::{Mutation, PositionMap, RopeSlice};
use tracing::{debug, trace};

use crate::change::{ChangeId, SpanHealth};
use crate::config::PreviewMode;
use crate::registry::ChangeRegistry;

/// Returns a registry whose spans follow `mutation`.
///
/// Offsets before an insertion point stay; offsets at or after it shift by
/// the inserted length. Offsets inside a deleted range collapse to its start,
/// offsets after it shift left. A change whose text was removed keeps its
/// (now degenerate) span and reports stale through [`SpanHealth`].
pub fn remap(registry: &ChangeRegistry, mutation: &Mutation) -> ChangeRegistry {
	if mutation.is_empty() || registry.is_empty() {
		return registry.clone();
	}

	let map = PositionMap::from_mutation(mutation);
	let moved: Vec<_> = registry
		.iter()
		.filter_map(|change| {
			let span = map.map_span(change.span);
			if span == change.span {
				return None;
			}
			trace!(change = %change.id, from = %change.span, to = %span, "mapper.moved");
			let mut change = change.clone();
			change.span = span;
			Some(change)
		})
		.collect();

	debug!(
		insertions = mutation.insertions.len(),
		deletions = mutation.deletions.len(),
		moved = moved.len(),
		"mapper.remap"
	);
	registry.replace_all(moved)
}

/// Health of every pending change against the live document, in span order.
pub fn validate(
	registry: &ChangeRegistry,
	content: RopeSlice,
	preview: PreviewMode,
) -> Vec<(ChangeId, SpanHealth)> {
	registry
		.pending()
		.into_iter()
		.map(|change| (change.id, change.health(content, preview)))
		.collect()
}

/// Ids of pending changes that need re-validation.
pub fn stale_ids(registry: &ChangeRegistry, content: RopeSlice, preview: PreviewMode) -> Vec<ChangeId> {
	validate(registry, content, preview)
		.into_iter()
		.filter(|(_, health)| health.is_stale())
		.map(|(id, _)| id)
		.collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use scribe_primitives::{Rope, Span, TextEdit};

	use super::*;
	use crate::change::{Change, StaleReason};

	fn tracked(span: Span) -> (ChangeRegistry, ChangeId) {
		let change = Change::replacement(span, "quick", "fast");
		let id = change.id;
		(ChangeRegistry::new().add(change).unwrap(), id)
	}

	fn span_after(mutation: Mutation) -> Span {
		let (registry, id) = tracked(Span::new(10, 15));
		remap(&registry, &mutation).get(id).unwrap().span
	}

	#[test]
	fn insertion_before_shifts_right() {
		assert_eq!(span_after(Mutation::new().insert(5, 3)), Span::new(13, 18));
	}

	#[test]
	fn insertion_after_leaves_span() {
		assert_eq!(span_after(Mutation::new().insert(20, 3)), Span::new(10, 15));
	}

	#[test]
	fn deletion_before_shifts_left() {
		assert_eq!(span_after(Mutation::new().delete(0, 8)), Span::new(2, 7));
	}

	#[test]
	fn deletion_overlapping_start_collapses_front() {
		assert_eq!(span_after(Mutation::new().delete(8, 12)), Span::new(8, 11));
	}

	#[test]
	fn combined_mutation_uses_pre_mutation_offsets() {
		let mutation = Mutation::new().insert(2, 4).delete(16, 30);
		assert_eq!(span_after(mutation), Span::new(14, 19));
	}

	#[test]
	fn empty_mutation_returns_same_snapshot() {
		let (registry, _) = tracked(Span::new(10, 15));
		assert!(remap(&registry, &Mutation::new()).ptr_eq(&registry));
	}

	#[test]
	fn remap_keeps_old_snapshot() {
		let (registry, id) = tracked(Span::new(10, 15));
		let _ = remap(&registry, &Mutation::new().insert(0, 1));
		assert_eq!(registry.get(id).unwrap().span, Span::new(10, 15));
	}

	#[test]
	fn deleted_text_turns_change_stale_but_keeps_it() {
		let mut doc = Rope::from("The quick brown fox");
		let (registry, id) = tracked(Span::new(4, 9));

		let edit = TextEdit::delete(Span::new(2, 12));
		edit.apply(&mut doc).unwrap();
		let registry = remap(&registry, &Mutation::from_edit(&edit));

		assert_eq!(registry.get(id).unwrap().span, Span::point(2));
		assert_eq!(
			validate(&registry, doc.slice(..), PreviewMode::Off),
			vec![(id, SpanHealth::Stale(StaleReason::TextMismatch))]
		);
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn unrelated_edit_keeps_change_valid() {
		let mut doc = Rope::from("The quick brown fox");
		let (registry, id) = tracked(Span::new(4, 9));

		let edit = TextEdit::insert(0, "Look! ");
		edit.apply(&mut doc).unwrap();
		let registry = remap(&registry, &Mutation::from_edit(&edit));

		assert_eq!(registry.get(id).unwrap().span, Span::new(10, 15));
		assert!(stale_ids(&registry, doc.slice(..), PreviewMode::Off).is_empty());
	}

	#[test]
	fn truncated_document_reports_out_of_range() {
		let (registry, id) = tracked(Span::new(4, 9));
		let doc = Rope::from("The");
		assert_eq!(
			validate(&registry, doc.slice(..), PreviewMode::Off),
			vec![(id, SpanHealth::Stale(StaleReason::OutOfRange { len: 3 }))]
		);
	}
}
