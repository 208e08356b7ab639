use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::diff::compute_diff;

const FOX: &str = "The quick brown fox jumps over the lazy dog.";

fn fox() -> Rope {
	Rope::from(FOX)
}

fn quick_to_fast() -> Change {
	Change::replacement(Span::new(4, 9), "quick", "fast")
}

fn jumps_to_leaps() -> Change {
	Change::replacement(Span::new(20, 25), "jumps", "leaps")
}

fn registry(changes: impl IntoIterator<Item = Change>) -> ChangeRegistry {
	ChangeRegistry::from_changes(changes).unwrap()
}

fn retain() -> ResolveOptions {
	ResolveOptions {
		retention: Retention::Retain,
		..ResolveOptions::default()
	}
}

fn apply_all(content: &Rope, edits: &[TextEdit]) -> Rope {
	let mut content = content.clone();
	for edit in edits {
		edit.apply(&mut content).unwrap();
	}
	content
}

#[test]
fn accept_single_replacement() {
	let change = quick_to_fast();
	let id = change.id;
	let reg = registry([change]);

	let res = resolve_one(&reg, &fox(), id, Decision::Accept, &ResolveOptions::default()).unwrap();

	assert_eq!(res.content.to_string(), "The fast brown fox jumps over the lazy dog.");
	assert!(res.registry.is_empty());
	assert_eq!(res.edits, vec![TextEdit::new(Span::new(4, 9), "fast")]);
	assert_eq!(apply_all(&fox(), &res.edits), res.content);
}

#[test]
fn reject_leaves_content_unchanged() {
	let change = quick_to_fast();
	let id = change.id;
	let reg = registry([change]);

	let res = resolve_one(&reg, &fox(), id, Decision::Reject, &ResolveOptions::default()).unwrap();

	assert_eq!(res.content.to_string(), FOX);
	assert!(res.is_content_unchanged());
	assert!(res.registry.pending().is_empty());
}

#[test]
fn bulk_accept_two_changes() {
	let reg = registry([jumps_to_leaps(), quick_to_fast()]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &ResolveOptions::default());

	assert_eq!(res.content.to_string(), "The fast brown fox leaps over the lazy dog.");
	assert!(res.registry.is_empty());
	// Applied top-down, both edits stay in the caller's coordinates.
	assert_eq!(
		res.edits,
		vec![
			TextEdit::new(Span::new(20, 25), "leaps"),
			TextEdit::new(Span::new(4, 9), "fast"),
		]
	);
	assert_eq!(apply_all(&fox(), &res.edits), res.content);
}

#[test]
fn unknown_id_is_not_found() {
	let reg = registry([quick_to_fast()]);
	let missing = ChangeId::new();
	let err = resolve_one(&reg, &fox(), missing, Decision::Accept, &ResolveOptions::default()).unwrap_err();
	assert_eq!(err, ResolveError::NotFound(missing));
}

#[test]
fn terminal_change_cannot_be_resolved_again() {
	let change = quick_to_fast();
	let id = change.id;
	let reg = registry([change]);

	let first = resolve_one(&reg, &fox(), id, Decision::Accept, &retain()).unwrap();
	assert_eq!(first.registry.get(id).unwrap().status, ChangeStatus::Accepted);

	let err = resolve_one(&first.registry, &first.content, id, Decision::Reject, &retain()).unwrap_err();
	assert_eq!(err, ResolveError::AlreadyResolved(id));
}

#[test]
fn out_of_range_change_fails_and_stays_pending() {
	let change = quick_to_fast();
	let id = change.id;
	let reg = registry([change]);
	let short = Rope::from("The");

	let err = resolve_one(&reg, &short, id, Decision::Accept, &ResolveOptions::default()).unwrap_err();
	assert!(matches!(err, ResolveError::OutOfRange { id: err_id, .. } if err_id == id));
	assert!(reg.get(id).unwrap().is_pending());
}

#[test]
fn accept_shifts_later_changes() {
	let first = quick_to_fast();
	let second = jumps_to_leaps();
	let (first_id, second_id) = (first.id, second.id);
	let reg = registry([first, second]);

	let res = resolve_one(&reg, &fox(), first_id, Decision::Accept, &ResolveOptions::default()).unwrap();

	let moved = res.registry.get(second_id).unwrap();
	assert_eq!(moved.span, Span::new(19, 24));
	assert_eq!(moved.health(res.content.slice(..), PreviewMode::Off), crate::SpanHealth::Valid);
}

#[test]
fn change_ending_at_resolved_start_keeps_its_end() {
	let before = Change::replacement(Span::new(0, 4), "The ", "A ");
	let insert = Change::addition(4, "very ");
	let (before_id, insert_id) = (before.id, insert.id);
	let reg = registry([before, insert]);

	let res = resolve_one(&reg, &fox(), insert_id, Decision::Accept, &ResolveOptions::default()).unwrap();

	assert_eq!(res.content.to_string(), "The very quick brown fox jumps over the lazy dog.");
	assert_eq!(res.registry.get(before_id).unwrap().span, Span::new(0, 4));
}

#[test]
fn retention_keeps_audit_trail_at_new_position() {
	let change = quick_to_fast();
	let id = change.id;
	let reg = registry([change]);

	let res = resolve_one(&reg, &fox(), id, Decision::Accept, &retain()).unwrap();

	let kept = res.registry.get(id).unwrap();
	assert_eq!(kept.status, ChangeStatus::Accepted);
	assert_eq!(kept.span, Span::new(4, 8));
	assert!(res.registry.pending().is_empty());
	assert_eq!(res.registry.counts().accepted, 1);
}

#[test]
fn bulk_retention_keeps_every_resolved_change() {
	let reg = registry([quick_to_fast(), jumps_to_leaps()]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &retain());

	let spans: Vec<Span> = res.registry.list().iter().map(|c| c.span).collect();
	assert_eq!(spans, vec![Span::new(4, 8), Span::new(19, 24)]);
	assert_eq!(res.registry.counts().accepted, 2);
	for change in res.registry.list() {
		assert_eq!(res.content.slice(change.span.as_range()).to_string(), change.suggested_text);
	}
}

#[test]
fn inline_preview_reject_restores_original() {
	let preview = ResolveOptions {
		preview: PreviewMode::Inline,
		..ResolveOptions::default()
	};
	let shown = Rope::from("The fast brown fox");
	let change = Change::replacement(Span::new(4, 8), "quick", "fast");
	let id = change.id;
	let reg = registry([change]);

	let rejected = resolve_one(&reg, &shown, id, Decision::Reject, &preview).unwrap();
	assert_eq!(rejected.content.to_string(), "The quick brown fox");

	let accepted = resolve_one(&reg, &shown, id, Decision::Accept, &preview).unwrap();
	assert_eq!(accepted.content, shown);
	assert!(accepted.edits.is_empty());
}

#[test]
fn inline_preview_reject_removes_previewed_addition() {
	let preview = ResolveOptions {
		preview: PreviewMode::Inline,
		..ResolveOptions::default()
	};
	let shown = Rope::from("The very quick fox");
	let change = Change::new(Span::new(4, 9), "", "very ");
	let id = change.id;
	let reg = registry([change]);

	let res = resolve_one(&reg, &shown, id, Decision::Reject, &preview).unwrap();
	assert_eq!(res.content.to_string(), "The quick fox");
}

#[test]
fn formatting_change_leaves_characters_alone() {
	let change = Change::new(Span::new(4, 9), "quick", "quick");
	assert_eq!(change.kind, ChangeKind::Formatting);
	let id = change.id;
	let reg = registry([change]);

	let res = resolve_one(&reg, &fox(), id, Decision::Accept, &ResolveOptions::default()).unwrap();
	assert_eq!(res.content.to_string(), FOX);
	assert!(res.registry.is_empty());
}

#[test]
fn overlapping_changes_are_skipped_by_default() {
	let low = quick_to_fast();
	let high = Change::replacement(Span::new(7, 15), "ck brown", "ck red");
	let (low_id, high_id) = (low.id, high.id);
	let reg = registry([low, high]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &ResolveOptions::default());

	assert_eq!(res.content.to_string(), "The quick red fox jumps over the lazy dog.");
	assert_eq!(
		res.outcomes,
		vec![
			Outcome::Applied {
				id: high_id,
				status: ChangeStatus::Accepted,
				edit: Some(TextEdit::new(Span::new(7, 15), "ck red")),
			},
			Outcome::SkippedOverlap { id: low_id },
		]
	);
	let left = res.registry.get(low_id).unwrap();
	assert!(left.is_pending());
	assert!(left.health(res.content.slice(..), PreviewMode::Off).is_stale());
}

#[test]
fn skipped_change_does_not_absorb_touching_accepted_text() {
	let content = Rope::from("xxxxBBBBBAAAyyyy");
	let upper = Change::replacement(Span::new(9, 12), "AAA", "AAAAA");
	let lower = Change::replacement(Span::new(4, 9), "BBBBB", "B");
	let straddling = Change::replacement(Span::new(2, 6), "xxBB", "zz");
	let straddling_id = straddling.id;
	let reg = registry([upper, lower, straddling]);

	let res = resolve_all(&reg, &content, Decision::Accept, &ResolveOptions::default());

	assert_eq!(res.content.to_string(), "xxxxBAAAAAyyyy");
	assert_eq!(res.skipped().collect::<Vec<_>>(), vec![straddling_id]);
	let left = res.registry.get(straddling_id).unwrap();
	assert_eq!(left.span, Span::new(2, 5));
	assert_eq!(apply_all(&content, &res.inverse_edits).to_string(), "xxxxBBBBBAAAyyyy");
}

#[test]
fn apply_in_order_clamps_overlapping_change() {
	let options = ResolveOptions {
		overlap: OverlapPolicy::ApplyInOrder,
		..ResolveOptions::default()
	};
	let low = quick_to_fast();
	let high = Change::replacement(Span::new(7, 15), "ck brown", "ck red");
	let reg = registry([low, high]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &options);

	assert_eq!(res.content.to_string(), "The fastck red fox jumps over the lazy dog.");
	assert_eq!(res.edits[1], TextEdit::new(Span::new(4, 7), "fast"));
	assert!(res.registry.is_empty());
	assert_eq!(apply_all(&fox(), &res.edits), res.content);
}

#[test]
fn bulk_reject_without_preview_touches_nothing() {
	let low = quick_to_fast();
	let high = Change::replacement(Span::new(7, 15), "ck brown", "ck red");
	let reg = registry([low, high]);

	let res = resolve_all(&reg, &fox(), Decision::Reject, &ResolveOptions::default());

	assert_eq!(res.content.to_string(), FOX);
	assert!(res.registry.is_empty());
	assert_eq!(res.applied().count(), 2);
}

#[test]
fn bulk_skips_out_of_range_changes() {
	let inside = quick_to_fast();
	let outside = Change::replacement(Span::new(40, 60), "?", "!");
	let outside_id = outside.id;
	let reg = registry([inside, outside]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &ResolveOptions::default());

	assert_eq!(res.content.to_string(), "The fast brown fox jumps over the lazy dog.");
	assert_eq!(res.skipped().collect::<Vec<_>>(), vec![outside_id]);
	assert!(res.registry.get(outside_id).unwrap().is_pending());
}

#[test]
fn bulk_leaves_already_resolved_entries_alone() {
	let mut done = Change::replacement(Span::new(35, 39), "lazy", "idle");
	done.status = ChangeStatus::Rejected;
	let done_id = done.id;
	let reg = registry([quick_to_fast(), done]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &ResolveOptions::default());

	let kept = res.registry.get(done_id).unwrap();
	assert_eq!(kept.status, ChangeStatus::Rejected);
	assert_eq!(kept.span, Span::new(34, 38));
	assert_eq!(res.registry.len(), 1);
}

#[test]
fn inverse_edits_restore_content() {
	let reg = registry([quick_to_fast(), jumps_to_leaps(), Change::addition(44, " Woof!")]);

	let res = resolve_all(&reg, &fox(), Decision::Accept, &ResolveOptions::default());
	assert_eq!(apply_all(&res.content, &res.inverse_edits), fox());
}

#[test]
fn rejection_is_idempotent_for_the_diff() {
	let suggested = "The fast brown fox jumps over the lazy dog.";
	let before = compute_diff(FOX, suggested).unwrap();
	let changes: Vec<Change> = before.iter().map(|op| op.to_change(FOX, 0)).collect();
	let id = changes[0].id;
	let reg = registry(changes);

	let res = resolve_one(&reg, &fox(), id, Decision::Reject, &ResolveOptions::default()).unwrap();
	let after = compute_diff(&res.content.to_string(), suggested).unwrap();
	assert_eq!(after, before);
}

/// Lays out alternating gaps and spans; each span becomes a replacement.
fn layout(segments: &[(usize, usize, String)]) -> (Rope, Vec<Change>) {
	let mut text = String::new();
	let mut changes = Vec::new();
	for (gap, len, suggested) in segments {
		text.push_str(&"x".repeat(*gap));
		let from = text.chars().count();
		let original = "o".repeat(*len);
		text.push_str(&original);
		changes.push(Change::new(Span::new(from, from + len), original, suggested.clone()));
	}
	(Rope::from(text), changes)
}

#[test]
fn prop_bulk_accept_matches_sequential_accept() {
	proptest!(|(segments in prop::collection::vec((0usize..3, 0usize..3, "[A-Z]{0,3}"), 0..8))| {
		let (content, changes) = layout(&segments);
		let reg = registry(changes);
		let options = ResolveOptions::default();

		let bulk = resolve_all(&reg, &content, Decision::Accept, &options);

		let mut order = reg.pending();
		order.sort_by(|a, b| order_key(&reg, b).cmp(&order_key(&reg, a)));
		let ids: Vec<ChangeId> = order.iter().map(|c| c.id).collect();

		let mut current = reg.clone();
		let mut text = content.clone();
		for id in ids {
			let step = resolve_one(&current, &text, id, Decision::Accept, &options).unwrap();
			current = step.registry;
			text = step.content;
		}

		prop_assert_eq!(bulk.content.to_string(), text.to_string());
		prop_assert!(bulk.registry.is_empty());
		prop_assert!(current.is_empty());
	});
}

#[test]
fn prop_survivors_keep_their_text() {
	proptest!(|(segments in prop::collection::vec((1usize..3, 1usize..3, "[A-Z]{0,3}"), 1..8), pick in 0usize..8)| {
		let (content, changes) = layout(&segments);
		let id = changes[pick % changes.len()].id;
		let reg = registry(changes);

		let res = resolve_one(&reg, &content, id, Decision::Accept, &ResolveOptions::default()).unwrap();
		for change in res.registry.list() {
			prop_assert_eq!(change.health(res.content.slice(..), PreviewMode::Off), crate::SpanHealth::Valid);
		}
	});
}
