//! Minimal edit descriptions between an original and a suggested text.
//!
//! Both texts are split into tokens ([`Granularity`]) and aligned with the
//! Myers algorithm. Unchanged runs are dropped; every maximal run of
//! differing tokens becomes one [`ChangeOp`], so an adjacent delete/insert
//! pair is reported as a single replacement.

mod tokens;


use scribe_primitives::{CharIdx, CharLen, Span};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, capture_diff_slices};
use tracing::{trace, warn};

use self::tokens::{Tokens, char_boundaries};
use crate::change::{Change, ChangeKind};
use crate::config::DiffOptions;
use crate::error::DiffError;

/// One edit between the original and the suggested text.
///
/// Offsets are characters in the *original* text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOp {
	/// Addition, deletion or replacement.
	pub kind: ChangeKind,
	/// Start of the affected original range (inclusive).
	pub original_start: CharIdx,
	/// End of the affected original range (exclusive).
	pub original_end: CharIdx,
	/// Text to put in place of the original range.
	pub text: String,
}

impl ChangeOp {
	/// The affected original range.
	pub fn span(&self) -> Span {
		Span::new(self.original_start, self.original_end)
	}

	/// Builds a pending [`Change`] from this op.
	///
	/// `original` must be the text the op was computed against; `base_offset`
	/// is where that text starts in the document.
	pub fn to_change(&self, original: &str, base_offset: CharIdx) -> Change {
		let removed: String = original
			.chars()
			.skip(self.original_start)
			.take(self.original_end - self.original_start)
			.collect();
		let span = Span::new(base_offset + self.original_start, base_offset + self.original_end);
		Change::new(span, removed, self.text.clone()).with_kind(self.kind)
	}
}

/// Character counts of a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
	/// Characters present only in the suggested text.
	pub chars_inserted: CharLen,
	/// Characters present only in the original text.
	pub chars_deleted: CharLen,
	/// Characters kept as is.
	pub chars_unchanged: CharLen,
}

/// Computes the edit operations turning `original` into `suggested` using
/// default options.
pub fn compute_diff(original: &str, suggested: &str) -> Result<Vec<ChangeOp>, DiffError> {
	compute_diff_with(original, suggested, &DiffOptions::default())
}

/// Computes the edit operations turning `original` into `suggested`.
///
/// The result is deterministic and ordered by ascending `original_start`.
/// Inputs longer than [`DiffOptions::max_input_chars`] are refused.
pub fn compute_diff_with(
	original: &str,
	suggested: &str,
	options: &DiffOptions,
) -> Result<Vec<ChangeOp>, DiffError> {
	let original_len = original.chars().count();
	let suggested_len = suggested.chars().count();

	let longest = original_len.max(suggested_len);
	if longest > options.max_input_chars {
		return Err(DiffError::InputTooLarge {
			len: longest,
			limit: options.max_input_chars,
		});
	}

	if original == suggested {
		return Ok(Vec::new());
	}
	if original.is_empty() {
		return Ok(vec![ChangeOp {
			kind: ChangeKind::Addition,
			original_start: 0,
			original_end: 0,
			text: suggested.to_string(),
		}]);
	}
	if suggested.is_empty() {
		return Ok(vec![ChangeOp {
			kind: ChangeKind::Deletion,
			original_start: 0,
			original_end: original_len,
			text: String::new(),
		}]);
	}

	let old = Tokens::new(original, options.granularity);
	let new = Tokens::new(suggested, options.granularity);
	let raw = capture_diff_slices(Algorithm::Myers, &old.items, &new.items);

	let mut ops = Vec::new();
	let mut run: Option<(std::ops::Range<usize>, std::ops::Range<usize>)> = None;

	for op in &raw {
		let (tag, old_range, new_range) = op.as_tag_tuple();
		if tag == DiffTag::Equal {
			if let Some((old_run, new_run)) = run.take() {
				ops.push(make_op(&old, &new, old_run, new_run));
			}
			continue;
		}
		run = Some(match run.take() {
			Some((old_run, new_run)) => (old_run.start..old_range.end, new_run.start..new_range.end),
			None => (old_range, new_range),
		});
	}
	if let Some((old_run, new_run)) = run {
		ops.push(make_op(&old, &new, old_run, new_run));
	}

	trace!(
		granularity = ?options.granularity,
		original_len,
		suggested_len,
		ops = ops.len(),
		"diff.computed"
	);
	Ok(ops)
}

fn make_op(
	old: &Tokens<'_>,
	new: &Tokens<'_>,
	old_run: std::ops::Range<usize>,
	new_run: std::ops::Range<usize>,
) -> ChangeOp {
	let kind = match (old_run.is_empty(), new_run.is_empty()) {
		(true, _) => ChangeKind::Addition,
		(false, true) => ChangeKind::Deletion,
		(false, false) => ChangeKind::Replacement,
	};
	ChangeOp {
		kind,
		original_start: old.offset(old_run.start),
		original_end: old.offset(old_run.end),
		text: new.text(new_run),
	}
}

/// Replays `ops` onto `original` in ascending order.
///
/// For ops produced by [`compute_diff`] this reproduces the suggested text.
/// An op starting before the end of the previous one is skipped. Offsets
/// past the end of `original` are clamped to it.
pub fn apply_ops(original: &str, ops: &[ChangeOp]) -> String {
	let bounds = char_boundaries(original);
	let last = bounds.len() - 1;
	let byte = |idx: CharIdx| bounds[idx.min(last)];

	let mut out = String::with_capacity(original.len());
	let mut cursor = 0;
	for op in ops {
		if op.original_start < cursor {
			warn!(span = %op.span(), cursor, "diff.op_out_of_order");
			continue;
		}
		out.push_str(&original[byte(cursor)..byte(op.original_start)]);
		out.push_str(&op.text);
		cursor = op.original_end.max(op.original_start);
	}
	out.push_str(&original[byte(cursor)..]);
	out
}

/// Counts inserted, deleted and unchanged characters.
pub fn summarize(original: &str, ops: &[ChangeOp]) -> DiffSummary {
	let original_len = original.chars().count();
	let chars_deleted: CharLen = ops.iter().map(|op| op.original_end - op.original_start).sum();
	DiffSummary {
		chars_inserted: ops.iter().map(|op| op.text.chars().count()).sum(),
		chars_deleted,
		chars_unchanged: original_len.saturating_sub(chars_deleted),
	}
}
