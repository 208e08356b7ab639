use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::range::{CharIdx, CharLen, Span};
use crate::rope::{SpanError, replace_span};

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a mutation, bias determines whether the
/// position moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// Text inserted at a pre-mutation offset; only its length matters for mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
	/// Offset in the pre-mutation document.
	pub at: CharIdx,
	/// Number of characters inserted.
	pub length: CharLen,
}

/// A removed range in pre-mutation coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
	/// Start of the removed range (inclusive).
	pub from: CharIdx,
	/// End of the removed range (exclusive).
	pub to: CharIdx,
}

impl Deletion {
	/// Number of characters removed.
	pub fn len(&self) -> CharLen {
		self.to.saturating_sub(self.from)
	}

	/// Returns true if nothing is removed.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A document mutation notification.
///
/// All offsets refer to the document as it was *before* the mutation. An
/// insertion at the start of a deletion lands where the deleted text was,
/// which is how a replacement is expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
	/// Inserted runs.
	#[serde(default)]
	pub insertions: Vec<Insertion>,
	/// Removed ranges.
	#[serde(default)]
	pub deletions: Vec<Deletion>,
}

impl Mutation {
	/// Creates an empty mutation.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an insertion of `length` characters at `at`.
	pub fn insert(mut self, at: CharIdx, length: CharLen) -> Self {
		self.insertions.push(Insertion { at, length });
		self
	}

	/// Adds a deletion of `[from, to)`.
	pub fn delete(mut self, from: CharIdx, to: CharIdx) -> Self {
		self.deletions.push(Deletion {
			from: from.min(to),
			to: from.max(to),
		});
		self
	}

	/// Describes a single content edit as a mutation.
	pub fn from_edit(edit: &TextEdit) -> Self {
		Self::from_edits(std::iter::once(edit))
	}

	/// Describes a batch of content edits as one mutation.
	///
	/// The edits must all be expressed in the same (pre-batch) coordinate
	/// space and must not overlap, as produced by a descending-order
	/// application pass.
	pub fn from_edits<'a>(edits: impl IntoIterator<Item = &'a TextEdit>) -> Self {
		edits.into_iter().fold(Self::new(), |mutation, edit| {
			let mutation = if edit.span.is_empty() {
				mutation
			} else {
				mutation.delete(edit.span.from, edit.span.to)
			};
			match edit.char_len() {
				0 => mutation,
				len => mutation.insert(edit.span.from, len),
			}
		})
	}

	/// Returns true if the mutation changes nothing.
	pub fn is_empty(&self) -> bool {
		self.insertions.iter().all(|ins| ins.length == 0)
			&& self.deletions.iter().all(Deletion::is_empty)
	}
}

/// Sorts deletions and merges overlapping ranges.
///
/// Touching ranges stay apart so an insertion at their shared boundary keeps
/// its place between them.
pub(super) fn normalized_deletions(deletions: &[Deletion]) -> Vec<Deletion> {
	let mut sorted: Vec<Deletion> = deletions.iter().copied().filter(|d| !d.is_empty()).collect();
	sorted.sort_by_key(|d| (d.from, d.to));

	let mut out: Vec<Deletion> = Vec::with_capacity(sorted.len());
	for del in sorted {
		match out.last_mut() {
			Some(last) if del.from < last.to => last.to = last.to.max(del.to),
			_ => out.push(del),
		}
	}
	out
}

/// A content-replacement instruction: replace `span` with `text`.
///
/// This is what the engine hands the host document store; the host applies
/// it atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
	/// Range to replace, in the coordinates of the document the edit targets.
	pub span: Span,
	/// Replacement text.
	pub text: String,
}

impl TextEdit {
	/// Creates a replacement edit.
	pub fn new(span: Span, text: impl Into<String>) -> Self {
		Self {
			span,
			text: text.into(),
		}
	}

	/// Creates a pure insertion at `at`.
	pub fn insert(at: CharIdx, text: impl Into<String>) -> Self {
		Self::new(Span::point(at), text)
	}

	/// Creates a pure deletion of `span`.
	pub fn delete(span: Span) -> Self {
		Self::new(span, String::new())
	}

	/// Length of the replacement text in characters.
	pub fn char_len(&self) -> CharLen {
		self.text.chars().count()
	}

	/// Returns true if applying the edit cannot change the document.
	pub fn is_noop(&self) -> bool {
		self.span.is_empty() && self.text.is_empty()
	}

	/// Span the replacement occupies once applied.
	pub fn applied_span(&self) -> Span {
		Span::with_len(self.span.from, self.char_len())
	}

	/// Applies this edit to a document in place.
	pub fn apply(&self, doc: &mut Rope) -> Result<(), SpanError> {
		replace_span(doc, self.span, &self.text)
	}
}
