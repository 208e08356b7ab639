use serde::{Deserialize, Serialize};

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for every tracked suggestion.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open character range `[from, to)` in document coordinates.
///
/// Unlike a selection there is no direction: `from <= to` always holds.
/// A zero-width span (`from == to`) marks an insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
	/// Start of the span (inclusive).
	pub from: CharIdx,
	/// End of the span (exclusive).
	pub to: CharIdx,
}

impl Span {
	/// Creates a span, swapping the bounds if they are given in reverse.
	pub fn new(from: CharIdx, to: CharIdx) -> Self {
		Self {
			from: from.min(to),
			to: from.max(to),
		}
	}

	/// Creates a zero-width span at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self { from: pos, to: pos }
	}

	/// Creates a span starting at `from` covering `len` characters.
	///
	/// The end saturates at `CharIdx::MAX`.
	pub fn with_len(from: CharIdx, len: CharLen) -> Self {
		Self {
			from,
			to: from.saturating_add(len),
		}
	}

	/// Returns the length of the span in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.to - self.from
	}

	/// Returns true for a zero-width insertion point.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.from == self.to
	}

	/// Returns true if the position is within the span (exclusive of `to`).
	pub fn contains(&self, pos: CharIdx) -> bool {
		pos >= self.from && pos < self.to
	}

	/// Returns true if this span overlaps with another.
	///
	/// Two spans that merely touch do not overlap. A zero-width span overlaps
	/// a non-empty span only when it sits strictly inside it; two zero-width
	/// spans never overlap, since insertions at one point can be ordered.
	pub fn overlaps(&self, other: &Span) -> bool {
		match (self.is_empty(), other.is_empty()) {
			(true, true) => false,
			(true, false) => self.from > other.from && self.from < other.to,
			(false, true) => other.from > self.from && other.from < self.to,
			(false, false) => self.from < other.to && other.from < self.to,
		}
	}

	/// Returns the smallest span covering both.
	pub fn merge(&self, other: &Span) -> Self {
		Self {
			from: self.from.min(other.from),
			to: self.to.max(other.to),
		}
	}

	/// Returns true if the span fits inside a document of `len_chars` characters.
	pub fn in_bounds(&self, len_chars: CharLen) -> bool {
		self.to <= len_chars
	}

	/// Returns this span as a standard library range.
	pub fn as_range(&self) -> std::ops::Range<CharIdx> {
		self.from..self.to
	}
}

impl Default for Span {
	fn default() -> Self {
		Self::point(0)
	}
}

impl From<std::ops::Range<CharIdx>> for Span {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl std::fmt::Display for Span {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}..{}", self.from, self.to)
	}
}
