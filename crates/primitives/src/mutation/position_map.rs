use super::types::{Bias, Mutation, normalized_deletions};
use crate::range::{CharIdx, CharLen, Span};

/// A single operation in a position map.
///
/// Operations walk the pre-mutation document from left to right: retained
/// characters keep their relative position, deleted characters collapse to
/// the deletion start, and inserted runs push everything after them right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N characters from the source document.
	Retain(CharLen),
	/// Delete the next N characters from the source document.
	Delete(CharLen),
	/// Insert N new characters at the current position.
	Insert(CharLen),
}

/// A compiled [`Mutation`]: a retain/delete/insert sequence used to map
/// pre-mutation positions into post-mutation coordinates.
///
/// The sequence covers the document only up to the last edit; positions past
/// it are shifted by the accumulated delta.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PositionMap {
	/// Sequence of retain/delete/insert operations.
	ops: Vec<Operation>,
	/// Source characters covered by `ops`.
	len: usize,
	/// Characters produced by `ops`.
	len_after: usize,
}

impl PositionMap {
	/// Creates an identity map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Compiles a mutation notification into a position map.
	///
	/// Overlapping deletions are merged; touching ones are not. An insertion
	/// that falls strictly inside a merged range is moved to that range's
	/// start.
	pub fn from_mutation(mutation: &Mutation) -> Self {
		let deletions = normalized_deletions(&mutation.deletions);

		let mut insertions: Vec<(CharIdx, CharLen)> = mutation
			.insertions
			.iter()
			.filter(|ins| ins.length > 0)
			.map(|ins| {
				let at = deletions
					.iter()
					.find(|d| d.from < ins.at && ins.at < d.to)
					.map_or(ins.at, |d| d.from);
				(at, ins.length)
			})
			.collect();
		insertions.sort_by_key(|(at, _)| *at);

		let mut map = Self::new();
		let mut cursor = 0;
		let mut pending = insertions.into_iter().peekable();

		for del in &deletions {
			while let Some((at, length)) = pending.next_if(|(at, _)| *at <= del.from) {
				map.retain(at - cursor);
				map.insert(length);
				cursor = at;
			}
			map.retain(del.from - cursor);
			map.delete(del.len());
			cursor = del.to;
		}
		for (at, length) in pending {
			map.retain(at - cursor);
			map.insert(length);
			cursor = at;
		}

		map
	}

	/// Returns the source length covered by this map.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the output length produced by the covered source range.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if the map moves no position.
	pub fn is_empty(&self) -> bool {
		self.ops.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Returns a slice of all operations in this map.
	pub fn ops(&self) -> &[Operation] {
		&self.ops
	}

	/// Adds a retain operation, merging with a preceding retain.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, merging with a preceding delete.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation, merging with a preceding insert.
	pub(crate) fn insert(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len_after += n;

		if let Some(Operation::Insert(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Insert(n));
		}
	}

	/// Maps a position through this map using the specified bias.
	///
	/// # Parameters
	/// - `pos`: The pre-mutation character position
	/// - `bias`: How to handle positions exactly at an insertion point
	///
	/// # Returns
	/// The position in the post-mutation document.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.ops {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(n) => {
					if old_pos == pos && bias == Bias::Left {
						// Position is exactly at insert point, stay before
					} else {
						new_pos += n;
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Maps both bounds of a span.
	///
	/// Bounds sitting exactly on an insertion point move with it, so an
	/// insertion at a span's end extends the span.
	pub fn map_span(&self, span: Span) -> Span {
		Span::new(self.map_pos(span.from, Bias::Right), self.map_pos(span.to, Bias::Right))
	}
}
