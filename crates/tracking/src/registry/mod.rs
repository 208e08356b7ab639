//! Immutable snapshot of the changes tracked for one document.
//!
//! Every operation that alters the registry returns a new
//! [`ChangeRegistry`]; published snapshots are never mutated, so a reader
//! can keep an older snapshot (for rendering, or as an undo point) while the
//! host moves on. Snapshots share their change allocations, which keeps
//! cloning cheap.


use std::sync::Arc;

use indexmap::IndexMap;
use scribe_primitives::Span;
use tracing::{debug, warn};

use crate::change::{Change, ChangeId, ChangeStatus};
use crate::error::RegistryError;

/// Two pending changes claiming overlapping spans.
///
/// This is data for the UI, not an error: resolution still processes both
/// according to the configured [`OverlapPolicy`](crate::OverlapPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapWarning {
	/// The change starting first (by span, then insertion order).
	pub first: ChangeId,
	/// The change starting second.
	pub second: ChangeId,
	/// Smallest span covering both.
	pub extent: Span,
}

/// Per-status totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
	/// Changes awaiting a decision.
	pub pending: usize,
	/// Accepted changes still retained.
	pub accepted: usize,
	/// Rejected changes still retained.
	pub rejected: usize,
}

/// Keyed collection of tracked changes.
///
/// Iteration order is ascending `span.from`; changes starting at the same
/// offset keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct ChangeRegistry {
	/// Changes keyed by id, in insertion order.
	entries: Arc<IndexMap<ChangeId, Arc<Change>>>,
	/// Entry indices sorted by `span.from`, then insertion order.
	order: Arc<[usize]>,
}

impl ChangeRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from a batch of changes.
	pub fn from_changes(changes: impl IntoIterator<Item = Change>) -> Result<Self, RegistryError> {
		let mut entries = IndexMap::new();
		for change in changes {
			let id = change.id;
			if entries.insert(id, Arc::new(change)).is_some() {
				return Err(RegistryError::DuplicateId(id));
			}
		}
		Ok(Self::from_entries(entries))
	}

	fn from_entries(entries: IndexMap<ChangeId, Arc<Change>>) -> Self {
		let mut order: Vec<usize> = (0..entries.len()).collect();
		order.sort_by_key(|&idx| entries[idx].span.from);
		Self {
			entries: Arc::new(entries),
			order: order.into(),
		}
	}

	/// Returns a registry with `change` added.
	///
	/// Fails with [`RegistryError::DuplicateId`] if the id is already tracked.
	pub fn add(&self, change: Change) -> Result<Self, RegistryError> {
		if self.entries.contains_key(&change.id) {
			warn!(change = %change.id, "registry.duplicate_id");
			return Err(RegistryError::DuplicateId(change.id));
		}

		debug!(
			change = %change.id,
			kind = %change.kind,
			span = %change.span,
			"registry.add"
		);
		let mut entries = (*self.entries).clone();
		entries.insert(change.id, Arc::new(change));
		Ok(Self::from_entries(entries))
	}

	/// Returns a registry without `id`; an equal registry if it is absent.
	pub fn remove(&self, id: ChangeId) -> Self {
		if !self.entries.contains_key(&id) {
			return self.clone();
		}

		debug!(change = %id, "registry.remove");
		let mut entries = (*self.entries).clone();
		entries.shift_remove(&id);
		Self::from_entries(entries)
	}

	/// Returns a registry with existing changes swapped for `changes`
	/// (matched by id), keeping their insertion positions.
	///
	/// Unknown ids are ignored.
	pub(crate) fn replace_all(&self, changes: impl IntoIterator<Item = Change>) -> Self {
		let mut entries = (*self.entries).clone();
		let mut touched = false;
		for change in changes {
			if let Some(slot) = entries.get_mut(&change.id) {
				*slot = Arc::new(change);
				touched = true;
			}
		}
		if touched {
			Self::from_entries(entries)
		} else {
			self.clone()
		}
	}

	/// Returns a registry without every id in `ids`.
	pub(crate) fn remove_all<'a>(&self, ids: impl IntoIterator<Item = &'a ChangeId>) -> Self {
		let mut entries = (*self.entries).clone();
		let before = entries.len();
		for id in ids {
			entries.shift_remove(id);
		}
		if entries.len() == before {
			self.clone()
		} else {
			Self::from_entries(entries)
		}
	}

	/// Looks up a change by id.
	pub fn get(&self, id: ChangeId) -> Option<&Change> {
		self.entries.get(&id).map(Arc::as_ref)
	}

	/// Returns true if `id` is tracked.
	pub fn contains(&self, id: ChangeId) -> bool {
		self.entries.contains_key(&id)
	}

	/// Number of tracked changes, in any status.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing is tracked.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Position of `id` in insertion order.
	pub fn insertion_rank(&self, id: ChangeId) -> Option<usize> {
		self.entries.get_index_of(&id)
	}

	/// Iterates all changes in ascending `span.from` order.
	pub fn iter(&self) -> impl Iterator<Item = &Change> + '_ {
		self.order.iter().map(|&idx| self.entries[idx].as_ref())
	}

	/// All changes in ascending `span.from` order.
	pub fn list(&self) -> Vec<&Change> {
		self.iter().collect()
	}

	/// Pending changes in ascending `span.from` order.
	pub fn pending(&self) -> Vec<&Change> {
		self.iter().filter(|change| change.is_pending()).collect()
	}

	/// Totals per status.
	pub fn counts(&self) -> StatusCounts {
		self.entries.values().fold(StatusCounts::default(), |mut counts, change| {
			match change.status {
				ChangeStatus::Pending => counts.pending += 1,
				ChangeStatus::Accepted => counts.accepted += 1,
				ChangeStatus::Rejected => counts.rejected += 1,
			}
			counts
		})
	}

	/// Every pair of pending changes whose spans overlap.
	///
	/// Touching spans and two insertions at the same point do not overlap.
	pub fn overlaps(&self) -> Vec<OverlapWarning> {
		let pending = self.pending();
		let mut warnings = Vec::new();

		for (i, first) in pending.iter().enumerate() {
			for second in &pending[i + 1..] {
				if second.span.from >= first.span.to {
					break;
				}
				if first.span.overlaps(&second.span) {
					warnings.push(OverlapWarning {
						first: first.id,
						second: second.id,
						extent: first.span.merge(&second.span),
					});
				}
			}
		}

		if !warnings.is_empty() {
			warn!(count = warnings.len(), "registry.overlapping_pending");
		}
		warnings
	}

	/// Ids of pending changes involved in at least one overlap.
	pub fn overlapping_ids(&self) -> Vec<ChangeId> {
		let mut ids: Vec<ChangeId> = self
			.overlaps()
			.into_iter()
			.flat_map(|warning| [warning.first, warning.second])
			.collect();
		ids.sort();
		ids.dedup();
		ids
	}

	/// Returns true if both registries are the same snapshot.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.entries, &other.entries)
	}
}

impl PartialEq for ChangeRegistry {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || self.entries == other.entries
	}
}

impl Eq for ChangeRegistry {}
