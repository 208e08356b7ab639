//! Suggestion lifecycle for one document.
//!
//! A [`SuggestionSession`] ties the engine to the host's document store:
//! it ingests completed suggestion responses, keeps the registry in step
//! with typed edits, resolves changes on behalf of the UI and hands the
//! resulting edits to the [`DocumentHost`].
//!
//! # Architecture
//!
//! ```text
//! SuggestionSession                  DocumentHost (host implements)
//! ┌──────────────────────┐           ┌──────────────────────┐
//! │ registry snapshot    │           │ content()            │
//! │ current change       │◄─────────►│ apply_edits()        │
//! │ resolution history   │           │ reveal()             │
//! │                      │           └──────────────────────┘
//! │ ingest()             │
//! │ accept_current() ... │
//! │ undo_last_resolution │
//! └──────────────────────┘
//! ```

mod host;
mod response;


use std::collections::BTreeMap;

pub use host::DocumentHost;
pub use response::{Position, SuggestedEdit, SuggestionResponse};
use scribe_primitives::{CharIdx, Mutation, Span, TextEdit};
use tracing::{debug, trace, warn};

use crate::change::{Change, ChangeId, ChangeStatus, Decision, SpanHealth};
use crate::config::TrackingConfig;
use crate::decorations::{Marker, project_with_content};
use crate::diff::compute_diff_with;
use crate::error::{IngestError, ResolveError};
use crate::mapper;
use crate::registry::{ChangeRegistry, StatusCounts};
use crate::resolve::{Outcome, Resolution, resolve_all, resolve_one};

/// Everything needed to revert one resolution call.
#[derive(Debug)]
struct HistoryEntry {
	registry: ChangeRegistry,
	inverse_edits: Vec<TextEdit>,
	tally: StatusCounts,
	focus: Option<ChangeId>,
}

/// Drives suggestion review for one document.
#[derive(Debug)]
pub struct SuggestionSession<H> {
	host: H,
	config: TrackingConfig,
	registry: ChangeRegistry,
	current: Option<ChangeId>,
	/// Accepted and rejected totals, kept here because resolved changes
	/// leave the registry under the default retention policy.
	tally: StatusCounts,
	history: Vec<HistoryEntry>,
}

impl<H: DocumentHost> SuggestionSession<H> {
	/// Creates a session with default configuration.
	pub fn new(host: H) -> Self {
		Self::with_config(host, TrackingConfig::default())
	}

	/// Creates a session with `config`.
	pub fn with_config(host: H, config: TrackingConfig) -> Self {
		Self {
			host,
			config,
			registry: ChangeRegistry::new(),
			current: None,
			tally: StatusCounts::default(),
			history: Vec::new(),
		}
	}

	/// The host document store.
	pub fn host(&self) -> &H {
		&self.host
	}

	/// Mutable access to the host. Edits made through it must be reported
	/// with [`on_document_mutation`](Self::on_document_mutation).
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	/// Active configuration.
	pub fn config(&self) -> &TrackingConfig {
		&self.config
	}

	/// Current registry snapshot.
	pub fn registry(&self) -> &ChangeRegistry {
		&self.registry
	}

	/// Adds positioned suggestions. Either all of them are tracked or none.
	pub fn ingest(&mut self, response: &SuggestionResponse) -> Result<Vec<ChangeId>, IngestError> {
		let len = self.host.content().len_chars();
		let mut registry = self.registry.clone();
		let mut ids = Vec::with_capacity(response.suggestions.len());

		for suggestion in &response.suggestions {
			let span = Span::from(suggestion.position);
			if suggestion.position.start > suggestion.position.end || !span.in_bounds(len) {
				warn!(%span, len, "session.invalid_position");
				return Err(IngestError::InvalidPosition { span, len });
			}
			let change = suggestion.to_change();
			ids.push(change.id);
			registry = registry.add(change)?;
		}

		self.commit_ingest(registry, &ids);
		Ok(ids)
	}

	/// Parses a JSON suggestion response and ingests it.
	pub fn ingest_json(&mut self, payload: &str) -> Result<Vec<ChangeId>, IngestError> {
		let response = SuggestionResponse::from_json(payload)?;
		self.ingest(&response)
	}

	/// Diffs a rewrite of `original` (found at `base_offset`) and tracks each
	/// differing run as a change carrying `metadata`.
	pub fn ingest_rewrite(
		&mut self,
		original: &str,
		suggested: &str,
		base_offset: CharIdx,
		metadata: &BTreeMap<String, String>,
	) -> Result<Vec<ChangeId>, IngestError> {
		let len = self.host.content().len_chars();
		let end = base_offset.checked_add(original.chars().count());
		if !end.is_some_and(|to| to <= len) {
			let span = Span::new(base_offset, end.unwrap_or(CharIdx::MAX));
			warn!(%span, len, "session.invalid_position");
			return Err(IngestError::InvalidPosition { span, len });
		}

		let ops = compute_diff_with(original, suggested, &self.config.diff_options())?;
		let mut registry = self.registry.clone();
		let mut ids = Vec::with_capacity(ops.len());
		for op in &ops {
			let mut change = op.to_change(original, base_offset);
			change.metadata.extend(metadata.clone());
			ids.push(change.id);
			registry = registry.add(change)?;
		}

		self.commit_ingest(registry, &ids);
		Ok(ids)
	}

	/// Installs a registry grown by ingestion.
	///
	/// Resolution history is dropped: its snapshots predate the new changes.
	fn commit_ingest(&mut self, registry: ChangeRegistry, ids: &[ChangeId]) {
		self.registry = registry;
		self.clear_history();
		let overlaps = self.registry.overlaps();
		debug!(added = ids.len(), overlaps = overlaps.len(), "session.ingest");
		if self.current.is_none() {
			self.refocus(0);
		}
	}

	/// Keeps tracked spans aligned after an edit the engine did not make.
	///
	/// Resolution history is dropped: its inverse edits no longer line up.
	pub fn on_document_mutation(&mut self, mutation: &Mutation) {
		self.registry = mapper::remap(&self.registry, mutation);
		self.clear_history();
	}

	fn clear_history(&mut self) {
		if !self.history.is_empty() {
			trace!(dropped = self.history.len(), "session.history_cleared");
			self.history.clear();
		}
	}

	/// Markers for the UI, with staleness checked against the live content.
	pub fn markers(&self) -> Vec<Marker> {
		project_with_content(&self.registry, self.host.content().slice(..), self.config.preview)
	}

	/// Health of every pending change.
	pub fn health(&self) -> Vec<(ChangeId, SpanHealth)> {
		mapper::validate(&self.registry, self.host.content().slice(..), self.config.preview)
	}

	/// The focused pending change.
	pub fn current(&self) -> Option<&Change> {
		self.current.and_then(|id| self.registry.get(id))
	}

	/// Position of the focused change among pending changes.
	pub fn current_index(&self) -> Option<usize> {
		let id = self.current?;
		self.registry.pending().iter().position(|change| change.id == id)
	}

	/// Every change the session has seen: pending plus resolved.
	pub fn total_count(&self) -> usize {
		self.pending_count() + self.accepted_count() + self.rejected_count()
	}

	/// Changes awaiting a decision.
	pub fn pending_count(&self) -> usize {
		self.registry.counts().pending
	}

	/// Changes accepted in this session.
	pub fn accepted_count(&self) -> usize {
		self.tally.accepted
	}

	/// Changes rejected in this session.
	pub fn rejected_count(&self) -> usize {
		self.tally.rejected
	}

	/// Focuses the next pending change, wrapping to the first.
	pub fn go_to_next(&mut self) -> Option<ChangeId> {
		self.step(1)
	}

	/// Focuses the previous pending change, wrapping to the last.
	pub fn go_to_previous(&mut self) -> Option<ChangeId> {
		self.step(-1)
	}

	fn step(&mut self, delta: isize) -> Option<ChangeId> {
		let pending = self.registry.pending();
		if pending.is_empty() {
			self.current = None;
			return None;
		}

		let count = pending.len() as isize;
		let next = match self.current_index() {
			Some(index) => (index as isize + delta).rem_euclid(count) as usize,
			None if delta < 0 => pending.len() - 1,
			None => 0,
		};
		let change = pending[next];
		let (id, span) = (change.id, change.span);
		self.current = Some(id);
		self.host.reveal(span);
		Some(id)
	}

	/// Focuses the pending change at `index`, or the first one.
	fn refocus(&mut self, index: usize) {
		let pending = self.registry.pending();
		self.current = pending.get(index).or(pending.first()).map(|change| change.id);
	}

	/// Accepts the focused change. Returns its id, or `None` when nothing is
	/// pending.
	pub fn accept_current(&mut self) -> Result<Option<ChangeId>, ResolveError> {
		self.resolve_current(Decision::Accept)
	}

	/// Rejects the focused change. Returns its id, or `None` when nothing is
	/// pending.
	pub fn reject_current(&mut self) -> Result<Option<ChangeId>, ResolveError> {
		self.resolve_current(Decision::Reject)
	}

	fn resolve_current(&mut self, decision: Decision) -> Result<Option<ChangeId>, ResolveError> {
		let Some(id) = self.current.or_else(|| self.registry.pending().first().map(|change| change.id)) else {
			return Ok(None);
		};
		let index = self.current_index().unwrap_or_default();
		let span = self.registry.get(id).map(|change| change.span).ok_or(ResolveError::NotFound(id))?;

		let content = self.host.content();
		let resolution = resolve_one(&self.registry, &content, id, decision, &self.config.resolve_options())?;
		let reveal = resolution.edits.first().map_or(span, TextEdit::applied_span);

		self.commit(resolution);
		self.refocus(index);
		self.host.reveal(reveal);
		debug!(change = %id, ?decision, "session.resolve_current");
		Ok(Some(id))
	}

	/// Accepts every pending change.
	pub fn accept_all(&mut self) -> Vec<Outcome> {
		self.resolve_every(Decision::Accept)
	}

	/// Rejects every pending change.
	pub fn reject_all(&mut self) -> Vec<Outcome> {
		self.resolve_every(Decision::Reject)
	}

	fn resolve_every(&mut self, decision: Decision) -> Vec<Outcome> {
		let content = self.host.content();
		let resolution = resolve_all(&self.registry, &content, decision, &self.config.resolve_options());
		// Lowest applied edit, in post-resolution coordinates.
		let reveal = resolution.inverse_edits.last().map(|edit| edit.span);
		let outcomes = resolution.outcomes.clone();

		self.commit(resolution);
		self.refocus(0);
		if let Some(span) = reveal {
			self.host.reveal(span);
		}
		debug!(?decision, outcomes = outcomes.len(), "session.resolve_all");
		outcomes
	}

	/// Hands the edits to the host and records how to revert them.
	fn commit(&mut self, resolution: Resolution) {
		let mut tally = StatusCounts::default();
		for outcome in &resolution.outcomes {
			match outcome {
				Outcome::Applied {
					status: ChangeStatus::Accepted,
					..
				} => tally.accepted += 1,
				Outcome::Applied {
					status: ChangeStatus::Rejected,
					..
				} => tally.rejected += 1,
				Outcome::Applied {
					status: ChangeStatus::Pending,
					..
				}
				| Outcome::SkippedOverlap { .. }
				| Outcome::SkippedOutOfRange { .. } => {}
			}
		}
		if tally == StatusCounts::default() {
			return;
		}

		if !resolution.edits.is_empty() {
			self.host.apply_edits(&resolution.edits);
		}
		self.tally.accepted += tally.accepted;
		self.tally.rejected += tally.rejected;
		let previous = std::mem::replace(&mut self.registry, resolution.registry);
		self.history.push(HistoryEntry {
			registry: previous,
			inverse_edits: resolution.inverse_edits,
			tally,
			focus: self.current,
		});
	}

	/// Reverts the most recent resolution call, restoring both the content
	/// and the registry snapshot. Returns false when there is nothing to undo.
	pub fn undo_last_resolution(&mut self) -> bool {
		let Some(entry) = self.history.pop() else {
			return false;
		};

		if !entry.inverse_edits.is_empty() {
			self.host.apply_edits(&entry.inverse_edits);
		}
		self.registry = entry.registry;
		self.tally.accepted -= entry.tally.accepted;
		self.tally.rejected -= entry.tally.rejected;
		self.current = entry.focus;
		if let Some(span) = self.current().map(|change| change.span) {
			self.host.reveal(span);
		}
		debug!(remaining = self.history.len(), "session.undo");
		true
	}

	/// Returns true if a resolution can be undone.
	pub fn can_undo(&self) -> bool {
		!self.history.is_empty()
	}
}
