//! Tracked AI suggestions for a text document.
//!
//! The engine turns suggested rewrites into positioned [`Change`]s, keeps
//! their spans attached to the text while the document is edited, and applies
//! accept/reject decisions without corrupting the offsets of changes still
//! waiting.
//!
//! Every operation is synchronous and returns a new [`ChangeRegistry`]
//! snapshot. The host document store stays the single owner of the content;
//! the engine only proposes [`TextEdit`]s and consumes [`Mutation`]
//! notifications.
//!
//! ```text
//! SuggestionResponse ─► diff ─► ChangeRegistry ─► decorations ─► UI
//!                                   ▲     │
//!                   mapper::remap ──┘     └─► resolve ─► TextEdit ─► host
//! ```

/// The tracked change model.
pub mod change;
/// Engine configuration.
pub mod config;
/// Marker projection for the UI.
pub mod decorations;
/// Text diffing.
pub mod diff;
/// Error types.
pub mod error;
/// Span remapping and validation.
pub mod mapper;
/// Immutable change registry.
pub mod registry;
/// Accept/reject resolution.
pub mod resolve;
/// Host-facing suggestion lifecycle.
pub mod session;

pub use change::{Change, ChangeId, ChangeKind, ChangeStatus, Decision, SpanHealth, StaleReason};
pub use config::{
	DiffOptions, Granularity, OverlapPolicy, PreviewMode, ResolveOptions, Retention, TrackingConfig,
};
pub use decorations::{Marker, VisualKind, project, project_with_content};
pub use diff::{ChangeOp, DiffSummary, apply_ops, compute_diff, compute_diff_with, summarize};
pub use error::{ConfigError, DiffError, Error, IngestError, RegistryError, ResolveError, Result};
pub use mapper::{remap, validate};
pub use registry::{ChangeRegistry, OverlapWarning, StatusCounts};
pub use resolve::{Outcome, Resolution, resolve_all, resolve_one};
pub use scribe_primitives::{Mutation, Rope, RopeSlice, Span, TextEdit};
pub use session::{DocumentHost, Position, SuggestedEdit, SuggestionResponse, SuggestionSession};
