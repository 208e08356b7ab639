//! Core types for suggestion tracking: character spans, content edits,
//! document mutations, and position mapping.

/// Document mutations, content edits, and position maps.
pub mod mutation;
/// Character-indexed span types.
pub mod range;
/// Rope utilities and extensions.
pub mod rope;

pub use mutation::{Bias, Deletion, Insertion, Mutation, PositionMap, TextEdit};
pub use range::{CharIdx, CharLen, Span};
pub use rope::{SpanError, check_span, replace_span, span_matches, span_text};
pub use ropey::{Rope, RopeSlice};
