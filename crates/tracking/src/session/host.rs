use scribe_primitives::{Rope, Span, TextEdit};

/// The document store a [`SuggestionSession`](super::SuggestionSession)
/// works against.
///
/// The host owns the content. The session reads it, hands back edits to
/// apply, and asks for ranges to be brought into view.
pub trait DocumentHost {
	/// Returns the current document content.
	fn content(&self) -> Rope;

	/// Applies `edits` in order as one atomic change.
	///
	/// Each edit is valid against the content left by the ones before it.
	fn apply_edits(&mut self, edits: &[TextEdit]);

	/// Scrolls to and focuses `span`. Purely presentational.
	fn reveal(&mut self, span: Span);
}
