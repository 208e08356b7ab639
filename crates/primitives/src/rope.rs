//! Rope utilities and extensions.

use ropey::{Rope, RopeSlice};
use thiserror::Error;

use crate::range::{CharLen, Span};

/// Errors raised when a span does not fit the document it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
	/// The span ends past the end of the document.
	#[error("span {span} is outside document bounds (length {len})")]
	OutOfRange {
		/// The offending span.
		span: Span,
		/// Document length in characters.
		len: CharLen,
	},
}

/// Checks that `span` lies inside `text`.
pub fn check_span(text: RopeSlice, span: Span) -> Result<(), SpanError> {
	let len = text.len_chars();
	if span.in_bounds(len) {
		Ok(())
	} else {
		Err(SpanError::OutOfRange { span, len })
	}
}

/// Returns the text covered by `span`, or an error if it exceeds the document.
pub fn span_text(text: RopeSlice, span: Span) -> Result<String, SpanError> {
	check_span(text, span)?;
	Ok(text.slice(span.as_range()).to_string())
}

/// Returns true if the text covered by `span` equals `expected`.
///
/// Out-of-range spans never match. Compares chunk by chunk without
/// allocating the slice.
pub fn span_matches(text: RopeSlice, span: Span, expected: &str) -> bool {
	if !span.in_bounds(text.len_chars()) {
		return false;
	}
	let slice = text.slice(span.as_range());
	slice.len_bytes() == expected.len() && slice == expected
}

/// Replaces the characters in `span` with `replacement`.
pub fn replace_span(doc: &mut Rope, span: Span, replacement: &str) -> Result<(), SpanError> {
	check_span(doc.slice(..), span)?;
	if !span.is_empty() {
		doc.remove(span.as_range());
	}
	if !replacement.is_empty() {
		doc.insert(span.from, replacement);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_span_text() {
		let text = Rope::from("hello world");
		assert_eq!(span_text(text.slice(..), Span::new(6, 11)).unwrap(), "world");
		assert_eq!(span_text(text.slice(..), Span::point(3)).unwrap(), "");
	}

	#[test]
	fn test_span_text_out_of_range() {
		let text = Rope::from("hello");
		let err = span_text(text.slice(..), Span::new(3, 9)).unwrap_err();
		assert_eq!(
			err,
			SpanError::OutOfRange {
				span: Span::new(3, 9),
				len: 5
			}
		);
	}

	#[test]
	fn test_span_matches_multibyte() {
		let text = Rope::from("naïve café");
		assert!(span_matches(text.slice(..), Span::new(6, 10), "café"));
		assert!(!span_matches(text.slice(..), Span::new(6, 10), "cafe"));
		assert!(!span_matches(text.slice(..), Span::new(6, 12), "café"));
	}

	#[test]
	fn test_replace_span() {
		let mut doc = Rope::from("hello world");
		replace_span(&mut doc, Span::new(0, 5), "goodbye").unwrap();
		assert_eq!(doc.to_string(), "goodbye world");
		replace_span(&mut doc, Span::point(7), ",").unwrap();
		assert_eq!(doc.to_string(), "goodbye, world");
	}
}
