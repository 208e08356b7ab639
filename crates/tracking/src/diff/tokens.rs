use scribe_primitives::CharIdx;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::Granularity;

/// A tokenized text with character offsets for each token boundary.
pub(super) struct Tokens<'a> {
	/// Token slices, in order; concatenated they form the source text.
	pub(super) items: Vec<&'a str>,
	/// `offsets[i]` is the character offset of token `i`; the final entry is
	/// the character length of the whole text.
	pub(super) offsets: Vec<CharIdx>,
}

impl<'a> Tokens<'a> {
	pub(super) fn new(text: &'a str, granularity: Granularity) -> Self {
		let items: Vec<&'a str> = match granularity {
			Granularity::Char => text
				.char_indices()
				.map(|(i, c)| &text[i..i + c.len_utf8()])
				.collect(),
			Granularity::Word => text.split_word_bounds().collect(),
		};

		let mut offsets = Vec::with_capacity(items.len() + 1);
		let mut pos = 0;
		offsets.push(pos);
		for item in &items {
			pos += match granularity {
				Granularity::Char => 1,
				Granularity::Word => item.chars().count(),
			};
			offsets.push(pos);
		}

		Self { items, offsets }
	}

	/// Character offset of the boundary before token `index`.
	pub(super) fn offset(&self, index: usize) -> CharIdx {
		self.offsets[index]
	}

	/// Concatenated text of tokens in `range`.
	pub(super) fn text(&self, range: std::ops::Range<usize>) -> String {
		self.items[range].concat()
	}
}

/// Byte offset of every character boundary, including the end of the text.
pub(super) fn char_boundaries(text: &str) -> Vec<usize> {
	text.char_indices()
		.map(|(i, _)| i)
		.chain(std::iter::once(text.len()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn char_tokens_have_unit_offsets() {
		let tokens = Tokens::new("héllo", Granularity::Char);
		assert_eq!(tokens.items, vec!["h", "é", "l", "l", "o"]);
		assert_eq!(tokens.offsets, vec![0, 1, 2, 3, 4, 5]);
	}

	#[test]
	fn word_tokens_split_on_boundaries() {
		let tokens = Tokens::new("The quick, fox", Granularity::Word);
		assert_eq!(tokens.items, vec!["The", " ", "quick", ",", " ", "fox"]);
		assert_eq!(tokens.offset(2), 4);
		assert_eq!(tokens.offset(tokens.items.len()), 14);
		assert_eq!(tokens.text(2..4), "quick,");
	}

	#[test]
	fn boundaries_cover_multibyte() {
		assert_eq!(char_boundaries("aé"), vec![0, 1, 3]);
		assert_eq!(char_boundaries(""), vec![0]);
	}
}
