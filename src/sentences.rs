use std::str::Split;

const BOUNDARIES: [char; 2] = ['.', '\n'];

/// Lazy sentence iterator over borrowed text.
///
/// Newlines count as periods; every piece is trimmed and empty pieces are
/// dropped. Abbreviations and decimals get split too. Clone the iterator to
/// walk the same text again.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    pieces: Split<'a, [char; 2]>,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.pieces.by_ref().map(str::trim).find(|s| !s.is_empty())
    }
}

/// Split raw text into sentences.
pub fn split_sentences(text: &str) -> Sentences<'_> {
    Sentences {
        pieces: text.split(BOUNDARIES),
    }
}
