use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` over normalized-stream indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A hidden word confirmed by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebusSubstring {
    /// Letters of the normalized stream in `[start, end)`
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl RebusSubstring {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Hidden word covering `span`
    pub fn at(text: impl Into<String>, span: Span) -> Self {
        Self::new(text, span.start, span.end)
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A phrase paired with the hidden words found in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebusPuzzle {
    pub phrase: String,
    pub substrings: Vec<RebusSubstring>,
}

impl RebusPuzzle {
    pub fn new(phrase: impl Into<String>, substrings: Vec<RebusSubstring>) -> Self {
        Self {
            phrase: phrase.into(),
            substrings,
        }
    }

    /// True when no hidden word was found
    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty()
    }
}
