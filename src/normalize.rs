// WHY: span coordinates everywhere in the crate are indices into the letter-only stream
// built here, so every call site must agree on what counts as a letter

/// Letter-only projection of a phrase plus a map back to the original characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPhrase {
    letters: Vec<char>,
    /// `positions[i]` is the char index in the original phrase of `letters[i]`
    positions: Vec<usize>,
}

impl NormalizedPhrase {
    /// Alphabetic characters of the phrase, in original order, case preserved
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Join `letters[start..end]` into a token.
    /// Out-of-range or inverted bounds yield an empty string rather than panicking.
    pub fn slice(&self, start: usize, end: usize) -> String {
        if start >= end || end > self.letters.len() {
            return String::new();
        }
        self.letters[start..end].iter().collect()
    }

    /// Char index in the original phrase of the letter at normalized index `index`
    pub fn original_index(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// The whole letter stream as a string
    pub fn as_string(&self) -> String {
        self.letters.iter().collect()
    }
}

/// Strip every non-alphabetic character from `phrase`
pub fn normalize(phrase: &str) -> NormalizedPhrase {
    let mut normalized = NormalizedPhrase::default();
    normalize_into(phrase, &mut normalized);
    normalized
}

/// Normalize into a supplied buffer, reusing its allocations
pub fn normalize_into(phrase: &str, buffer: &mut NormalizedPhrase) {
    buffer.letters.clear();
    buffer.positions.clear();

    for (index, ch) in phrase.chars().enumerate() {
        if ch.is_alphabetic() {
            buffer.letters.push(ch);
            buffer.positions.push(index);
        }
    }
}
