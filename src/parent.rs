/// Find the whitespace-delimited token of `phrase` that contains the span `[start, end)`.
///
/// Each token advances the running offset by its full char length, punctuation and
/// digits included, while spans are measured in the letter-only stream. The two agree
/// only for purely alphabetic tokens; tokens like `"hello!!"` shift every later window.
/// A token matches when `offset <= start <= end <= offset + len(token)`, so a zero-length
/// span sitting on a boundary resolves to the earlier token.
///
/// Returns `""` when the span straddles tokens, lies past the last token, is inverted,
/// or the phrase has no tokens.
///
/// # Example
/// ```
/// use rebus::resolve_parent;
/// assert_eq!(resolve_parent(3, 5, "hello world"), "hello");
/// assert_eq!(resolve_parent(3, 8, "hello world"), "");
/// ```
pub fn resolve_parent(start: usize, end: usize, phrase: &str) -> &str {
    let mut offset = 0;

    for word in phrase.split_whitespace() {
        let word_len = word.chars().count();
        if offset <= start && start <= end && end <= offset + word_len {
            return word;
        }
        offset += word_len;
    }

    ""
}
