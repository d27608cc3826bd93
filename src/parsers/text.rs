use crate::results::{StyledWord, WordStyle};
use regex::Regex;
use std::sync::LazyLock;

/// Runs of HTML whitespace: space, tab, line feed, form feed, carriage return
/// and the non-breaking space that `&nbsp;` decodes to.
static HTML_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t\n\r\x0C\x{A0}]+").expect("whitespace pattern is valid")
});

/// A single space, or a maximal run of anything else
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" |[^ ]+").expect("token pattern is valid"));

/// Collapses every run of HTML whitespace into a single space, without trimming
pub fn normalize_whitespace(text: &str) -> String {
    HTML_WHITESPACE.replace_all(text, " ").into_owned()
}

/// Splits text at whitespace boundaries without discarding the whitespace.
///
/// Each space is its own token and every other run is one token, so
/// concatenating the tokens gives back the normalized text.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    TOKEN
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokenizes a text node and appends one word per token, all tagged `style`
pub fn push_words(text: &str, style: WordStyle, out: &mut Vec<StyledWord>) {
    out.extend(
        tokenize(text)
            .into_iter()
            .filter_map(|token| StyledWord::new(token, style)),
    );
}
