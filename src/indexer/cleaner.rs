use regex::Regex;
use std::sync::LazyLock;

/// Anything that is not a word character, whitespace or allowed punctuation
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,;:\-()"'!?/%]"#).unwrap());

/// Page-break marker injected by the PDF extractor, e.g. `--- Halaman 12 ---`
static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{3}\s*Halaman\s+\d+\s*-{3}").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an extracted text span.
///
/// Strips characters outside the allow-list, removes page-break markers and
/// collapses whitespace runs into single spaces. The function is idempotent.
pub fn clean_text(text: &str) -> String {
    let text = DISALLOWED_CHARS.replace_all(text, "");

    // Removing one marker can splice two halves of another one together
    let mut text = text.into_owned();
    while PAGE_MARKER.is_match(&text) {
        text = PAGE_MARKER.replace_all(&text, " ").into_owned();
    }

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}
