use regex::Regex;

/// The two structural markers of an Indonesian statute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    /// `BAB <roman numeral>` followed by the chapter title on its own line
    Chapter,
    /// `Pasal <number>` on its own line
    Article,
}

/// A located heading. `start..end` spans the whole heading including its line break(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: HeadingKind,
    pub start: usize,
    pub end: usize,
    /// Roman numeral for chapters, decimal number for articles
    pub number: String,
    /// Chapter title; always `None` for articles
    pub title: Option<String>,
}

/// Finds the next heading of a given kind at or after a byte offset.
///
/// The chunker and the definition extractor only talk to this trait, so the
/// marker syntax can change without touching the segmentation logic.
pub trait HeadingScanner: Send + Sync {
    /// `from` must lie on a char boundary of `text`
    fn find_next(&self, text: &str, kind: HeadingKind, from: usize) -> Option<Heading>;

    /// All headings of `kind` in `text`, in document order
    fn find_all(&self, text: &str, kind: HeadingKind) -> Vec<Heading> {
        let mut headings = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(heading) = self.find_next(text, kind, pos) else {
                break;
            };
            // Guard against zero-width matches from custom implementations
            pos = heading.end.max(heading.start + 1);
            headings.push(heading);
        }
        headings
    }
}

/// Regex-backed scanner for the layout produced by PDF text extraction
pub struct RegexHeadingScanner {
    chapter: Regex,
    article: Regex,
}

impl RegexHeadingScanner {
    pub fn new() -> Self {
        Self {
            chapter: Regex::new(
                r"\bBAB\s+([IVXLCDM]+)[ \t]*\r?\n\s*([A-Z][A-Z \t]*?)[ \t]*\r?\n",
            )
            .unwrap(),
            article: Regex::new(r"\bPasal\s+(\d+)[ \t]*\r?\n").unwrap(),
        }
    }
}

impl Default for RegexHeadingScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingScanner for RegexHeadingScanner {
    fn find_next(&self, text: &str, kind: HeadingKind, from: usize) -> Option<Heading> {
        if from > text.len() {
            return None;
        }

        let regex = match kind {
            HeadingKind::Chapter => &self.chapter,
            HeadingKind::Article => &self.article,
        };

        let caps = regex.captures_at(text, from)?;
        let whole = caps.get(0)?;

        Some(Heading {
            kind,
            start: whole.start(),
            end: whole.end(),
            number: caps.get(1)?.as_str().to_string(),
            title: match kind {
                HeadingKind::Chapter => caps.get(2).map(|m| m.as_str().trim().to_string()),
                HeadingKind::Article => None,
            },
        })
    }
}
