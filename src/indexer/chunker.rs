use super::Chunk;
use super::cleaner::clean_text;
use super::scanner::{HeadingKind, HeadingScanner, RegexHeadingScanner};

/// Articles whose cleaned body is this many characters or fewer are dropped
pub const MIN_CONTENT_LENGTH: usize = 50;

/// Splits a statute into one chunk per article, grouped under chapters.
///
/// Scanning is two-level: chapter headings first, then article headings
/// inside each chapter span. Articles that appear before the first chapter
/// heading are ignored.
pub struct LegalChunker<S: HeadingScanner = RegexHeadingScanner> {
    scanner: S,
    min_content_length: usize,
}

impl LegalChunker<RegexHeadingScanner> {
    pub fn new() -> Self {
        Self::with_scanner(RegexHeadingScanner::new())
    }
}

impl Default for LegalChunker<RegexHeadingScanner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: HeadingScanner> LegalChunker<S> {
    pub fn with_scanner(scanner: S) -> Self {
        Self {
            scanner,
            min_content_length: MIN_CONTENT_LENGTH,
        }
    }

    /// Chunk the full document text. Never fails; no headings yields an empty vector.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chapters = self.scanner.find_all(text, HeadingKind::Chapter);
        let mut chunks = Vec::new();

        for (i, chapter) in chapters.iter().enumerate() {
            let span_end = chapters
                .get(i + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());
            let span = &text[chapter.end..span_end];
            let title = chapter.title.as_deref().unwrap_or_default();

            let articles = self.scanner.find_all(span, HeadingKind::Article);
            for (j, article) in articles.iter().enumerate() {
                let body_end = articles
                    .get(j + 1)
                    .map(|next| next.start)
                    .unwrap_or(span.len());
                let content = clean_text(&span[article.end..body_end]);

                if content.chars().count() <= self.min_content_length {
                    continue;
                }

                chunks.push(Chunk::new(&chapter.number, title, &article.number, content));
            }
        }

        tracing::debug!(
            "Chunked document into {} articles across {} chapters",
            chunks.len(),
            chapters.len()
        );

        chunks
    }
}

/// Chunk `text` with the default regex scanner
pub fn chunk_document(text: &str) -> Vec<Chunk> {
    LegalChunker::new().chunk(text)
}
