use super::Definition;
use super::cleaner::clean_text;
use super::scanner::{HeadingKind, HeadingScanner, RegexHeadingScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Citation attached to every extracted definition
pub const DEFAULT_DEFINITION_SOURCE: &str = "Pasal 1 UU No. 27 Tahun 2022";

/// `N. <term> adalah ` at the start of a definition item
static DEFINITION_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.\s+([A-Za-z\s]+)\s+adalah\s+").unwrap());

/// Start of the next numbered item, which terminates the current definition
static NEXT_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\s+[A-Za-z]").unwrap());

/// Extracts the numbered definition list from Article 1
pub struct DefinitionExtractor<S: HeadingScanner = RegexHeadingScanner> {
    scanner: S,
    source: String,
}

impl DefinitionExtractor<RegexHeadingScanner> {
    pub fn new() -> Self {
        Self::with_scanner(RegexHeadingScanner::new())
    }
}

impl Default for DefinitionExtractor<RegexHeadingScanner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: HeadingScanner> DefinitionExtractor<S> {
    pub fn with_scanner(scanner: S) -> Self {
        Self {
            scanner,
            source: DEFAULT_DEFINITION_SOURCE.to_string(),
        }
    }

    /// Override the `sumber` citation
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn extract(&self, text: &str) -> Vec<Definition> {
        let Some(body) = self.article_one_body(text) else {
            tracing::debug!("Article 1 not bounded by Pasal 1 / Pasal 2 headings, no definitions");
            return Vec::new();
        };

        let mut definitions = Vec::new();
        let mut pos = 0;

        while let Some(caps) = DEFINITION_ITEM.captures_at(body, pos) {
            let (Some(whole), Some(nomor), Some(istilah)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };

            let def_start = whole.end();
            // The definition needs at least one character before the next item may start
            let search_from = body[def_start..]
                .chars()
                .next()
                .map(|c| def_start + c.len_utf8())
                .unwrap_or(body.len());
            let def_end = NEXT_ITEM
                .find_at(body, search_from)
                .map(|m| m.start())
                .unwrap_or(body.len());

            let definisi = clean_text(&body[def_start..def_end]);
            if !definisi.is_empty() {
                definitions.push(Definition {
                    id: format!("definisi_{}", nomor.as_str()),
                    nomor: nomor.as_str().to_string(),
                    istilah: istilah.as_str().trim().to_string(),
                    definisi,
                    sumber: self.source.clone(),
                });
            }

            pos = def_end.max(def_start);
        }

        definitions
    }

    /// Text between the first `Pasal 1` heading and the following `Pasal 2` heading
    fn article_one_body<'a>(&self, text: &'a str) -> Option<&'a str> {
        let mut pos = 0;
        let first = loop {
            let heading = self.scanner.find_next(text, HeadingKind::Article, pos)?;
            if heading.number == "1" {
                break heading;
            }
            pos = heading.end;
        };

        let mut pos = first.end;
        loop {
            let heading = self.scanner.find_next(text, HeadingKind::Article, pos)?;
            if heading.number == "2" {
                return Some(&text[first.end..heading.start]);
            }
            pos = heading.end;
        }
    }
}

/// Extract definitions with the default scanner and citation
pub fn extract_definitions(text: &str) -> Vec<Definition> {
    DefinitionExtractor::new().extract(text)
}
