use anyhow::{Context, Result};
use std::path::Path;

/// Extract the text of a PDF, one page-break marker per page.
///
/// Pages are joined with [`join_pages`], so the chunker sees the same
/// `--- Halaman N ---` markers that [`super::clean_text`] strips later.
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    tracing::info!("Extracted {} pages from {}", pages.len(), path.display());

    Ok(join_pages(&pages))
}

/// Join page texts, prefixing each with `\n--- Halaman {n} ---\n` (1-based)
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        text.push_str(&format!("\n--- Halaman {} ---\n", i + 1));
        text.push_str(page.as_ref());
    }
    text
}
