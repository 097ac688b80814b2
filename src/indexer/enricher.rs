use super::{Chunk, EnrichedChunk};

/// Number of characters of a neighbor's content kept in a context preview
pub const CONTEXT_PREVIEW_CHARS: usize = 200;

/// Attach previews of the previous and next article to every chunk.
///
/// `content` is never modified; the combined text lands in `content_with_context`.
pub fn enrich_chunks(chunks: &[Chunk]) -> Vec<EnrichedChunk> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let before = i.checked_sub(1).and_then(|prev| chunks.get(prev));
            let after = chunks.get(i + 1);

            let mut parts = Vec::with_capacity(3);
            if let Some(prev) = before {
                parts.push(context_line(prev));
            }
            parts.push(chunk.content.clone());
            if let Some(next) = after {
                parts.push(context_line(next));
            }

            EnrichedChunk {
                chunk: chunk.clone(),
                content_with_context: parts.join("\n\n"),
            }
        })
        .collect()
}

fn context_line(neighbor: &Chunk) -> String {
    format!(
        "[Konteks Pasal {}]: {}",
        neighbor.pasal,
        preview(&neighbor.content)
    )
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(CONTEXT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(pasal: &str, content: &str) -> Chunk {
        Chunk::new("I", "KETENTUAN UMUM", pasal, content.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert!(enrich_chunks(&[]).is_empty());
    }

    #[test]
    fn test_single_chunk_has_no_context() {
        let enriched = enrich_chunks(&[chunk("1", "isi pasal satu")]);
        assert_eq!(enriched[0].content_with_context, "isi pasal satu");
    }

    #[test]
    fn test_neighbors_are_previewed() {
        let chunks = vec![chunk("1", "satu"), chunk("2", "dua"), chunk("3", "tiga")];
        let enriched = enrich_chunks(&chunks);

        assert_eq!(
            enriched[0].content_with_context,
            "satu\n\n[Konteks Pasal 2]: dua"
        );
        assert_eq!(
            enriched[1].content_with_context,
            "[Konteks Pasal 1]: satu\n\ndua\n\n[Konteks Pasal 3]: tiga"
        );
        assert_eq!(
            enriched[2].content_with_context,
            "[Konteks Pasal 2]: dua\n\ntiga"
        );
    }

    #[test]
    fn test_long_neighbor_is_truncated_with_marker() {
        let long = "é".repeat(CONTEXT_PREVIEW_CHARS + 10);
        let exact = "x".repeat(CONTEXT_PREVIEW_CHARS);
        let chunks = vec![chunk("1", &long), chunk("2", "dua"), chunk("3", &exact)];
        let enriched = enrich_chunks(&chunks);

        let expected_prefix = format!(
            "[Konteks Pasal 1]: {}...\n\n",
            "é".repeat(CONTEXT_PREVIEW_CHARS)
        );
        assert!(enriched[1].content_with_context.starts_with(&expected_prefix));
        assert!(
            enriched[1]
                .content_with_context
                .ends_with(&format!("[Konteks Pasal 3]: {}", exact))
        );
    }

    #[test]
    fn test_content_is_unchanged() {
        let chunks = vec![chunk("1", "satu"), chunk("2", "dua")];
        let enriched = enrich_chunks(&chunks);

        for (original, enriched) in chunks.iter().zip(&enriched) {
            assert_eq!(&enriched.chunk, original);
        }
    }
}
