//! Question-answering handlers behind the MCP tools.
//!
//! Every handler turns retrieval results into Indonesian Markdown. Empty
//! retrieval is a normal outcome and renders a "not found" message; upstream
//! failures propagate as errors.

use crate::retriever::{PdpRetriever, RetrievalResult};
use anyhow::Result;
use std::sync::Arc;

pub const TANYA_TOP_K: usize = 5;
pub const TANYA_MAX_TOKENS: usize = 4000;
pub const CARI_PASAL_MAX: i64 = 10;
/// Results listed by the rights, obligations and sanctions overviews
pub const OVERVIEW_TOP_K: usize = 8;

const DEFINISI_PREVIEW_CHARS: usize = 500;

const HAK_QUERY: &str = "hak subjek data pribadi mendapatkan informasi akses menolak meminta hapus";
const KEWAJIBAN_QUERY: &str =
    "kewajiban pengendali prosesor data pribadi wajib harus menjaga keamanan";
const SANKSI_UMUM_QUERY: &str = "sanksi pelanggaran pidana administratif denda penjara";

const FOOTER_ADMINISTRATIF: &str = "\n---\n_Sanksi administratif dapat berupa: peringatan tertulis, penghentian sementara kegiatan pemrosesan, penghapusan data pribadi, dan/atau denda administratif._\n";
const FOOTER_PIDANA: &str = "\n---\n_Sanksi pidana dapat berupa pidana penjara dan/atau denda sesuai dengan tingkat pelanggaran._\n";

/// Kind of sanction requested by `sanksi_pelanggaran`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JenisSanksi {
    /// Chapter X
    Administratif,
    /// Chapter XIV
    Pidana,
    /// Unrecognized value: searched without a chapter filter, echoed in the title
    Lainnya(String),
}

impl JenisSanksi {
    /// `None` for a missing or blank value
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        Some(match value.to_lowercase().as_str() {
            "administratif" => Self::Administratif,
            "pidana" => Self::Pidana,
            _ => Self::Lainnya(value.to_string()),
        })
    }

    fn query(&self) -> &'static str {
        match self {
            Self::Administratif => "sanksi administratif peringatan tertulis penghentian denda",
            Self::Pidana => "sanksi pidana penjara denda tahun",
            Self::Lainnya(_) => SANKSI_UMUM_QUERY,
        }
    }

    fn bab(&self) -> Option<&'static str> {
        match self {
            Self::Administratif => Some("X"),
            Self::Pidana => Some("XIV"),
            Self::Lainnya(_) => None,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Administratif => "Administratif".to_string(),
            Self::Pidana => "Pidana".to_string(),
            Self::Lainnya(value) => title_case(value),
        }
    }

    fn footer(&self) -> Option<&'static str> {
        match self {
            Self::Administratif => Some(FOOTER_ADMINISTRATIF),
            Self::Pidana => Some(FOOTER_PIDANA),
            Self::Lainnya(_) => None,
        }
    }
}

/// Tool handlers over a shared retriever
#[derive(Clone)]
pub struct PdpTools {
    retriever: Arc<PdpRetriever>,
}

impl PdpTools {
    pub fn new(retriever: Arc<PdpRetriever>) -> Self {
        Self { retriever }
    }

    /// General question: bounded context plus a reference list
    pub async fn tanya_pdp(&self, pertanyaan: &str) -> Result<String> {
        let (context, results) = self
            .retriever
            .get_context_for_query(pertanyaan, TANYA_TOP_K, TANYA_MAX_TOKENS)
            .await?;

        if results.is_empty() {
            return Ok(
                "Maaf, saya tidak menemukan informasi yang relevan dalam UU PDP untuk pertanyaan Anda."
                    .to_string(),
            );
        }

        let mut response = format!(
            "Berdasarkan UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi:\n\n{}\n\n---\nReferensi yang digunakan:\n",
            context
        );
        for (i, result) in results.iter().enumerate() {
            response.push_str(&format!(
                "\n{}. {} (relevansi: {})",
                i + 1,
                result.reference(),
                format_relevance(result.score)
            ));
        }

        Ok(response)
    }

    /// Keyword search over articles, optionally within one chapter
    pub async fn cari_pasal(
        &self,
        keyword: &str,
        bab: Option<&str>,
        jumlah_hasil: i64,
    ) -> Result<String> {
        let top_k = clamp_jumlah_hasil(jumlah_hasil);
        let bab = bab.map(str::trim).filter(|b| !b.is_empty());
        let results = self.retriever.search_pasal(keyword, top_k, bab).await?;

        if results.is_empty() {
            let mut message = format!("Tidak ditemukan pasal yang relevan dengan '{}'", keyword);
            if let Some(bab) = bab {
                message.push_str(&format!(" pada BAB {}", bab));
            }
            return Ok(message);
        }

        let mut response = format!("Hasil pencarian pasal untuk '{}'", keyword);
        if let Some(bab) = bab {
            response.push_str(&format!(" (BAB {})", bab));
        }
        response.push_str(":\n\n");

        for (i, result) in results.iter().enumerate() {
            response.push_str(&format!(
                "**{}. {}** (relevansi: {})\n{}\n\n",
                i + 1,
                result.reference(),
                format_relevance(result.score),
                result.content
            ));
        }

        Ok(response)
    }

    /// Definition lookup: Article 1 definitions first, then chapter I articles
    pub async fn definisi_istilah(&self, istilah: &str) -> Result<String> {
        let mut results = self.retriever.search_definisi(istilah, 2).await?;
        let pasal = self
            .retriever
            .search_pasal(&format!("definisi {} adalah", istilah), 3, Some("I"))
            .await?;
        results.extend(pasal);

        if results.is_empty() {
            return Ok(format!(
                "Tidak ditemukan definisi untuk istilah '{}' dalam UU PDP.",
                istilah
            ));
        }

        let mut response = format!("Definisi '{}' dalam UU PDP:\n\n", istilah);
        for (i, result) in results.iter().take(3).enumerate() {
            let n = i + 1;
            if metadata_str(result, "type") == Some("definisi") {
                response.push_str(&format!(
                    "{}. **{}**\n   {}\n   _(Sumber: {})_\n\n",
                    n,
                    metadata_str(result, "istilah").unwrap_or(istilah),
                    metadata_str(result, "definisi").unwrap_or(&result.content),
                    metadata_str(result, "sumber").unwrap_or("UU PDP")
                ));
            } else {
                response.push_str(&format!(
                    "{}. Berdasarkan **{}**:\n   {}\n\n",
                    n,
                    metadata_str(result, "full_reference").unwrap_or("UU PDP"),
                    preview(&result.content, DEFINISI_PREVIEW_CHARS)
                ));
            }
        }

        Ok(response)
    }

    /// Rights of the data subject (chapter IV)
    pub async fn hak_subjek_data(&self) -> Result<String> {
        let results = self.overview_search(HAK_QUERY, "IV").await?;
        if results.is_empty() {
            return Ok("Tidak ditemukan pasal tentang hak subjek data pribadi dalam UU PDP.".to_string());
        }

        let mut response = String::from(
            "# Hak-Hak Subjek Data Pribadi (UU No. 27 Tahun 2022)\n\n\
             Berdasarkan UU Perlindungan Data Pribadi, subjek data memiliki hak-hak berikut:\n\n",
        );
        push_sections(&mut response, &results);
        response.push_str(
            "\n---\n_Catatan: Hak-hak ini diatur dalam BAB IV UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi._\n",
        );

        Ok(response)
    }

    /// Obligations of controllers and processors (chapter VIII)
    pub async fn kewajiban_pengendali(&self) -> Result<String> {
        let results = self.overview_search(KEWAJIBAN_QUERY, "VIII").await?;
        if results.is_empty() {
            return Ok(
                "Tidak ditemukan pasal tentang kewajiban pengendali dan prosesor data pribadi dalam UU PDP."
                    .to_string(),
            );
        }

        let mut response = String::from(
            "# Kewajiban Pengendali dan Prosesor Data Pribadi\n\n\
             Berdasarkan UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi:\n\n",
        );
        push_sections(&mut response, &results);

        Ok(response)
    }

    /// Sanctions, filtered by kind when one is given
    pub async fn sanksi_pelanggaran(&self, jenis_sanksi: Option<&str>) -> Result<String> {
        let jenis = JenisSanksi::parse(jenis_sanksi);
        let query = jenis.as_ref().map_or(SANKSI_UMUM_QUERY, JenisSanksi::query);
        let bab = jenis.as_ref().and_then(JenisSanksi::bab);

        let results = self
            .retriever
            .search_pasal(query, OVERVIEW_TOP_K, bab)
            .await?;

        let mut title = String::from("Sanksi Pelanggaran UU Perlindungan Data Pribadi");
        if let Some(jenis) = &jenis {
            title.push_str(&format!(" ({})", jenis.label()));
        }

        if results.is_empty() {
            return Ok(format!(
                "# {}\n\nTidak ditemukan pasal tentang sanksi yang relevan dalam UU PDP.",
                title
            ));
        }

        let mut response = format!("# {}\n\nBerdasarkan UU No. 27 Tahun 2022:\n\n", title);
        push_sections(&mut response, &results);
        if let Some(footer) = jenis.as_ref().and_then(JenisSanksi::footer) {
            response.push_str(footer);
        }

        Ok(response)
    }

    /// Chapter-scoped article search, widened to the whole law when the chapter is empty
    async fn overview_search(&self, query: &str, bab: &str) -> Result<Vec<RetrievalResult>> {
        let results = self
            .retriever
            .search_pasal(query, OVERVIEW_TOP_K, Some(bab))
            .await?;
        if !results.is_empty() {
            return Ok(results);
        }

        tracing::debug!("No results in BAB {}, falling back to all articles", bab);
        self.retriever
            .search_pasal(query, OVERVIEW_TOP_K, None)
            .await
    }
}

/// `jumlah_hasil` clamped to `1..=10`
pub fn clamp_jumlah_hasil(jumlah_hasil: i64) -> usize {
    jumlah_hasil.clamp(1, CARI_PASAL_MAX) as usize
}

/// Score as a percentage with two decimals, e.g. `0.9512` -> `95.12%`
pub fn format_relevance(score: f32) -> String {
    format!("{:.2}%", score * 100.0)
}

fn metadata_str<'a>(result: &'a RetrievalResult, key: &str) -> Option<&'a str> {
    result.metadata.get(key).and_then(|v| v.as_str())
}

fn push_sections(response: &mut String, results: &[RetrievalResult]) {
    for (i, result) in results.iter().enumerate() {
        response.push_str(&format!(
            "## {}. {}\n{}\n\n",
            i + 1,
            result.reference(),
            result.content
        ));
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
