use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request for a free-form question about the law
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TanyaPdpRequest {
    /// Pertanyaan tentang UU PDP (e.g., "Apa saja hak subjek data pribadi?")
    pub pertanyaan: String,
}

/// Request to search articles by keyword
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CariPasalRequest {
    /// Kata kunci pencarian
    pub keyword: String,
    /// Optional chapter filter as a roman numeral (e.g., "IV")
    #[serde(default)]
    pub bab: Option<String>,
    /// Jumlah hasil (default: 5, dibatasi 1 sampai 10)
    #[serde(default = "default_jumlah_hasil")]
    pub jumlah_hasil: i64,
}

fn default_jumlah_hasil() -> i64 {
    5
}

/// Request for the definition of a legal term
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DefinisiIstilahRequest {
    /// Istilah yang dicari (e.g., "Data Pribadi", "Pengendali Data Pribadi")
    pub istilah: String,
}

/// Request to list data subject rights (no parameters)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HakSubjekDataRequest {}

/// Request to list controller obligations (no parameters)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct KewajibanPengendaliRequest {}

/// Request for sanctions
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SanksiPelanggaranRequest {
    /// Jenis sanksi: "administratif" atau "pidana". Kosongkan untuk semua sanksi.
    #[serde(default)]
    pub jenis_sanksi: Option<String>,
}

/// Request for server status (no parameters)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ServerStatusRequest {}

fn require_non_blank(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}

impl TanyaPdpRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(&self.pertanyaan, "pertanyaan")
    }
}

impl CariPasalRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(&self.keyword, "keyword")
    }
}

impl DefinisiIstilahRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(&self.istilah, "istilah")
    }
}
