use crate::client::RagClient;
use crate::config::{Config, ServerConfig};
use crate::error::RagError;
use crate::tools::PdpTools;
use crate::types::*;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::prompt::PromptRouter, tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    RoleServer,
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router,
};
use std::path::Path;

mod fallback;

pub use fallback::FallbackMcpServer;

#[derive(Clone)]
pub struct PdpMcpServer {
    tools: PdpTools,
    server_name: String,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl PdpMcpServer {
    /// Create a server answering from the client's retriever
    pub fn new(client: &RagClient) -> Self {
        Self::with_tools(
            PdpTools::new(client.retriever()),
            client.config().server.name.clone(),
        )
    }

    pub fn with_tools(tools: PdpTools, server_name: impl Into<String>) -> Self {
        Self {
            tools,
            server_name: server_name.into(),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

/// Render a tool failure for the MCP client
fn tool_error(err: impl Into<RagError>) -> String {
    let err = err.into();
    if err.is_user_error() {
        tracing::debug!("Rejected tool call: {}", err);
    } else {
        tracing::error!("Tool call failed: {}", err);
    }
    err.to_user_string()
}

#[tool_router(router = tool_router)]
impl PdpMcpServer {
    #[tool(
        description = "Jawab pertanyaan umum tentang UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi berdasarkan pasal-pasal yang relevan"
    )]
    async fn tanya_pdp(
        &self,
        Parameters(req): Parameters<TanyaPdpRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(tool_error)?;

        self.tools
            .tanya_pdp(&req.pertanyaan)
            .await
            .map_err(tool_error)
    }

    #[tool(
        description = "Cari pasal UU PDP berdasarkan kata kunci, opsional dibatasi pada satu BAB (angka romawi)"
    )]
    async fn cari_pasal(
        &self,
        Parameters(req): Parameters<CariPasalRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(tool_error)?;

        self.tools
            .cari_pasal(&req.keyword, req.bab.as_deref(), req.jumlah_hasil)
            .await
            .map_err(tool_error)
    }

    #[tool(description = "Cari definisi istilah hukum yang diatur dalam UU PDP")]
    async fn definisi_istilah(
        &self,
        Parameters(req): Parameters<DefinisiIstilahRequest>,
    ) -> Result<String, String> {
        req.validate().map_err(tool_error)?;

        self.tools
            .definisi_istilah(&req.istilah)
            .await
            .map_err(tool_error)
    }

    #[tool(description = "Daftar hak-hak subjek data pribadi menurut UU PDP (BAB IV)")]
    async fn hak_subjek_data(
        &self,
        Parameters(_req): Parameters<HakSubjekDataRequest>,
    ) -> Result<String, String> {
        self.tools.hak_subjek_data().await.map_err(tool_error)
    }

    #[tool(
        description = "Daftar kewajiban pengendali dan prosesor data pribadi menurut UU PDP (BAB VIII)"
    )]
    async fn kewajiban_pengendali(
        &self,
        Parameters(_req): Parameters<KewajibanPengendaliRequest>,
    ) -> Result<String, String> {
        self.tools.kewajiban_pengendali().await.map_err(tool_error)
    }

    #[tool(
        description = "Sanksi atas pelanggaran UU PDP, bisa difilter menjadi sanksi administratif (BAB X) atau pidana (BAB XIV)"
    )]
    async fn sanksi_pelanggaran(
        &self,
        Parameters(req): Parameters<SanksiPelanggaranRequest>,
    ) -> Result<String, String> {
        self.tools
            .sanksi_pelanggaran(req.jenis_sanksi.as_deref())
            .await
            .map_err(tool_error)
    }
}

// Prompts for slash commands
#[prompt_router]
impl PdpMcpServer {
    #[prompt(
        name = "tanya",
        description = "Ajukan pertanyaan tentang UU Perlindungan Data Pribadi"
    )]
    async fn tanya_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        let pertanyaan = args
            .get("pertanyaan")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Gunakan tool tanya_pdp untuk menjawab pertanyaan berikut berdasarkan UU No. 27 Tahun 2022: {}",
                pertanyaan
            ),
        )])
    }

    #[prompt(
        name = "cari",
        description = "Cari pasal UU PDP berdasarkan kata kunci"
    )]
    async fn cari_prompt(
        &self,
        Parameters(args): Parameters<serde_json::Value>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        let keyword = args.get("keyword").and_then(|v| v.as_str()).unwrap_or("");
        let mut text = format!(
            "Gunakan tool cari_pasal untuk mencari pasal dengan kata kunci '{}'",
            keyword
        );
        if let Some(bab) = args.get("bab").and_then(|v| v.as_str()) {
            text.push_str(&format!(" pada BAB {}", bab));
        }
        text.push('.');

        Ok(vec![PromptMessage::new_text(PromptMessageRole::User, text)])
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler]
impl ServerHandler for PdpMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: self.server_name.clone(),
                title: Some("Asisten UU Perlindungan Data Pribadi".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Asisten tanya jawab UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi. \
                Gunakan tanya_pdp untuk pertanyaan umum, cari_pasal untuk mencari pasal, \
                definisi_istilah untuk definisi istilah, hak_subjek_data untuk hak subjek data, \
                kewajiban_pengendali untuk kewajiban pengendali dan prosesor, \
                serta sanksi_pelanggaran untuk sanksi administratif atau pidana."
                    .into(),
            ),
        }
    }
}

/// Serve over stdio, degrading to [`FallbackMcpServer`] when the RAG client
/// cannot be built so the MCP host still gets a diagnosable server.
pub async fn serve_stdio(config_path: Option<&Path>) -> Result<()> {
    let (server_name, client) = match Config::load(config_path) {
        Ok(config) => (config.server.name.clone(), RagClient::with_config(config)),
        Err(e) => (ServerConfig::default().name, Err(e)),
    };

    let transport = rmcp::transport::io::stdio();

    match client {
        Ok(client) => {
            tracing::info!("Starting {} MCP server", server_name);
            let server = PdpMcpServer::new(&client);
            server.serve(transport).await?.waiting().await?;
        }
        Err(e) => {
            tracing::warn!("RAG client unavailable, starting in degraded mode: {}", e);
            let server = FallbackMcpServer::new(server_name, e.to_string());
            server.serve(transport).await?.waiting().await?;
        }
    }

    Ok(())
}
