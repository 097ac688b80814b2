//! Degraded-mode server, served when the RAG client cannot be constructed.

use crate::types::{ServerStatusRequest, TanyaPdpRequest};
use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};

#[derive(Clone)]
pub struct FallbackMcpServer {
    server_name: String,
    reason: String,
    tool_router: ToolRouter<Self>,
}

impl FallbackMcpServer {
    pub fn new(server_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            reason: reason.into(),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl FallbackMcpServer {
    #[tool(description = "Tanya jawab UU PDP (saat ini tidak tersedia)")]
    async fn tanya_pdp(&self, Parameters(_req): Parameters<TanyaPdpRequest>) -> String {
        format!(
            "Layanan tanya jawab UU PDP sedang tidak tersedia.\n\nPenyebab: {}",
            self.reason
        )
    }

    #[tool(description = "Tampilkan status server dan penyebab mode terbatas")]
    async fn server_status(&self, Parameters(_req): Parameters<ServerStatusRequest>) -> String {
        format!(
            "Status: mode terbatas\nServer: {}\nVersi: {}\nPenyebab: {}\n\n\
             Periksa GEMINI_API_KEY dan PINECONE_API_KEY, lalu jalankan ulang server.",
            self.server_name,
            env!("CARGO_PKG_VERSION"),
            self.reason
        )
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for FallbackMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.server_name.clone(),
                title: Some("Asisten UU Perlindungan Data Pribadi (mode terbatas)".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Server berjalan dalam mode terbatas: {}. Gunakan server_status untuk detail.",
                self.reason
            )),
        }
    }
}
