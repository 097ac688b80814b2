use anyhow::Result;
use clap::{Parser, Subcommand};
use pdp_rag::error::KnowledgeBaseError;
use pdp_rag::paths::PlatformPaths;
use pdp_rag::{Config, KnowledgeBase, RagClient};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pdp-rag",
    about = "Tanya jawab UU No. 27 Tahun 2022 tentang Perlindungan Data Pribadi",
    version
)]
struct Cli {
    /// Path to a config.toml (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdio (default)
    Serve,

    /// Extract the knowledge base from the law's PDF
    Extract {
        /// PDF of UU No. 27 Tahun 2022
        #[arg(long)]
        pdf: PathBuf,
        /// Output JSON (default: configured knowledge base path)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Embed the knowledge base and upsert it into the vector index
    Ingest {
        /// Knowledge base JSON (default: configured knowledge base path)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Delete every vector in the namespace first
        #[arg(long)]
        reset: bool,
    },

    /// Run a retrieval query against the index
    Query {
        question: String,
        #[arg(long, default_value = "5")]
        top_k: usize,
    },

    /// Show vector index statistics
    Stats,

    /// Write a default config.toml (to --config, or the platform config directory)
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP frames, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => pdp_rag::mcp_server::serve_stdio(config_path).await,
        Command::Extract { pdf, output } => extract(config_path, &pdf, output),
        Command::Ingest { input, reset } => ingest(config_path, input, reset).await,
        Command::Query { question, top_k } => query(config_path, &question, top_k).await,
        Command::Stats => stats(config_path).await,
        Command::InitConfig { force } => init_config(config_path, force),
    }
}

fn extract(config_path: Option<&Path>, pdf: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    let output = output.unwrap_or_else(|| config.ingestion.knowledge_base_path.clone());

    let kb = KnowledgeBase::from_pdf(pdf, &config.ingestion.source_title)?;
    kb.save(&output)?;

    println!("Knowledge base written to {}", output.display());
    println!("  Pasal:    {}", kb.metadata.total_pasal);
    println!("  Definisi: {}", kb.metadata.total_definisi);
    Ok(())
}

fn init_config(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(PlatformPaths::default_config_path);

    Config::write_default(&path, force)?;
    println!("Config written to {}", path.display());
    println!("Set GEMINI_API_KEY and PINECONE_API_KEY in the environment; keys are never stored in the file.");
    Ok(())
}

async fn ingest(config_path: Option<&Path>, input: Option<PathBuf>, reset: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let input = input.unwrap_or_else(|| config.ingestion.knowledge_base_path.clone());

    let kb = load_knowledge_base(&input)?;
    let client = RagClient::with_config(config)?;
    let report = client.ingest(&kb, reset).await?;

    println!(
        "Ingested {} pasal and {} definisi: {} vectors in {} batches ({} ms)",
        report.pasal, report.definisi, report.vectors_upserted, report.batches, report.duration_ms
    );
    print_stats(&client).await
}

async fn query(config_path: Option<&Path>, question: &str, top_k: usize) -> Result<()> {
    let client = RagClient::with_config(Config::load(config_path)?)?;
    let results = client.query(question, top_k).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. {} ({:.3})", i + 1, result.reference(), result.score);
        println!("   {}", result.content.chars().take(200).collect::<String>());
    }
    Ok(())
}

async fn stats(config_path: Option<&Path>) -> Result<()> {
    let client = RagClient::with_config(Config::load(config_path)?)?;
    print_stats(&client).await
}

async fn print_stats(client: &RagClient) -> Result<()> {
    let stats = client.statistics().await?;

    println!("Total vectors: {}", stats.total_vectors);
    if let Some(dimension) = stats.dimension {
        println!("Dimension:     {}", dimension);
    }
    if let Some(fullness) = stats.index_fullness {
        println!("Fullness:      {:.2}%", fullness * 100.0);
    }
    for (namespace, count) in &stats.namespaces {
        let name = if namespace.is_empty() { "(default)" } else { namespace.as_str() };
        println!("  {}: {}", name, count);
    }
    Ok(())
}

fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    match KnowledgeBase::load(path) {
        Ok(kb) => Ok(kb),
        Err(e @ KnowledgeBaseError::NotFound(_)) => Err(anyhow::Error::new(e)
            .context("Run `pdp-rag extract --pdf <PATH>` first to build the knowledge base")),
        Err(e) => Err(e.into()),
    }
}
