use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docqa::connector::adapter::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use docqa::connector::http;
use docqa::domain::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use docqa::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, env = "DOCQA_DATA_DIR", default_value = "~/.docqa")]
    data_dir: String,

    /// Keep documents in memory only
    #[arg(long, global = true, env = "DOCQA_MEMORY_STORAGE")]
    memory_storage: bool,

    #[arg(long, global = true, env = "DOCQA_MOCK_EMBEDDINGS")]
    mock_embeddings: bool,

    /// Answer with canned responses instead of calling the LLM
    #[arg(long, global = true)]
    mock_llm: bool,

    #[arg(long, global = true, env = "DOCQA_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long, global = true, env = "DOCQA_CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: Option<String>,

    #[arg(long, global = true, env = "GROQ_MODEL", default_value = DEFAULT_MODEL)]
    groq_model: String,

    #[arg(long, global = true, env = "GROQ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    groq_base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = expand_tilde(&cli.data_dir);
    debug!("Using data directory {}", data_dir);

    let container = Container::new(ContainerConfig {
        data_dir,
        memory_storage: cli.memory_storage,
        mock_embeddings: cli.mock_embeddings,
        mock_llm: cli.mock_llm,
        chunk_size: cli.chunk_size,
        chunk_overlap: cli.chunk_overlap,
        groq_api_key: cli.groq_api_key,
        groq_model: cli.groq_model,
        groq_base_url: cli.groq_base_url,
    })
    .await?;

    if let Commands::Serve { port, public } = cli.command {
        let ip = if public {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        return http::serve(Arc::new(container), SocketAddr::new(ip, port)).await;
    }

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn ask_accepts_document_scope() {
        let cli = Cli::try_parse_from(["docqa", "--mock-llm", "ask", "What?", "--document", "3"])
            .unwrap();
        assert!(cli.mock_llm);
        match cli.command {
            Commands::Ask { question, document } => {
                assert_eq!(question, "What?");
                assert_eq!(document, Some(3));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn delete_requires_numeric_id() {
        assert!(Cli::try_parse_from(["docqa", "delete", "abc"]).is_err());
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/docqa"), "/var/lib/docqa");
    }
}
