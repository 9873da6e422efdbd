use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use incident_commander::{
    backend::{BackendClient, IncidentBackend},
    config::{Config, TransportMode},
    mcp::{self, McpServer},
    tools::IncidentTools,
};

#[derive(Parser, Debug)]
#[command(name = "incident-commander-mcp")]
#[command(about = "MCP server exposing Incident Commander tools to AI agents")]
struct Cli {
    /// Transport to serve on: stdio or sse (overrides TRANSPORT)
    #[arg(long)]
    transport: Option<String>,

    /// Bind host for the sse transport (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port for the sse transport (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Incident backend base URL (overrides API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(raw) = self.transport {
            match TransportMode::parse(&raw) {
                Some(mode) => config.server.transport = mode,
                None => warn!("Ignoring unknown --transport '{}'", raw),
            }
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.api_base_url {
            config.backend.base_url = url;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply(&mut config);
    info!("Loaded configuration: {:?}", config);

    let backend: Arc<dyn IncidentBackend> = Arc::new(BackendClient::new(&config.backend)?);
    info!("Using incident backend at {}", config.backend.base_url);

    let server = McpServer::new(IncidentTools::new(backend.clone()));
    let outcome = match config.server.transport {
        TransportMode::Stdio => mcp::serve_stdio(server).await,
        TransportMode::Sse => mcp::serve_http(server, &config.server.addr()).await,
    };

    drop(backend);
    info!("Backend client released");

    outcome?;
    Ok(())
}
