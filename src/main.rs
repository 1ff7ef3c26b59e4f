mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::client::ApiClient;
use pagesearch::Config;

#[derive(Parser)]
#[command(name = "pagesearch")]
#[command(about = "Semantic search over browsed pages", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "YAML config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[cfg(feature = "server")]
    Serve {
        #[arg(long, help = "Bind host (overrides config)")]
        host: Option<String>,
        #[arg(long, help = "Bind port (overrides config)")]
        port: Option<u16>,
    },
    /// Index one page
    Index {
        #[arg(long, help = "Source URL of the page")]
        url: String,
        #[arg(long, help = "Page text")]
        text: Option<String>,
        #[arg(long, help = "Read page text from a file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Server URL (default: from config)")]
        server: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Find pages similar to a query
    Query {
        query: String,
        #[arg(long, short = 'k', help = "Number of results (default: 3)")]
        top_k: Option<usize>,
        #[arg(long, help = "Server URL (default: from config)")]
        server: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show an indexed page by id
    Report {
        #[arg(allow_negative_numbers = true)]
        id: i64,
        #[arg(long, help = "Server URL (default: from config)")]
        server: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show index status
    Status {
        #[arg(long, help = "Server URL (default: from config)")]
        server: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn client(config: &Config, server: Option<String>) -> Result<ApiClient> {
    let base_url = server.unwrap_or_else(|| config.server.base_url());
    ApiClient::new(&base_url)
}

/// Apply `serve --host/--port` on top of the loaded config.
#[cfg(feature = "server")]
fn with_serve_overrides(mut config: Config, command: &Commands) -> Result<Config> {
    if let Commands::Serve { host, port } = command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    #[cfg(feature = "server")]
    let config = with_serve_overrides(config, &cli.command)?;

    init_logging(&config);

    match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve { .. } => commands::serve::run(config).await,
        Commands::Index {
            url,
            text,
            file,
            server,
            json,
        } => commands::index::run(&client(&config, server)?, &url, text, file, json).await,
        Commands::Query {
            query,
            top_k,
            server,
            json,
        } => commands::query::run(&client(&config, server)?, &query, top_k, json).await,
        Commands::Report { id, server, json } => {
            commands::report::run(&client(&config, server)?, id, json).await
        }
        Commands::Status { server, json } => {
            commands::status::run(&client(&config, server)?, json).await
        }
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = parse(&["pagesearch", "serve", "--host", "0.0.0.0", "--port", "9001"]);
        let config = with_serve_overrides(Config::default(), &cli.command).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn test_other_commands_keep_loaded_config() {
        let cli = parse(&["pagesearch", "status", "--json"]);
        let mut loaded = Config::default();
        loaded.server.port = 0;

        // Only `serve` re-validates after overrides.
        let config = with_serve_overrides(loaded, &cli.command).unwrap();
        assert_eq!(config.server.port, 0);
    }

    #[test]
    fn test_serve_rejects_zero_port() {
        let cli = parse(&["pagesearch", "serve", "--port", "0"]);
        assert!(with_serve_overrides(Config::default(), &cli.command).is_err());
    }
}
