//! Serve command - run the HTTP server

use anyhow::Result;
use tracing::warn;

use pagesearch::server::run_server;
use pagesearch::{Config, FailurePolicy, SearchEngine};

pub async fn run(config: Config) -> Result<()> {
    let engine = SearchEngine::from_config(&config)?;

    if config.embedding.on_failure == FailurePolicy::FallbackRandom {
        warn!(
            endpoint = %config.embedding.endpoint,
            "embedding failures fall back to random vectors; results degrade silently while the service is down"
        );
    }

    run_server(engine, &config.server).await
}
