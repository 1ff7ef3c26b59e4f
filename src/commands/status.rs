//! Status command - index summary from a running server

use anyhow::Result;
use colored::*;

use super::client::ApiClient;

pub async fn run(client: &ApiClient, json: bool) -> Result<()> {
    let status = client.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Index Status".bold());
    println!();
    println!("  {} {}", "server:".dimmed(), client.base_url());
    println!(
        "  {} {} pages indexed",
        "→".dimmed(),
        status.documents.to_string().cyan()
    );
    println!(
        "  {} model {} ({} dimensions)",
        "→".dimmed(),
        status.model.cyan(),
        status.dimension
    );

    let policy = status.on_embedding_failure.to_string();
    match status.on_embedding_failure {
        pagesearch::FailurePolicy::FallbackRandom => println!(
            "  {} on embedding failure: {} (results degrade silently)",
            "!".yellow(),
            policy.yellow()
        ),
        pagesearch::FailurePolicy::PropagateError => {
            println!("  {} on embedding failure: {}", "→".dimmed(), policy)
        }
    }

    match status.last_indexed {
        Some(ts) => println!(
            "  {} Last indexed: {}",
            "→".dimmed(),
            ts.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("  {} Nothing indexed yet", "→".dimmed()),
    }

    Ok(())
}
