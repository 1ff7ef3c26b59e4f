//! Query command - semantic search against the server

use anyhow::Result;
use colored::Colorize;

use super::client::ApiClient;

/// Run query command
pub async fn run(client: &ApiClient, query: &str, top_k: Option<usize>, json: bool) -> Result<()> {
    let response = client.query(query, top_k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        response.results.len(),
        query.cyan()
    );
    println!();

    for (i, record) in response.results.iter().enumerate() {
        println!(
            "{}. {}",
            (i + 1).to_string().bold(),
            record.source_identifier.cyan()
        );
        println!("   {}", record.excerpt(100).dimmed());
        println!(
            "   {}",
            record.ingested_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
        println!();
    }

    Ok(())
}
