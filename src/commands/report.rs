//! Report command - show one indexed page

use anyhow::Result;
use colored::Colorize;

use super::client::ApiClient;

/// Run report command. Exits with status 1 when the id is unknown.
pub async fn run(client: &ApiClient, id: i64, json: bool) -> Result<()> {
    let Some(record) = client.report(id).await? else {
        if json {
            println!("{}", serde_json::json!({ "detail": "Page not found", "id": id }));
        } else {
            eprintln!("{} No page with id {}", "Error:".red().bold(), id);
        }
        std::process::exit(1);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{} {}", "Page".bold(), id.to_string().cyan());
        println!();
        println!("  {} {}", "url:".dimmed(), record.source_identifier);
        println!(
            "  {} {}",
            "indexed:".dimmed(),
            record.ingested_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!();
        println!("{}", record.text);
    }

    Ok(())
}
