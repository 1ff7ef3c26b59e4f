//! Index command - send one page to the server

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use super::client::ApiClient;

/// Run index command
pub async fn run(
    client: &ApiClient,
    url: &str,
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(_), Some(_)) => bail!("Pass either --text or --file, not both"),
        (None, None) => bail!("Nothing to index: pass --text or --file"),
    };

    let response = client.index(url, &text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!(
            "{} Indexed {} as id {}",
            "✓".green().bold(),
            url.cyan(),
            response.id.to_string().bold()
        );
        println!(
            "  {} {} characters",
            "→".dimmed(),
            text.chars().count()
        );
    }

    Ok(())
}
