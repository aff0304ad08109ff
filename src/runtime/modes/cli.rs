//! CLI mode
//!
//! One-shot commands that reuse the server's lookup pipeline.

use anyhow::{Context, Result};

use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::services::ResponseShape;

/// Look up one address and print it to stdout.
///
/// Runs through the same cache, bogon filter and database as the server.
/// `self`/`me` cannot be used here since there is no peer connection.
pub async fn run_lookup(
    config: &StaticConfig,
    addr: &str,
    pretty: bool,
    filter: Option<&str>,
) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config).await?;

    let shape = match ResponseShape::from_request(filter, None) {
        ResponseShape::Full { .. } => ResponseShape::Full { pretty },
        filtered => filtered,
    };

    let outcome = startup
        .lookup_service
        .lookup(addr, None)
        .await
        .map_err(|e| anyhow::anyhow!(e.format_colored()))?;

    let body = shape.render(outcome.result.as_ref())?;
    let text = String::from_utf8(body).context("Lookup output is not valid UTF-8")?;

    // full mode already ends with a newline
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    Ok(())
}

/// Write a sample configuration file, or print it when no path is given.
pub fn run_generate_config(output_path: Option<&str>) -> Result<()> {
    match output_path {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .with_context(|| format!("Failed to write sample config to {}", path))?;
            println!("Sample configuration written to {}", path);
        }
        None => print!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
