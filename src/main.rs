use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

mod caption;
mod cli;
mod config;
mod extract;
mod fetch;
mod filename;
mod models;
mod persist;
mod resolve;

use cli::Args;
use config::ScrapeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over -q / -v.
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(io::stderr)
        .init();

    debug!(?args, "arguments parsed");

    let link = match args.link.as_deref() {
        Some(link) => link.to_string(),
        None => prompt_for_link()?,
    };

    let config = ScrapeConfig::from_args(&args);
    let summary = extract::scrape_page(&link, &config)
        .await
        .with_context(|| format!("could not harvest images from {link}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        println!(
            "Found {} images, downloaded {} into {} ({} skipped, {} failed)",
            summary.discovered,
            summary.downloaded(),
            summary.directory.display(),
            summary.skipped.len(),
            summary.failed.len(),
        );
    }

    Ok(())
}

fn prompt_for_link() -> Result<String> {
    eprint!("Page URL: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read page URL from stdin")?;

    let link = line.trim();
    if link.is_empty() {
        bail!("no page URL given; pass --link or type one at the prompt");
    }
    Ok(link.to_string())
}
