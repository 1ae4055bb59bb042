//! CLI entry point for the gallery crawler.

use std::io::IsTerminal;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use gallery_core::GalleryCrawler;
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, sources) = cli::parse_with_sources();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = args
        .config
        .as_deref()
        .map(app_config::load_file_config)
        .transpose()?;
    let config = app_config::resolve_crawl_config(&args, &sources, file_config.as_ref())?;
    info!(
        base_url = %config.base_url,
        output_dir = %config.output_dir.display(),
        concurrency = config.concurrency,
        "Gallery crawler starting"
    );

    let crawler = GalleryCrawler::from_config(config).context("Invalid crawl settings")?;
    let use_spinner = progress::should_use_spinner(std::io::stderr().is_terminal(), args.quiet);
    let (spinner, stop) = progress::spawn_progress_ui(use_spinner, crawler.clone());
    let outcome = crawler.run().await;
    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }
    if let Err(error) = crawler.close().await {
        warn!(error = %error, "Failed to close browser session");
    }
    let catalog = outcome.context("Gallery crawl failed")?;

    let catalog_path = crawler.catalog_path();
    catalog
        .save(&catalog_path)
        .await
        .with_context(|| format!("Failed to write catalog '{}'", catalog_path.display()))?;

    info!(
        categories = catalog.categories.len(),
        images = catalog.images.len(),
        "Crawl complete"
    );
    if !args.quiet {
        println!(
            "Crawled {} categories and {} images into {}",
            catalog.categories.len(),
            catalog.images.len(),
            catalog_path.display()
        );
    }

    Ok(())
}
