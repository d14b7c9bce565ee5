//! Afwezigen - injured, suspended and doubtful players per team, in Dutch.
//!
//! Fetches the injuries list (cached for 12 hours), works out each team's
//! relevant fixture and prints who is missing. Keeps running and refreshes
//! every 12 hours unless `--once` is given.

mod refresh;
mod render;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use afwezigen_core::{ApiClient, Config, ResponseCache, Translations};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use refresh::Refresher;
use render::Renderer;

const USAGE: &str = "\
Usage: afwezigen [OPTIONS]

Options:
  --once         Refresh once, print and exit
  --html <PATH>  Also write the report as an HTML fragment to PATH
  --no-cache     Drop the cached response before the first refresh
  -h, --help     Show this help

Configuration is read from ~/.config/afwezigen/config.json and AFWEZIGEN_*
environment variables (a .env file is honoured). RUST_LOG controls logging.";

#[derive(Debug, Default, PartialEq)]
struct Args {
    once: bool,
    html: Option<PathBuf>,
    no_cache: bool,
    help: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--once" => parsed.once = true,
                "--no-cache" => parsed.no_cache = true,
                "-h" | "--help" => parsed.help = true,
                "--html" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--html needs a path"))?;
                    parsed.html = Some(PathBuf::from(path));
                }
                other => anyhow::bail!("Unknown argument: {}", other),
            }
        }
        Ok(parsed)
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "afwezigen.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    info!(url = %config.injuries_url, "Afwezigen starting");

    let translations = Translations::load(config.translations_file.as_deref())?;
    let cache = ResponseCache::new(config.cache_dir()?, config.cache_ttl())?;
    if args.no_cache {
        cache.clear().context("Failed to clear cache")?;
    }

    let api = ApiClient::new(&config)?;
    let refresher = Arc::new(Refresher::new(api, cache, translations, &config));
    let renderer = Renderer::new(args.html);

    if args.once {
        // Errors end the process here; the loop below logs and carries on instead
        if let Some(output) = refresher.refresh(Utc::now()).await? {
            renderer.publish(&output)?;
        }
        return Ok(());
    }

    let result = refresh::run(refresher, config.refresh_interval(), renderer).await;
    info!("Afwezigen shutting down");
    result
}
