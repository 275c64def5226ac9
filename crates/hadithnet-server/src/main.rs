//! Hadith.net server - same-origin API over the CDN dataset, or an offline
//! caching proxy in front of a running site.

mod cdn;
mod content;
mod error;
mod manifest;
mod proxy;
mod routes;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hadithnet_core::config::Config;
use hadithnet_core::worker::{CacheStorage, HttpNetwork, OfflineWorker};
use reqwest::Url;

const USAGE: &str = "\
Usage: hadithnet-server [OPTIONS]

Options:
  --bind <ADDR>       Address to listen on (default from config)
  --offline-proxy     Run the offline caching proxy instead of the API
  --origin <URL>      Origin the offline proxy forwards to
  -h, --help          Print this help";

#[derive(Debug, Default, PartialEq)]
struct Args {
    bind: Option<String>,
    offline_proxy: bool,
    origin: Option<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--bind" => {
                parsed.bind = Some(iter.next().context("--bind requires an address")?.clone())
            }
            "--origin" => {
                parsed.origin = Some(iter.next().context("--origin requires a URL")?.clone())
            }
            "--offline-proxy" => parsed.offline_proxy = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("Unknown argument: {}\n\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

/// Initialize logging to stderr, plus a daily log file when `log_dir` is set.
/// The returned guard must live until shutdown so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // RUST_LOG controls the level (e.g., RUST_LOG=hadithnet_server=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hadithnet-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
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

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let _log_guard = init_tracing(config.log_dir.as_deref());

    let bind = args.bind.unwrap_or_else(|| config.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    if args.offline_proxy {
        let origin = args
            .origin
            .or_else(|| config.origin_url.clone())
            .context("--offline-proxy needs --origin or HADITHNET_ORIGIN_URL")?;
        let origin: Url = origin
            .parse()
            .with_context(|| format!("Invalid origin URL: {}", origin))?;

        let cache_dir = config.worker_cache_dir()?;
        let caches = CacheStorage::persistent(cache_dir.clone())
            .with_context(|| format!("Failed to open worker caches at {}", cache_dir.display()))?;
        let worker = Arc::new(OfflineWorker::new(
            HttpNetwork::new()?,
            Arc::new(caches),
            origin.clone(),
            &config.cache_version,
        ));
        let report = worker.register().await;
        info!(
            %origin,
            caches = %cache_dir.display(),
            cached = report.cached.len(),
            failed = report.failed.len(),
            state = %worker.state(),
            "Offline proxy ready"
        );

        info!("Listening on http://{}", bind);
        axum::serve(listener, proxy::proxy_router(worker)).await?;
    } else {
        let state = Arc::new(routes::ServerState::from_config(&config)?);
        info!(
            cdn = %config.cdn_base_url,
            content_repo = state.content.is_some(),
            "Hadith API ready"
        );

        info!("Listening on http://{}", bind);
        axum::serve(listener, routes::router(state)).await?;
    }

    Ok(())
}
