//! Hadith.net reader - a terminal hadith reader that keeps working offline.
//!
//! Everything fetched is kept in the local cache, so books that have been
//! opened once stay readable without a connection.

mod args;
mod commands;
mod output;

use std::io;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hadithnet_core::config::Config;

use commands::Reader;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args::parse(&args)?;
    debug!(?command, "Running command");

    let config = Config::load()?;
    let mut reader = Reader::open(config)?;
    reader.run(command).await
}
