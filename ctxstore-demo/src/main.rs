//! ctxstore demo
//!
//! Runs the theme and prompts scenarios against an in-process hub and prints
//! a JSON report of what each context observed.
//!
//! Usage:
//!   ctxstore-demo --backend file --data-file store.json

use anyhow::{Context, Result};
use clap::Parser;
use ctxstore_demo::{open_backend, BackendKind, Demo};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "ctxstore-demo")]
#[command(about = "Reactive key-value store shared across isolated contexts")]
struct Args {
    /// Storage backend for the background context
    #[arg(short, long, value_enum, default_value = "memory")]
    backend: BackendKind,

    /// JSON file used by the file backend
    #[arg(short, long, default_value = "ctxstore.json")]
    data_file: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("ctxstore demo starting ({:?} backend)", args.backend);
    let backend = open_backend(args.backend, &args.data_file).await?;
    let demo = Demo::start(backend)?;

    let theme = demo.theme_scenario().await?;
    let prompts = demo.prompts_scenario().await?;
    demo.shutdown().await;

    let report = json!({ "theme": theme, "prompts": prompts });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to render report")?
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .compact()
            .init();
    } else {
        let log_level = if verbose { Level::DEBUG } else { Level::INFO };
        FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_target(false)
            .compact()
            .init();
    }
}
