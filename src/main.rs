use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coachline::{Config, ContextEngine, HttpBackend, Variant};

/// Coachline - conversational coaching client with pinned context
#[derive(Parser)]
#[command(name = "coachline", version, about)]
struct Cli {
    /// Coaching product ("strategy" or "nutrition")
    #[arg(long)]
    variant: Option<Variant>,

    /// Assistant backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds to wait for a single answer
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory exported pin boards are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive coaching session (default)
    Chat,
    /// Print a markdown file as plain text
    Sanitize {
        /// File to read
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "warn,coachline=info",
        2 => "info,coachline=debug",
        _ => "trace",
    };

    // stdout belongs to the conversation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Command::Sanitize { path }) = &cli.command {
        let text = std::fs::read_to_string(path)?;
        println!("{}", coachline::sanitize(&text));
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(secs) = cli.timeout_secs {
        anyhow::ensure!(secs > 0, "--timeout-secs must be at least 1");
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }
    tracing::debug!(?config, "loaded configuration");

    let backend = HttpBackend::new(&config.api_url, config.request_timeout)?;
    tracing::info!(
        variant = %config.variant,
        backend = %config.api_url,
        "starting coaching session"
    );

    let engine = ContextEngine::new(
        config.variant.engine_config(),
        Arc::new(backend),
        config.request_timeout,
    );

    coachline::console::run(engine, &config.export_dir).await
}
