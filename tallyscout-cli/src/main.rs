use anyhow::{Context, Result};
use clap::Parser;
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};
use tallyscout::{pipeline, CliOverrides, CountConfig, DefaultCounter, StreamReporter};
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Count a term across files and URLs listed one per line on stdin
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Term to count (default: Go)
    #[arg(short = 't', long = "term")]
    term: Option<String>,

    /// Maximum number of inputs processed at once (default: 5)
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// HTTP request timeout in seconds (default: 10)
    #[arg(long = "timeout")]
    timeout_secs: Option<u64>,

    /// Configuration file, layered over the global and local ones
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            search_term: self.term.clone(),
            concurrency: self.concurrency,
            http_timeout_secs: self.timeout_secs,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    execute().await
}

async fn execute() -> Result<()> {
    let cli = Cli::parse();

    let config = CountConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());
    config.validate()?;

    init_logging(&config.log_level);
    debug!("Using configuration: {:?}", config);

    let counter = Arc::new(DefaultCounter::from_config(&config)?);
    let reporter = Arc::new(StreamReporter::new());
    let input = BufReader::new(tokio::io::stdin());

    let summary = pipeline::run(input, counter, reporter, &config)
        .await
        .context("counting aborted")?;

    println!("Total:{}", summary.total);
    Ok(())
}

/// Logs go to stderr so stdout carries only report lines
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
