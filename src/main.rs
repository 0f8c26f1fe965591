//! ipspan CLI - count distinct IPv4 addresses in a file.
//!
//! Run with:
//!     ipspan -n 8 -c 67108864 /path/to/ips.txt

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use ipspan::{CancelToken, CountConfig, Counter, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};

const MB: u64 = 1024 * 1024;

/// Count distinct IPv4 addresses in a newline-delimited file.
#[derive(Parser)]
#[command(name = "ipspan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File with one dotted-quad address per line
    file: PathBuf,

    /// Bytes of file handed to a worker per unit of work
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk: u64,

    /// Bytes added to every window to recover lines split across chunks
    #[arg(short, long, default_value_t = DEFAULT_OVERLAP)]
    overlap: u64,

    /// Number of parallel parsing workers
    #[arg(short = 'n', long, default_value_t = ipspan::default_workers())]
    workers: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    let config = CountConfig::new(cli.chunk, cli.overlap, cli.workers).context("Incorrect flags")?;

    info!(path = %cli.file.display(), "reading file");
    let file = File::open(&cli.file)
        .with_context(|| format!("Cannot open {}", cli.file.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("Cannot stat {}", cli.file.display()))?
        .len();
    info!("opened {} MB file", size / MB);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            warn!("interrupted, stopping workers");
            cancel.cancel();
        })
        .context("Failed to install signal handler")?;
    }

    let result = Counter::new(config).count_file(&file, size, &cancel);

    println!("Total unique IPs: {}", result.unique_count());

    if result.has_errors() {
        for err in result.errors() {
            error!("{}", err);
        }
        return Ok(ExitCode::FAILURE);
    }
    if result.was_cancelled() {
        warn!("run was interrupted, count is partial");
    }

    Ok(ExitCode::SUCCESS)
}
