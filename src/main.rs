use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dockscope_docker::{DockerClient, LogWindow};
use dockscope_logs::{ContainerFilter, ExportFormat, LogSource};

mod config;
mod headless;
mod interactive;

use config::Config;

/// Dockscope - A terminal UI for viewing live Docker container logs
#[derive(Parser, Debug)]
#[command(name = "dockscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: the platform config dir, e.g. ~/.config/dockscope/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Docker host to try first, e.g. unix:///var/run/docker.sock or tcp://host:2375
    #[arg(long, global = true, value_name = "HOST")]
    host: Option<String>,

    /// Number of historical log lines to fetch per container
    #[arg(long, global = true, value_name = "N")]
    tail: Option<u64>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Only show log lines from this time on (RFC 3339, e.g. 2024-01-01T10:00:00Z)
    #[arg(long, global = true, value_name = "TIME", value_parser = parse_time)]
    since: Option<DateTime<Utc>>,

    /// Only show log lines up to this time (RFC 3339)
    #[arg(long, global = true, value_name = "TIME", value_parser = parse_time)]
    until: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List running containers
    List,

    /// List running containers matching every given pattern
    Filter {
        /// Substring of the container name
        #[arg(long)]
        name: Option<String>,

        /// Substring of the image name
        #[arg(long)]
        image: Option<String>,

        /// Substring of the image ID
        #[arg(long)]
        image_id: Option<String>,

        /// Substring of the status, e.g. "unhealthy"
        #[arg(long)]
        status: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Follow every running container's logs on stdout
    Tail,

    /// Snapshot recent logs from every running container
    Export {
        /// markdown or json
        #[arg(long, default_value = "markdown")]
        format: ExportFormat,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// How long to collect logs before exporting
        #[arg(long, default_value = "1000", value_name = "MS")]
        wait_ms: u64,
    },
}

/// Where tracing output goes
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(args.host, args.tail, args.log_file);

    // The TUI owns the terminal; headless runs without a TTY too
    let interactive = args.command.is_none() && std::io::stdout().is_terminal();

    let target = match (&config.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Discard,
        (None, false) => LogTarget::Stderr,
    };
    init_tracing(target)?;

    let window = LogWindow::new(args.since, args.until)?;
    let client = Arc::new(
        DockerClient::connect(config.docker_host.as_deref(), config.tail_lines)
            .await?
            .with_window(window),
    );
    let source: Arc<dyn LogSource> = client.clone();

    match args.command {
        Some(Command::List) => headless::list(source.as_ref()).await,
        Some(Command::Filter {
            name,
            image,
            image_id,
            status,
            json,
        }) => {
            let filter = ContainerFilter {
                name,
                image,
                image_id,
                status,
            };
            headless::filter(source.as_ref(), &filter, json).await
        }
        Some(Command::Tail) => headless::tail(source).await,
        Some(Command::Export {
            format,
            output,
            wait_ms,
        }) => {
            headless::export(source, format, output.as_deref(), Duration::from_millis(wait_ms))
                .await
        }
        None if interactive => interactive::run(config, client).await,
        None => headless::tail(source).await,
    }
}

fn parse_time(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 time such as 2024-01-01T10:00:00Z: {e}"))
}

/// Install the tracing subscriber, filtered by `RUST_LOG` (default `warn`)
fn init_tracing(target: LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        LogTarget::Discard => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}
