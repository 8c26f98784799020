//! Commands that run without the TUI: list, filter, tail, export

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dockscope_logs::{
    Container, ContainerContextManager, ContainerFilter, DisplayLine, ExportFormat, LineKind,
    LogExport, LogSource, NullSink, PresentationSink,
};

use crate::interactive::SHUTDOWN_TIMEOUT;

/// Prints each container's lines to stdout, prefixed with its name
pub struct StdoutSink {
    name: String,
}

impl StdoutSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `[HH:MM:SS] name: message` for log lines; `None` for header lines
    fn format(&self, line: &DisplayLine) -> Option<String> {
        match line.kind {
            LineKind::Log => Some(match line.text.split_once(' ') {
                Some((time, message)) => format!("[{}] {}: {}", time, self.name, message),
                None => format!("{}: {}", self.name, line.text),
            }),
            LineKind::Error => Some(format!("{}: {}", self.name, line.text)),
            LineKind::Info => None,
        }
    }
}

impl PresentationSink for StdoutSink {
    fn append_line(&self, line: DisplayLine) {
        if let Some(text) = self.format(&line) {
            // Reader went away (e.g. piped into head)
            let _ = writeln!(std::io::stdout().lock(), "{}", text);
        }
    }

    fn scroll_to_end(&self) {}
}

pub async fn list(source: &dyn LogSource) -> Result<()> {
    let containers = source
        .list_running_containers()
        .await
        .context("Failed to list containers")?;

    write_table(&mut std::io::stdout().lock(), &containers)?;
    Ok(())
}

/// Print the running containers `filter` keeps, as a table or JSON
pub async fn filter(source: &dyn LogSource, filter: &ContainerFilter, json: bool) -> Result<()> {
    let containers = source
        .list_running_containers()
        .await
        .context("Failed to list containers")?;
    let matched = filter.apply(containers);

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &matched)?;
        writeln!(out)?;
    } else if matched.is_empty() {
        writeln!(out, "No containers match the filter criteria")?;
    } else {
        write_table(&mut out, &matched)?;
    }
    Ok(())
}

fn write_table(out: &mut impl Write, containers: &[Container]) -> std::io::Result<()> {
    writeln!(out, "{:<12}  {:<30}  {:<30}  STATUS", "ID", "NAME", "IMAGE")?;
    for c in containers {
        writeln!(out, "{:<12}  {:<30}  {:<30}  {}", c.id, c.name, c.image, c.status)?;
    }
    Ok(())
}

/// Follow every running container until Ctrl+C or SIGTERM
pub async fn tail(source: Arc<dyn LogSource>) -> Result<()> {
    let containers = running(source.as_ref()).await?;
    let root = CancellationToken::new();
    let manager = ContainerContextManager::new(root.clone());

    manager.initialize_contexts(&containers, source.clone(), |container, _| {
        Arc::new(StdoutSink::new(container.name.clone())) as Arc<dyn PresentationSink>
    })?;
    info!(count = manager.count(), "tailing containers");

    shutdown_signal().await;

    root.cancel();
    manager.shutdown(SHUTDOWN_TIMEOUT).await;
    close(source.as_ref()).await;
    Ok(())
}

/// Stream for `wait`, then write a snapshot of every buffer as Markdown or JSON
pub async fn export(
    source: Arc<dyn LogSource>,
    format: ExportFormat,
    output: Option<&Path>,
    wait: Duration,
) -> Result<()> {
    let containers = running(source.as_ref()).await?;
    let root = CancellationToken::new();
    let manager = ContainerContextManager::new(root.clone());

    manager.initialize_contexts(&containers, source.clone(), |_, _| {
        Arc::new(NullSink) as Arc<dyn PresentationSink>
    })?;

    // Let the initial tail arrive
    tokio::time::sleep(wait).await;

    let export = LogExport::from_snapshot(manager.snapshot(), chrono::Utc::now());
    root.cancel();
    manager.shutdown(SHUTDOWN_TIMEOUT).await;
    close(source.as_ref()).await;

    let rendered = export.render(format)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            eprintln!(
                "Exported {} logs from {} containers to {}",
                export.summary.total_logs,
                export.summary.total_containers,
                path.display()
            );
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(rendered.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

async fn running(source: &dyn LogSource) -> Result<Vec<Container>> {
    let containers = source
        .list_running_containers()
        .await
        .context("Failed to list containers")?;
    if containers.is_empty() {
        warn!("no running containers");
    }
    Ok(containers)
}

async fn close(source: &dyn LogSource) {
    if let Err(e) = source.close().await {
        warn!("Failed to close Docker client: {:#}", e);
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
