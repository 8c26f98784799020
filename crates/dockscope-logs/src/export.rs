//! Export of buffered logs as Markdown or JSON, for pasting into other tools.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Container, ContainerLogContext, LogEntry, Result};

/// Substrings (lowercase) that count a message as an error
const ERROR_MARKERS: [&str; 3] = ["error", "exception", "fail"];

/// How many images the summary lists
const TOP_IMAGES: usize = 5;

const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported format: {other} (supported: json, markdown)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContainerLogs {
    pub container: Container,
    pub log_count: usize,
    pub logs: Vec<LogEntry>,
    pub time_range: Option<TimeRange>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ExportSummary {
    pub total_containers: usize,
    pub total_logs: usize,
    pub time_range: Option<TimeRange>,
    pub top_images: Vec<String>,
    pub error_count: usize,
}

/// Point-in-time copy of every container's buffered logs
#[derive(Clone, Debug, Serialize)]
pub struct LogExport {
    pub generated_at: DateTime<Utc>,
    pub containers: Vec<ContainerLogs>,
    pub summary: ExportSummary,
}

impl LogExport {
    pub fn from_contexts(contexts: &[Arc<ContainerLogContext>]) -> Self {
        let snapshot = contexts
            .iter()
            .map(|c| (c.container().clone(), c.log_buffer()))
            .collect();
        Self::from_snapshot(snapshot, Utc::now())
    }

    /// Build from `(container, entries)` pairs. Containers with no entries are left out.
    pub fn from_snapshot(
        snapshot: Vec<(Container, Vec<LogEntry>)>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut containers = Vec::new();
        let mut image_counts: HashMap<String, usize> = HashMap::new();
        let mut error_count = 0;
        let mut overall: Option<TimeRange> = None;

        for (container, logs) in snapshot {
            if logs.is_empty() {
                continue;
            }

            error_count += logs.iter().filter(|e| is_error(&e.message)).count();
            *image_counts.entry(container.image.clone()).or_default() += 1;

            let time_range = time_range(&logs);
            if let Some(range) = time_range {
                overall = Some(match overall {
                    Some(o) => TimeRange {
                        start: o.start.min(range.start),
                        end: o.end.max(range.end),
                    },
                    None => range,
                });
            }

            containers.push(ContainerLogs {
                container,
                log_count: logs.len(),
                logs,
                time_range,
            });
        }

        let summary = ExportSummary {
            total_containers: containers.len(),
            total_logs: containers.iter().map(|c| c.log_count).sum(),
            time_range: overall,
            top_images: top_images(image_counts),
            error_count,
        };

        Self {
            generated_at,
            containers,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn render(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Markdown => Ok(self.to_markdown()),
            ExportFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Docker Container Logs Summary\n\n");
        let s = &self.summary;

        // Writing to a String cannot fail
        let _ = writeln!(md, "Generated at: {}\n", self.generated_at.format(EXPORT_TIME_FORMAT));
        let _ = writeln!(md, "- Containers: {}", s.total_containers);
        let _ = writeln!(md, "- Log entries: {}", s.total_logs);
        let _ = writeln!(md, "- Errors: {}", s.error_count);
        if !s.top_images.is_empty() {
            let _ = writeln!(md, "- Top images: {}", s.top_images.join(", "));
        }
        if let Some(range) = s.time_range {
            let _ = writeln!(md, "- Time range: {}", format_range(range));
        }
        md.push('\n');

        for c in &self.containers {
            let _ = writeln!(md, "## Container: {}", c.container.name);
            let _ = writeln!(md, "- Image: {}", c.container.image);
            let _ = writeln!(md, "- Status: {}", c.container.status);
            let _ = writeln!(md, "- Log entries: {}\n", c.log_count);

            md.push_str("```\n");
            for entry in &c.logs {
                let _ = writeln!(
                    md,
                    "[{}] {}",
                    entry.timestamp.format(EXPORT_TIME_FORMAT),
                    entry.message
                );
            }
            md.push_str("```\n\n");
        }

        md
    }
}

fn is_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    ERROR_MARKERS.iter().any(|m| lower.contains(m))
}

fn time_range(logs: &[LogEntry]) -> Option<TimeRange> {
    let start = logs.iter().map(|e| e.timestamp).min()?;
    let end = logs.iter().map(|e| e.timestamp).max()?;
    Some(TimeRange { start, end })
}

/// Most frequent first; ties broken by name so output is stable
fn top_images(counts: HashMap<String, usize>) -> Vec<String> {
    let mut images: Vec<_> = counts.into_iter().collect();
    images.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    images.into_iter().take(TOP_IMAGES).map(|(name, _)| name).collect()
}

fn format_range(range: TimeRange) -> String {
    format!(
        "{} to {}",
        range.start.format(EXPORT_TIME_FORMAT),
        range.end.format(EXPORT_TIME_FORMAT)
    )
}
