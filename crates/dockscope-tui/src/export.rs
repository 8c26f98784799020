//! Writing a log export to disk and the clipboard

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arboard::Clipboard;
use dockscope_logs::LogExport;

/// What an export managed to do
#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub containers: usize,
    pub entries: usize,
    /// Whether the Markdown also landed on the clipboard
    pub copied: bool,
}

impl ExportOutcome {
    /// One-line summary for the status bar
    pub fn message(&self) -> String {
        let target = if self.copied {
            format!("clipboard and {}", self.path.display())
        } else {
            self.path.display().to_string()
        };
        format!(
            "Exported {} logs from {} containers to {}",
            self.entries, self.containers, target
        )
    }
}

/// Render `export` as Markdown, write it to `dockscope_logs_<unix>.md` under
/// `dir`, and copy it to the clipboard when `use_clipboard` is set.
///
/// A clipboard failure is logged and reported through `copied`; only a
/// failed file write is an error.
pub fn export_markdown(export: &LogExport, dir: &Path, use_clipboard: bool) -> Result<ExportOutcome> {
    let markdown = export.to_markdown();

    let filename = format!("dockscope_logs_{}.md", export.generated_at.timestamp());
    let path = dir.join(filename);
    std::fs::write(&path, &markdown)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    let copied = use_clipboard && copy_to_clipboard(&markdown);

    tracing::info!(
        path = %path.display(),
        containers = export.summary.total_containers,
        copied,
        "Exported logs"
    );

    Ok(ExportOutcome {
        path,
        containers: export.summary.total_containers,
        entries: export.summary.total_logs,
        copied,
    })
}

fn copy_to_clipboard(text: &str) -> bool {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Clipboard unavailable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dockscope_types::{Container, LogEntry};

    #[test]
    fn test_export_writes_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let container = Container::new("abc", "web", "nginx:1", "Up 2 minutes");
        let entry = LogEntry::new("abc", at, "GET / 200");
        let export = LogExport::from_snapshot(vec![(container, vec![entry])], at);

        let outcome = export_markdown(&export, dir.path(), false).unwrap();

        assert!(!outcome.copied);
        assert_eq!(outcome.entries, 1);
        assert_eq!(
            outcome.path,
            dir.path().join(format!("dockscope_logs_{}.md", at.timestamp()))
        );
        let written = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(written.starts_with("# Docker Container Logs Summary"));
        assert!(written.contains("[2024-05-01 12:00:00] GET / 200"));
        assert!(outcome.message().contains("1 logs from 1 containers"));
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let export = LogExport::from_snapshot(Vec::new(), Utc::now());
        let err = export_markdown(&export, &dir.path().join("missing"), false).unwrap_err();
        assert!(err.to_string().contains("Failed to write export"));
    }
}
