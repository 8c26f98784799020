//! Bridge from the log pipeline's background tasks to the UI loop

use dockscope_logs::PresentationSink;
use dockscope_types::DisplayLine;
use tokio::sync::mpsc;

/// A presentation request queued for the UI loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiUpdate {
    Line { container_id: String, line: DisplayLine },
    ScrollToEnd { container_id: String },
}

impl UiUpdate {
    pub fn container_id(&self) -> &str {
        match self {
            Self::Line { container_id, .. } | Self::ScrollToEnd { container_id } => container_id,
        }
    }
}

/// Sink for one container's pane. Lines are queued and applied by the UI
/// loop on its own task, so pane state is only ever touched there.
pub struct ChannelSink {
    container_id: String,
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl ChannelSink {
    pub fn new(container_id: impl Into<String>, tx: mpsc::UnboundedSender<UiUpdate>) -> Self {
        Self {
            container_id: container_id.into(),
            tx,
        }
    }
}

impl PresentationSink for ChannelSink {
    fn append_line(&self, line: DisplayLine) {
        // UI gone during shutdown
        let _ = self.tx.send(UiUpdate::Line {
            container_id: self.container_id.clone(),
            line,
        });
    }

    fn scroll_to_end(&self) {
        let _ = self.tx.send(UiUpdate::ScrollToEnd {
            container_id: self.container_id.clone(),
        });
    }
}
