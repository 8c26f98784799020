//! Shared types for dockscope
//!
//! This crate contains data structures used across multiple dockscope crates.
//! It deliberately has no UI toolkit dependency so the log core can be used
//! headless.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Docker Resource Types
// ============================================================================

/// Running container descriptor, as reported by the Docker endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Short (12 character) container ID
    pub id: String,
    /// Container name without the leading slash
    pub name: String,
    pub image: String,
    /// Image digest, e.g. "sha256:9a2c..."; empty when the endpoint did not report one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_id: String,
    /// Human readable status, e.g. "Up 3 hours"
    pub status: String,
}

impl Container {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            image_id: String::new(),
            status: status.into(),
        }
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = image_id.into();
        self
    }

    /// Pane title (" name "), cut to at most `max` chars with a trailing "... "
    pub fn short_title(&self, max: usize) -> String {
        let title = format!(" {} ", self.name);
        if title.chars().count() <= max || max < 4 {
            return title;
        }
        let head: String = title.chars().take(max - 4).collect();
        format!("{}... ", head.trim_end())
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Which output stream a log line came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    #[default]
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// A single parsed log entry. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Source container ID
    pub container_id: String,

    /// Docker supplied timestamp, or the wall clock time at parse if none was found
    pub timestamp: DateTime<Utc>,

    /// Trimmed message text
    pub message: String,

    /// Output stream (best effort)
    pub stream: StreamKind,
}

impl LogEntry {
    pub fn new(
        container_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            timestamp,
            message: message.into(),
            stream: StreamKind::Stdout,
        }
    }

    /// The "no entry" sentinel: parsers return an empty message for blank input
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Format as "HH:MM:SS message" for display
    pub fn display_text(&self) -> String {
        format!("{} {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

// ============================================================================
// Presentation Types
// ============================================================================

/// RGB color assigned to a container pane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaneColor(pub u8, pub u8, pub u8);

/// Fixed palette assigned round-robin to panes, by position only
pub const PANE_PALETTE: [PaneColor; 8] = [
    PaneColor(255, 248, 235),
    PaneColor(135, 206, 250),
    PaneColor(152, 251, 152),
    PaneColor(255, 218, 185),
    PaneColor(221, 160, 221),
    PaneColor(240, 230, 140),
    PaneColor(175, 238, 238),
    PaneColor(255, 182, 193),
];

/// Color for a pane at the given position
pub fn palette_color(position: usize) -> PaneColor {
    PANE_PALETTE[position % PANE_PALETTE.len()]
}

/// Kind of a line handed to a presentation sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// A formatted log entry
    Log,
    /// An in-band error (e.g. the stream could not be opened)
    Error,
    /// Informational header text
    Info,
}

/// A line of text for a container pane
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
}

impl DisplayLine {
    pub fn log(entry: &LogEntry) -> Self {
        Self {
            kind: LineKind::Log,
            text: entry.display_text(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Info,
            text: text.into(),
        }
    }
}
