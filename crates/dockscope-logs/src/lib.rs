//! Log processing for dockscope
//!
//! This crate provides the per-container log pipeline: parsing Docker's
//! (optionally multiplexed) log lines, streaming them through a bounded
//! channel, buffering the most recent entries per container, and managing
//! the set of container contexts. Search and export read buffer snapshots;
//! containers can be narrowed by name, image, image ID or status.

mod buffer;
mod context;
mod error;
pub mod export;
mod filter;
mod manager;
mod parser;
pub mod search;
mod sink;
mod source;
mod stream;

pub use buffer::LogBuffer;
pub use context::{ContainerLogContext, LOG_BUFFER_CAPACITY, LOG_CHANNEL_CAPACITY};
pub use error::{Error, Result};
pub use export::{ExportFormat, LogExport};
pub use filter::ContainerFilter;
pub use manager::ContainerContextManager;
pub use parser::LogParser;
pub use search::{CompiledFilter, SearchHit, SearchResults};
pub use sink::{NullSink, PresentationSink};
pub use source::{LogSource, RawLogStream};
pub use stream::{LineSplitter, stream_logs};

// Re-export types used in our public API
pub use dockscope_types::{
    Container, DisplayLine, LineKind, LogEntry, PANE_PALETTE, PaneColor, StreamKind, palette_color,
};
