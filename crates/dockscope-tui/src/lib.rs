//! TUI components for dockscope
//!
//! This crate provides the terminal user interface for dockscope: pane state
//! fed by the log pipeline, keybindings, event handling and widgets.

pub mod app;
pub mod config;
pub mod export;
pub mod sink;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Pane, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use export::{ExportOutcome, export_markdown};
pub use sink::{ChannelSink, UiUpdate};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, SearchPanel, StatusBar, grid_hints};
pub use ui::screens::LogGridScreen;
pub use ui::{Layout, Theme};
