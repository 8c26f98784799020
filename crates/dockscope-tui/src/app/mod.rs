//! Application state and actions

mod action;
mod state;

pub use action::Action;
pub use state::{AppState, MAX_PANE_LINES, Pane, STATUS_TTL, UiState};
