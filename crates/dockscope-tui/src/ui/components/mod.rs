mod help_overlay;
mod search_panel;
mod status_bar;

pub use help_overlay::HelpOverlay;
pub use search_panel::SearchPanel;
pub use status_bar::{StatusBar, grid_hints};
