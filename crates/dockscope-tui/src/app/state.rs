use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dockscope_logs::{CompiledFilter, ContainerLogContext, SearchResults};
use dockscope_types::{Container, DisplayLine, PaneColor};

use crate::sink::UiUpdate;

/// Lines kept per pane; older lines scroll off
pub const MAX_PANE_LINES: usize = 1000;

/// How long a status message stays visible
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// One container's on-screen log view
pub struct Pane {
    pub container: Container,
    pub color: PaneColor,

    lines: VecDeque<DisplayLine>,

    /// Lines scrolled back from the newest (0 = showing the end)
    pub scroll_back: usize,

    /// Follow mode: new lines keep the view pinned to the end
    pub follow: bool,
}

impl Pane {
    pub fn new(container: Container, color: PaneColor) -> Self {
        Self {
            container,
            color,
            lines: VecDeque::new(),
            scroll_back: 0,
            follow: true,
        }
    }

    pub fn push(&mut self, line: DisplayLine) {
        if self.lines.len() >= MAX_PANE_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);

        // Keep a scrolled-back view on the same lines
        if !self.follow && self.scroll_back > 0 {
            self.scroll_back = (self.scroll_back + 1).min(self.lines.len().saturating_sub(1));
        }
    }

    pub fn scroll_to_end(&mut self) {
        if self.follow {
            self.scroll_back = 0;
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.follow = false;
        self.scroll_back = (self.scroll_back + n).min(self.lines.len().saturating_sub(1));
    }

    /// Scroll towards the newest line; reaching it turns follow mode back on
    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
        if self.scroll_back == 0 {
            self.follow = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
        self.follow = true;
    }

    pub fn toggle_follow(&mut self) {
        if self.follow {
            self.follow = false;
        } else {
            self.scroll_to_bottom();
        }
    }

    /// The lines that fit in `height` rows at the current scroll position
    pub fn visible(&self, height: usize) -> impl Iterator<Item = &DisplayLine> {
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        self.lines.range(start..end)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// UI-specific transient state
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show only the selected pane
    pub fullscreen: bool,

    /// Is the search panel open?
    pub search_active: bool,

    /// Current search input text
    pub search_input: String,

    /// Case insensitive search?
    pub search_case_insensitive: bool,

    /// Results for the current input, refreshed as it changes
    pub search_results: SearchResults,

    pub search_error: Option<String>,

    /// Transient message and when it was shown
    pub status: Option<(String, Instant)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            fullscreen: false,
            search_active: false,
            search_input: String::new(),
            search_case_insensitive: true,
            search_results: SearchResults::default(),
            search_error: None,
            status: None,
        }
    }
}

/// Global application state
pub struct AppState {
    /// One pane per container, in manager order
    pub panes: Vec<Pane>,

    /// Container ID to pane position
    index: HashMap<String, usize>,

    /// Position of the focused pane
    pub selected: usize,

    pub ui_state: UiState,

    /// Docker endpoint shown in the header
    pub endpoint: String,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl AppState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            panes: Vec::new(),
            index: HashMap::new(),
            selected: 0,
            ui_state: UiState::default(),
            endpoint: endpoint.into(),
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
        }
    }

    /// Replace every pane, keeping the selection in range
    pub fn set_panes(&mut self, panes: Vec<Pane>) {
        self.index = panes
            .iter()
            .enumerate()
            .map(|(i, p)| (p.container.id.clone(), i))
            .collect();
        self.panes = panes;
        self.selected = self.selected.min(self.panes.len().saturating_sub(1));
        self.ui_state.search_results = SearchResults::default();
        self.render_dirty = true;
    }

    /// Apply an update from a pane's sink. Updates for unknown containers
    /// (e.g. from contexts torn down by a refresh) are ignored.
    pub fn apply_update(&mut self, update: UiUpdate) {
        let Some(&i) = self.index.get(update.container_id()) else {
            return;
        };
        let pane = &mut self.panes[i];
        match update {
            UiUpdate::Line { line, .. } => pane.push(line),
            UiUpdate::ScrollToEnd { .. } => pane.scroll_to_end(),
        }
        self.render_dirty = true;
    }

    /// Move selection down, wrapping to the first pane
    pub fn select_next(&mut self) {
        let len = self.panes.len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected >= len - 1 { 0 } else { self.selected + 1 };
    }

    /// Move selection up, wrapping to the last pane
    pub fn select_prev(&mut self) {
        let len = self.panes.len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
    }

    pub fn selected_pane(&self) -> Option<&Pane> {
        self.panes.get(self.selected)
    }

    pub fn selected_pane_mut(&mut self) -> Option<&mut Pane> {
        self.panes.get_mut(self.selected)
    }

    /// Panes to draw, with their positions: all of them, or the selected one in fullscreen
    pub fn visible_panes(&self) -> Vec<(usize, &Pane)> {
        if self.ui_state.fullscreen {
            self.selected_pane().map(|p| vec![(self.selected, p)]).unwrap_or_default()
        } else {
            self.panes.iter().enumerate().collect()
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        self.ui_state.fullscreen = !self.ui_state.fullscreen;
    }

    pub fn toggle_help(&mut self) {
        self.ui_state.help_visible = !self.ui_state.help_visible;
    }

    /// Start search input mode
    pub fn start_search(&mut self) {
        self.ui_state.search_active = true;
        self.ui_state.search_input.clear();
        self.ui_state.search_results = SearchResults::default();
        self.ui_state.search_error = None;
    }

    /// Close the search panel and forget the query
    pub fn close_search(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
        self.ui_state.search_results = SearchResults::default();
        self.ui_state.search_error = None;
    }

    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }

    pub fn toggle_case_sensitive(&mut self) {
        self.ui_state.search_case_insensitive = !self.ui_state.search_case_insensitive;
    }

    /// Re-run the current query against every context's buffer
    pub fn refresh_search(&mut self, contexts: &[Arc<ContainerLogContext>]) {
        let query = &self.ui_state.search_input;
        let filter = if self.ui_state.search_case_insensitive {
            CompiledFilter::literal(query)
        } else {
            CompiledFilter::literal_case_sensitive(query)
        };

        match filter {
            Ok(filter) => {
                self.ui_state.search_results = SearchResults::collect(contexts, &filter);
                self.ui_state.search_error = None;
            }
            Err(e) => {
                self.ui_state.search_results = SearchResults::default();
                self.ui_state.search_error = Some(e.to_string());
            }
        }
    }

    /// Show a transient status message
    pub fn show_status(&mut self, msg: impl Into<String>) {
        self.ui_state.status = Some((msg.into(), Instant::now()));
        self.render_dirty = true;
    }

    /// Drop the status message once it is older than [`STATUS_TTL`]
    pub fn expire_status(&mut self, now: Instant) {
        if let Some((_, shown)) = &self.ui_state.status
            && now.duration_since(*shown) >= STATUS_TTL
        {
            self.ui_state.status = None;
            self.render_dirty = true;
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.ui_state.status.as_ref().map(|(msg, _)| msg.as_str())
    }
}
