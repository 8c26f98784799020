//! The TUI event loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dockscope_docker::DockerClient;
use dockscope_logs::{Container, ContainerContextManager, LogExport, LogSource, PresentationSink};
use dockscope_tui::{
    Action, AppState, ChannelSink, Event, EventHandler, KeyBindings, KeyContext, LogGridScreen,
    Pane, Tui, UiUpdate, export_markdown,
};

use crate::config::Config;

/// How long log tasks get to stop after quitting
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

struct App {
    state: AppState,
    manager: ContainerContextManager,
    source: Arc<dyn LogSource>,
    config: Config,
    keybindings: KeyBindings,
    /// Pane updates from the current generation of contexts
    updates: mpsc::UnboundedReceiver<UiUpdate>,
}

pub async fn run(config: Config, client: Arc<DockerClient>) -> Result<()> {
    let root = CancellationToken::new();
    let source: Arc<dyn LogSource> = client.clone();

    let containers = source
        .list_running_containers()
        .await
        .context("Failed to list containers")?;

    let (_, updates) = mpsc::unbounded_channel();
    let mut app = App {
        state: AppState::new(client.endpoint().host.clone()),
        manager: ContainerContextManager::new(root.clone()),
        source,
        config,
        keybindings: KeyBindings::new(),
        updates,
    };
    app.start_contexts(&containers);

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(app.config.tick_rate(), &root);
    let result = app.event_loop(&mut tui, &mut events).await;

    // Stop input first so the terminal can be handed back cleanly
    root.cancel();
    events.shutdown().await;
    app.manager.shutdown(SHUTDOWN_TIMEOUT).await;
    if let Err(e) = app.source.close().await {
        warn!("Failed to close Docker client: {:#}", e);
    }
    tui.restore()?;

    result
}

impl App {
    async fn event_loop(&mut self, tui: &mut Tui, events: &mut EventHandler) -> Result<()> {
        self.draw(tui)?;

        loop {
            tokio::select! {
                Some(event) = events.next() => {
                    match event {
                        Event::Key(key) => {
                            if let Some(action) = self.action_for(&key) {
                                self.handle_action(action).await;
                            }
                        }
                        Event::Tick => {
                            self.state.expire_status(Instant::now());
                            // New lines may have landed in the buffers
                            if self.state.ui_state.search_active && self.state.render_dirty {
                                self.refresh_search();
                            }
                        }
                        Event::Resize(_, _) => self.state.render_dirty = true,
                        Event::Error(e) => self.state.show_status(format!("Input error: {}", e)),
                    }
                    if self.state.render_dirty {
                        self.draw(tui)?;
                    }
                }

                // Lines are applied as they arrive and drawn on the next event
                Some(update) = self.updates.recv() => {
                    self.state.apply_update(update);
                    while let Ok(update) = self.updates.try_recv() {
                        self.state.apply_update(update);
                    }
                }

                else => break,
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let state = &self.state;
        tui.draw(|frame| LogGridScreen::render(frame, state))?;
        self.state.render_dirty = false;
        Ok(())
    }

    fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        if self.state.ui_state.search_active {
            self.keybindings.get_search_input_action(key)
        } else {
            self.keybindings.get_action(KeyContext::Grid, key)
        }
    }

    /// Replace all contexts and panes with fresh ones for `containers`.
    ///
    /// Each generation gets its own update channel, so lines still in flight
    /// from torn-down contexts never reach the new panes.
    fn start_contexts(&mut self, containers: &[Container]) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.updates = rx;

        let result = self.manager.rebuild(containers, self.source.clone(), |container, _| {
            Arc::new(ChannelSink::new(container.id.clone(), tx.clone())) as Arc<dyn PresentationSink>
        });

        let panes = self
            .manager
            .all_contexts()
            .iter()
            .map(|c| Pane::new(c.container().clone(), c.color()))
            .collect();
        self.state.set_panes(panes);
        self.manager.focus(self.state.selected);

        if let Err(e) = result {
            warn!("Failed to start log streams: {}", e);
            self.state.show_status(format!("Failed to start log streams: {}", e));
        }
    }

    async fn refresh(&mut self) {
        match self.source.list_running_containers().await {
            Ok(containers) => {
                self.start_contexts(&containers);
                info!(count = containers.len(), "refreshed containers");
                self.state
                    .show_status(format!("Refreshed: {} containers", self.state.panes.len()));
            }
            Err(e) => self.state.show_status(format!("Refresh failed: {:#}", e)),
        }
    }

    fn refresh_search(&mut self) {
        let contexts = self.manager.all_contexts();
        self.state.refresh_search(&contexts);
    }

    fn export(&mut self) {
        let export = LogExport::from_contexts(&self.manager.all_contexts());
        if export.is_empty() {
            self.state.show_status("No logs to export");
            return;
        }

        match export_markdown(&export, &self.config.export_dir, self.config.clipboard) {
            Ok(outcome) => self.state.show_status(outcome.message()),
            Err(e) => self.state.show_status(format!("Export failed: {:#}", e)),
        }
    }

    async fn handle_action(&mut self, action: Action) {
        self.state.render_dirty = true;

        match action {
            Action::Quit => self.state.should_quit = true,

            Action::SelectNext => {
                self.state.select_next();
                self.manager.focus(self.state.selected);
            }
            Action::SelectPrev => {
                self.state.select_prev();
                self.manager.focus(self.state.selected);
            }
            Action::ToggleFullscreen => self.state.toggle_fullscreen(),

            Action::ScrollUp(n) => {
                if let Some(pane) = self.state.selected_pane_mut() {
                    pane.scroll_up(n);
                }
            }
            Action::ScrollDown(n) => {
                if let Some(pane) = self.state.selected_pane_mut() {
                    pane.scroll_down(n);
                }
            }
            Action::ScrollToBottom => {
                if let Some(pane) = self.state.selected_pane_mut() {
                    pane.scroll_to_bottom();
                }
            }
            Action::ToggleFollow => {
                if let Some(pane) = self.state.selected_pane_mut() {
                    pane.toggle_follow();
                }
            }

            Action::ToggleHelp => self.state.toggle_help(),

            Action::OpenSearch => self.state.start_search(),
            Action::CloseSearch => self.state.close_search(),
            Action::SearchInput(c) => {
                self.state.search_input_char(c);
                self.refresh_search();
            }
            Action::SearchBackspace => {
                self.state.search_input_backspace();
                self.refresh_search();
            }
            Action::SearchClear => {
                self.state.ui_state.search_input.clear();
                self.refresh_search();
            }
            Action::ToggleCaseSensitive => {
                self.state.toggle_case_sensitive();
                self.refresh_search();
            }

            Action::ExportLogs => self.export(),
            Action::Refresh => self.refresh().await,

            Action::ShowStatus(msg) => self.state.show_status(msg),
            Action::Render => {}
        }
    }
}
