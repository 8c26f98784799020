use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{AppState, Pane};
use crate::ui::components::{HelpOverlay, SearchPanel, StatusBar, grid_hints};
use crate::ui::{Layout, Theme};

/// Pane title length, including padding
const TITLE_WIDTH: usize = 30;

/// Main screen: one bordered pane per container, stacked in a column
pub struct LogGridScreen;

impl LogGridScreen {
    pub fn render(frame: &mut Frame, state: &AppState) {
        let (header, content, status) = Layout::main(frame.area());

        Self::render_header(frame, header, state);

        let panes = state.visible_panes();
        if panes.is_empty() {
            let empty = Paragraph::new("No running containers. Press r to refresh.")
                .style(Theme::text_dim())
                .alignment(Alignment::Center);
            frame.render_widget(empty, content);
        } else {
            let areas = Layout::pane_column(content, panes.len());
            for ((index, pane), area) in panes.into_iter().zip(areas) {
                Self::render_pane(frame, area, pane, index == state.selected);
            }
        }

        let status_bar = StatusBar::new()
            .hints(grid_hints())
            .message(state.status_text())
            .right(format!("{} containers", state.panes.len()));
        frame.render_widget(status_bar, status);

        if state.ui_state.search_active {
            SearchPanel::render(frame, &state.ui_state);
        }
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![
            Span::styled(" dockscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.endpoint.as_str(), Theme::text()),
        ];
        if state.ui_state.fullscreen {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled("fullscreen", Theme::text_highlight()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_pane(frame: &mut Frame, area: Rect, pane: &Pane, selected: bool) {
        let mut title = vec![Span::styled(
            pane.container.short_title(TITLE_WIDTH),
            Theme::pane_title(pane.color, selected),
        )];
        if !pane.follow {
            title.push(Span::styled(
                format!(" paused +{} ", pane.scroll_back),
                Theme::text_highlight(),
            ));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::pane_border(pane.color, selected))
            .title(Line::from(title));

        let height = block.inner(area).height as usize;
        let lines: Vec<Line> = pane
            .visible(height)
            .map(|l| Line::from(Span::styled(l.text.as_str(), Theme::line(l.kind))))
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
