use dockscope_logs::SearchResults;
use ratatui::{
    Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::UiState;
use crate::ui::{Layout, Theme};

/// Search popup: the query line followed by hits grouped per container
pub struct SearchPanel;

impl SearchPanel {
    pub fn render(frame: &mut Frame, ui_state: &UiState) {
        let area = Layout::centered(frame.area(), 80, 70);
        frame.render_widget(Clear, area);

        let mode = if ui_state.search_case_insensitive {
            "case-insensitive"
        } else {
            "case-sensitive"
        };
        let title = format!(
            " Search ({mode}) - {} hits ",
            ui_state.search_results.total_hits()
        );

        let mut lines = vec![Line::from(vec![
            Span::styled("/", Theme::text_highlight()),
            Span::styled(ui_state.search_input.as_str(), Theme::text()),
            Span::styled("█", Theme::text_dim()),
        ])];
        lines.push(Line::from(""));

        if let Some(err) = &ui_state.search_error {
            lines.push(Line::from(Span::styled(err.as_str(), Theme::error())));
        } else if ui_state.search_input.is_empty() {
            lines.push(Line::from(Span::styled(
                "Type to search every container's recent logs",
                Theme::text_dim(),
            )));
        } else if ui_state.search_results.is_empty() {
            lines.push(Line::from(Span::styled("No matches", Theme::text_dim())));
        } else {
            lines.extend(result_lines(&ui_state.search_results));
        }

        let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(panel, area);
    }
}

fn result_lines(results: &SearchResults) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for group in &results.groups {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", group.container.name, group.hits.len()),
            Theme::title(),
        )));
        for hit in &group.hits {
            let mut spans = vec![Span::styled(
                format!("  {} ", hit.entry.timestamp.format("%H:%M:%S")),
                Theme::text_dim(),
            )];
            spans.extend(highlight(&hit.entry.message, &hit.ranges));
            lines.push(Line::from(spans));
        }
    }
    lines
}

/// Split `text` into spans, highlighting the given byte ranges
fn highlight<'a>(text: &'a str, ranges: &[(usize, usize)]) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    for &(start, end) in ranges {
        if start < pos || end > text.len() {
            continue;
        }
        if start > pos {
            spans.push(Span::styled(&text[pos..start], Theme::text()));
        }
        spans.push(Span::styled(&text[start..end], Theme::match_highlight()));
        pos = end;
    }
    if pos < text.len() {
        spans.push(Span::styled(&text[pos..], Theme::text()));
    }
    spans
}
