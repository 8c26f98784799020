use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let area = frame.area();

        let popup_width = 46.min(area.width.saturating_sub(4));
        let popup_height = 26.min(area.height.saturating_sub(2));

        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(Self::lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn lines() -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Panes"),
            Self::key_line("j/↓/Tab", "Next container"),
            Self::key_line("k/↑", "Previous container"),
            Self::key_line("Space", "Toggle fullscreen"),
            Line::from(""),
            Self::section("Scrolling"),
            Self::key_line("PgUp/^u", "Page up"),
            Self::key_line("PgDn/^d", "Page down"),
            Self::key_line("K/J", "Line up/down"),
            Self::key_line("End/G", "Jump to newest"),
            Self::key_line("f", "Toggle follow mode"),
            Line::from(""),
            Self::section("Actions"),
            Self::key_line("/", "Search all containers"),
            Self::key_line("^s", "Case sensitivity (search)"),
            Self::key_line("y", "Export logs"),
            Self::key_line("r", "Refresh containers"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("q", "Quit"),
        ]
    }

    fn section(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
