use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the screen into header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(1),    // Panes
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Stack `count` panes in a single column of equal height
    pub fn pane_column(area: Rect, count: usize) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let constraints = (0..count).map(|_| Constraint::Ratio(1, count as u32));
        RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area)
            .to_vec()
    }

    /// A popup centered in `area`, sized as a percentage of it
    pub fn centered(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - height_percent) / 2),
                Constraint::Percentage(height_percent),
                Constraint::Percentage((100 - height_percent) / 2),
            ])
            .split(area);

        RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - width_percent) / 2),
                Constraint::Percentage(width_percent),
                Constraint::Percentage((100 - width_percent) / 2),
            ])
            .split(vertical[1])[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_column_covers_area() {
        let area = Rect::new(0, 0, 80, 30);
        let panes = Layout::pane_column(area, 3);
        assert_eq!(panes.len(), 3);
        assert_eq!(panes.iter().map(|r| r.height).sum::<u16>(), 30);
        assert!(panes.iter().all(|r| r.width == 80));
        assert!(Layout::pane_column(area, 0).is_empty());
    }

    #[test]
    fn test_main_reserves_header_and_status() {
        let (header, content, status) = Layout::main(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, 1);
        assert_eq!(status.height, 1);
        assert_eq!(content.height, 22);
    }
}
