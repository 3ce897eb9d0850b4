pub mod overlay;
pub mod settings_panel;
pub mod tracker_card;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tracker::TrackerSnapshot;

pub const HORIZONTAL_MARGIN: u16 = 2;
pub const VERTICAL_MARGIN: u16 = 1;

/// Top bar: app name on the left, today's usage badge on the right
pub struct HeaderBar<'a> {
    pub snapshot: Option<TrackerSnapshot>,
    pub username: Option<&'a str>,
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let block = Block::default().borders(Borders::BOTTOM);
        let inner = block.inner(area);
        block.render(area, buf);
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::styled("Reflectis", bold_style),
            Span::styled(" · conscious network", dim_style),
        ]))
        .render(halves[0], buf);

        let mut badge = Vec::new();
        if let Some(snapshot) = self.snapshot {
            let style = if snapshot.is_active {
                Style::default()
            } else {
                dim_style
            };
            badge.push(Span::styled(format!("⏱ {}min today", snapshot.minutes()), style));
        }
        if let Some(username) = self.username {
            badge.push(Span::styled(format!("  @{username}"), dim_style));
        }
        Paragraph::new(Line::from(badge))
            .alignment(Alignment::Right)
            .render(halves[1], buf);
    }
}

/// Sidebar list of the user's communities
pub struct CommunitiesList<'a> {
    pub communities: &'a [String],
}

impl Widget for CommunitiesList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self
            .communities
            .iter()
            .map(|c| Line::from(Span::styled(c.as_str(), Style::default().fg(Color::Gray))))
            .collect::<Vec<Line>>();

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Your communities "))
            .render(area, buf);
    }
}

/// One line of key hints at the bottom of a screen
pub struct KeyHints<'a>(pub &'a str);

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.0)
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

/// Header / body / hints split shared by every screen
pub fn frame_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
pub(crate) fn rendered_text(buffer: &Buffer) -> String {
    buffer
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit_monitor::UsageLevel;

    fn snapshot(elapsed_seconds: u64, is_active: bool) -> TrackerSnapshot {
        TrackerSnapshot {
            elapsed_seconds,
            daily_limit_minutes: 30,
            is_active,
            is_limit_reached: false,
            usage_level: UsageLevel::Normal,
            progress_percent: elapsed_seconds / 60 * 100 / 30,
        }
    }

    #[test]
    fn test_header_shows_minutes_badge() {
        let area = Rect::new(0, 0, 80, 2);
        let mut buffer = Buffer::empty(area);

        HeaderBar {
            snapshot: Some(snapshot(12 * 60 + 30, true)),
            username: Some("ana_reflete"),
        }
        .render(area, &mut buffer);

        let rendered = rendered_text(&buffer);
        assert!(rendered.contains("Reflectis"));
        assert!(rendered.contains("12min today"));
        assert!(rendered.contains("@ana_reflete"));
    }

    #[test]
    fn test_header_logged_out() {
        let area = Rect::new(0, 0, 80, 2);
        let mut buffer = Buffer::empty(area);

        HeaderBar {
            snapshot: None,
            username: None,
        }
        .render(area, &mut buffer);

        let rendered = rendered_text(&buffer);
        assert!(rendered.contains("Reflectis"));
        assert!(!rendered.contains("today"));
    }

    #[test]
    fn test_communities_list() {
        let area = Rect::new(0, 0, 40, 6);
        let mut buffer = Buffer::empty(area);
        let communities = vec!["Minimalismo Digital".to_string(), "Slow Reading".to_string()];

        CommunitiesList {
            communities: &communities,
        }
        .render(area, &mut buffer);

        let rendered = rendered_text(&buffer);
        assert!(rendered.contains("Your communities"));
        assert!(rendered.contains("Minimalismo Digital"));
        assert!(rendered.contains("Slow Reading"));
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(40, 10, area), Rect::new(20, 7, 40, 10));
        // larger than the area gets clamped
        assert_eq!(centered_rect(100, 50, area), area);
    }

    #[test]
    fn test_frame_layout_splits_area() {
        let [header, body, hints] = frame_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, 2);
        assert_eq!(hints.height, 1);
        assert_eq!(body.height, 24 - 2 * VERTICAL_MARGIN - 3);
        assert_eq!(header.x, HORIZONTAL_MARGIN);
    }

    #[test]
    fn test_key_hints_small_area() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buffer = Buffer::empty(area);
        KeyHints("(q)uit (space) pause").render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }
}
