use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::limit_monitor::UsageLevel;
use crate::tracker::TrackerSnapshot;

pub const LIMIT_REACHED_MESSAGE: &str = "Daily limit reached. How about a pause for reflection?";

/// Sidebar card: time used today, the limit and a progress gauge
pub struct TimeTrackerCard {
    pub snapshot: TrackerSnapshot,
    /// Highlight usage above the near-limit threshold
    pub warnings: bool,
}

impl TimeTrackerCard {
    fn is_warning(&self) -> bool {
        self.warnings && self.snapshot.usage_level != UsageLevel::Normal
    }
}

impl Widget for TimeTrackerCard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let warn = self.is_warning();

        let accent = if warn { Color::Red } else { Color::Cyan };
        let title = if warn {
            " Time used today ⚠ "
        } else {
            " Time used today "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, Style::default().fg(accent)));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        let status = if snapshot.is_active { "" } else { "  (paused)" };
        let counts = Line::from(vec![
            Span::styled(
                format!("{}min {}s", snapshot.minutes(), snapshot.seconds()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(status, Style::default().add_modifier(Modifier::DIM)),
        ]);
        Paragraph::new(counts).render(top[0], buf);
        Paragraph::new(Line::from(Span::styled(
            format!("Limit: {}min", snapshot.daily_limit_minutes),
            Style::default().fg(Color::Gray),
        )))
        .alignment(Alignment::Right)
        .render(top[1], buf);

        let capped = snapshot.progress_percent.min(100);
        Gauge::default()
            .gauge_style(Style::default().fg(accent).bg(Color::DarkGray))
            .ratio(capped as f64 / 100.0)
            .label(format!("{capped}%"))
            .render(chunks[1], buf);

        if snapshot.is_limit_reached {
            Paragraph::new(Span::styled(
                LIMIT_REACHED_MESSAGE,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);
        }
    }
}
