use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::config::LIMIT_RANGE_MINUTES;

/// Values being edited on the settings screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub daily_limit_minutes: u32,
    pub time_warnings: bool,
    pub auto_logout: bool,
    /// Feedback from the last action, e.g. "Settings saved"
    pub status: Option<String>,
}

fn toggle_line(key: &str, label: &str, on: bool) -> Line<'static> {
    let (mark, style) = if on {
        ("[x]", Style::default().fg(Color::Green))
    } else {
        ("[ ]", Style::default().fg(Color::Gray))
    };
    Line::from(vec![
        Span::styled(mark, style),
        Span::raw(format!(" {label} ")),
        Span::styled(format!("({key})"), Style::default().add_modifier(Modifier::DIM)),
    ])
}

impl Widget for &SettingsView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Mindful time management ");
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::raw("Daily usage limit: "),
            Span::styled(
                format!("{} minutes", self.daily_limit_minutes),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (-/+)", Style::default().add_modifier(Modifier::DIM)),
        ]))
        .render(chunks[0], buf);

        let lo = *LIMIT_RANGE_MINUTES.start();
        let hi = *LIMIT_RANGE_MINUTES.end();
        let clamped = self.daily_limit_minutes.clamp(lo, hi);
        let ratio = f64::from(clamped - lo) / f64::from(hi - lo);
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(ratio)
            .label(format!("{lo}min … {hi}min"))
            .render(chunks[1], buf);

        Paragraph::new(toggle_line(
            "w",
            "Time warnings near the limit",
            self.time_warnings,
        ))
        .render(chunks[3], buf);
        Paragraph::new(toggle_line(
            "o",
            "Log out automatically at the daily limit",
            self.auto_logout,
        ))
        .render(chunks[4], buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ))
            .render(chunks[6], buf);
        }
    }
}
