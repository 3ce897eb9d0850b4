use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use super::centered_rect;

const OVERLAY_WIDTH: u16 = 52;
const OVERLAY_HEIGHT: u16 = 10;

/// Full-screen interruption shown once the daily limit is reached
pub struct LimitOverlay {
    pub daily_limit_minutes: u32,
}

impl Widget for LimitOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // dim whatever is underneath
        buf.set_style(area, Style::default().add_modifier(Modifier::DIM));

        let popup = centered_rect(OVERLAY_WIDTH, OVERLAY_HEIGHT, area);
        Clear.render(popup, buf);

        let red_bold_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(Span::styled("⚠  Daily limit reached", red_bold_style)),
            Line::from(""),
            Line::from(format!(
                "You have used all {} minutes you set for today.",
                self.daily_limit_minutes
            )),
            Line::from("How about a pause for reflection?"),
            Line::from(""),
            Line::from(vec![
                Span::styled("(a)", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("djust limit   "),
                Span::styled("(c)", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("ontinue anyway"),
            ]),
        ];

        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(popup, buf);
    }
}
