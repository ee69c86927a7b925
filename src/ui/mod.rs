pub mod status_bar;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;

pub fn render(app: &App, frame: &mut Frame) {
    let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
        .areas(frame.area());

    render_body(app, frame, body);
    status_bar::render(app, frame, footer);
}

fn render_body(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.config.theme;

    let refreshed = match &app.last_refresh {
        Some(at) => format!("last refresh {}", at.format("%H:%M:%S")),
        None => "waiting for first refresh".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " procbar ",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(app.endpoint.as_str(), Style::default().fg(theme.fg)),
        ]),
        Line::from(Span::styled(
            format!(" {}", refreshed),
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            " r refresh  q quit",
            Style::default().fg(theme.dim),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}
