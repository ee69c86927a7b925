use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::config::Theme;

pub fn render(app: &App, frame: &mut Frame, area: Rect) {
    let texts = app.fields.texts();
    let line = build_line(
        &texts,
        &app.config.status_bar.separator,
        app.stale.as_deref(),
        &app.config.theme,
    );
    frame.render_widget(Paragraph::new(line), area);
}

/// Fields in slot order, then a stale marker when the last refresh failed.
pub fn build_line<'a>(
    fields: &'a [String],
    separator: &'a str,
    stale: Option<&str>,
    theme: &Theme,
) -> Line<'a> {
    let field_style = if stale.is_some() {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.fg)
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, text) in fields.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(separator, Style::default().fg(theme.dim)));
        }
        spans.push(Span::styled(text.as_str(), field_style));
    }

    if let Some(reason) = stale {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("stale: {}", reason),
            Style::default()
                .fg(theme.stale)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    Line::from(spans)
}
