// Error boundary for the content region.
// A panic while drawing a view is caught and replaced by a recovery panel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ratatui::{prelude::*, widgets::*};

use super::icon::Icon;
use super::palette::Palette;

/// Run `render`, returning the panic message if it panicked.
pub fn render_guarded(frame: &mut Frame, render: impl FnOnce(&mut Frame)) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(|| render(frame))).map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Recovery panel shown in place of a crashed view.
pub fn draw_fault(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    frame.render_widget(Clear, area);

    let error = Style::default().fg(palette.error);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Something went wrong", Icon::AlertTriangle.glyph()),
            error.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This view failed to render. Your bookmarks and settings are safe.",
            palette.muted(),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), palette.muted())),
        Line::from(""),
        Line::from(vec![
            Icon::Refresh.span(Style::default().fg(palette.warn)),
            Span::styled("r", Style::default().fg(palette.warn)),
            Span::raw(" Try again   "),
            Span::styled("R", Style::default().fg(palette.warn)),
            Span::raw(" Reload everything   "),
            Span::styled("q", Style::default().fg(palette.warn)),
            Span::raw(" Quit"),
        ]),
    ];

    let panel = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(error)
                .title(" Error "),
        );
    frame.render_widget(panel, area);
}
