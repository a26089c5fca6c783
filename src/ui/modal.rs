// Modal UI components.
// Post editor and confirmation dialogs drawn over the current view.

use ratatui::{prelude::*, widgets::*};

use crate::state::{FormField, PostForm};

use super::icon::Icon;
use super::palette::Palette;

/// Centered rectangle of at most `width` x `height` inside `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw the create/edit post form.
pub fn draw_post_form(frame: &mut Frame, form: &PostForm, palette: &Palette) {
    let modal_area = centered(frame.area(), 72, 22);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.accent())
        .title(format!(" {} {} ", Icon::Edit.glyph(), form.heading()))
        .title_style(palette.title())
        .style(palette.base());
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Min(6),    // Body
            Constraint::Length(4), // Author
            Constraint::Length(1), // Submit state
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    draw_field(frame, form, FormField::Title, palette, chunks[0]);
    draw_field(frame, form, FormField::Body, palette, chunks[1]);
    draw_field(frame, form, FormField::Author, palette, chunks[2]);

    let status = if form.submitting {
        Span::styled("⏳ Saving...", Style::default().fg(palette.warn))
    } else if let Some(err) = &form.submit_error {
        Span::styled(
            format!("{} {}", Icon::AlertCircle.glyph(), err),
            Style::default().fg(palette.error),
        )
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[3]);

    // Instructions
    let instructions = Line::from(vec![
        Icon::Save.span(Style::default().fg(palette.warn)),
        Span::styled("Enter", Style::default().fg(palette.warn)),
        Span::styled(" = Save  ", palette.muted()),
        Span::styled("Tab/↑↓", Style::default().fg(palette.warn)),
        Span::styled(" = Next field  ", palette.muted()),
        Icon::Close.span(Style::default().fg(palette.warn)),
        Span::styled("Esc", Style::default().fg(palette.warn)),
        Span::styled(" = Cancel ", palette.muted()),
    ]);
    frame.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_field(frame: &mut Frame, form: &PostForm, field: FormField, palette: &Palette, area: Rect) {
    let focused = form.focus == field;
    let error = form.error_for(field);
    let border = if error.is_some() {
        Style::default().fg(palette.error)
    } else if focused {
        palette.accent()
    } else {
        palette.muted()
    };

    let chars = form.value(field).chars().count();
    let counter = match field {
        FormField::Author => String::new(),
        _ => format!(" {} chars ", chars),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", field.label()))
        .title_bottom(Line::from(Span::styled(counter, palette.muted())).right_aligned());

    let mut spans = vec![Span::raw(form.value(field))];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(palette.warn)));
    }
    let mut lines = vec![Line::from(spans)];
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(palette.error),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Draw a yes/no confirmation dialog.
pub fn draw_confirm(frame: &mut Frame, title: &str, message: &str, palette: &Palette) {
    let modal_area = centered(frame.area(), 56, 7);
    frame.render_widget(Clear, modal_area);

    let text = vec![
        Line::from(""),
        Line::from(Span::raw(message)),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(palette.warn)),
            Span::styled(" = Confirm  ", palette.muted()),
            Icon::Close.span(Style::default().fg(palette.warn)),
            Span::styled("n/Esc", Style::default().fg(palette.warn)),
            Span::styled(" = Cancel", palette.muted()),
        ]),
    ];

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error))
                .title(format!(" {} {} ", Icon::AlertTriangle.glyph(), title)),
        );
    frame.render_widget(widget, modal_area);
}
