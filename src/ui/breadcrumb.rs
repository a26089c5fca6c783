// Breadcrumb rendering for navigation trail.
// Shows the current navigation path and, on list views, the search box.

use ratatui::{prelude::*, widgets::*};

use crate::state::{BreadcrumbNode, SearchInput};

use super::icon::Icon;
use super::palette::Palette;

/// Render the breadcrumb trail.
pub fn draw_breadcrumb(
    frame: &mut Frame,
    breadcrumbs: &[BreadcrumbNode],
    search: Option<&SearchInput>,
    palette: &Palette,
    area: Rect,
) {
    let mut spans = Vec::new();

    for (i, node) in breadcrumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", palette.muted()));
        }

        let style = if i == breadcrumbs.len() - 1 {
            // Current level is highlighted
            palette.title()
        } else {
            Style::default().fg(palette.fg)
        };

        spans.push(Span::styled(node.label.clone(), style));
    }

    let breadcrumb_line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(palette.muted());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Breadcrumb on the first row, search box below it when the view has one
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(breadcrumb_line), rows[0]);

    if let Some(search) = search {
        frame.render_widget(Paragraph::new(search_line(search, palette)), rows[1]);
    }
}

fn search_line<'a>(search: &'a SearchInput, palette: &Palette) -> Line<'a> {
    let mut spans = vec![Icon::Search.span(palette.accent())];

    if search.editing {
        spans.push(Span::raw(search.raw()));
        spans.push(Span::styled("█", Style::default().fg(palette.warn)));
    } else if search.raw().is_empty() {
        spans.push(Span::styled("press / to search", palette.muted()));
    } else {
        spans.push(Span::styled(search.raw(), Style::default().fg(palette.fg)));
    }

    if search.is_pending() {
        spans.push(Span::styled("  …", palette.muted()));
    } else if !search.committed().is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Icon::Filter.span(palette.accent()));
        spans.push(Span::styled("(x to clear)", palette.muted()));
    }

    Line::from(spans)
}
