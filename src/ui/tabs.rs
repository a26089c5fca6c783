// Tab bar rendering with badge support for Console tab.
// Handles visual indication of active tab and unread error count.

use ratatui::{prelude::*, widgets::*};

use crate::api::Transport;
use crate::app::{App, Tab};
use crate::prefs::{BookmarkKind, Theme};

use super::icon::Icon;
use super::palette::Palette;

/// Draw the tab bar at the top of the screen.
pub fn draw_tabs<T: Transport>(frame: &mut Frame, app: &App<T>, palette: &Palette, area: Rect) {
    let unread = app.activity.unread_errors;
    let bookmarks = app.prefs.bookmarks.total();

    let tab_titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let title = match tab {
                Tab::Console if unread > 0 => format!("{} ({})", tab.title(), unread),
                Tab::Bookmarks if bookmarks > 0 => format!("{} ({})", tab.title(), bookmarks),
                _ => tab.title().to_string(),
            };

            let style = if *tab == app.active_tab {
                Style::default()
                    .fg(palette.warn)
                    .add_modifier(Modifier::BOLD)
            } else if *tab == Tab::Console && unread > 0 {
                Style::default().fg(palette.error)
            } else {
                Style::default().fg(palette.fg)
            };

            Line::from(Span::styled(title, style))
        })
        .collect();

    let selected_index = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let theme_icon = match app.prefs.theme.mode() {
        Theme::Light => Icon::Sun,
        Theme::Dark => Icon::Moon,
    };
    let right = format!(
        " {} {}  {} {}/{} ",
        theme_icon.glyph(),
        app.prefs.theme.mode().as_str(),
        Icon::Bookmark.glyph(),
        app.prefs.bookmarks.count(BookmarkKind::Post),
        app.prefs.bookmarks.count(BookmarkKind::User),
    );

    let tabs_widget = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(palette.muted())
                .title(" placard ")
                .title_style(palette.title())
                .title_top(Line::from(Span::styled(right, palette.muted())).right_aligned()),
        )
        .select(selected_index)
        .highlight_style(Style::default().fg(palette.warn))
        .divider(Span::raw(" │ "));

    frame.render_widget(tabs_widget, area);
}
