// Generic list rendering for selectable items.
// Provides styled list views with loading, empty and "load more" states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::api::{Post, Transport, User};
use crate::app::App;
use crate::prefs::{BookmarkKind, BookmarkStore};
use crate::state::PagedList;

use super::icon::Icon;
use super::palette::Palette;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.warn));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str, palette: &Palette) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(palette.error));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(palette.muted());
    frame.render_widget(text, area);
}

/// Star shown next to bookmarked rows.
pub fn bookmark_marker(bookmarked: bool, palette: &Palette) -> Span<'static> {
    if bookmarked {
        Icon::Bookmark.span(Style::default().fg(palette.warn))
    } else {
        Span::raw("  ")
    }
}

pub fn post_row<'a>(post: &'a Post, bookmarks: &BookmarkStore, palette: &Palette) -> ListItem<'a> {
    let bookmarked = bookmarks.is_bookmarked(BookmarkKind::Post, post.id);
    ListItem::new(Line::from(vec![
        bookmark_marker(bookmarked, palette),
        Span::styled(format!("#{:<4}", post.id), palette.muted()),
        Span::styled(post.title.as_str(), Style::default().fg(palette.accent)),
        Span::styled(format!("  {}", truncate(&post.body, 60)), palette.muted()),
    ]))
}

pub fn user_row<'a>(user: &'a User, bookmarks: &BookmarkStore, palette: &Palette) -> ListItem<'a> {
    let bookmarked = bookmarks.is_bookmarked(BookmarkKind::User, user.id);
    ListItem::new(Line::from(vec![
        bookmark_marker(bookmarked, palette),
        Span::styled(user.name.as_str(), Style::default().fg(palette.accent)),
        Span::styled(format!("  @{}", user.username), Style::default().fg(palette.info)),
        Span::styled(format!("  {}", user.email), palette.muted()),
        Span::styled(format!("  {}", user.company.name), palette.muted()),
    ]))
}

/// Render an infinite-scroll list. A trailing row stands in for the next page
/// and the visible row count is recorded so the app can tell when it is on screen.
fn render_paged<T>(
    frame: &mut Frame,
    list: &mut PagedList<T>,
    area: Rect,
    title: &str,
    noun: &str,
    palette: &Palette,
    row: impl Fn(&T) -> ListItem<'_>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(format!(" {} ({}) ", title, list.len()))
        .title_style(palette.title());
    let inner = block.inner(area);
    list.viewport_rows = inner.height as usize;

    let pages = &list.pages;
    if pages.is_empty() {
        if pages.is_loading_first() {
            frame.render_widget(block, area);
            render_loading(frame, inner, &format!("Loading {}", noun), palette);
            return;
        }
        if let Some(err) = pages.error() {
            frame.render_widget(block, area);
            render_error(
                frame,
                inner,
                &format!("{}. Press r to retry.", err.user_message()),
                palette,
            );
            return;
        }
        if !pages.has_more() {
            frame.render_widget(block, area);
            render_empty(frame, inner, &format!("No {} found", noun), palette);
            return;
        }
    }

    let mut items: Vec<ListItem> = pages.items().map(row).collect();
    if let Some(err) = pages.error() {
        items.push(ListItem::new(Span::styled(
            format!("❌ {}. Press r to retry.", err.user_message()),
            Style::default().fg(palette.error),
        )));
    } else if pages.is_fetching() {
        items.push(ListItem::new(Span::styled(
            format!("⏳ Loading more {}...", noun),
            Style::default().fg(palette.warn),
        )));
    } else if pages.has_more() {
        items.push(ListItem::new(Span::styled("  ↓ more", palette.muted())));
    } else {
        items.push(ListItem::new(Span::styled(
            format!("{} No more {}", Icon::Check.glyph(), noun),
            palette.muted(),
        )));
    }

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(palette.highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

/// Render the infinite-scroll posts list.
pub fn render_posts_list<T: Transport>(
    frame: &mut Frame,
    app: &mut App<T>,
    palette: &Palette,
    area: Rect,
) {
    let bookmarks = &app.prefs.bookmarks;
    render_paged(
        frame,
        &mut app.posts,
        area,
        "Posts",
        "posts",
        palette,
        |post| post_row(post, bookmarks, palette),
    );
}

/// Render the paged users list.
pub fn render_users_list<T: Transport>(
    frame: &mut Frame,
    app: &mut App<T>,
    palette: &Palette,
    area: Rect,
) {
    let bookmarks = &app.prefs.bookmarks;
    render_paged(
        frame,
        &mut app.users,
        area,
        "Users",
        "users",
        palette,
        |user| user_row(user, bookmarks, palette),
    );
}

/// Render the bookmarks page: counts, pane switcher and the selected pane.
pub fn render_bookmarks<T: Transport>(
    frame: &mut Frame,
    app: &mut App<T>,
    palette: &Palette,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(format!(" Bookmarks ({} total) ", app.prefs.bookmarks.total()))
        .title_style(palette.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.prefs.bookmarks.total() == 0 {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} No bookmarks yet", Icon::Bookmark.glyph()),
                palette.title(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press b on a post or user to save it here.",
                palette.muted(),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let pane_style = |kind: BookmarkKind| {
        if app.bookmarks_pane == kind {
            Style::default()
                .fg(palette.warn)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.muted()
        }
    };
    let header = Line::from(vec![
        Span::styled(
            format!(
                " {} Posts ({}) ",
                Icon::FileText.glyph(),
                app.prefs.bookmarks.count(BookmarkKind::Post)
            ),
            pane_style(BookmarkKind::Post),
        ),
        Span::styled("│", palette.muted()),
        Span::styled(
            format!(
                " {} Users ({}) ",
                Icon::User.glyph(),
                app.prefs.bookmarks.count(BookmarkKind::User)
            ),
            pane_style(BookmarkKind::User),
        ),
        Span::styled("   ←/→ switch", palette.muted()),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let loading = match app.bookmarks_pane {
        BookmarkKind::Post => app.all_posts.is_loading_first(),
        BookmarkKind::User => app.all_users.is_loading_first(),
    };
    if loading {
        render_loading(frame, chunks[1], "Loading bookmarks", palette);
        return;
    }

    let bookmarks = &app.prefs.bookmarks;
    let items: Vec<ListItem> = match app.bookmarks_pane {
        BookmarkKind::Post => app
            .bookmarked_posts()
            .into_iter()
            .map(|post| post_row(post, bookmarks, palette))
            .collect(),
        BookmarkKind::User => app
            .bookmarked_users()
            .into_iter()
            .map(|user| user_row(user, bookmarks, palette))
            .collect(),
    };

    if items.is_empty() {
        let noun = match app.bookmarks_pane {
            BookmarkKind::Post => "posts",
            BookmarkKind::User => "users",
        };
        render_empty(frame, chunks[1], &format!("No bookmarked {}", noun), palette);
        return;
    }

    let list_widget = List::new(items)
        .highlight_style(palette.highlight())
        .highlight_symbol("> ");
    let mut state = app.bookmarks.list_state.clone();
    frame.render_stateful_widget(list_widget, chunks[1], &mut state);
    app.bookmarks.list_state = state;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::minutes(5))),
            "5m ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::hours(3))),
            "3h ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::days(2))),
            "2d ago"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a longer sentence", 8), "a longe…");
    }
}
