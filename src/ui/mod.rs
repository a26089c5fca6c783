// UI module for rendering the TUI.
// Contains widgets for tabs, breadcrumbs, lists, detail views and dialogs.

mod boundary;
mod breadcrumb;
mod dashboard;
mod detail;
mod icon;
mod list;
mod modal;
mod palette;
mod tabs;

use chrono::Utc;
use ratatui::{prelude::*, widgets::*};

use crate::api::Transport;
use crate::app::{App, Modal};
use crate::prefs::BookmarkKind;
use crate::state::{NotificationLevel, ViewLevel};

use icon::Icon;
use palette::Palette;

/// Seconds a notification stays in the status bar.
const NOTIFICATION_SECS: i64 = 5;

/// Main draw function that renders the entire UI.
pub fn draw<T: Transport>(frame: &mut Frame, app: &mut App<T>) {
    let palette = Palette::for_theme(app.prefs.theme.mode());
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Length(3), // Breadcrumb and search
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    // Tab bar
    tabs::draw_tabs(frame, app, &palette, chunks[0]);

    // Breadcrumb
    let breadcrumbs = app.nav.breadcrumbs();
    breadcrumb::draw_breadcrumb(frame, &breadcrumbs, app.search(), &palette, chunks[1]);

    // Main content area, isolated so a crashing view cannot take the app down
    match app.render_fault.clone() {
        Some(message) => boundary::draw_fault(frame, chunks[2], &message, &palette),
        None => {
            let result =
                boundary::render_guarded(frame, |frame| draw_content(frame, app, &palette, chunks[2]));
            if let Err(message) = result {
                tracing::error!(%message, view = %app.nav.current().title(), "view crashed");
                boundary::draw_fault(frame, chunks[2], &message, &palette);
                app.render_fault = Some(message);
            }
        }
    }

    // Status bar
    draw_status_bar(frame, app, &palette, chunks[3]);

    // Dialogs and help (rendered last, on top of everything)
    match &app.modal {
        Some(Modal::Form(form)) => modal::draw_post_form(frame, form, &palette),
        Some(Modal::ConfirmDelete { id, title }) => modal::draw_confirm(
            frame,
            "Delete Post",
            &format!("Delete post #{} \"{}\"?", id, list::truncate(title, 30)),
            &palette,
        ),
        Some(Modal::ConfirmClearBookmarks) => modal::draw_confirm(
            frame,
            "Clear Bookmarks",
            &format!(
                "Remove all {} bookmarks? This cannot be undone.",
                app.prefs.bookmarks.total()
            ),
            &palette,
        ),
        None => {}
    }
    if app.show_help {
        draw_help_overlay(frame, &palette);
    }
}

/// Draw the main content area based on the current view.
fn draw_content<T: Transport>(frame: &mut Frame, app: &mut App<T>, palette: &Palette, area: Rect) {
    match app.nav.current() {
        ViewLevel::Dashboard => dashboard::draw_dashboard(frame, app, palette, area),
        ViewLevel::Posts => list::render_posts_list(frame, app, palette, area),
        ViewLevel::Users => list::render_users_list(frame, app, palette, area),
        ViewLevel::Bookmarks => list::render_bookmarks(frame, app, palette, area),
        ViewLevel::PostDetail { .. } => {
            detail::draw_post_detail(frame, &app.post_view, &app.prefs.bookmarks, palette, area)
        }
        ViewLevel::UserProfile { .. } => {
            detail::draw_user_profile(frame, &mut app.profile, &app.prefs.bookmarks, palette, area)
        }
        ViewLevel::Console => draw_console_tab(frame, app, palette, area),
    }
}

/// Draw the Console tab with the activity log.
fn draw_console_tab<T: Transport>(
    frame: &mut Frame,
    app: &mut App<T>,
    palette: &Palette,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(" Console ")
        .title_style(palette.title());

    if app.activity.is_empty() {
        let text = Paragraph::new("No messages")
            .alignment(Alignment::Center)
            .style(palette.muted())
            .block(block);
        frame.render_widget(text, area);
    } else {
        // Show newest messages first
        let items: Vec<ListItem> = app
            .activity
            .newest_first()
            .map(|msg| {
                let (icon, color) = level_icon(msg.level, palette);
                let time = list::format_relative_time(&msg.timestamp);

                ListItem::new(Line::from(vec![
                    icon.span(Style::default().fg(color)),
                    Span::styled(format!("{:>8} ", time), palette.muted()),
                    Span::styled(msg.message.clone(), Style::default().fg(color)),
                ]))
            })
            .collect();

        let list_widget = List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
            .highlight_symbol("> ");

        let mut state = app.activity.list_state.clone();
        frame.render_stateful_widget(list_widget, area, &mut state);
        app.activity.list_state = state;
    }
}

fn level_icon(level: NotificationLevel, palette: &Palette) -> (Icon, Color) {
    match level {
        NotificationLevel::Error => (Icon::AlertCircle, palette.error),
        NotificationLevel::Warn => (Icon::AlertTriangle, palette.warn),
        NotificationLevel::Success => (Icon::Check, palette.success),
        NotificationLevel::Info => (Icon::Info, palette.accent),
    }
}

fn hint<'a>(key: &'a str, action: &'a str, palette: &Palette) -> [Span<'a>; 2] {
    [
        Span::raw(format!("  {} ", key)),
        Span::styled(action, palette.muted()),
    ]
}

/// Draw the status bar with keybinding hints or the latest notification.
fn draw_status_bar<T: Transport>(frame: &mut Frame, app: &App<T>, palette: &Palette, area: Rect) {
    if let Some(latest) = app.activity.latest() {
        let age = Utc::now().signed_duration_since(latest.timestamp);
        if age.num_seconds() < NOTIFICATION_SECS {
            let (icon, color) = level_icon(latest.level, palette);
            let line = Line::from(vec![
                Span::raw(" "),
                icon.span(Style::default().fg(color)),
                Span::styled(latest.message.as_str(), Style::default().fg(color)),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }
    }

    let mut hints: Vec<Span> = Vec::new();
    if app.search().is_some_and(|search| search.editing) {
        hints.extend(hint("type", "Filter", palette));
        hints.extend(hint("Enter/Esc", "Done", palette));
    } else {
        hints.extend(hint("↑↓", "Navigate", palette));
        hints.extend(hint("↵", "Open", palette));
        if app.nav.can_go_back() {
            hints.extend(hint("Esc", "Back", palette));
        }
        match app.nav.current() {
            ViewLevel::Posts | ViewLevel::Users => {
                hints.extend(hint("/", "Search", palette));
                hints.extend(hint("b", "Bookmark", palette));
            }
            ViewLevel::PostDetail { id } => {
                let verb = if app.prefs.bookmarks.is_bookmarked(BookmarkKind::Post, *id) {
                    "Unbookmark"
                } else {
                    "Bookmark"
                };
                hints.extend(hint("b", verb, palette));
                hints.extend(hint("e", "Edit", palette));
                hints.extend(hint("d", "Delete", palette));
            }
            ViewLevel::Bookmarks => {
                hints.extend(hint("←→", "Pane", palette));
                hints.extend(hint("X", "Clear all", palette));
            }
            _ => hints.extend(hint("b", "Bookmark", palette)),
        }
        hints.extend(hint("n", "New post", palette));
        hints.extend(hint("r", "Refresh", palette));
        hints.extend(hint("?", "Help", palette));
        hints.extend(hint("q", "Quit", palette));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame, palette: &Palette) {
    let popup_area = modal::centered(frame.area(), 56, 24);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let keys = [
        ("↑/↓ or j/k", "Navigate list / scroll post"),
        ("Enter", "Open selection"),
        ("Esc", "Go back / close help"),
        ("Tab/S-Tab", "Switch tabs"),
        ("←/→", "Switch bookmarks pane"),
        ("/", "Search posts or users"),
        ("x", "Clear search"),
        ("b", "Toggle bookmark"),
        ("n", "New post"),
        ("e", "Edit post"),
        ("d", "Delete post"),
        ("X", "Clear all bookmarks"),
        ("t", "Toggle light/dark theme"),
        ("r", "Refresh current view"),
        ("?", "Show/hide this help"),
        ("q", "Quit"),
    ];

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    help_text.extend(keys.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", key), palette.accent()),
            Span::raw(*action),
        ])
    }));
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("Press ", palette.muted()),
        Span::styled("Esc", Style::default().fg(palette.warn)),
        Span::styled(" or ", palette.muted()),
        Span::styled("?", Style::default().fg(palette.warn)),
        Span::styled(" to close", palette.muted()),
    ]));

    let help_paragraph = Paragraph::new(help_text)
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.accent())
                .title(format!(" {} Help ", Icon::HelpCircle.glyph()))
                .title_style(palette.title()),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::demo_api;
    use crate::cache::{QueryCache, RetryPolicy};
    use crate::config::Config;
    use crate::prefs::Preferences;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;
    use tokio::runtime::Handle;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn test_app(dir: &TempDir) -> App<crate::api::testing::FakeTransport> {
        let path = dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(|name| {
            (name == "PLACARD_DATA_DIR").then(|| path.clone())
        })
        .unwrap();
        let prefs = Preferences::load(&config.data_dir).unwrap();
        let cache = QueryCache::new(demo_api(30, 10), RetryPolicy::immediate(1));
        App::new(&config, cache, prefs, Handle::current())
    }

    #[tokio::test]
    async fn test_posts_view_records_viewport() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.switch_tab(crate::app::Tab::Posts);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        // 30 rows minus tab bar, breadcrumb, status bar and list borders.
        assert_eq!(app.posts.viewport_rows, 21);
        assert!(app.posts.sentinel_visible());
        assert!(screen(&terminal).contains("Posts (0)"));
    }

    #[tokio::test]
    async fn test_help_overlay_lists_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.show_help = true;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Keyboard Shortcuts"));
        assert!(text.contains("Toggle bookmark"));
    }

    #[tokio::test]
    async fn test_render_fault_shows_recovery_panel() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.render_fault = Some("boom".into());

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Something went wrong"));
        // The chrome around the content region still renders.
        assert!(text.contains("Dashboard"));
    }
}
