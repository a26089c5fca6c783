// Dashboard view.
// Stat cards followed by the most recent posts and users.

use ratatui::{prelude::*, widgets::*};

use crate::api::Transport;
use crate::app::App;

use super::icon::Icon;
use super::list::{post_row, render_error, render_loading, user_row};
use super::palette::Palette;

/// One number with a caption.
struct StatCard {
    title: &'static str,
    value: String,
    icon: Icon,
    color: Color,
    subtitle: &'static str,
}

fn draw_card(frame: &mut Frame, card: &StatCard, palette: &Palette, area: Rect) {
    let lines = vec![
        Line::from(vec![
            card.icon.span(Style::default().fg(card.color)),
            Span::styled(card.title, palette.muted()),
        ]),
        Line::from(Span::styled(
            card.value.as_str(),
            Style::default().fg(card.color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(card.subtitle, palette.muted())),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.muted()),
    );
    frame.render_widget(widget, area);
}

/// Average posts per user with one decimal; "0" when there are no users.
pub fn average_posts_per_user(posts: usize, users: usize) -> String {
    if users == 0 {
        return "0".to_string();
    }
    format!("{:.1}", posts as f64 / users as f64)
}

fn count_label(count: Option<usize>, loading: bool) -> String {
    match count {
        Some(count) => count.to_string(),
        None if loading => "…".to_string(),
        None => "-".to_string(),
    }
}

/// Draw the dashboard.
pub fn draw_dashboard<T: Transport>(
    frame: &mut Frame,
    app: &App<T>,
    palette: &Palette,
    area: Rect,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    let total_posts = app.all_posts.data().map(Vec::len);
    let total_users = app.all_users.data().map(Vec::len);
    let average = match (total_posts, total_users) {
        (Some(posts), Some(users)) => average_posts_per_user(posts, users),
        _ => "…".to_string(),
    };

    let cards = [
        StatCard {
            title: "Total Posts",
            value: count_label(total_posts, app.all_posts.loading),
            icon: Icon::FileText,
            color: palette.accent,
            subtitle: "Published content",
        },
        StatCard {
            title: "Total Users",
            value: count_label(total_users, app.all_users.loading),
            icon: Icon::User,
            color: palette.success,
            subtitle: "Community members",
        },
        StatCard {
            title: "Bookmarks",
            value: app.prefs.bookmarks.total().to_string(),
            icon: Icon::Bookmark,
            color: palette.warn,
            subtitle: "Saved items",
        },
        StatCard {
            title: "Avg Posts/User",
            value: average,
            icon: Icon::TrendingUp,
            color: palette.info,
            subtitle: "Engagement metric",
        },
    ];

    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    for (card, card_area) in cards.iter().zip(card_areas.iter()) {
        draw_card(frame, card, palette, *card_area);
    }

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let posts_len = app.recent_posts().len();
    let users_len = app.recent_users().len();
    let selected = app.dashboard.selected(posts_len + users_len);
    let bookmarks = &app.prefs.bookmarks;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(" Recent Posts ")
        .title_style(palette.title());
    let inner = block.inner(lists[0]);
    if posts_len == 0 {
        frame.render_widget(block, lists[0]);
        match &app.all_posts.error {
            Some(err) => render_error(frame, inner, err.user_message(), palette),
            None => render_loading(frame, inner, "Loading posts", palette),
        }
    } else {
        let items: Vec<ListItem> = app
            .recent_posts()
            .iter()
            .map(|post| post_row(post, bookmarks, palette))
            .collect();
        let mut state = ListState::default().with_selected(selected.filter(|&i| i < posts_len));
        let list_widget = List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list_widget, lists[0], &mut state);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(" Recent Users ")
        .title_style(palette.title());
    let inner = block.inner(lists[1]);
    if users_len == 0 {
        frame.render_widget(block, lists[1]);
        match &app.all_users.error {
            Some(err) => render_error(frame, inner, err.user_message(), palette),
            None => render_loading(frame, inner, "Loading users", palette),
        }
    } else {
        let items: Vec<ListItem> = app
            .recent_users()
            .iter()
            .map(|user| user_row(user, bookmarks, palette))
            .collect();
        let mut state = ListState::default().with_selected(
            selected
                .and_then(|i| i.checked_sub(posts_len))
                .filter(|&i| i < users_len),
        );
        let list_widget = List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list_widget, lists[1], &mut state);
    }
}
