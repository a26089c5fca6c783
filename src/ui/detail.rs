// Detail views.
// Post with its author and comments; user profile with the user's posts.

use ratatui::{prelude::*, widgets::*};

use crate::api::User;
use crate::app::{PostView, ProfileView};
use crate::prefs::{BookmarkKind, BookmarkStore};
use crate::state::QueryState;

use super::icon::Icon;
use super::list::{post_row, render_empty, render_error, render_loading};
use super::palette::Palette;

fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(title)
        .title_style(palette.title())
}

/// Draw the loading or error placeholder for a query with no data.
/// Returns true when something was drawn.
fn placeholder<T>(
    frame: &mut Frame,
    area: Rect,
    state: &QueryState<T>,
    what: &str,
    palette: &Palette,
) -> bool {
    if state.data.is_some() {
        return false;
    }
    if let Some(err) = &state.error {
        render_error(frame, area, err.user_message(), palette);
    } else if state.loading {
        render_loading(frame, area, &format!("Loading {}", what), palette);
    } else {
        render_empty(frame, area, &format!("No {}", what), palette);
    }
    true
}

/// Contact lines shared by the author card and the profile card.
fn contact_lines<'a>(user: &'a User, palette: &Palette) -> Vec<Line<'a>> {
    let icon = palette.muted();
    vec![
        Line::from(vec![Icon::Mail.span(icon), Span::raw(user.email.as_str())]),
        Line::from(vec![
            Icon::MapPin.span(icon),
            Span::raw(format!(
                "{}, {} {}",
                user.address.street, user.address.suite, user.address.city
            )),
        ]),
        Line::from(vec![
            Icon::Globe.span(icon),
            Span::raw(user.website.as_str()),
            Span::raw(" "),
            Span::styled(Icon::ExternalLink.glyph(), icon),
        ]),
    ]
}

/// Render a post with its comments and an author card.
pub fn draw_post_detail(
    frame: &mut Frame,
    view: &PostView,
    bookmarks: &BookmarkStore,
    palette: &Palette,
    area: Rect,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    let block = panel(" Post ", palette);
    let inner = block.inner(columns[0]);
    frame.render_widget(block, columns[0]);

    if !placeholder(frame, inner, &view.post, "post", palette) {
        if let Some(post) = view.post.data() {
            let bookmarked = bookmarks.is_bookmarked(BookmarkKind::Post, post.id);
            let author = view
                .author
                .data()
                .map(|user| user.name.as_str())
                .unwrap_or("…");

            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        post.title.as_str(),
                        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                    ),
                    if bookmarked {
                        Span::styled(
                            format!("  {}", Icon::Bookmark.glyph()),
                            Style::default().fg(palette.warn),
                        )
                    } else {
                        Span::raw("")
                    },
                ]),
                Line::from(vec![
                    Icon::User.span(palette.muted()),
                    Span::styled(format!("{}  ·  post #{}", author, post.id), palette.muted()),
                ]),
                Line::from(""),
            ];
            lines.extend(post.body.lines().map(Line::raw));
            lines.push(Line::from(""));

            let comment_title = match view.comments.data() {
                Some(comments) => format!("Comments ({})", comments.len()),
                None => "Comments".to_string(),
            };
            lines.push(Line::from(Span::styled(comment_title, palette.title())));
            match view.comments.data() {
                Some(comments) if comments.is_empty() => {
                    lines.push(Line::from(Span::styled("No comments yet", palette.muted())));
                }
                Some(comments) => {
                    for comment in comments {
                        lines.push(Line::from(""));
                        lines.push(Line::from(vec![
                            Span::styled(comment.name.as_str(), palette.accent()),
                            Span::styled(format!("  {}", comment.email), palette.muted()),
                        ]));
                        lines.extend(comment.body.lines().map(Line::raw));
                    }
                }
                None if view.comments.error.is_some() => {
                    lines.push(Line::from(Span::styled(
                        format!("{} Could not load comments", Icon::AlertCircle.glyph()),
                        Style::default().fg(palette.error),
                    )));
                }
                None => {
                    lines.push(Line::from(Span::styled("Loading comments...", palette.muted())));
                }
            }

            let text = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((view.scroll, 0));
            frame.render_widget(text, inner);
        }
    }

    let block = panel(" Author ", palette);
    let inner = block.inner(columns[1]);
    frame.render_widget(block, columns[1]);
    if !placeholder(frame, inner, &view.author, "author", palette) {
        if let Some(user) = view.author.data() {
            let mut lines = vec![
                Line::from(Span::styled(
                    user.name.as_str(),
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(format!("@{}", user.username), palette.accent())),
                Line::from(""),
            ];
            lines.extend(contact_lines(user, palette));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter: view profile",
                palette.muted(),
            )));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        }
    }
}

/// Render a user profile with the user's posts.
pub fn draw_user_profile(
    frame: &mut Frame,
    view: &mut ProfileView,
    bookmarks: &BookmarkStore,
    palette: &Palette,
    area: Rect,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
        .split(area);

    let block = panel(" Profile ", palette);
    let inner = block.inner(columns[0]);
    frame.render_widget(block, columns[0]);

    if !placeholder(frame, inner, &view.user, "user", palette) {
        if let Some(user) = view.user.data() {
            let bookmarked = bookmarks.is_bookmarked(BookmarkKind::User, user.id);
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        user.name.as_str(),
                        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                    ),
                    if bookmarked {
                        Span::styled(
                            format!("  {}", Icon::Bookmark.glyph()),
                            Style::default().fg(palette.warn),
                        )
                    } else {
                        Span::raw("")
                    },
                ]),
                Line::from(Span::styled(format!("@{}", user.username), palette.accent())),
                Line::from(""),
            ];
            lines.extend(contact_lines(user, palette));
            lines.push(Line::from(vec![
                Span::styled("☏ ", palette.muted()),
                Span::raw(user.phone.as_str()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Company", palette.title())));
            lines.push(Line::from(user.company.name.as_str()));
            lines.push(Line::from(Span::styled(
                user.company.catch_phrase.as_str(),
                palette.muted().add_modifier(Modifier::ITALIC),
            )));
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        }
    }

    let title = match view.posts.data() {
        Some(posts) => format!(" Posts ({}) ", posts.len()),
        None => " Posts ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.muted())
        .title(title)
        .title_style(palette.title());
    let inner = block.inner(columns[1]);

    if view.posts.data().is_some_and(|posts| !posts.is_empty()) {
        let items: Vec<ListItem> = view
            .posts
            .data()
            .into_iter()
            .flatten()
            .map(|post| post_row(post, bookmarks, palette))
            .collect();
        let list_widget = List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list_widget, columns[1], &mut view.selection.list_state);
    } else {
        frame.render_widget(block, columns[1]);
        if !placeholder(frame, inner, &view.posts, "posts", palette) {
            render_empty(frame, inner, "This user has not posted yet", palette);
        }
    }
}
