// App state and main event loop.
// Manages tabs, navigation state, background loads and keyboard input handling.

use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};

use crate::api::{ApiClient, Comment, Post, Transport, User};
use crate::cache::{CacheEvent, CacheKey, EntityKind, QueryCache, QueryResult};
use crate::config::Config;
use crate::error::FetchError;
use crate::prefs::{BookmarkKind, Preferences};
use crate::queries::{posts, users};
use crate::state::{
    ActivityLog, FormMode, NavigationStack, Notification, Page, PageRequest, PagedList, PostForm,
    QueryState, SearchInput, Selection, ViewLevel,
};
use crate::ui;

/// Rows on the dashboard: recent posts first, then recent users.
pub const RECENT_POSTS: usize = 5;
pub const RECENT_USERS: usize = 4;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Posts,
    Users,
    Bookmarks,
    Console,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Posts,
        Tab::Users,
        Tab::Bookmarks,
        Tab::Console,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Posts => "Posts",
            Tab::Users => "Users",
            Tab::Bookmarks => "Bookmarks",
            Tab::Console => "Console",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Posts,
            Tab::Posts => Tab::Users,
            Tab::Users => Tab::Bookmarks,
            Tab::Bookmarks => Tab::Console,
            Tab::Console => Tab::Dashboard,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Console,
            Tab::Posts => Tab::Dashboard,
            Tab::Users => Tab::Posts,
            Tab::Bookmarks => Tab::Users,
            Tab::Console => Tab::Bookmarks,
        }
    }

    /// View shown when the tab is opened.
    pub fn root(&self) -> ViewLevel {
        match self {
            Tab::Dashboard => ViewLevel::Dashboard,
            Tab::Posts => ViewLevel::Posts,
            Tab::Users => ViewLevel::Users,
            Tab::Bookmarks => ViewLevel::Bookmarks,
            Tab::Console => ViewLevel::Console,
        }
    }
}

/// Dialog drawn over the current view.
#[derive(Debug, Clone)]
pub enum Modal {
    Form(PostForm),
    ConfirmDelete { id: u64, title: String },
    ConfirmClearBookmarks,
}

/// Result of background work, tagged with the context it was started for.
#[derive(Debug)]
pub enum AppEvent {
    PostsPage {
        request: PageRequest,
        result: Result<Page<Post>, FetchError>,
    },
    UsersPage {
        request: PageRequest,
        result: Result<Page<User>, FetchError>,
    },
    AllPosts(QueryResult<Vec<Post>>),
    AllUsers(QueryResult<Vec<User>>),
    Post {
        id: u64,
        result: QueryResult<Post>,
    },
    Comments {
        post_id: u64,
        result: QueryResult<Vec<Comment>>,
    },
    Author {
        post_id: u64,
        result: QueryResult<User>,
    },
    User {
        id: u64,
        result: QueryResult<User>,
    },
    UserPosts {
        user_id: u64,
        result: QueryResult<Vec<Post>>,
    },
    Saved {
        mode: FormMode,
        result: Result<Post, FetchError>,
    },
    Deleted {
        id: u64,
        result: Result<(), FetchError>,
    },
}

/// Post detail page: the post, its comments and its author.
#[derive(Debug, Default)]
pub struct PostView {
    pub id: Option<u64>,
    pub post: QueryState<Post>,
    pub comments: QueryState<Vec<Comment>>,
    pub author: QueryState<User>,
    pub scroll: u16,
}

/// User profile page: the user and their posts.
#[derive(Debug, Default)]
pub struct ProfileView {
    pub id: Option<u64>,
    pub user: QueryState<User>,
    pub posts: QueryState<Vec<Post>>,
    pub selection: Selection,
}

/// Main application state.
pub struct App<T: Transport = ApiClient> {
    /// Currently active tab.
    pub active_tab: Tab,
    pub nav: NavigationStack,
    pub cache: QueryCache<T>,
    pub prefs: Preferences,

    pub posts: PagedList<Post>,
    pub posts_search: SearchInput,
    pub users: PagedList<User>,
    pub users_search: SearchInput,

    /// Full collections for the dashboard and bookmarks pages.
    pub all_posts: QueryState<Vec<Post>>,
    pub all_users: QueryState<Vec<User>>,
    pub dashboard: Selection,
    pub bookmarks_pane: BookmarkKind,
    pub bookmarks: Selection,

    pub post_view: PostView,
    pub profile: ProfileView,

    pub activity: ActivityLog,
    pub modal: Option<Modal>,
    pub show_help: bool,
    /// Message of the last panic caught while drawing the content region.
    pub render_fault: Option<String>,
    /// Whether the app should exit.
    pub should_quit: bool,

    debounce: Duration,
    runtime: Handle,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    cache_events: broadcast::Receiver<CacheEvent>,
}

impl<T: Transport> App<T> {
    pub fn new(config: &Config, cache: QueryCache<T>, prefs: Preferences, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cache_events = cache.subscribe();
        let mut app = Self {
            active_tab: Tab::default(),
            nav: NavigationStack::new(Tab::default().root()),
            cache,
            prefs,
            posts: PagedList::new(),
            posts_search: SearchInput::new(config.debounce),
            users: PagedList::new(),
            users_search: SearchInput::new(config.debounce),
            all_posts: QueryState::default(),
            all_users: QueryState::default(),
            dashboard: Selection::default(),
            bookmarks_pane: BookmarkKind::Post,
            bookmarks: Selection::default(),
            post_view: PostView::default(),
            profile: ProfileView::default(),
            activity: ActivityLog::default(),
            modal: None,
            show_help: false,
            render_fault: None,
            should_quit: false,
            debounce: config.debounce,
            runtime,
            events_tx,
            events_rx,
            cache_events,
        };
        app.load_current_view();
        app
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.drain_events();
            self.tick(Instant::now());
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.load_visible_pages();
            self.handle_events()?;
        }
        tracing::info!("exiting");
        Ok(())
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        // Wake up in time to commit a pending search.
        let now = Instant::now();
        let timeout = [&self.posts_search, &self.users_search]
            .iter()
            .filter_map(|search| search.time_until_commit(now))
            .fold(INPUT_POLL, Duration::min);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Apply every finished background result and cache notification.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
        loop {
            match self.cache_events.try_recv() {
                Ok(event) => self.apply_cache_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cache notifications dropped");
                    self.notify(Notification::warn(format!(
                        "Missed {} updates, press r to refresh",
                        skipped
                    )));
                }
                Err(_) => break,
            }
        }
    }

    /// Commit debounced search input.
    pub fn tick(&mut self, now: Instant) {
        if self.posts_search.tick(now) {
            let filter = self.posts_search.committed().to_string();
            tracing::debug!(%filter, "posts filter committed");
            self.posts.reset(filter);
        }
        if self.users_search.tick(now) {
            let filter = self.users_search.committed().to_string();
            tracing::debug!(%filter, "users filter committed");
            self.users.reset(filter);
        }
    }

    /// Start the next page for a list whose sentinel row was just drawn.
    pub fn load_visible_pages(&mut self) {
        match self.nav.current() {
            ViewLevel::Posts => {
                if let Some(request) = self.posts.request_more() {
                    let cache = self.cache.clone();
                    let filter = self.posts.pages.filter().to_string();
                    self.spawn(async move {
                        let result = posts::fetch_posts_page(&cache, request.page, &filter).await;
                        AppEvent::PostsPage { request, result }
                    });
                }
            }
            ViewLevel::Users => {
                if let Some(request) = self.users.request_more() {
                    let cache = self.cache.clone();
                    let filter = self.users.pages.filter().to_string();
                    self.spawn(async move {
                        let result = users::fetch_users_page(&cache, request.page, &filter).await;
                        AppEvent::UsersPage { request, result }
                    });
                }
            }
            _ => {}
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            // Closed only when the app is gone.
            let _ = tx.send(task.await);
        });
    }

    fn notify(&mut self, notification: Notification) {
        self.activity.push(notification);
        if self.active_tab == Tab::Console {
            self.activity.mark_read();
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PostsPage { request, result } => {
                let applied = match result {
                    Ok(page) => {
                        let applied = self.posts.complete(request, page);
                        tracing::debug!(pages = self.posts.pages.page_count(), "posts page loaded");
                        applied
                    }
                    Err(err) => self.posts.fail(request, err),
                };
                if !applied {
                    tracing::debug!(?request, "discarding stale posts page");
                }
            }
            AppEvent::UsersPage { request, result } => {
                let applied = match result {
                    Ok(page) => self.users.complete(request, page),
                    Err(err) => self.users.fail(request, err),
                };
                if !applied {
                    tracing::debug!(?request, "discarding stale users page");
                }
            }
            AppEvent::AllPosts(result) => self.all_posts.apply(result),
            AppEvent::AllUsers(result) => self.all_users.apply(result),
            AppEvent::Post { id, result } => {
                if self.post_view.id != Some(id) {
                    return;
                }
                let author_id = result.data.as_ref().map(|post| post.user_id);
                self.post_view.post.apply(result);
                if let Some(user_id) = author_id {
                    self.load_author(id, user_id);
                }
            }
            AppEvent::Comments { post_id, result } => {
                if self.post_view.id == Some(post_id) {
                    self.post_view.comments.apply(result);
                }
            }
            AppEvent::Author { post_id, result } => {
                if self.post_view.id == Some(post_id) {
                    self.post_view.author.apply(result);
                }
            }
            AppEvent::User { id, result } => {
                if self.profile.id == Some(id) {
                    self.profile.user.apply(result);
                }
            }
            AppEvent::UserPosts { user_id, result } => {
                if self.profile.id == Some(user_id) {
                    self.profile.posts.apply(result);
                }
            }
            AppEvent::Saved { mode, result } => self.finish_save(mode, result),
            AppEvent::Deleted { id, result } => self.finish_delete(id, result),
        }
    }

    fn apply_cache_event(&mut self, event: CacheEvent) {
        match event {
            CacheEvent::Failed { key, error } => {
                tracing::debug!(%key, "read failed after retries");
                self.notify(Notification::error(error.user_message()));
            }
            CacheEvent::Updated(_) | CacheEvent::Invalidated(_) | CacheEvent::Removed(_) => {}
        }
    }

    fn finish_save(&mut self, mode: FormMode, result: Result<Post, FetchError>) {
        match result {
            Ok(post) => {
                self.modal = None;
                let message = match mode {
                    FormMode::Create => format!("Post #{} created", post.id),
                    FormMode::Edit { id } => format!("Post #{} updated", id),
                };
                self.notify(Notification::success(message));
                self.refresh_post_lists();
                match mode {
                    FormMode::Create => self.switch_tab(Tab::Posts),
                    // Served from the entry the update just wrote.
                    FormMode::Edit { id } if self.post_view.id == Some(id) => self.load_post(id),
                    FormMode::Edit { .. } => {}
                }
            }
            Err(err) => {
                if let Some(Modal::Form(form)) = &mut self.modal {
                    form.submitting = false;
                    form.submit_error = Some(err.user_message().to_string());
                }
                self.notify(Notification::error(format!(
                    "Could not save post: {}",
                    err.user_message()
                )));
            }
        }
    }

    fn finish_delete(&mut self, id: u64, result: Result<(), FetchError>) {
        match result {
            Ok(()) => {
                self.notify(Notification::success(format!("Post #{} deleted", id)));
                self.nav.forget_post(id);
                if self.post_view.id == Some(id) {
                    self.post_view = PostView::default();
                }
                self.refresh_post_lists();
                self.load_current_view();
            }
            Err(err) => self.notify(Notification::error(format!(
                "Could not delete post: {}",
                err.user_message()
            ))),
        }
    }

    /// Refetch every visible post collection after a write.
    fn refresh_post_lists(&mut self) {
        let filter = self.posts_search.committed().to_string();
        self.posts.reset(filter);
        if self.all_posts.data.is_some() {
            self.load_all_posts();
        }
        if let Some(user_id) = self.profile.id {
            self.load_profile_posts(user_id);
        }
    }

    fn load_all_posts(&mut self) {
        self.all_posts.begin();
        let cache = self.cache.clone();
        self.spawn(async move { AppEvent::AllPosts(posts::fetch_posts(&cache).await) });
    }

    fn load_all_users(&mut self) {
        self.all_users.begin();
        let cache = self.cache.clone();
        self.spawn(async move { AppEvent::AllUsers(users::fetch_users(&cache).await) });
    }

    fn load_post(&mut self, id: u64) {
        self.post_view.post.begin();
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = posts::fetch_post(&cache, id).await;
            AppEvent::Post { id, result }
        });
    }

    fn load_comments(&mut self, post_id: u64) {
        self.post_view.comments.begin();
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = posts::fetch_post_comments(&cache, post_id).await;
            AppEvent::Comments { post_id, result }
        });
    }

    fn load_author(&mut self, post_id: u64, user_id: u64) {
        self.post_view.author.begin();
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = users::fetch_user(&cache, user_id).await;
            AppEvent::Author { post_id, result }
        });
    }

    fn load_profile(&mut self, id: u64) {
        self.profile.user.begin();
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = users::fetch_user(&cache, id).await;
            AppEvent::User { id, result }
        });
        self.load_profile_posts(id);
    }

    fn load_profile_posts(&mut self, user_id: u64) {
        self.profile.posts.begin();
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = posts::fetch_user_posts(&cache, user_id).await;
            AppEvent::UserPosts { user_id, result }
        });
    }

    /// Fetch whatever the current view shows. Fresh cache entries make this cheap.
    pub fn load_current_view(&mut self) {
        match self.nav.current().clone() {
            ViewLevel::Dashboard | ViewLevel::Bookmarks => {
                self.load_all_posts();
                self.load_all_users();
            }
            ViewLevel::PostDetail { id } => {
                if self.post_view.id != Some(id) {
                    self.post_view = PostView {
                        id: Some(id),
                        ..PostView::default()
                    };
                }
                self.load_post(id);
                self.load_comments(id);
            }
            ViewLevel::UserProfile { id, .. } => {
                if self.profile.id != Some(id) {
                    self.profile = ProfileView {
                        id: Some(id),
                        ..ProfileView::default()
                    };
                }
                self.load_profile(id);
            }
            // Paged lists load through their sentinel row.
            ViewLevel::Posts | ViewLevel::Users | ViewLevel::Console => {}
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.nav = NavigationStack::new(tab.root());
        if tab == Tab::Console {
            self.activity.mark_read();
        }
        self.load_current_view();
    }

    fn open(&mut self, level: ViewLevel) {
        self.nav.push(level);
        tracing::debug!(view = %self.nav.current().title(), depth = self.nav.depth(), "open");
        self.load_current_view();
    }

    fn open_post(&mut self, id: u64) {
        self.open(ViewLevel::PostDetail { id });
    }

    fn open_user(&mut self, user: &User) {
        self.open(ViewLevel::UserProfile {
            id: user.id,
            name: user.name.clone(),
        });
    }

    fn go_back(&mut self) {
        if self.nav.pop() {
            self.load_current_view();
        }
    }

    /// Re-read the current view from the network.
    pub fn refresh(&mut self) {
        match self.nav.current().clone() {
            ViewLevel::Dashboard | ViewLevel::Bookmarks => {
                self.cache.invalidate(|key| {
                    matches!(key.kind, EntityKind::PostList | EntityKind::UserList)
                });
                self.load_current_view();
            }
            ViewLevel::Posts => {
                if self.posts.pages.error().is_some() {
                    self.posts.pages.clear_error();
                } else {
                    self.cache.invalidate(|key| key.kind == EntityKind::PostPage);
                    let filter = self.posts_search.committed().to_string();
                    self.posts.reset(filter);
                }
            }
            ViewLevel::Users => {
                if self.users.pages.error().is_some() {
                    self.users.pages.clear_error();
                } else {
                    self.cache.invalidate_key(&CacheKey::user_list());
                    let filter = self.users_search.committed().to_string();
                    self.users.reset(filter);
                }
            }
            ViewLevel::PostDetail { id } => {
                self.cache.invalidate(|key| {
                    *key == CacheKey::post_detail(id) || *key == CacheKey::post_comments(id)
                });
                self.load_current_view();
            }
            ViewLevel::UserProfile { id, .. } => {
                self.cache.invalidate(|key| {
                    *key == CacheKey::user_detail(id) || *key == CacheKey::user_posts(id)
                });
                self.load_current_view();
            }
            ViewLevel::Console => {}
        }
        self.notify(Notification::info(format!("Refreshing {}", self.nav.current().title())));
    }

    /// Drop every cache entry and all view state, then start over.
    pub fn full_reload(&mut self) {
        tracing::warn!("full reload requested");
        self.cache.clear();
        self.render_fault = None;
        self.modal = None;
        self.posts = PagedList::new();
        self.posts_search = SearchInput::new(self.debounce);
        self.users = PagedList::new();
        self.users_search = SearchInput::new(self.debounce);
        self.all_posts.reset();
        self.all_users.reset();
        self.dashboard.reset();
        self.bookmarks.reset();
        self.post_view = PostView::default();
        self.profile = ProfileView::default();
        let tab = self.active_tab;
        self.switch_tab(tab);
    }

    /// Recent rows shown on the dashboard.
    pub fn recent_posts(&self) -> &[Post] {
        self.all_posts
            .data()
            .map(|posts| &posts[..posts.len().min(RECENT_POSTS)])
            .unwrap_or(&[])
    }

    pub fn recent_users(&self) -> &[User] {
        self.all_users
            .data()
            .map(|users| &users[..users.len().min(RECENT_USERS)])
            .unwrap_or(&[])
    }

    /// Bookmarked posts that are present in the loaded collection, in bookmark order.
    pub fn bookmarked_posts(&self) -> Vec<&Post> {
        let Some(all) = self.all_posts.data() else {
            return Vec::new();
        };
        self.prefs
            .bookmarks
            .ids(BookmarkKind::Post)
            .iter()
            .filter_map(|id| all.iter().find(|post| post.id == *id))
            .collect()
    }

    pub fn bookmarked_users(&self) -> Vec<&User> {
        let Some(all) = self.all_users.data() else {
            return Vec::new();
        };
        self.prefs
            .bookmarks
            .ids(BookmarkKind::User)
            .iter()
            .filter_map(|id| all.iter().find(|user| user.id == *id))
            .collect()
    }

    fn bookmarks_len(&self) -> usize {
        match self.bookmarks_pane {
            BookmarkKind::Post => self.bookmarked_posts().len(),
            BookmarkKind::User => self.bookmarked_users().len(),
        }
    }

    /// The entity the cursor is on, if the view has one.
    fn focused_entity(&self) -> Option<(BookmarkKind, u64)> {
        match self.nav.current() {
            ViewLevel::Posts => self.posts.selected_item().map(|p| (BookmarkKind::Post, p.id)),
            ViewLevel::Users => self.users.selected_item().map(|u| (BookmarkKind::User, u.id)),
            ViewLevel::PostDetail { id } => Some((BookmarkKind::Post, *id)),
            ViewLevel::UserProfile { id, .. } => Some((BookmarkKind::User, *id)),
            ViewLevel::Dashboard => {
                let index = self
                    .dashboard
                    .selected(self.recent_posts().len() + self.recent_users().len())?;
                match self.recent_posts().get(index) {
                    Some(post) => Some((BookmarkKind::Post, post.id)),
                    None => self
                        .recent_users()
                        .get(index - self.recent_posts().len())
                        .map(|user| (BookmarkKind::User, user.id)),
                }
            }
            ViewLevel::Bookmarks => {
                let index = self.bookmarks.selected(self.bookmarks_len())?;
                match self.bookmarks_pane {
                    BookmarkKind::Post => self
                        .bookmarked_posts()
                        .get(index)
                        .map(|post| (BookmarkKind::Post, post.id)),
                    BookmarkKind::User => self
                        .bookmarked_users()
                        .get(index)
                        .map(|user| (BookmarkKind::User, user.id)),
                }
            }
            ViewLevel::Console => None,
        }
    }

    /// The post the cursor is on, when fully loaded.
    fn focused_post(&self) -> Option<Post> {
        match self.nav.current() {
            ViewLevel::Posts => self.posts.selected_item().cloned(),
            ViewLevel::PostDetail { .. } => self.post_view.post.data().cloned(),
            ViewLevel::UserProfile { .. } => {
                let posts = self.profile.posts.data()?;
                let index = self.profile.selection.selected(posts.len())?;
                posts.get(index).cloned()
            }
            ViewLevel::Dashboard => {
                let index = self
                    .dashboard
                    .selected(self.recent_posts().len() + self.recent_users().len())?;
                self.recent_posts().get(index).cloned()
            }
            ViewLevel::Bookmarks if self.bookmarks_pane == BookmarkKind::Post => {
                let index = self.bookmarks.selected(self.bookmarks_len())?;
                self.bookmarked_posts().get(index).map(|post| (*post).clone())
            }
            _ => None,
        }
    }

    pub fn toggle_bookmark(&mut self, kind: BookmarkKind, id: u64) {
        match self.prefs.bookmarks.toggle(kind, id) {
            Ok(bookmarked) => {
                let noun = match kind {
                    BookmarkKind::Post => "Post",
                    BookmarkKind::User => "User",
                };
                let verb = if bookmarked { "bookmarked" } else { "removed from bookmarks" };
                self.notify(Notification::info(format!("{} #{} {}", noun, id, verb)));
                if self.nav.current() == &ViewLevel::Bookmarks {
                    let len = self.bookmarks_len();
                    if self.bookmarks.selected(len).is_none() {
                        self.bookmarks.select_prev(len);
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "bookmark not saved");
                self.notify(Notification::error(format!("Could not save bookmark: {}", err)));
            }
        }
    }

    fn toggle_theme(&mut self) {
        match self.prefs.theme.toggle() {
            Ok(theme) => tracing::info!(theme = theme.as_str(), "theme changed"),
            Err(err) => self.notify(Notification::error(format!("Could not save theme: {}", err))),
        }
    }

    fn clear_bookmarks(&mut self) {
        match self.prefs.bookmarks.clear_all() {
            Ok(()) => {
                self.bookmarks.reset();
                self.notify(Notification::info("All bookmarks cleared"));
            }
            Err(err) => self.notify(Notification::error(format!(
                "Could not clear bookmarks: {}",
                err
            ))),
        }
    }

    fn submit_form(&mut self) {
        let Some(Modal::Form(form)) = &mut self.modal else {
            return;
        };
        if form.submitting {
            return;
        }
        let Some(payload) = form.validate() else {
            return;
        };
        form.submitting = true;
        form.submit_error = None;
        let mode = form.mode;
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = match mode {
                FormMode::Create => posts::create_post(&cache, &payload).await,
                FormMode::Edit { id } => posts::update_post(&cache, id, &payload).await,
            };
            AppEvent::Saved { mode, result }
        });
    }

    fn delete_post(&mut self, id: u64) {
        self.modal = None;
        let cache = self.cache.clone();
        self.spawn(async move {
            let result = posts::delete_post(&cache, id).await;
            AppEvent::Deleted { id, result }
        });
    }

    fn search_mut(&mut self) -> Option<&mut SearchInput> {
        match self.nav.current() {
            ViewLevel::Posts => Some(&mut self.posts_search),
            ViewLevel::Users => Some(&mut self.users_search),
            _ => None,
        }
    }

    pub fn search(&self) -> Option<&SearchInput> {
        match self.nav.current() {
            ViewLevel::Posts => Some(&self.posts_search),
            ViewLevel::Users => Some(&self.users_search),
            _ => None,
        }
    }

    fn clear_search(&mut self) {
        match self.nav.current() {
            ViewLevel::Posts => {
                if self.posts_search.clear() {
                    self.posts.reset("");
                }
            }
            ViewLevel::Users => {
                if self.users_search.clear() {
                    self.users.reset("");
                }
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }
        if self.render_fault.is_some() {
            match key.code {
                KeyCode::Char('r') => self.render_fault = None,
                KeyCode::Char('R') => self.full_reload(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        if self.search().is_some_and(|search| search.editing) {
            self.handle_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.switch_tab(self.active_tab.next()),
            KeyCode::BackTab => self.switch_tab(self.active_tab.prev()),
            KeyCode::Esc => self.go_back(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Left | KeyCode::Right => {
                if self.nav.current() == &ViewLevel::Bookmarks {
                    self.bookmarks_pane = match self.bookmarks_pane {
                        BookmarkKind::Post => BookmarkKind::User,
                        BookmarkKind::User => BookmarkKind::Post,
                    };
                    self.bookmarks.reset();
                }
            }
            KeyCode::Enter => self.activate_selection(),
            KeyCode::Char('/') => {
                if let Some(search) = self.search_mut() {
                    search.editing = true;
                }
            }
            KeyCode::Char('x') => self.clear_search(),
            KeyCode::Char('b') => {
                if let Some((kind, id)) = self.focused_entity() {
                    self.toggle_bookmark(kind, id);
                }
            }
            KeyCode::Char('n') => self.modal = Some(Modal::Form(PostForm::create())),
            KeyCode::Char('e') => {
                if let Some(post) = self.focused_post() {
                    self.modal = Some(Modal::Form(PostForm::edit(&post)));
                }
            }
            KeyCode::Char('d') => {
                if let Some(post) = self.focused_post() {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: post.id,
                        title: post.title,
                    });
                }
            }
            KeyCode::Char('X') => {
                if self.prefs.bookmarks.total() > 0 {
                    self.modal = Some(Modal::ConfirmClearBookmarks);
                }
            }
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        let Some(search) = self.search_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Enter => search.editing = false,
            KeyCode::Backspace => search.pop(now),
            KeyCode::Char(c) => search.push(c, now),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = &mut self.modal else {
            return;
        };
        match modal {
            Modal::Form(form) => match key.code {
                KeyCode::Esc => self.modal = None,
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.pop(),
                KeyCode::Enter => self.submit_form(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            },
            Modal::ConfirmDelete { id, .. } => {
                let id = *id;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => self.delete_post(id),
                    KeyCode::Char('n') | KeyCode::Esc => self.modal = None,
                    _ => {}
                }
            }
            Modal::ConfirmClearBookmarks => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.modal = None;
                    self.clear_bookmarks();
                }
                KeyCode::Char('n') | KeyCode::Esc => self.modal = None,
                _ => {}
            },
        }
    }

    fn move_selection(&mut self, down: bool) {
        match self.nav.current() {
            ViewLevel::Posts => {
                if down {
                    self.posts.select_next()
                } else {
                    self.posts.select_prev()
                }
            }
            ViewLevel::Users => {
                if down {
                    self.users.select_next()
                } else {
                    self.users.select_prev()
                }
            }
            ViewLevel::PostDetail { .. } => {
                self.post_view.scroll = if down {
                    self.post_view.scroll.saturating_add(1)
                } else {
                    self.post_view.scroll.saturating_sub(1)
                };
            }
            ViewLevel::UserProfile { .. } => {
                let len = self.profile.posts.data().map_or(0, Vec::len);
                if down {
                    self.profile.selection.select_next(len)
                } else {
                    self.profile.selection.select_prev(len)
                }
            }
            ViewLevel::Dashboard => {
                let len = self.recent_posts().len() + self.recent_users().len();
                if down {
                    self.dashboard.select_next(len)
                } else {
                    self.dashboard.select_prev(len)
                }
            }
            ViewLevel::Bookmarks => {
                let len = self.bookmarks_len();
                if down {
                    self.bookmarks.select_next(len)
                } else {
                    self.bookmarks.select_prev(len)
                }
            }
            ViewLevel::Console => {
                let len = self.activity.len();
                let state = &mut self.activity.list_state;
                let next = match state.selected() {
                    Some(i) if down => (i + 1).min(len.saturating_sub(1)),
                    Some(i) => i.saturating_sub(1),
                    None => 0,
                };
                if len > 0 {
                    state.select(Some(next));
                }
            }
        }
    }

    fn activate_selection(&mut self) {
        match self.nav.current() {
            ViewLevel::Posts => {
                if let Some(id) = self.posts.selected_item().map(|post| post.id) {
                    self.open_post(id);
                }
            }
            ViewLevel::Users => {
                if let Some(user) = self.users.selected_item().cloned() {
                    self.open_user(&user);
                }
            }
            ViewLevel::PostDetail { .. } => {
                if let Some(author) = self.post_view.author.data().cloned() {
                    self.open_user(&author);
                }
            }
            ViewLevel::UserProfile { .. } | ViewLevel::Dashboard | ViewLevel::Bookmarks => {
                match self.focused_entity() {
                    Some((BookmarkKind::Post, id)) => self.open_post(id),
                    Some((BookmarkKind::User, id)) => {
                        let user = self
                            .all_users
                            .data()
                            .and_then(|all| all.iter().find(|user| user.id == id))
                            .cloned();
                        match user {
                            Some(user) => self.open_user(&user),
                            None => self.open(ViewLevel::UserProfile {
                                id,
                                name: format!("User #{}", id),
                            }),
                        }
                    }
                    None => {}
                }
            }
            ViewLevel::Console => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{FakeTransport, demo_api};
    use crate::cache::RetryPolicy;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let path = dir.path().to_string_lossy().to_string();
        Config::from_lookup(|name| match name {
            "PLACARD_DATA_DIR" => Some(path.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn app(dir: &TempDir, transport: FakeTransport) -> App<FakeTransport> {
        let config = config(dir);
        let prefs = Preferences::load(&config.data_dir).unwrap();
        let cache = QueryCache::new(transport, RetryPolicy::immediate(3));
        App::new(&config, cache, prefs, Handle::current())
    }

    fn press(app: &mut App<FakeTransport>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    /// Wait for one background result and apply it.
    async fn settle(app: &mut App<FakeTransport>) {
        let event = app.events_rx.recv().await.unwrap();
        app.apply_event(event);
    }

    #[tokio::test]
    async fn test_dashboard_loads_collections() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(100, 10));
        settle(&mut app).await;
        settle(&mut app).await;

        assert_eq!(app.recent_posts().len(), RECENT_POSTS);
        assert_eq!(app.recent_users().len(), RECENT_USERS);
        assert_eq!(app.cache.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_posts_scroll_and_stale_page_discarded() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(100, 10));
        app.switch_tab(Tab::Posts);
        app.posts.viewport_rows = 30;

        // Dashboard collections requested at startup, then the first page.
        app.load_visible_pages();
        for _ in 0..3 {
            settle(&mut app).await;
        }
        assert_eq!(app.posts.len(), 10);

        // A filter committed while page 2 is in flight discards it.
        app.load_visible_pages();
        let now = Instant::now();
        app.posts_search.set_raw("title 1", now);
        app.tick(now + Duration::from_secs(1));
        settle(&mut app).await;
        assert!(app.posts.is_empty());
        assert_eq!(app.posts.pages.filter(), "title 1");
    }

    #[tokio::test]
    async fn test_bookmark_key_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        app.nav.push(ViewLevel::UserProfile {
            id: 7,
            name: "User 7".into(),
        });

        press(&mut app, KeyCode::Char('b'));
        assert!(app.prefs.bookmarks.is_bookmarked(BookmarkKind::User, 7));
        press(&mut app, KeyCode::Char('b'));
        assert!(!app.prefs.bookmarks.is_bookmarked(BookmarkKind::User, 7));

        let reloaded = Preferences::load(dir.path()).unwrap();
        assert!(!reloaded.bookmarks.is_bookmarked(BookmarkKind::User, 7));
    }

    #[tokio::test]
    async fn test_open_post_loads_author() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        settle(&mut app).await;
        settle(&mut app).await;

        app.open_post(12);
        // Post and comments, then the author once the post is known.
        for _ in 0..3 {
            settle(&mut app).await;
        }
        assert_eq!(app.post_view.post.data().map(|p| p.id), Some(12));
        assert_eq!(app.post_view.comments.data().map(Vec::len), Some(3));
        assert_eq!(app.post_view.author.data().map(|u| u.id), Some(2));
    }

    #[tokio::test]
    async fn test_result_for_closed_post_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        app.post_view.id = Some(3);
        app.apply_event(AppEvent::Post {
            id: 4,
            result: QueryResult::ok(serde_json::from_value(crate::api::testing::post_json(4)).unwrap()),
        });
        assert!(app.post_view.post.data().is_none());
    }

    #[tokio::test]
    async fn test_delete_leaves_detail_view() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        app.switch_tab(Tab::Posts);
        app.open_post(5);

        app.finish_delete(5, Ok(()));
        assert_eq!(app.nav.current(), &ViewLevel::Posts);
        assert_eq!(app.post_view.id, None);
        assert_eq!(
            app.activity.latest().map(|n| n.message.as_str()),
            Some("Post #5 deleted")
        );
    }

    #[tokio::test]
    async fn test_invalid_form_not_submitted() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        settle(&mut app).await;
        settle(&mut app).await;
        let calls = app.cache.transport().calls();

        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Enter);

        match &app.modal {
            Some(Modal::Form(form)) => {
                assert!(!form.submitting);
                assert_eq!(form.errors.len(), 3);
            }
            other => panic!("expected form, got {:?}", other),
        }
        assert_eq!(app.cache.transport().calls(), calls);
    }

    #[tokio::test]
    async fn test_clear_search_resets_immediately() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        app.switch_tab(Tab::Users);
        let now = Instant::now();
        app.users_search.set_raw("user1", now);
        app.tick(now + Duration::from_secs(1));
        assert_eq!(app.users.pages.filter(), "user1");

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.users.pages.filter(), "");
        assert_eq!(app.users_search.raw(), "");
    }

    #[tokio::test]
    async fn test_render_fault_recovery_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(20, 10));
        app.render_fault = Some("index out of bounds".into());

        // Other keys are swallowed while the recovery panel is up.
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_tab, Tab::Dashboard);

        press(&mut app, KeyCode::Char('R'));
        assert!(app.render_fault.is_none());
        assert!(app.all_posts.loading);
    }

    #[tokio::test]
    async fn test_missed_cache_updates_warn() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, demo_api(10, 10));
        let post = Post {
            id: 1,
            user_id: 1,
            title: "title".into(),
            body: "body".into(),
        };
        for _ in 0..300 {
            app.cache.set_data(CacheKey::post_detail(1), &post).unwrap();
        }

        app.drain_events();

        let latest = app.activity.latest().unwrap();
        assert_eq!(latest.level, crate::state::NotificationLevel::Warn);
        assert!(latest.message.contains("press r"));
    }
}
