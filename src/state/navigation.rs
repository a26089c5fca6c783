// Drill-down navigation.
// Each tab owns a stack of views; the breadcrumb trail is read off the stack.

/// One entry of the breadcrumb trail.
#[derive(Debug, Clone)]
pub struct BreadcrumbNode {
    /// Text shown in the trail.
    pub label: String,
}

/// A screen the user can be looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewLevel {
    /// Overview with counts and recent items
    Dashboard,
    /// Infinite-scroll post list
    Posts,
    /// A single post with its author and comments
    PostDetail { id: u64 },
    /// Paged user directory
    Users,
    /// A single user with their posts
    UserProfile { id: u64, name: String },
    /// Bookmarked posts and users
    Bookmarks,
    /// Activity log
    Console,
}

impl ViewLevel {
    /// Heading used for the view and in log lines.
    pub fn title(&self) -> String {
        match self {
            ViewLevel::Dashboard => "Dashboard".to_string(),
            ViewLevel::Posts => "Posts".to_string(),
            ViewLevel::PostDetail { id } => format!("Post #{}", id),
            ViewLevel::Users => "Users".to_string(),
            ViewLevel::UserProfile { name, .. } => format!("{} / Profile", name),
            ViewLevel::Bookmarks => "Bookmarks".to_string(),
            ViewLevel::Console => "Console".to_string(),
        }
    }

    pub fn to_breadcrumb(&self) -> BreadcrumbNode {
        let label = match self {
            ViewLevel::PostDetail { id } => format!("#{}", id),
            ViewLevel::UserProfile { name, .. } => name.clone(),
            other => other.title(),
        };
        BreadcrumbNode { label }
    }
}

/// Views opened within the active tab, root first.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    stack: Vec<ViewLevel>,
}

impl NavigationStack {
    pub fn new(root: ViewLevel) -> Self {
        Self { stack: vec![root] }
    }

    /// The view on top of the stack.
    pub fn current(&self) -> &ViewLevel {
        // The root is never popped.
        &self.stack[self.stack.len() - 1]
    }

    /// Push a new view level onto the stack (drill down).
    /// Re-opening the level already on top is a no-op.
    pub fn push(&mut self, level: ViewLevel) {
        if *self.current() != level {
            self.stack.push(level);
        }
    }

    /// Go back one view. The root is never popped; returns whether anything changed.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn breadcrumbs(&self) -> Vec<BreadcrumbNode> {
        self.stack
            .iter()
            .map(|level| level.to_breadcrumb())
            .collect()
    }

    /// Drop every level showing the given post, e.g. after it was deleted.
    pub fn forget_post(&mut self, post_id: u64) {
        let root = self.stack[0].clone();
        self.stack
            .retain(|level| *level != ViewLevel::PostDetail { id: post_id });
        if self.stack.is_empty() {
            self.stack.push(root);
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(ViewLevel::Dashboard)
    }
}
