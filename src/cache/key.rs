// Cache keys.
// A key is the entity kind plus a canonical rendering of its parameters.

use std::fmt;
use std::time::Duration;

const POSTS_STALE_TIME: Duration = Duration::from_secs(5 * 60);
const USERS_STALE_TIME: Duration = Duration::from_secs(10 * 60);

/// Kind of cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// The full posts collection.
    PostList,
    /// One `_start/_limit` slice of the posts collection.
    PostPage,
    PostDetail,
    PostComments,
    /// Posts written by one user.
    UserPosts,
    UserList,
    UserDetail,
}

impl EntityKind {
    /// How long a fetched value is served without going back to the network.
    pub fn stale_time(&self) -> Duration {
        match self {
            EntityKind::PostList
            | EntityKind::PostPage
            | EntityKind::PostDetail
            | EntityKind::PostComments
            | EntityKind::UserPosts => POSTS_STALE_TIME,
            EntityKind::UserList | EntityKind::UserDetail => USERS_STALE_TIME,
        }
    }

    /// Kinds holding lists of posts; any post mutation invalidates them.
    pub fn is_post_list(&self) -> bool {
        matches!(
            self,
            EntityKind::PostList | EntityKind::PostPage | EntityKind::UserPosts
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::PostList => "post-list",
            EntityKind::PostPage => "post-page",
            EntityKind::PostDetail => "post-detail",
            EntityKind::PostComments => "post-comments",
            EntityKind::UserPosts => "user-posts",
            EntityKind::UserList => "user-list",
            EntityKind::UserDetail => "user-detail",
        }
    }
}

/// Deterministic identifier of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    params: String,
}

impl CacheKey {
    /// Build a key; parameter order does not matter.
    pub fn new(kind: EntityKind, params: &[(&str, String)]) -> Self {
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.sort();
        let params = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        Self { kind, params }
    }

    pub fn post_list() -> Self {
        Self::new(EntityKind::PostList, &[])
    }

    pub fn post_page(start: usize, limit: usize) -> Self {
        Self::new(
            EntityKind::PostPage,
            &[("start", start.to_string()), ("limit", limit.to_string())],
        )
    }

    pub fn post_detail(id: u64) -> Self {
        Self::new(EntityKind::PostDetail, &[("id", id.to_string())])
    }

    pub fn post_comments(post_id: u64) -> Self {
        Self::new(EntityKind::PostComments, &[("post", post_id.to_string())])
    }

    pub fn user_posts(user_id: u64) -> Self {
        Self::new(EntityKind::UserPosts, &[("user", user_id.to_string())])
    }

    pub fn user_list() -> Self {
        Self::new(EntityKind::UserList, &[])
    }

    pub fn user_detail(id: u64) -> Self {
        Self::new(EntityKind::UserDetail, &[("id", id.to_string())])
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind.name(), self.params)
    }
}
