// User queries.
// The remote has no paging for users, so pages are sliced from the cached full list.

use crate::api::{ApiRequest, Transport, User};
use crate::cache::{CacheKey, QueryCache, QueryResult};
use crate::error::FetchError;
use crate::state::Page;

use super::contains_ignore_case;

/// Users per page.
pub const USERS_PAGE_SIZE: usize = 8;

/// Whether a user matches a search filter (name, handle, email or company).
pub fn matches_filter(user: &User, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    contains_ignore_case(&user.name, &needle)
        || contains_ignore_case(&user.username, &needle)
        || contains_ignore_case(&user.email, &needle)
        || contains_ignore_case(&user.company.name, &needle)
}

pub async fn fetch_users<T: Transport>(cache: &QueryCache<T>) -> QueryResult<Vec<User>> {
    cache
        .query(CacheKey::user_list(), ApiRequest::get("/users"))
        .await
}

pub async fn fetch_user<T: Transport>(cache: &QueryCache<T>, id: u64) -> QueryResult<User> {
    cache
        .query(CacheKey::user_detail(id), ApiRequest::get(format!("/users/{}", id)))
        .await
}

/// One page of users matching `filter`, cut from the full collection.
pub async fn fetch_users_page<T: Transport>(
    cache: &QueryCache<T>,
    page: u32,
    filter: &str,
) -> Result<Page<User>, FetchError> {
    let users: Vec<User> = cache
        .fetch(CacheKey::user_list(), ApiRequest::get("/users"))
        .await?;
    Ok(slice_page(users, page, filter))
}

fn slice_page(users: Vec<User>, page: u32, filter: &str) -> Page<User> {
    let start = page.saturating_sub(1) as usize * USERS_PAGE_SIZE;
    let matching: Vec<User> = users
        .into_iter()
        .filter(|user| matches_filter(user, filter))
        .collect();
    let has_more = start + USERS_PAGE_SIZE < matching.len();
    let items = matching
        .into_iter()
        .skip(start)
        .take(USERS_PAGE_SIZE)
        .collect();
    Page { items, has_more }
}
