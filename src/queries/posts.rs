// Post queries and mutations.

use crate::api::{ApiRequest, Comment, NewPost, Post, Transport};
use crate::cache::{CacheKey, QueryCache, QueryResult};
use crate::error::FetchError;
use crate::state::Page;

use super::contains_ignore_case;

/// Posts per infinite-scroll page.
pub const POSTS_PAGE_SIZE: usize = 10;

/// Whether a post matches a search filter (title or body, case-insensitive).
pub fn matches_filter(post: &Post, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    contains_ignore_case(&post.title, &needle) || contains_ignore_case(&post.body, &needle)
}

/// Fetch one page of posts for infinite scroll.
///
/// Pages are cached by their raw slice so every filter shares them; the
/// filter is applied to the slice afterwards.
pub async fn fetch_posts_page<T: Transport>(
    cache: &QueryCache<T>,
    page: u32,
    filter: &str,
) -> Result<Page<Post>, FetchError> {
    let start = page.saturating_sub(1) as usize * POSTS_PAGE_SIZE;
    let request = ApiRequest::get("/posts")
        .param("_start", start)
        .param("_limit", POSTS_PAGE_SIZE);
    let response = cache
        .fetch_response(CacheKey::post_page(start, POSTS_PAGE_SIZE), request)
        .await?;

    let total = response.total_count;
    let posts: Vec<Post> = serde_json::from_value(response.body)?;
    let fetched = posts.len();
    let has_more = fetched >= POSTS_PAGE_SIZE
        && total.is_none_or(|total| ((start + fetched) as u64) < total);

    let items = posts
        .into_iter()
        .filter(|post| matches_filter(post, filter))
        .collect();
    Ok(Page { items, has_more })
}

/// The full posts collection.
pub async fn fetch_posts<T: Transport>(cache: &QueryCache<T>) -> QueryResult<Vec<Post>> {
    cache
        .query(CacheKey::post_list(), ApiRequest::get("/posts"))
        .await
}

pub async fn fetch_post<T: Transport>(cache: &QueryCache<T>, id: u64) -> QueryResult<Post> {
    cache
        .query(CacheKey::post_detail(id), ApiRequest::get(format!("/posts/{}", id)))
        .await
}

pub async fn fetch_post_comments<T: Transport>(
    cache: &QueryCache<T>,
    post_id: u64,
) -> QueryResult<Vec<Comment>> {
    cache
        .query(
            CacheKey::post_comments(post_id),
            ApiRequest::get(format!("/posts/{}/comments", post_id)),
        )
        .await
}

pub async fn fetch_user_posts<T: Transport>(
    cache: &QueryCache<T>,
    user_id: u64,
) -> QueryResult<Vec<Post>> {
    cache
        .query(
            CacheKey::user_posts(user_id),
            ApiRequest::get(format!("/users/{}/posts", user_id)),
        )
        .await
}

/// Create a post; every post list is invalidated afterwards.
pub async fn create_post<T: Transport>(
    cache: &QueryCache<T>,
    post: &NewPost,
) -> Result<Post, FetchError> {
    let response = cache
        .mutate(ApiRequest::post("/posts", serde_json::to_value(post)?))
        .await?;
    let created: Post = serde_json::from_value(response.body)?;
    cache.invalidate(|key| key.kind.is_post_list());
    tracing::info!(id = created.id, "post created");
    Ok(created)
}

/// Replace a post. The detail entry is written from the response so reading it
/// back costs no round trip.
pub async fn update_post<T: Transport>(
    cache: &QueryCache<T>,
    id: u64,
    post: &NewPost,
) -> Result<Post, FetchError> {
    let mut body = serde_json::to_value(post)?;
    body["id"] = id.into();
    let response = cache
        .mutate(ApiRequest::put(format!("/posts/{}", id), body))
        .await?;
    let updated: Post = serde_json::from_value(response.body)?;
    cache.set_data(CacheKey::post_detail(id), &updated)?;
    cache.invalidate(|key| key.kind.is_post_list());
    tracing::info!(id, "post updated");
    Ok(updated)
}

/// Delete a post and forget its detail entry.
pub async fn delete_post<T: Transport>(cache: &QueryCache<T>, id: u64) -> Result<(), FetchError> {
    cache
        .mutate(ApiRequest::delete(format!("/posts/{}", id)))
        .await?;
    cache.remove(&CacheKey::post_detail(id));
    cache.remove(&CacheKey::post_comments(id));
    cache.invalidate(|key| key.kind.is_post_list());
    tracing::info!(id, "post deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::demo_api;
    use crate::cache::RetryPolicy;
    use crate::state::pagination::PageAccumulator;

    fn cache(posts: u64) -> QueryCache<crate::api::testing::FakeTransport> {
        QueryCache::new(demo_api(posts, 10), RetryPolicy::never())
    }

    #[tokio::test]
    async fn test_scroll_through_hundred_posts() {
        let cache = cache(100);
        let mut acc = PageAccumulator::new();
        acc.reset("");

        let request = acc.begin_next().unwrap();
        let page = fetch_posts_page(&cache, request.page, acc.filter()).await.unwrap();
        acc.complete(request, page);
        assert_eq!(acc.len(), 10);
        assert!(acc.has_more());

        for _ in 0..9 {
            let request = acc.begin_next().unwrap();
            let page = fetch_posts_page(&cache, request.page, acc.filter()).await.unwrap();
            assert!(acc.complete(request, page));
        }

        assert_eq!(acc.len(), 100);
        assert!(!acc.has_more());
        assert!(acc.begin_next().is_none());
        assert_eq!(cache.transport().calls(), 10);
    }

    #[tokio::test]
    async fn test_short_last_page() {
        let cache = cache(25);
        let page = fetch_posts_page(&cache, 3, "").await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_filter_applied_to_shared_page() {
        let cache = cache(100);
        let all = fetch_posts_page(&cache, 1, "").await.unwrap();
        let filtered = fetch_posts_page(&cache, 1, "TITLE 7").await.unwrap();

        assert_eq!(all.items.len(), 10);
        assert_eq!(filtered.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![7]);
        assert!(filtered.has_more);
        assert_eq!(cache.transport().calls(), 1);
    }

    /// Load every post-list kind once.
    async fn load_lists(cache: &QueryCache<crate::api::testing::FakeTransport>) {
        fetch_posts(cache).await;
        fetch_posts_page(cache, 1, "").await.unwrap();
        fetch_user_posts(cache, 1).await;
    }

    #[tokio::test]
    async fn test_update_writes_detail_cache() {
        let cache = cache(100);
        let edit = NewPost {
            user_id: 1,
            title: "updated title".into(),
            body: "updated body with enough characters".into(),
        };

        let updated = update_post(&cache, 3, &edit).await.unwrap();
        assert_eq!(updated.id, 3);
        assert_eq!(cache.transport().calls(), 1);

        let detail = fetch_post(&cache, 3).await;
        assert_eq!(detail.data.unwrap().title, "updated title");
        assert_eq!(cache.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_lists() {
        let cache = cache(100);
        load_lists(&cache).await;
        load_lists(&cache).await;
        assert_eq!(cache.transport().calls(), 3);

        let edit = NewPost {
            user_id: 1,
            title: "updated title".into(),
            body: "updated body with enough characters".into(),
        };
        update_post(&cache, 3, &edit).await.unwrap();
        assert_eq!(cache.transport().calls(), 4);

        load_lists(&cache).await;
        assert_eq!(cache.transport().calls(), 7);
    }

    #[tokio::test]
    async fn test_delete_invalidates_lists() {
        let cache = cache(100);
        load_lists(&cache).await;
        assert_eq!(cache.transport().calls(), 3);

        delete_post(&cache, 5).await.unwrap();
        assert_eq!(cache.transport().calls(), 4);

        load_lists(&cache).await;
        assert_eq!(cache.transport().calls(), 7);
    }

    #[tokio::test]
    async fn test_create_invalidates_lists() {
        let cache = cache(100);
        fetch_posts(&cache).await;
        fetch_posts_page(&cache, 1, "").await.unwrap();
        fetch_user_posts(&cache, 1).await;
        assert_eq!(cache.transport().calls(), 3);

        let created = create_post(
            &cache,
            &NewPost {
                user_id: 1,
                title: "brand new".into(),
                body: "a body that is long enough".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.id, 101);

        fetch_posts(&cache).await;
        fetch_posts_page(&cache, 1, "").await.unwrap();
        fetch_user_posts(&cache, 1).await;
        assert_eq!(cache.transport().calls(), 7);
    }

    #[tokio::test]
    async fn test_delete_removes_detail() {
        let cache = cache(100);
        fetch_post(&cache, 4).await;
        assert!(cache.peek::<Post>(&CacheKey::post_detail(4)).is_some());

        delete_post(&cache, 4).await.unwrap();
        assert!(cache.peek::<Post>(&CacheKey::post_detail(4)).is_none());
    }

    #[tokio::test]
    async fn test_comments_for_post() {
        let cache = cache(100);
        let comments = fetch_post_comments(&cache, 2).await.data.unwrap();
        assert_eq!(comments.len(), 3);
        assert!(comments.iter().all(|c| c.post_id == 2));
    }

    #[test]
    fn test_matches_filter() {
        let post = Post {
            id: 1,
            user_id: 1,
            title: "Sunt aut facere".into(),
            body: "quia et suscipit".into(),
        };
        assert!(matches_filter(&post, ""));
        assert!(matches_filter(&post, "FACERE"));
        assert!(matches_filter(&post, "suscipit"));
        assert!(!matches_filter(&post, "dolorem"));
    }
}
