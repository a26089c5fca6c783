// In-memory transport for tests.
// Answers requests from a scripted handler and counts calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use crate::error::FetchError;

use super::client::{ApiRequest, ApiResponse, Method, Transport};

type Handler =
    Box<dyn Fn(&ApiRequest, usize) -> Result<ApiResponse, FetchError> + Send + Sync + 'static>;

/// Fake transport. The handler receives the request and the zero-based call index.
pub struct FakeTransport {
    handler: Handler,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest, usize) -> Result<ApiResponse, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold every response until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        (self.handler)(&request, index)
    }
}

pub fn post_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "userId": (id - 1) / 10 + 1,
        "title": format!("post title {}", id),
        "body": format!("post body {}", id),
    })
}

pub fn user_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("User {}", id),
        "username": format!("user{}", id),
        "email": format!("user{}@example.test", id),
        "address": {
            "street": "Main St",
            "suite": "Apt. 1",
            "city": "Springfield",
            "zipcode": "00000",
            "geo": { "lat": "0.0", "lng": "0.0" }
        },
        "phone": "555-0100",
        "website": "example.test",
        "company": { "name": format!("Company {}", id), "catchPhrase": "", "bs": "" }
    })
}

/// Serves `posts` posts and `users` users with `_start/_limit` slicing and totals,
/// echoing writes the way the demo API does.
pub fn demo_api(posts: u64, users: u64) -> FakeTransport {
    FakeTransport::new(move |request, _| {
        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["posts"]) => {
                let start: u64 = request
                    .query_value("_start")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let limit: u64 = request
                    .query_value("_limit")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(posts);
                let end = (start + limit).min(posts);
                let items: Vec<_> = (start + 1..=end).map(post_json).collect();
                Ok(ApiResponse::with_total(json!(items), posts))
            }
            (Method::Get, ["posts", id]) => {
                let id: u64 = id.parse().unwrap_or(0);
                if id == 0 || id > posts {
                    Err(FetchError::from_status(404, "{}"))
                } else {
                    Ok(ApiResponse::new(post_json(id)))
                }
            }
            (Method::Get, ["posts", id, "comments"]) => {
                let post_id: u64 = id.parse().unwrap_or(0);
                let comments: Vec<_> = (1..=3)
                    .map(|n| {
                        json!({
                            "id": (post_id - 1) * 3 + n,
                            "postId": post_id,
                            "name": format!("comment {}", n),
                            "email": "c@example.test",
                            "body": "nice",
                        })
                    })
                    .collect();
                Ok(ApiResponse::new(json!(comments)))
            }
            (Method::Get, ["users"]) => {
                let items: Vec<_> = (1..=users).map(user_json).collect();
                Ok(ApiResponse::new(json!(items)))
            }
            (Method::Get, ["users", id]) => {
                let id: u64 = id.parse().unwrap_or(0);
                Ok(ApiResponse::new(user_json(id)))
            }
            (Method::Get, ["users", id, "posts"]) => {
                let user_id: u64 = id.parse().unwrap_or(0);
                let items: Vec<_> = (1..=posts)
                    .map(post_json)
                    .filter(|p| p["userId"] == user_id)
                    .collect();
                Ok(ApiResponse::new(json!(items)))
            }
            (Method::Post, ["posts"]) => {
                let mut body = request.body.clone().unwrap_or_default();
                body["id"] = json!(posts + 1);
                Ok(ApiResponse::new(body))
            }
            (Method::Put, ["posts", _]) => Ok(ApiResponse::new(
                request.body.clone().unwrap_or_default(),
            )),
            (Method::Delete, ["posts", _]) => Ok(ApiResponse::new(json!({}))),
            _ => Err(FetchError::from_status(404, "{}")),
        }
    })
}
