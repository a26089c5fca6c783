// Read-through query cache.
// Serves fresh entries from memory, collapses duplicate requests and
// applies the retry policy to everything that reaches the network.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::error::FetchError;

use super::key::CacheKey;
use super::retry::RetryPolicy;
use super::store::CachedData;

type SharedFetch = Shared<BoxFuture<'static, Result<ApiResponse, FetchError>>>;

const EVENT_CAPACITY: usize = 256;

/// Notification sent to subscribers when an entry changes.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    Updated(CacheKey),
    Invalidated(CacheKey),
    Removed(CacheKey),
    Failed { key: CacheKey, error: FetchError },
}

/// Outcome of a query: the freshest value available and the failure, if any.
///
/// Both may be set at once when a refetch failed but an older value is still cached.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<V> {
    pub data: Option<V>,
    pub error: Option<FetchError>,
}

impl<V> QueryResult<V> {
    pub fn ok(data: V) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Failed, but stale data is still there to show.
    pub fn is_degraded(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}

/// A request currently on the wire, tagged with the key generation it was sent under.
struct InFlight {
    generation: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedData<ApiResponse>>,
    in_flight: HashMap<CacheKey, InFlight>,
    /// Bumped whenever a key is invalidated, overwritten or removed.
    generations: HashMap<CacheKey, u64>,
}

impl CacheState {
    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: &CacheKey) -> u64 {
        let generation = self.generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }
}

enum Lookup {
    Fresh(ApiResponse),
    Pending(SharedFetch),
}

/// Cache-keyed fetch layer over a [`Transport`].
pub struct QueryCache<T> {
    transport: Arc<T>,
    policy: RetryPolicy,
    state: Arc<Mutex<CacheState>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            policy: self.policy.clone(),
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport> QueryCache<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport: Arc::new(transport),
            policy,
            state: Arc::new(Mutex::new(CacheState::default())),
            events,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Receive a [`CacheEvent`] for every change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Fetch and decode the value for `key`.
    pub async fn fetch<V: DeserializeOwned>(
        &self,
        key: CacheKey,
        request: ApiRequest,
    ) -> Result<V, FetchError> {
        let response = self.fetch_response(key, request).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Fetch the raw response for `key`, hitting the network only when the entry is stale.
    pub async fn fetch_response(
        &self,
        key: CacheKey,
        request: ApiRequest,
    ) -> Result<ApiResponse, FetchError> {
        match self.lookup(&key, request) {
            Lookup::Fresh(response) => Ok(response),
            Lookup::Pending(future) => future.await,
        }
    }

    /// Like [`fetch`](Self::fetch), but falls back to the last cached value on failure.
    pub async fn query<V: DeserializeOwned>(
        &self,
        key: CacheKey,
        request: ApiRequest,
    ) -> QueryResult<V> {
        match self.fetch::<V>(key.clone(), request).await {
            Ok(data) => QueryResult::ok(data),
            Err(error) => QueryResult {
                data: self.peek(&key),
                error: Some(error),
            },
        }
    }

    /// Last cached value for `key`, fresh or not.
    pub fn peek<V: DeserializeOwned>(&self, key: &CacheKey) -> Option<V> {
        let state = lock(&self.state);
        state
            .entries
            .get(key)
            .and_then(|entry| serde_json::from_value(entry.data.body.clone()).ok())
    }

    #[cfg(test)]
    pub fn is_fetching(&self, key: &CacheKey) -> bool {
        lock(&self.state).in_flight.contains_key(key)
    }

    /// Write a value directly, superseding any request in flight for the key.
    pub fn set_data<V: Serialize>(&self, key: CacheKey, value: &V) -> Result<(), FetchError> {
        let body = serde_json::to_value(value)?;
        {
            let mut state = lock(&self.state);
            state.bump(&key);
            state.in_flight.remove(&key);
            state
                .entries
                .insert(key.clone(), CachedData::new(ApiResponse::new(body)));
        }
        tracing::debug!(%key, "cache entry written directly");
        let _ = self.events.send(CacheEvent::Updated(key));
        Ok(())
    }

    /// Mark every matching entry stale and orphan matching requests in flight.
    /// Returns the number of keys affected.
    pub fn invalidate(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let keys: Vec<CacheKey> = {
            let mut state = lock(&self.state);
            let keys: HashSet<CacheKey> = state
                .entries
                .keys()
                .chain(state.in_flight.keys())
                .filter(|key| predicate(key))
                .cloned()
                .collect();
            for key in &keys {
                state.bump(key);
                state.in_flight.remove(key);
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.invalidate();
                }
            }
            keys.into_iter().collect()
        };

        for key in &keys {
            tracing::debug!(%key, "cache entry invalidated");
            let _ = self.events.send(CacheEvent::Invalidated(key.clone()));
        }
        keys.len()
    }

    pub fn invalidate_key(&self, key: &CacheKey) -> usize {
        self.invalidate(|candidate| candidate == key)
    }

    /// Drop the entry for `key` entirely.
    pub fn remove(&self, key: &CacheKey) {
        {
            let mut state = lock(&self.state);
            state.bump(key);
            state.in_flight.remove(key);
            state.entries.remove(key);
        }
        let _ = self.events.send(CacheEvent::Removed(key.clone()));
    }

    /// Forget everything.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        let pending: Vec<CacheKey> = state.in_flight.keys().cloned().collect();
        for key in &pending {
            state.bump(key);
        }
        state.in_flight.clear();
        state.entries.clear();
        tracing::info!("query cache cleared");
    }

    /// Send a write request. Writes bypass the cache and are never retried.
    pub async fn mutate(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        let result = self.transport.send(request.clone()).await;
        if let Err(err) = &result {
            tracing::warn!(method = ?request.method, path = %request.path, error = %err, "mutation failed");
        }
        result
    }

    fn lookup(&self, key: &CacheKey, request: ApiRequest) -> Lookup {
        let mut state = lock(&self.state);

        if let Some(entry) = state.entries.get(key) {
            if entry.is_valid(key.kind.stale_time()) {
                tracing::trace!(%key, "cache hit");
                return Lookup::Fresh(entry.data.clone());
            }
        }

        if let Some(flight) = state.in_flight.get(key) {
            tracing::trace!(%key, "joining request in flight");
            return Lookup::Pending(flight.future.clone());
        }

        let generation = state.generation(key);
        let future = self.start_fetch(key.clone(), generation, request);
        state.in_flight.insert(
            key.clone(),
            InFlight {
                generation,
                future: future.clone(),
            },
        );
        Lookup::Pending(future)
    }

    fn start_fetch(&self, key: CacheKey, generation: u64, request: ApiRequest) -> SharedFetch {
        let transport = self.transport.clone();
        let policy = self.policy.clone();
        let state = self.state.clone();
        let events = self.events.clone();

        tracing::debug!(%key, "fetching");
        async move {
            let result = policy.send(transport, request).await;
            complete(&state, &events, &key, generation, &result);
            result
        }
        .boxed()
        .shared()
    }
}

/// Record the outcome of a request sent under `generation`.
fn complete(
    state: &Mutex<CacheState>,
    events: &broadcast::Sender<CacheEvent>,
    key: &CacheKey,
    generation: u64,
    result: &Result<ApiResponse, FetchError>,
) {
    let event = {
        let mut state = lock(state);
        if state
            .in_flight
            .get(key)
            .is_some_and(|flight| flight.generation == generation)
        {
            state.in_flight.remove(key);
        }

        let current = generation == state.generation(key);
        match result {
            Ok(response) if current => {
                state
                    .entries
                    .insert(key.clone(), CachedData::new(response.clone()));
                Some(CacheEvent::Updated(key.clone()))
            }
            Ok(_) => {
                tracing::debug!(%key, "discarding superseded response");
                None
            }
            Err(error) => {
                tracing::warn!(%key, %error, "fetch failed");
                current.then(|| CacheEvent::Failed {
                    key: key.clone(),
                    error: error.clone(),
                })
            }
        }
    };

    if let Some(event) = event {
        let _ = events.send(event);
    }
}

#[cfg(test)]
impl<T: Transport> QueryCache<T> {
    /// Pretend the entry for `key` was stored `secs` seconds ago.
    pub fn backdate(&self, key: &CacheKey, secs: i64) {
        if let Some(entry) = lock(&self.state).entries.get_mut(key) {
            entry.cached_at = chrono::Utc::now() - chrono::Duration::seconds(secs);
        }
    }
}
