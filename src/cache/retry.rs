// Retry policy for reads.
// Consulted by the fetch layer; executed with tokio-retry.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::error::FetchError;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(4);

/// How often and how patiently a failed read is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: usize,
    /// Delay before the first retry; doubles afterwards.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Policy that makes a single attempt.
    pub fn never() -> Self {
        Self::immediate(1)
    }

    /// Delays between consecutive attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // from_millis(2) yields 2, 4, 8, ... so half the base delay as factor gives base, 2*base, ...
        let factor = (self.base_delay.as_millis() as u64) / 2;
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .take(self.max_attempts.saturating_sub(1))
    }

    /// Whether this error deserves another attempt.
    pub fn should_retry(&self, error: &FetchError) -> bool {
        error.is_retryable()
    }

    /// Run `action` under this policy.
    pub async fn run<R, F, Fut>(&self, mut action: F) -> Result<R, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, FetchError>>,
    {
        let attempts = AtomicUsize::new(0);
        RetryIf::start(
            self.delays(),
            || {
                attempts.fetch_add(1, Ordering::Relaxed);
                action()
            },
            |err: &FetchError| {
                let attempt = attempts.load(Ordering::Relaxed);
                let retry = self.should_retry(err) && attempt < self.max_attempts;
                if retry {
                    tracing::warn!(attempt, error = %err, "request failed, retrying");
                }
                retry
            },
        )
        .await
    }

    /// Send a request through `transport` under this policy.
    pub async fn send<T: Transport>(
        &self,
        transport: Arc<T>,
        request: ApiRequest,
    ) -> Result<ApiResponse, FetchError> {
        self.run(|| {
            let transport = transport.clone();
            let request = request.clone();
            async move { transport.send(request).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;

    #[test]
    fn test_default_delays_increase() {
        let delays: Vec<Duration> = RetryPolicy::default().delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
    }

    #[test]
    fn test_delays_capped() {
        let policy = RetryPolicy {
            max_attempts: 6,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        };
        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(delays.len(), 5);
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_transient_failures_exhaust_attempts() {
        let transport = Arc::new(FakeTransport::new(|_, _| {
            Err(FetchError::from_status(500, "boom"))
        }));
        let result = RetryPolicy::immediate(3)
            .send(transport.clone(), ApiRequest::get("/posts/5"))
            .await;

        assert!(matches!(result, Err(FetchError::Server { status: 500, .. })));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let transport = Arc::new(FakeTransport::new(|_, _| {
            Err(FetchError::from_status(404, "missing"))
        }));
        let result = RetryPolicy::immediate(3)
            .send(transport.clone(), ApiRequest::get("/posts/999"))
            .await;

        assert!(matches!(result, Err(FetchError::Client { status: 404, .. })));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_timeout_retried_then_succeeds() {
        let transport = Arc::new(FakeTransport::new(|_, call| {
            if call < 2 {
                Err(FetchError::ClientTimeout)
            } else {
                Ok(ApiResponse::new(serde_json::json!([])))
            }
        }));
        let result = RetryPolicy::immediate(3)
            .send(transport.clone(), ApiRequest::get("/users"))
            .await;

        assert!(result.is_ok());
        assert_eq!(transport.calls(), 3);
    }
}
