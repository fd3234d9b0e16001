//! Action dispatcher.
//!
//! Every resource call goes through [`ActionDispatcher::dispatch`], which runs
//! the action against the session and retries it while the API answers
//! `429 Too Many Requests`.

use crate::action::ActionRequest;
use crate::error::{ClientError, ClientResult};
use crate::retry::{with_retry_if, RetryPolicy};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Runs schema actions with bounded retry on rate limiting.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    session: Arc<Session>,
    policy: RetryPolicy,
}

impl ActionDispatcher {
    /// Create a dispatcher using the retry policy of the session configuration.
    pub fn new(session: Arc<Session>) -> Self {
        let policy = session.config().retry;
        Self { session, policy }
    }

    /// Replace the dispatcher-level retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session the actions run against.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Dispatcher-level retry policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute an action, retrying while it is rate limited.
    ///
    /// The request's retry override wins over the dispatcher policy. A success
    /// returns at once; a rate-limited failure waits the retry delay and tries
    /// again until attempts run out, then returns that last error unchanged.
    /// Any other failure returns immediately.
    ///
    /// # Errors
    ///
    /// [`ClientError::Configuration`] if the effective attempt count is zero,
    /// without calling the API. Otherwise whatever the last attempt failed with.
    #[instrument(skip(self, request), fields(action = %request.keys.join("/")))]
    pub async fn dispatch(&self, request: ActionRequest) -> ClientResult<Value> {
        let policy = self.policy.merge(&request.retry);

        if policy.max_attempts == 0 {
            return Err(ClientError::Configuration(format!(
                "max_attempts must be at least 1 for action [{}]",
                request.keys.join("/")
            )));
        }

        let response = with_retry_if(
            &policy,
            || self.session.execute(&request),
            ClientError::is_rate_limited,
        )
        .await?;

        Ok(match &request.transform {
            Some(transform) => transform.apply(response),
            None => response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SchemaCache;
    use crate::config::SessionConfig;
    use crate::schema::ApiSchema;
    use crate::transport::SchemaClient;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers from a script, then repeats the last entry.
    struct ScriptedClient {
        script: Mutex<Vec<ClientResult<Value>>>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(script: Vec<ClientResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn replay(result: &ClientResult<Value>) -> ClientResult<Value> {
        match result {
            Ok(v) => Ok(v.clone()),
            Err(ClientError::Api {
                status,
                title,
                body,
            }) => Err(ClientError::Api {
                status: *status,
                title: title.clone(),
                body: body.clone(),
            }),
            Err(other) => Err(ClientError::InvalidResponse(other.to_string())),
        }
    }

    #[async_trait]
    impl SchemaClient for ScriptedClient {
        async fn fetch_schema(&self, domain: &str) -> ClientResult<ApiSchema> {
            ApiSchema::from_openapi(domain, json!({"swagger": "2.0", "paths": {}}))
        }

        async fn execute(&self, _schema: &ApiSchema, _request: &ActionRequest) -> ClientResult<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let script = self.script.lock().unwrap();
            replay(&script[n.min(script.len() - 1)])
        }
    }

    async fn dispatcher(client: Arc<ScriptedClient>) -> ActionDispatcher {
        let session = Session::builder()
            .config(SessionConfig::new("https://api.example.com", "token"))
            .cache(SchemaCache::new())
            .client(client)
            .connect()
            .await
            .unwrap();
        ActionDispatcher::new(Arc::new(session))
    }

    fn throttled(n: u32) -> ClientResult<Value> {
        Err(ClientError::api(429, format!("attempt {}", n)))
    }

    fn assert_elapsed(start: tokio::time::Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "expected ~{:?}, got {:?}",
            expected,
            elapsed
        );
    }

    #[tokio::test]
    async fn test_default_policy_is_twelve_by_five_seconds() {
        let client = ScriptedClient::new(vec![Ok(json!(null))]);
        let dispatcher = dispatcher(client).await;
        assert_eq!(dispatcher.policy(), RetryPolicy::default());
        assert_eq!(dispatcher.policy().max_attempts, 12);
        assert_eq!(dispatcher.policy().retry_delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_short_circuits() {
        let client = ScriptedClient::new(vec![Ok(json!({"id": 1}))]);
        let dispatcher = dispatcher(client.clone()).await;
        let start = tokio::time::Instant::now();

        let value = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_read"]))
            .await
            .unwrap();

        assert_eq!(value, json!({"id": 1}));
        assert_eq!(client.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_until_exhausted() {
        for n in 1..=4u32 {
            let client = ScriptedClient::new((1..=n).map(throttled).collect());
            let dispatcher = dispatcher(client.clone()).await;
            let start = tokio::time::Instant::now();

            let err = dispatcher
                .dispatch(
                    ActionRequest::new(&["users", "user_list"])
                        .with_max_attempts(n)
                        .with_retry_delay(Duration::from_secs(3)),
                )
                .await
                .unwrap_err();

            assert_eq!(client.calls(), n);
            assert_elapsed(start, Duration::from_secs(3) * (n - 1));
            match err {
                ClientError::Api { status, body, .. } => {
                    assert_eq!(status, 429);
                    assert_eq!(body, format!("attempt {}", n));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_throttling() {
        let client = ScriptedClient::new(vec![throttled(1), throttled(2), Ok(json!([]))]);
        let dispatcher = dispatcher(client.clone()).await;
        let start = tokio::time::Instant::now();

        let value = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]))
            .await
            .unwrap();

        assert_eq!(value, json!([]));
        assert_eq!(client.calls(), 3);
        assert_elapsed(start, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_fail_fast() {
        let client = ScriptedClient::new(vec![Err(ClientError::api(500, "boom"))]);
        let dispatcher = dispatcher(client.clone()).await;
        let start = tokio::time::Instant::now();

        let err = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]).with_max_attempts(7))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(client.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_attempts_never_calls() {
        let client = ScriptedClient::new(vec![Ok(json!(null))]);
        let dispatcher = dispatcher(client.clone()).await;

        let err = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]).with_max_attempts(0))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Configuration(_)));
        assert_eq!(client.calls(), 0);

        let dispatcher = dispatcher.with_policy(RetryPolicy {
            max_attempts: 0,
            retry_delay: Duration::ZERO,
        });
        let err = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatcher_policy_used_when_call_does_not_override() {
        let client = ScriptedClient::new(vec![throttled(1)]);
        let dispatcher = dispatcher(client.clone()).await.with_policy(RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        });
        let start = tokio::time::Instant::now();

        dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]))
            .await
            .unwrap_err();

        assert_eq!(client.calls(), 3);
        assert_elapsed(start, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_policy_makes_one_attempt() {
        let client = ScriptedClient::new(vec![throttled(1)]);
        let dispatcher = dispatcher(client.clone())
            .await
            .with_policy(RetryPolicy::no_retry());

        let err = dispatcher
            .dispatch(ActionRequest::new(&["users", "user_list"]))
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_transform_applied_on_success() {
        let client = ScriptedClient::new(vec![Ok(json!({"count": 1, "results": [{"id": 1}]}))]);
        let dispatcher = dispatcher(client).await;

        let value = dispatcher
            .dispatch(
                ActionRequest::new(&["users", "user_list"])
                    .with_transform(|v| v["results"].clone()),
            )
            .await
            .unwrap();

        assert_eq!(value, json!([{"id": 1}]));
    }
}
