//! Streaming client with retry orchestration.
//!
//! The [`Client`] type is the entry point. [`Client::streaming_predict`]
//! drives the whole pipeline: one transport attempt at a time, a bounded
//! retry loop around the retry-eligible failures, and translation of every
//! terminal outcome into a [`ResponseEnvelope`] so callers never handle an
//! error mid-stream.

use async_stream::stream;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::envelope::ResponseEnvelope;
use crate::error::{Error, Result};
use crate::request::PredictRequest;
use crate::retry::RetryPolicy;
use crate::transport;

/// A streaming predict client.
///
/// The client is cheap to clone and designed to be reused across calls; it
/// holds a pooled HTTP client and the default [`RetryPolicy`]. Each call
/// owns its own connection and retry state, so concurrent calls proceed
/// independently.
///
/// # Examples
///
/// ```no_run
/// use everstream::{Client, PredictRequest};
/// use futures_util::StreamExt;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), everstream::Error> {
/// let client = Client::builder().build()?;
///
/// let request = PredictRequest::new(json!({"prompt": "hello"}));
/// let mut stream = client.streaming_predict("http://model.internal/stream", request);
///
/// while let Some(envelope) = stream.next().await {
///     if let Some(result) = envelope.result() {
///         println!("chunk: {result}");
///     } else {
///         eprintln!("call failed: {:?}", envelope.traceback());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Issues a streaming predict call against a resolved target URL.
    ///
    /// Returns a lazy stream of envelopes: every decoded chunk of the one
    /// attempt that succeeds arrives as `SUCCESS`; any terminal failure
    /// (non-retryable status, exhausted retries, undecodable fragment, bad
    /// target URL) arrives as a single trailing `FAILURE`. The stream never
    /// yields an error and this method never fails.
    ///
    /// Dropping the stream cancels the in-flight request.
    pub fn streaming_predict(
        &self,
        target: impl Into<String>,
        request: PredictRequest,
    ) -> BoxStream<'static, ResponseEnvelope> {
        let inner = self.inner.clone();
        let target = target.into();

        Box::pin(stream! {
            let url = match Url::parse(&target) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(target = %target, error = %e, "unusable target URL");
                    yield ResponseEnvelope::from_error(&Error::InvalidUrl(e));
                    return;
                }
            };

            let policy = inner
                .policy
                .with_overrides(request.timeout_seconds, request.num_retries);

            let mut fragments =
                run_with_retries(inner.http.clone(), url, request.payload, policy);
            while let Some(item) = fragments.next().await {
                match item {
                    Ok(result) => yield ResponseEnvelope::success(result),
                    Err(err) => {
                        tracing::error!(error = %err, "streaming predict failed");
                        yield ResponseEnvelope::from_error(&err);
                        return;
                    }
                }
            }
        })
    }
}

/// Wraps the single-attempt transport in the bounded retry loop.
///
/// Fragments are decoded and yielded as they arrive, so the orchestrator
/// alone controls emission timing: a retry can only happen on an attempt
/// that was classified before its fragment stream existed, never after
/// output has been handed downstream.
fn run_with_retries(
    http: reqwest::Client,
    url: Url,
    payload: Value,
    policy: RetryPolicy,
) -> BoxStream<'static, Result<Value>> {
    Box::pin(stream! {
        let started = Instant::now();
        let mut attempt: u32 = 1;

        let terminal = loop {
            tracing::debug!(attempt, "starting streaming attempt");
            match transport::attempt(&http, &url, &payload).await {
                Ok(mut fragments) => {
                    while let Some(fragment) = fragments.next().await {
                        match fragment {
                            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                                Ok(value) => yield Ok(value),
                                Err(e) => {
                                    yield Err(Error::Decode { fragment: raw, source: e });
                                    return;
                                }
                            },
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                    // Server closed the stream normally.
                    return;
                }
                Err(err) if err.is_retryable() => {
                    if policy.should_stop(attempt, started.elapsed()) {
                        break exhausted(err);
                    }
                    let wait = policy.wait_before(attempt);
                    tracing::info!(
                        attempt,
                        delay_ms = wait.as_millis() as u64,
                        error = %err,
                        "transient upstream failure, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => break err,
            }
        };

        yield Err(terminal);
    })
}

/// Maps the last retry-eligible failure into the terminal error callers
/// see once the policy gives up.
fn exhausted(last: Error) -> Error {
    match last {
        Error::Overloaded => {
            tracing::warn!("retries exhausted on 429, reporting overload to caller");
            Error::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: b"Too many concurrent requests".to_vec(),
            }
        }
        Error::NoHealthyBackend => {
            tracing::warn!("retries exhausted on 503, reporting no healthy upstream");
            Error::Upstream {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: b"No healthy upstream".to_vec(),
            }
        }
        other => {
            // Only retry-eligible failures can reach the exhaustion path.
            debug_assert!(false, "non-retryable failure in exhaustion path: {other}");
            Error::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: b"Unknown error".to_vec(),
            }
        }
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use everstream::{ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), everstream::Error> {
/// let client = ClientBuilder::new()
///     .retry_policy(RetryPolicy {
///         max_retries: 3,
///         timeout: Duration::from_secs(5),
///         ..RetryPolicy::default()
///     })
///     .io_timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    policy: RetryPolicy,
    io_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with the stock retry policy.
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            io_timeout: None,
        }
    }

    /// Sets the default retry policy for calls made through this client.
    ///
    /// Individual requests can still override the retry count and time
    /// budget via [`PredictRequest`].
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets a per-read I/O timeout on the underlying HTTP client.
    ///
    /// This bounds an attempt that hangs without erroring, which the
    /// orchestrator's wall-clock budget alone cannot do (that budget is
    /// only checked between attempts). Off by default.
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.io_timeout {
            builder = builder.read_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                policy: self.policy,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
