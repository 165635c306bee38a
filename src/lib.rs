//! # Everstream - a resilient SSE streaming client
//!
//! Everstream issues long-lived streaming POST requests to inference
//! endpoints, consumes the server-sent-event response, and wraps the whole
//! exchange in a bounded retry policy. Overload signals (429) and missing
//! backends (503) are retried with exponential backoff; everything else is
//! terminal. Callers always receive a lazy stream of
//! [`ResponseEnvelope`] values and never an error, which makes forwarding
//! the stream to an external client trivial regardless of outcome.
//!
//! ## Quick Start
//!
//! ```no_run
//! use everstream::{Client, PredictRequest};
//! use futures_util::StreamExt;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), everstream::Error> {
//!     let client = Client::builder().build()?;
//!
//!     let request = PredictRequest::new(json!({
//!         "prompt": "Why do streams need retries?",
//!     }));
//!
//!     let mut stream = client.streaming_predict("http://model.internal/stream", request);
//!     while let Some(envelope) = stream.next().await {
//!         match envelope.result() {
//!             Some(chunk) => println!("chunk: {chunk}"),
//!             None => eprintln!("failed: {:?}", envelope.traceback()),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Never throws mid-stream** - every outcome, including exhausted
//!   retries and undecodable fragments, arrives as a `FAILURE` envelope
//! - **Retry-safe by construction** - attempts are only retried when they
//!   failed before producing a single fragment, so output is never
//!   duplicated or torn
//! - **Bounded retries** - attempt count and wall-clock budget, whichever
//!   trips first, with a clamped exponential backoff between attempts
//! - **Lazy end to end** - fragments decode and surface as they arrive off
//!   the wire; dropping the stream cancels the in-flight request
//! - **Structured logging** - `tracing` spans the retry loop with attempt
//!   numbers and backoff delays
//!
//! ## Retry behavior
//!
//! A call makes up to `max_retries + 1` attempts inside a wall-clock
//! budget. Only two upstream signals are considered transient: HTTP 429
//! (overloaded) and HTTP 503 (no healthy backend). The wait between
//! attempts follows `multiplier * exp_base^attempt`, clamped between a
//! floor and a ceiling; see [`RetryPolicy`] for the knobs and their
//! defaults. When retries run out, the caller sees one `FAILURE` envelope
//! whose diagnostic names the condition ("Too many concurrent requests" or
//! "No healthy upstream").
//!
//! ```no_run
//! use everstream::{Client, PredictRequest, RetryPolicy};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), everstream::Error> {
//! let client = Client::builder()
//!     .retry_policy(RetryPolicy {
//!         max_retries: 3,
//!         timeout: Duration::from_secs(5),
//!         ..RetryPolicy::default()
//!     })
//!     .build()?;
//!
//! // Per-call overrides, for callers with their own deadline.
//! let request = PredictRequest::new(json!({"prompt": "hi"}))
//!     .with_timeout_seconds(2.0)
//!     .with_num_retries(1);
//! # Ok(())
//! # }
//! ```

mod client;
mod envelope;
mod error;
pub mod request;
pub mod retry;
mod transport;

pub use client::{Client, ClientBuilder};
pub use envelope::ResponseEnvelope;
pub use error::{Error, Result};
pub use request::PredictRequest;
pub use retry::RetryPolicy;
