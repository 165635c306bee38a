//! Retry tuning example: custom policies and per-request overrides.
//!
//! This example shows how to:
//! - Replace the stock retry policy on the client
//! - Inspect the backoff curve a policy produces
//! - Override the budget and retry count for one call
//!
//! Run with: `cargo run --example retry_tuning`

use everstream::{Client, PredictRequest, RetryPolicy};
use futures_util::StreamExt;
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), everstream::Error> {
    tracing_subscriber::fmt()
        .with_env_filter("everstream=info,retry_tuning=info")
        .init();

    // An impatient policy: three quick attempts inside a tight budget.
    let policy = RetryPolicy {
        max_retries: 2,
        timeout: Duration::from_secs(3),
        min_wait: Duration::from_millis(100),
        max_wait: Duration::from_millis(500),
        ..RetryPolicy::default()
    };

    println!("=== Backoff curve ===");
    for attempt in 1..=5 {
        println!(
            "wait after failed attempt {attempt}: {:?}",
            policy.wait_before(attempt)
        );
    }

    let client = Client::builder()
        .retry_policy(policy)
        .io_timeout(Duration::from_secs(30))
        .build()?;

    // A caller with its own deadline can shrink the bounds further for
    // one request without touching the client.
    let request = PredictRequest::new(json!({"prompt": "ping"}))
        .with_timeout_seconds(1.5)
        .with_num_retries(1);

    println!("=== Calling (expected to fail fast without a live endpoint) ===");
    let mut stream = client.streaming_predict("http://localhost:5005/stream", request);

    while let Some(envelope) = stream.next().await {
        if envelope.is_failure() {
            println!(
                "terminal failure: {}",
                envelope.traceback().unwrap_or("<no diagnostic>")
            );
        } else {
            println!("chunk: {:?}", envelope.result());
        }
    }

    Ok(())
}
