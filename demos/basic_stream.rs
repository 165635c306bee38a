//! Basic example: stream predictions from an inference endpoint.
//!
//! This example shows how to:
//! - Create a client with the stock retry policy
//! - Issue a streaming predict call
//! - Consume SUCCESS chunks and spot the terminal FAILURE
//!
//! Run with: `cargo run --example basic_stream -- http://localhost:5005/stream`

use everstream::{Client, PredictRequest};
use futures_util::StreamExt;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), everstream::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("everstream=debug,basic_stream=info")
        .init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:5005/stream".to_string());

    let client = Client::builder().build()?;

    let request = PredictRequest::new(json!({
        "prompt": "Write a haiku about retries",
        "max_new_tokens": 64,
    }));

    println!("=== Streaming from {target} ===");
    let mut stream = client.streaming_predict(&target, request);

    while let Some(envelope) = stream.next().await {
        match envelope.result() {
            Some(chunk) => println!("chunk: {chunk}"),
            None => {
                eprintln!("call failed: {}", envelope.traceback().unwrap_or("<no diagnostic>"));
            }
        }
    }

    println!("stream finished");
    Ok(())
}
