//! Single-attempt streaming transport.
//!
//! One invocation of [`attempt`] performs one HTTP POST and owns one
//! connection. A non-success status is classified and raised before any
//! fragment is produced, which is what makes the caller's retry loop safe:
//! an attempt that failed this way has delivered nothing downstream.

use async_stream::stream;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use http::StatusCode;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// Raw SSE `data` payloads of one attempt, in arrival order.
///
/// The stream is finite (ends when the server closes the response) and not
/// restartable. Dropping it drops the underlying response and releases the
/// connection.
pub(crate) type FragmentStream = BoxStream<'static, Result<String>>;

/// Performs one streaming POST against the target.
///
/// Status 200 returns the fragment stream; any other status reads the full
/// error body and classifies it: 429 is [`Error::Overloaded`], 503 is
/// [`Error::NoHealthyBackend`], everything else [`Error::Upstream`].
pub(crate) async fn attempt(
    http: &reqwest::Client,
    url: &Url,
    payload: &Value,
) -> Result<FragmentStream> {
    tracing::debug!(url = %url, "opening streaming request");

    let response = http.post(url.clone()).json(payload).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "non-success status from upstream");
        return Err(classify_status(status, body));
    }

    let mut bytes = response.bytes_stream();
    Ok(Box::pin(stream! {
        let mut decoder = SseFrameDecoder::new();
        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(Error::Network(e));
                    return;
                }
            };
            for data in decoder.push(&chunk) {
                yield Ok(data);
            }
        }
        if let Some(data) = decoder.finish() {
            yield Ok(data);
        }
    }))
}

fn classify_status(status: StatusCode, body: Vec<u8>) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::Overloaded,
        StatusCode::SERVICE_UNAVAILABLE => Error::NoHealthyBackend,
        _ => Error::Upstream { status, body },
    }
}

/// Incremental decoder for the SSE wire format.
///
/// Feeds on raw byte chunks and emits the `data` payload of each complete
/// event. Events end at a blank line; multiple `data:` lines within one
/// event are joined with newlines per the SSE convention; comment lines
/// (leading `:`) and non-`data` fields are ignored.
struct SseFrameDecoder {
    buffer: String,
    data_lines: Vec<String>,
}

impl SseFrameDecoder {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            data_lines: Vec::new(),
        }
    }

    /// Consumes one network chunk, returning every event completed by it.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(event) = self.take_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes a trailing event whose final blank line never arrived.
    fn finish(mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        if let Some(event) = self.take_line(tail.trim_end_matches('\r')) {
            return Some(event);
        }
        if self.data_lines.is_empty() {
            None
        } else {
            Some(self.data_lines.join("\n"))
        }
    }

    fn take_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            let event = self.data_lines.join("\n");
            self.data_lines.clear();
            return Some(event);
        }
        if line.starts_with(':') {
            return None;
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data_lines
                .push(value.strip_prefix(' ').unwrap_or(value).to_owned());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::SseFrameDecoder;

    fn decode_all(chunks: &[&str]) -> Vec<String> {
        let mut decoder = SseFrameDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.push(chunk.as_bytes()));
        }
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn single_event() {
        assert_eq!(decode_all(&["data: {\"a\":1}\n\n"]), vec!["{\"a\":1}"]);
    }

    #[test]
    fn multiple_events_in_one_chunk() {
        assert_eq!(
            decode_all(&["data: one\n\ndata: two\n\n"]),
            vec!["one", "two"]
        );
    }

    #[test]
    fn event_split_across_chunks() {
        assert_eq!(
            decode_all(&["data: hel", "lo wor", "ld\n", "\n"]),
            vec!["hello world"]
        );
    }

    #[test]
    fn multi_line_data_joined_with_newlines() {
        assert_eq!(
            decode_all(&["data: first\ndata: second\n\n"]),
            vec!["first\nsecond"]
        );
    }

    #[test]
    fn comments_and_other_fields_ignored() {
        assert_eq!(
            decode_all(&[": keep-alive\n\nevent: ping\nid: 7\ndata: payload\n\n"]),
            vec!["payload"]
        );
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(decode_all(&["data: x\r\n\r\n"]), vec!["x"]);
    }

    #[test]
    fn data_without_space_after_colon() {
        assert_eq!(decode_all(&["data:tight\n\n"]), vec!["tight"]);
    }

    #[test]
    fn unterminated_final_event_flushed() {
        assert_eq!(decode_all(&["data: tail"]), vec!["tail"]);
        assert_eq!(decode_all(&["data: a\n\ndata: b\n"]), vec!["a", "b"]);
    }

    #[test]
    fn blank_input_produces_nothing() {
        assert!(decode_all(&["\n\n", ": ping\n\n"]).is_empty());
    }
}
