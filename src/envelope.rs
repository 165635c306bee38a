//! The uniform terminal/streaming unit delivered to callers.
//!
//! Every element a caller pulls from [`Client::streaming_predict`] is a
//! [`ResponseEnvelope`], tagged `SUCCESS` or `FAILURE`. A failed call is
//! indistinguishable in type from a successful one, so route handlers can
//! forward the stream (as JSON lines or SSE) without branching on outcome.
//!
//! [`Client::streaming_predict`]: crate::Client::streaming_predict

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One unit of a streaming predict response.
///
/// Serializes with a `status` tag matching the upstream task protocol:
///
/// ```json
/// {"status":"SUCCESS","result":{"token":"hi"}}
/// {"status":"FAILURE","traceback":"..."}
/// ```
///
/// A call emits either `Success` envelopes from exactly one attempt, or a
/// single `Failure` carrying whatever diagnostic could be recovered from the
/// terminal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseEnvelope {
    /// One decoded chunk of a successful attempt.
    #[serde(rename = "SUCCESS")]
    Success {
        /// The decoded fragment payload.
        result: Value,
    },

    /// The single terminal record of a failed call.
    #[serde(rename = "FAILURE")]
    Failure {
        /// Diagnostic text recovered from the upstream error body, if any.
        #[serde(default)]
        traceback: Option<String>,
    },
}

impl ResponseEnvelope {
    /// Wraps one decoded result chunk.
    pub fn success(result: Value) -> Self {
        ResponseEnvelope::Success { result }
    }

    /// Builds the terminal failure record.
    pub fn failure(traceback: Option<String>) -> Self {
        ResponseEnvelope::Failure { traceback }
    }

    /// Translates a terminal error into the failure envelope callers see.
    ///
    /// Upstream error bodies are parsed as JSON and an embedded
    /// `detail.traceback` field extracted when present; a body that is not
    /// JSON is carried verbatim. Other error kinds use their display text.
    pub(crate) fn from_error(err: &Error) -> Self {
        let traceback = match err {
            Error::Upstream { body, .. } => extract_diagnostic(body),
            other => Some(other.to_string()),
        };
        ResponseEnvelope::Failure { traceback }
    }

    /// Returns `true` for a `SUCCESS` envelope.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    /// Returns `true` for a `FAILURE` envelope.
    pub fn is_failure(&self) -> bool {
        matches!(self, ResponseEnvelope::Failure { .. })
    }

    /// Returns the decoded result of a `SUCCESS` envelope.
    pub fn result(&self) -> Option<&Value> {
        match self {
            ResponseEnvelope::Success { result } => Some(result),
            ResponseEnvelope::Failure { .. } => None,
        }
    }

    /// Returns the diagnostic text of a `FAILURE` envelope, if it has one.
    pub fn traceback(&self) -> Option<&str> {
        match self {
            ResponseEnvelope::Success { .. } => None,
            ResponseEnvelope::Failure { traceback } => traceback.as_deref(),
        }
    }
}

/// Pulls a usable diagnostic out of an upstream error body.
fn extract_diagnostic(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(json) => json
            .get("detail")
            .and_then(|detail| detail.get("traceback"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn success_wire_shape() {
        let envelope = ResponseEnvelope::success(json!({"token": "hi"}));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "SUCCESS", "result": {"token": "hi"}})
        );
    }

    #[test]
    fn failure_wire_shape() {
        let envelope = ResponseEnvelope::failure(Some("boom".to_string()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "FAILURE", "traceback": "boom"})
        );

        let envelope = ResponseEnvelope::failure(None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "FAILURE", "traceback": null})
        );
    }

    #[test]
    fn envelopes_round_trip() {
        let success = ResponseEnvelope::success(json!([1, 2, 3]));
        let parsed: ResponseEnvelope =
            serde_json::from_str(&serde_json::to_string(&success).unwrap()).unwrap();
        assert_eq!(parsed, success);

        let failure = ResponseEnvelope::failure(None);
        let parsed: ResponseEnvelope =
            serde_json::from_str(&serde_json::to_string(&failure).unwrap()).unwrap();
        assert_eq!(parsed, failure);
    }

    #[test]
    fn traceback_extracted_from_detail_field() {
        let err = Error::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: br#"{"detail":{"traceback":"Traceback (most recent call last): ..."}}"#.to_vec(),
        };
        let envelope = ResponseEnvelope::from_error(&err);
        assert_eq!(
            envelope.traceback(),
            Some("Traceback (most recent call last): ...")
        );
    }

    #[test]
    fn json_body_without_traceback_yields_none() {
        let err = Error::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: br#"{"message":"it broke"}"#.to_vec(),
        };
        let envelope = ResponseEnvelope::from_error(&err);
        assert!(envelope.is_failure());
        assert_eq!(envelope.traceback(), None);
    }

    #[test]
    fn non_json_body_carried_verbatim() {
        let err = Error::Upstream {
            status: StatusCode::BAD_GATEWAY,
            body: b"upstream connect error".to_vec(),
        };
        let envelope = ResponseEnvelope::from_error(&err);
        assert_eq!(envelope.traceback(), Some("upstream connect error"));
    }

    #[test]
    fn non_upstream_errors_use_display_text() {
        let err = Error::Configuration("bad client".to_string());
        let envelope = ResponseEnvelope::from_error(&err);
        assert_eq!(envelope.traceback(), Some("configuration error: bad client"));
    }
}
