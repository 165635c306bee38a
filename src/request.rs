//! Per-call request type: an opaque payload plus optional retry overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One streaming predict request.
///
/// The payload is an opaque JSON value forwarded to the upstream verbatim;
/// this crate never inspects it. The two optional fields override the
/// client's retry policy for this call only.
///
/// # Examples
///
/// ```
/// use everstream::PredictRequest;
/// use serde_json::json;
///
/// let request = PredictRequest::new(json!({"prompt": "hello"}))
///     .with_timeout_seconds(4.0)
///     .with_num_retries(2);
///
/// assert_eq!(request.timeout_seconds, Some(4.0));
/// assert_eq!(request.num_retries, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// The JSON payload sent as the POST body.
    pub payload: Value,

    /// Wall-clock budget for this call in seconds. `None` uses the
    /// client's configured budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<f64>,

    /// Maximum retries for this call. `None` uses the client's configured
    /// count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_retries: Option<u32>,
}

impl PredictRequest {
    /// Creates a request from an already-built JSON payload.
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            timeout_seconds: None,
            num_retries: None,
        }
    }

    /// Creates a request by serializing any `Serialize` payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the payload cannot be converted
    /// to JSON.
    pub fn from_payload<T: Serialize>(payload: &T) -> Result<Self> {
        let payload =
            serde_json::to_value(payload).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self::new(payload))
    }

    /// Overrides the wall-clock budget for this call.
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Overrides the retry count for this call.
    pub fn with_num_retries(mut self, retries: u32) -> Self {
        self.num_retries = Some(retries);
        self
    }

    /// The JSON payload this request carries.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}
