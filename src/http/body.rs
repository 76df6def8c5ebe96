//! JSON body decoding.
//!
//! Bodies are buffered whole (bounded by the configured limit) and parsed as
//! JSON. Anything unreadable, unparsable or `null` counts as no body; the
//! required-field checks downstream report the problem.

use axum::body::Body;
use serde_json::Value;

/// Buffer `body` and parse it as JSON.
pub async fn read_json(body: Body, limit: usize) -> Option<Value> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to buffer request body");
            return None;
        }
    };

    if bytes.is_empty() {
        return None;
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not valid JSON");
            None
        }
    }
}
