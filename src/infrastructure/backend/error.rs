//! Mapping transport failures and error bodies to [`GatewayError`].

use crate::domain::ports::GatewayError;

/// Bodies at least this long are not shown to the operator verbatim.
const MAX_RAW_BODY_CHARS: usize = 200;

/// Derive the operator-facing message for a non-success response.
///
/// Order of preference: a string `detail` field of a JSON body, then the
/// raw body when short and non-empty, then a generic status message.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        return match json.get("detail").and_then(serde_json::Value::as_str) {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => generic(status),
        };
    }

    if !body.is_empty() && body.chars().count() < MAX_RAW_BODY_CHARS {
        body.to_string()
    } else {
        generic(status)
    }
}

fn generic(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// Classify a failure that happened before any response was received.
pub fn transport_error(err: &reqwest::Error, base_url: &str) -> GatewayError {
    let base_url = base_url.to_string();
    if err.is_timeout() {
        GatewayError::Timeout { base_url }
    } else if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Unreachable { base_url }
    }
}
