//! Captured network packet types
//!
//! One `CapturedPacket` per request observed on the active page. The
//! `response`/`fail_info` pair is mutually exclusive: a request either
//! completed with a response or failed with an error descriptor.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// One intercepted request/response pair.
#[derive(Debug, Clone)]
pub struct CapturedPacket {
    /// CDP request id, used to fetch the response body on demand.
    pub request_id: String,
    pub url: String,
    pub method: String,
    /// Present when the request completed. `None` marks a failed request.
    pub response: Option<ResponseInfo>,
    /// Present only when the request failed.
    pub fail_info: Option<FailInfo>,
    pub captured_at: DateTime<Utc>,
}

/// Response metadata plus the lazily hydrated body.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub status: i64,
    pub mime_type: String,
    /// `None` until hydrated via `Network.getResponseBody`, or when the
    /// response genuinely has no body.
    pub body: Option<PacketBody>,
}

/// Error descriptor for a request that never completed.
#[derive(Debug, Clone)]
pub struct FailInfo {
    pub error_text: String,
}

/// Closed set of body shapes the summarizer dispatches on.
#[derive(Debug, Clone)]
pub enum PacketBody {
    /// Parsed JSON value (mapping, sequence or scalar).
    Json(Value),
    /// Raw bytes from a base64-encoded CDP body.
    Binary(Vec<u8>),
    /// Anything else, passed through as text.
    Text(String),
}

/// Classify a raw CDP response body into a `PacketBody`.
///
/// `Network.getResponseBody` returns the body as a string plus a flag
/// telling whether that string is base64-encoded binary data. JSON is only
/// parsed when the declared MIME type says so; a declared-JSON body that
/// fails to parse degrades to text rather than erroring, since the payload
/// is server-controlled.
pub fn classify_body(raw: &str, base64_encoded: bool, mime_type: &str) -> Option<PacketBody> {
    if raw.is_empty() {
        return None;
    }

    if base64_encoded {
        return match BASE64.decode(raw) {
            Ok(bytes) => Some(PacketBody::Binary(bytes)),
            // Flag said base64 but the payload isn't; keep it as text.
            Err(_) => Some(PacketBody::Text(raw.to_string())),
        };
    }

    if mime_type.contains("json")
        && let Ok(value) = serde_json::from_str::<Value>(raw)
    {
        return Some(PacketBody::Json(value));
    }

    Some(PacketBody::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_classifies_as_none() {
        assert!(classify_body("", false, "application/json").is_none());
        assert!(classify_body("", true, "image/png").is_none());
    }

    #[test]
    fn base64_body_decodes_to_binary() {
        let encoded = BASE64.encode([0x89, 0x50, 0x4e, 0x47]);
        match classify_body(&encoded, true, "image/png") {
            Some(PacketBody::Binary(bytes)) => assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]),
            other => panic!("expected binary body, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base64_degrades_to_text() {
        match classify_body("not base64 at all!!!", true, "image/png") {
            Some(PacketBody::Text(text)) => assert_eq!(text, "not base64 at all!!!"),
            other => panic!("expected text body, got {other:?}"),
        }
    }

    #[test]
    fn json_mime_parses_body() {
        match classify_body(r#"{"ok":true}"#, false, "application/json; charset=utf-8") {
            Some(PacketBody::Json(value)) => assert_eq!(value["ok"], Value::Bool(true)),
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_degrades_to_text() {
        match classify_body("{not json", false, "application/json") {
            Some(PacketBody::Text(text)) => assert_eq!(text, "{not json"),
            other => panic!("expected text body, got {other:?}"),
        }
    }

    #[test]
    fn non_json_mime_stays_text_even_if_parseable() {
        match classify_body(r#"{"ok":true}"#, false, "text/html") {
            Some(PacketBody::Text(text)) => assert_eq!(text, r#"{"ok":true}"#),
            other => panic!("expected text body, got {other:?}"),
        }
    }
}
