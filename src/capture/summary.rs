//! Packet summaries for LLM consumption
//!
//! Condenses an arbitrarily large, arbitrarily nested response body into a
//! small schema-like summary so an agent with a limited context window can
//! reason about API traffic without ingesting full payloads. Mappings keep
//! their keys (values replaced by their own summaries), sequences are
//! sampled by their first element only, and recursion stops at a fixed
//! depth ceiling.
//!
//! Everything here is a pure function of its input. There is deliberately
//! no failure mode: these functions process arbitrary third-party payloads
//! and degrade to descriptive strings instead of erroring.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::packet::{CapturedPacket, PacketBody};

/// Default recursion ceiling for JSON schema summaries.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Status of a summarized packet: the numeric HTTP code, or the literal
/// string `"Failed"` when the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketStatus {
    Code(i64),
    Failed,
}

impl Serialize for PacketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PacketStatus::Code(code) => serializer.serialize_i64(*code),
            PacketStatus::Failed => serializer.serialize_str("Failed"),
        }
    }
}

/// Compact summary of one captured packet.
///
/// Serialized with camelCase keys; `contentSummary` and `errorInfo` are
/// explicit nulls rather than omitted keys, so consumers see a stable
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketSummary {
    pub url: String,
    pub method: String,
    pub status: PacketStatus,
    /// Schema value for JSON bodies, descriptive string for binary/text
    /// bodies, null when there is no body.
    pub content_summary: Option<Value>,
    pub error_info: Option<String>,
}

/// Summarize one packet with the default depth ceiling.
pub fn summarize_packet(packet: &CapturedPacket) -> PacketSummary {
    summarize_packet_with_depth(packet, DEFAULT_MAX_DEPTH)
}

/// Summarize one packet with an explicit depth ceiling.
pub fn summarize_packet_with_depth(packet: &CapturedPacket, max_depth: usize) -> PacketSummary {
    let status = match &packet.response {
        Some(response) => PacketStatus::Code(response.status),
        None => PacketStatus::Failed,
    };

    let content_summary = packet.response.as_ref().and_then(|response| {
        response
            .body
            .as_ref()
            .map(|body| summarize_body(body, &response.mime_type, max_depth))
    });

    PacketSummary {
        url: packet.url.clone(),
        method: packet.method.clone(),
        status,
        content_summary,
        error_info: packet.fail_info.as_ref().map(|fail| fail.error_text.clone()),
    }
}

/// Summarize a whole capture in input order, one summary per packet.
pub fn summarize_packets(packets: &[CapturedPacket]) -> Vec<PacketSummary> {
    packets.iter().map(summarize_packet).collect()
}

/// Batch variant of [`summarize_packet_with_depth`].
pub fn summarize_packets_with_depth(
    packets: &[CapturedPacket],
    max_depth: usize,
) -> Vec<PacketSummary> {
    packets
        .iter()
        .map(|packet| summarize_packet_with_depth(packet, max_depth))
        .collect()
}

fn summarize_body(body: &PacketBody, mime_type: &str, max_depth: usize) -> Value {
    match body {
        PacketBody::Json(value)
            if mime_type.contains("json") && (value.is_object() || value.is_array()) =>
        {
            summarize_json(value, max_depth, 0)
        }
        PacketBody::Binary(bytes) => Value::String(format!("Binary data, {} bytes", bytes.len())),
        PacketBody::Text(text) => text_summary(text),
        PacketBody::Json(Value::String(text)) => text_summary(text),
        PacketBody::Json(value) => text_summary(&value.to_string()),
    }
}

// The trailing "...'" is appended even when nothing was truncated; it is
// part of the output contract, not a truncation indicator.
fn text_summary(text: &str) -> Value {
    let preview: String = text.chars().take(100).collect();
    Value::String(format!(
        "Text data, length {}, preview: '{preview}...'",
        text.chars().count()
    ))
}

/// Recursively build the bounded-depth schema of a JSON value.
///
/// Descending into a mapping's values or a sequence's first element costs
/// one depth unit; a mapping's own keys never do. An empty sequence yields
/// its zero-count descriptor regardless of depth. Scalars pass through
/// unchanged.
pub fn summarize_json(value: &Value, max_depth: usize, current_depth: usize) -> Value {
    if let Value::Array(items) = value
        && items.is_empty()
    {
        return json!({"type": "list", "itemCount": 0});
    }

    if current_depth >= max_depth {
        return Value::String(format!("Max depth ({max_depth}) reached..."));
    }

    match value {
        Value::Array(items) => json!({
            "type": "list",
            "itemCount": items.len(),
            "firstItemSchema": summarize_json(&items[0], max_depth, current_depth + 1),
        }),
        Value::Object(map) => {
            let mut schema = Map::with_capacity(map.len());
            for (key, value) in map {
                schema.insert(key.clone(), summarize_json(value, max_depth, current_depth + 1));
            }
            Value::Object(schema)
        }
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::packet::{FailInfo, ResponseInfo};
    use chrono::Utc;

    fn packet(
        response: Option<ResponseInfo>,
        fail_info: Option<FailInfo>,
    ) -> CapturedPacket {
        CapturedPacket {
            request_id: "req-1".to_string(),
            url: "https://api.test.local/v1/items".to_string(),
            method: "GET".to_string(),
            response,
            fail_info,
            captured_at: Utc::now(),
        }
    }

    fn json_response(body: Value) -> Option<ResponseInfo> {
        Some(ResponseInfo {
            status: 200,
            mime_type: "application/json".to_string(),
            body: Some(PacketBody::Json(body)),
        })
    }

    #[test]
    fn mapping_keeps_keys_and_summarizes_values() {
        let input = json!({"a": 1, "b": [1, 2, 3], "c": {}});
        let schema = summarize_json(&input, 4, 0);
        assert_eq!(
            schema,
            json!({
                "a": 1,
                "b": {"type": "list", "itemCount": 3, "firstItemSchema": 1},
                "c": {}
            })
        );
    }

    #[test]
    fn mapping_key_order_is_preserved() {
        let input = json!({"zeta": 1, "alpha": 2, "mid": 3});
        let schema = summarize_json(&input, 4, 0);
        let keys: Vec<&String> = match &schema {
            Value::Object(map) => map.keys().collect(),
            other => panic!("expected object schema, got {other:?}"),
        };
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn depth_ceiling_replaces_structure_with_placeholder() {
        // Six levels of nesting against a ceiling of 4: the value reached
        // at depth 4 becomes the placeholder string.
        let input = json!({"l1": {"l2": {"l3": {"l4": {"l5": {"l6": 1}}}}}});
        let schema = summarize_json(&input, 4, 0);
        assert_eq!(
            schema["l1"]["l2"]["l3"]["l4"],
            Value::String("Max depth (4) reached...".to_string())
        );
    }

    #[test]
    fn depth_ceiling_applies_through_list_descent() {
        let input = json!([[[[[1]]]]]);
        let schema = summarize_json(&input, 2, 0);
        // Two list descents allowed, then the placeholder.
        assert_eq!(
            schema["firstItemSchema"]["firstItemSchema"],
            Value::String("Max depth (2) reached...".to_string())
        );
    }

    #[test]
    fn empty_list_yields_zero_count_descriptor_only() {
        let schema = summarize_json(&json!([]), 4, 0);
        assert_eq!(schema, json!({"type": "list", "itemCount": 0}));
        let keys: Vec<&String> = match &schema {
            Value::Object(map) => map.keys().collect(),
            other => panic!("expected object schema, got {other:?}"),
        };
        assert_eq!(keys, ["type", "itemCount"]);
    }

    #[test]
    fn empty_list_descriptor_wins_over_depth_placeholder() {
        // Explicit tie-break: the zero-count descriptor appears even when
        // the list sits at the ceiling.
        let input = json!({"a": {"b": []}});
        let schema = summarize_json(&input, 2, 0);
        assert_eq!(schema["a"]["b"], json!({"type": "list", "itemCount": 0}));
    }

    #[test]
    fn list_schema_samples_first_element_only() {
        let homogeneous = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let heterogeneous = json!([{"id": 1}, "mixed", [null]]);
        assert_eq!(
            summarize_json(&homogeneous, 4, 0),
            summarize_json(&heterogeneous, 4, 0)
        );
        let schema = summarize_json(&heterogeneous, 4, 0);
        assert_eq!(schema["itemCount"], json!(3));
        assert_eq!(schema["firstItemSchema"], json!({"id": 1}));
    }

    #[test]
    fn scalars_pass_through_unchanged() {
        for scalar in [json!(42), json!(1.5), json!("text"), json!(true), json!(null)] {
            assert_eq!(summarize_json(&scalar, 4, 0), scalar);
        }
    }

    #[test]
    fn summarizing_twice_is_identical() {
        let p = packet(
            json_response(json!({"items": [{"a": {"b": [1]}}], "total": 7})),
            None,
        );
        assert_eq!(summarize_packet(&p), summarize_packet(&p));
    }

    #[test]
    fn json_body_produces_schema_summary() {
        let p = packet(json_response(json!([])), None);
        let summary = summarize_packet(&p);
        assert_eq!(summary.status, PacketStatus::Code(200));
        assert_eq!(
            summary.content_summary,
            Some(json!({"type": "list", "itemCount": 0}))
        );
        assert_eq!(summary.error_info, None);
    }

    #[test]
    fn failed_request_reports_status_and_error() {
        let p = packet(
            None,
            Some(FailInfo {
                error_text: "net::ERR_TIMEOUT".to_string(),
            }),
        );
        let summary = summarize_packet(&p);
        assert_eq!(summary.status, PacketStatus::Failed);
        assert_eq!(summary.content_summary, None);
        assert_eq!(summary.error_info, Some("net::ERR_TIMEOUT".to_string()));

        let wire = serde_json::to_value(&summary).unwrap();
        assert_eq!(wire["status"], json!("Failed"));
        assert_eq!(wire["errorInfo"], json!("net::ERR_TIMEOUT"));
        assert_eq!(wire["contentSummary"], Value::Null);
    }

    #[test]
    fn binary_body_reports_byte_length() {
        let p = packet(
            Some(ResponseInfo {
                status: 200,
                mime_type: "image/png".to_string(),
                body: Some(PacketBody::Binary(vec![0u8; 2048])),
            }),
            None,
        );
        let summary = summarize_packet(&p);
        assert_eq!(
            summary.content_summary,
            Some(json!("Binary data, 2048 bytes"))
        );
    }

    #[test]
    fn text_body_reports_length_and_preview() {
        let text = "x".repeat(500);
        let p = packet(
            Some(ResponseInfo {
                status: 200,
                mime_type: "text/html".to_string(),
                body: Some(PacketBody::Text(text.clone())),
            }),
            None,
        );
        let summary = summarize_packet(&p);
        let expected = format!("Text data, length 500, preview: '{}...'", &text[..100]);
        assert_eq!(summary.content_summary, Some(json!(expected)));
    }

    #[test]
    fn short_text_still_gets_ellipsis_suffix() {
        let p = packet(
            Some(ResponseInfo {
                status: 204,
                mime_type: "text/plain".to_string(),
                body: Some(PacketBody::Text("ok".to_string())),
            }),
            None,
        );
        let summary = summarize_packet(&p);
        assert_eq!(
            summary.content_summary,
            Some(json!("Text data, length 2, preview: 'ok...'"))
        );
    }

    #[test]
    fn text_preview_counts_characters_not_bytes() {
        let text = "é".repeat(150);
        let p = packet(
            Some(ResponseInfo {
                status: 200,
                mime_type: "text/plain".to_string(),
                body: Some(PacketBody::Text(text)),
            }),
            None,
        );
        let summary = summarize_packet(&p);
        let rendered = match summary.content_summary {
            Some(Value::String(s)) => s,
            other => panic!("expected string summary, got {other:?}"),
        };
        assert!(rendered.starts_with("Text data, length 150, preview: '"));
        let preview = "é".repeat(100);
        assert!(rendered.ends_with(&format!("{preview}...'")));
    }

    #[test]
    fn json_scalar_body_falls_through_to_text_branch() {
        // A JSON MIME type with a scalar body is not a mapping or
        // sequence, so it takes the text branch.
        let p = packet(json_response(json!("just a string")), None);
        let summary = summarize_packet(&p);
        assert_eq!(
            summary.content_summary,
            Some(json!("Text data, length 13, preview: 'just a string...'"))
        );
    }

    #[test]
    fn json_shaped_body_without_json_mime_stays_text() {
        let p = packet(
            Some(ResponseInfo {
                status: 200,
                mime_type: "text/plain".to_string(),
                body: Some(PacketBody::Json(json!({"a": 1}))),
            }),
            None,
        );
        let summary = summarize_packet(&p);
        let rendered = match summary.content_summary {
            Some(Value::String(s)) => s,
            other => panic!("expected string summary, got {other:?}"),
        };
        assert!(rendered.starts_with("Text data, length"));
    }

    #[test]
    fn empty_body_yields_null_summary() {
        let p = packet(
            Some(ResponseInfo {
                status: 304,
                mime_type: "application/json".to_string(),
                body: None,
            }),
            None,
        );
        let summary = summarize_packet(&p);
        assert_eq!(summary.status, PacketStatus::Code(304));
        assert_eq!(summary.content_summary, None);
    }

    #[test]
    fn per_call_depth_ceiling_is_respected() {
        let p = packet(json_response(json!({"a": {"b": {"c": 1}}})), None);
        let summary = summarize_packet_with_depth(&p, 1);
        assert_eq!(
            summary.content_summary,
            Some(json!({"a": "Max depth (1) reached..."}))
        );
    }

    #[test]
    fn batch_preserves_length_and_order() {
        let packets = vec![
            packet(json_response(json!({"first": 1})), None),
            packet(None, Some(FailInfo { error_text: "net::ERR_ABORTED".to_string() })),
            packet(json_response(json!([1, 2])), None),
        ];
        let summaries = summarize_packets(&packets);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].content_summary, Some(json!({"first": 1})));
        assert_eq!(summaries[1].status, PacketStatus::Failed);
        assert_eq!(
            summaries[2].content_summary,
            Some(json!({"type": "list", "itemCount": 2, "firstItemSchema": 1}))
        );
    }

    #[test]
    fn wire_shape_uses_camel_case_keys() {
        let p = packet(json_response(json!({"a": 1})), None);
        let wire = serde_json::to_value(summarize_packet(&p)).unwrap();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["url", "method", "status", "contentSummary", "errorInfo"]);
        assert_eq!(wire["status"], json!(200));
    }
}
