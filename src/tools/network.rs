//! Network capture and analysis tools
//!
//! The data-analysis workflow: start capture, browse, list the traffic
//! metadata, then either pull one response body or summarize packets into
//! the compact schema form the agent can actually reason about.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::capture::{
    CapturedPacket, NetworkCapture, PacketBody, summarize_packets_with_depth,
};
use crate::manager::BrowserManager;
use crate::tools::active_page;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResponseBodyArgs {
    /// Request id from network_traffic_summary
    pub request_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummarizeArgs {
    /// Summarize only this request; all captured requests when omitted
    pub request_id: Option<String>,
    /// Recursion ceiling for JSON schema summaries (default from config,
    /// normally 4)
    pub max_depth: Option<usize>,
}

/// Enable network capture on the current page, discarding any previous
/// capture.
pub async fn start_capture(
    manager: &BrowserManager,
    capture: &NetworkCapture,
) -> Result<Value, McpError> {
    let page = active_page(manager).await?;

    capture.start(&page).await.map_err(|e| {
        McpError::internal_error(format!("Failed to start network capture: {e}"), None)
    })?;

    Ok(json!({
        "success": true,
        "message": "Network capture enabled on the current page"
    }))
}

/// Metadata-only listing of captured packets, in capture order.
///
/// Deliberately contains no bodies; the agent uses it to decide which
/// request is worth pulling or summarizing.
pub async fn traffic_summary(capture: &NetworkCapture) -> Result<Value, McpError> {
    if !capture.is_active().await {
        return Err(McpError::invalid_request(
            "No capture session. Run network_start_capture first.",
            None,
        ));
    }

    let packets = capture.snapshot().await;
    let rows: Vec<Value> = packets.iter().map(traffic_row).collect();

    Ok(json!({
        "captured": rows.len(),
        "traffic_summary": rows,
    }))
}

fn traffic_row(packet: &CapturedPacket) -> Value {
    let (status, mime_type): (Value, Value) = match &packet.response {
        Some(response) => (
            json!(response.status),
            json!(response.mime_type),
        ),
        None => (Value::Null, Value::Null),
    };
    json!({
        "request_id": packet.request_id,
        "url": packet.url,
        "method": packet.method,
        "status": status,
        "mime_type": mime_type,
        "error": packet.fail_info.as_ref().map(|f| f.error_text.clone()),
        "captured_at": packet.captured_at.to_rfc3339(),
    })
}

/// Fetch one response body, classified by shape.
pub async fn response_body(
    manager: &BrowserManager,
    capture: &NetworkCapture,
    args: ResponseBodyArgs,
) -> Result<Value, McpError> {
    if !capture.is_active().await {
        return Err(McpError::invalid_request(
            "No capture session. Run network_start_capture first.",
            None,
        ));
    }

    let page = active_page(manager).await?;
    let packet = capture
        .hydrate_body(&page, &args.request_id)
        .await
        .map_err(|e| {
            McpError::invalid_params(
                format!(
                    "Could not get response body for request id '{}': {e}",
                    args.request_id
                ),
                None,
            )
        })?;

    let (status, mime_type) = match &packet.response {
        Some(response) => (json!(response.status), json!(response.mime_type)),
        None => (json!("Failed"), Value::Null),
    };

    let body = match packet.response.as_ref().and_then(|r| r.body.as_ref()) {
        Some(PacketBody::Json(value)) => json!({ "kind": "json", "content": value }),
        Some(PacketBody::Text(text)) => json!({ "kind": "text", "content": text }),
        Some(PacketBody::Binary(bytes)) => json!({
            "kind": "binary",
            "size_bytes": bytes.len(),
            "base64": BASE64.encode(bytes),
        }),
        None => Value::Null,
    };

    Ok(json!({
        "request_id": packet.request_id,
        "url": packet.url,
        "method": packet.method,
        "status": status,
        "mime_type": mime_type,
        "error": packet.fail_info.as_ref().map(|f| f.error_text.clone()),
        "body": body,
    }))
}

/// Summarize one or all captured packets into the compact schema form.
pub async fn summarize(
    manager: &BrowserManager,
    capture: &NetworkCapture,
    default_max_depth: usize,
    args: SummarizeArgs,
) -> Result<Value, McpError> {
    if !capture.is_active().await {
        return Err(McpError::invalid_request(
            "No capture session. Run network_start_capture first.",
            None,
        ));
    }

    let page = active_page(manager).await?;
    let max_depth = args.max_depth.unwrap_or(default_max_depth);

    let packets = match &args.request_id {
        Some(request_id) => {
            let packet = capture.hydrate_body(&page, request_id).await.map_err(|e| {
                McpError::invalid_params(
                    format!("Could not summarize request id '{request_id}': {e}"),
                    None,
                )
            })?;
            vec![packet]
        }
        None => capture.hydrate_all(&page).await,
    };

    let summaries = summarize_packets_with_depth(&packets, max_depth);
    let summaries = serde_json::to_value(&summaries).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize summaries: {e}"), None)
    })?;

    Ok(json!({
        "count": packets.len(),
        "max_depth": max_depth,
        "summaries": summaries,
    }))
}
