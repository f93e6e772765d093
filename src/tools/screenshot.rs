//! Browser screenshot tool - captures the page or a cached element

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide_cdp::cdp::browser_protocol::page::CaptureScreenshotFormat;
use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools::{active_page, cached_element};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScreenshotArgs {
    /// Image format: "png" (default) or "jpeg"
    pub format: Option<String>,
    /// Capture only this cached element instead of the full page
    pub element_id: Option<String>,
}

/// Capture a screenshot, returned base64-encoded.
pub async fn screenshot(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: ScreenshotArgs,
) -> Result<Value, McpError> {
    let format_str = match args.format.as_deref() {
        Some("jpeg") | Some("jpg") => "jpeg",
        Some("png") | None => "png",
        Some(other) => {
            return Err(McpError::invalid_params(
                format!("Unsupported format '{other}'. Use \"png\" or \"jpeg\"."),
                None,
            ));
        }
    };
    let format_enum = match format_str {
        "jpeg" => CaptureScreenshotFormat::Jpeg,
        _ => CaptureScreenshotFormat::Png,
    };

    let image_data = if let Some(element_id) = &args.element_id {
        let element = cached_element(registry, element_id)?;
        element.screenshot(format_enum).await.map_err(|e| {
            McpError::internal_error(
                format!(
                    "Element screenshot failed for '{element_id}'. \
                     Possible causes: (1) Element is not visible or has no dimensions, \
                     (2) Element is off-screen, \
                     (3) The handle is stale. Error: {e}"
                ),
                None,
            )
        })?
    } else {
        let page = active_page(manager).await?;
        let params = ScreenshotParams::builder().format(format_enum).build();
        page.screenshot(params).await.map_err(|e| {
            McpError::internal_error(
                format!(
                    "Page screenshot failed. \
                     Possible causes: (1) Page has not fully loaded, \
                     (2) Page has excessive dimensions, \
                     (3) Browser is in an invalid state. Error: {e}"
                ),
                None,
            )
        })?
    };

    let base64_image = BASE64.encode(&image_data);

    Ok(json!({
        "success": true,
        "image": base64_image,
        "format": format_str,
        "size_bytes": image_data.len(),
        "element_id": args.element_id,
        "message": format!("Screenshot captured ({} bytes, {} format)", image_data.len(), format_str),
    }))
}
