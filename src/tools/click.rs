//! Browser click tool - clicks a previously located element

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools::{active_page, cached_element};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClickArgs {
    /// Element id returned by browser_find_element
    pub element_id: String,
    /// Wait for a navigation triggered by the click (links, submit
    /// buttons)
    pub wait_for_navigation: Option<bool>,
}

/// Click a cached element via its clickable point.
///
/// Clicking through `page.click(point)` instead of the element's own click
/// helper avoids the IntersectionObserver hang on elements that are
/// covered while scrolling.
pub async fn click(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: ClickArgs,
) -> Result<Value, McpError> {
    let element = cached_element(registry, &args.element_id)?;
    let page = active_page(manager).await?;

    element.scroll_into_view().await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Failed to scroll element '{}' into view. \
                 The handle may be stale; re-run browser_find_element. Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    let point = element.clickable_point().await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Failed to get clickable point for element '{}'. \
                 The element may not be visible. Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    page.click(point).await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Click failed for element '{}'. \
                 Possible causes: (1) Element is obscured by another element, \
                 (2) Element is disabled, \
                 (3) Page changed after the element was found. \
                 Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    if args.wait_for_navigation.unwrap_or(false) {
        page.wait_for_navigation().await.map_err(|e| {
            McpError::internal_error(format!("Navigation after click failed: {e}"), None)
        })?;
    }

    Ok(json!({
        "success": true,
        "element_id": args.element_id,
        "message": "Element clicked successfully"
    }))
}
