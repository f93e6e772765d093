//! Browser input tool - types text into a previously located element

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools::{active_page, cached_element};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InputTextArgs {
    /// Element id returned by browser_find_element
    pub element_id: String,
    /// Text to type
    pub text: String,
    /// Clear the field before typing (default true)
    pub clear_first: Option<bool>,
}

/// Focus a cached element and type into it.
pub async fn input_text(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: InputTextArgs,
) -> Result<Value, McpError> {
    let element = cached_element(registry, &args.element_id)?;
    let page = active_page(manager).await?;

    element.scroll_into_view().await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Failed to scroll element '{}' into view. Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    // Click to focus; the clickable-point path avoids the
    // IntersectionObserver hang.
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
                "Click to focus failed for element '{}'. \
                 Possible causes: (1) Element is obscured, \
                 (2) Element is disabled or not focusable. Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    if args.clear_first.unwrap_or(true) {
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| {
                McpError::internal_error(
                    format!(
                        "Failed to clear field for element '{}'. \
                         Possible causes: (1) Element is not an input/textarea, \
                         (2) Field is read-only or disabled. Error: {e}",
                        args.element_id
                    ),
                    None,
                )
            })?;
    }

    element.type_str(&args.text).await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Typing failed for element '{}'. \
                 Possible causes: (1) Element lost focus during typing, \
                 (2) Element is not a text input, \
                 (3) Field has input restrictions. Error: {e}",
                args.element_id
            ),
            None,
        )
    })?;

    Ok(json!({
        "success": true,
        "element_id": args.element_id,
        "text_length": args.text.len(),
        "message": format!("Typed {} characters", args.text.len())
    }))
}
