//! Text extraction tool - page or element text content

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::manager::BrowserManager;
use crate::tools::active_page;
use crate::utils::{validate_interaction_timeout, wait_for_element};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractTextArgs {
    /// CSS selector to extract from; the whole body when omitted
    pub selector: Option<String>,
    /// How long to wait for the selector to appear (default 5000)
    pub timeout_ms: Option<u64>,
}

/// Extract rendered text for agent analysis.
pub async fn extract_text(
    manager: &BrowserManager,
    args: ExtractTextArgs,
) -> Result<Value, McpError> {
    let page = active_page(manager).await?;

    let selector = args.selector.as_deref().unwrap_or("body");
    let timeout = validate_interaction_timeout(args.timeout_ms, 5_000)?;
    let element = wait_for_element(&page, selector, timeout).await?;

    let text = element
        .inner_text()
        .await
        .map_err(|e| {
            McpError::internal_error(
                format!("Failed to extract text from '{selector}'. Error: {e}"),
                None,
            )
        })?
        .unwrap_or_default();

    Ok(json!({
        "success": true,
        "selector": selector,
        "length": text.chars().count(),
        "text": text,
    }))
}
