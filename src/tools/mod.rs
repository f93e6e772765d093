//! Browser automation tool implementations
//!
//! Each module owns one tool's argument type and operation. The rmcp
//! router in `crate::server` wires them to the wire protocol.

pub mod click;
pub mod export_csv;
pub mod extract_text;
pub mod find_element;
pub mod get_attribute;
pub mod input_text;
pub mod navigate;
pub mod network;
pub mod run_js;
pub mod screenshot;
pub mod send_key;
pub mod wait;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use rmcp::ErrorData as McpError;
use std::fmt::Display;
use std::sync::Arc;

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;

pub(crate) fn browser_error(e: impl Display) -> McpError {
    McpError::internal_error(format!("Browser error: {e}"), None)
}

/// The page the agent is working on.
///
/// Tools other than navigate never create pages; they act on the page the
/// last navigation produced and tell the agent to navigate when there is
/// none.
pub(crate) async fn active_page(manager: &BrowserManager) -> Result<Page, McpError> {
    if let Some(page) = manager.get_current_page().await {
        return Ok(page);
    }

    let browser_arc = manager.get_or_launch().await.map_err(browser_error)?;
    let guard = browser_arc.lock().await;
    let wrapper = guard.as_ref().ok_or_else(|| {
        McpError::internal_error(
            "Browser not available. This is an internal error - please report it.",
            None,
        )
    })?;

    crate::browser::get_current_page(wrapper)
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))
}

/// Resolve a cached element id, with remediation hints when it is gone.
pub(crate) fn cached_element(
    registry: &ElementRegistry,
    element_id: &str,
) -> Result<Arc<Element>, McpError> {
    registry.get(element_id).ok_or_else(|| {
        McpError::invalid_params(
            format!(
                "Element id '{element_id}' not found in the registry. \
                 Element handles go stale after navigation; call \
                 browser_find_element again to get a fresh id."
            ),
            None,
        )
    })
}
