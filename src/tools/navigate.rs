//! Browser navigation tool - loads URLs and waits for page ready

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools::browser_error;
use crate::utils::validate_navigation_timeout;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NavigateArgs {
    /// Target URL; must start with http:// or https://
    pub url: String,
    /// Navigation timeout in milliseconds (default 30000, max 300000)
    pub timeout_ms: Option<u64>,
    /// CSS selector to wait for after the load event, for SPAs that render
    /// content late
    pub wait_for_selector: Option<String>,
}

/// Navigate the browser to a URL, enforcing the single-page model.
///
/// All existing pages are closed first so `active_page` stays
/// deterministic; cached element handles are dropped for the same reason.
pub async fn navigate(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: NavigateArgs,
) -> Result<Value, McpError> {
    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        return Err(McpError::invalid_params(
            "URL must start with http:// or https://",
            None,
        ));
    }

    let browser_arc = manager.get_or_launch().await.map_err(browser_error)?;
    let browser_guard = browser_arc.lock().await;
    let wrapper = browser_guard.as_ref().ok_or_else(|| {
        McpError::internal_error(
            "Browser not available. This is an internal error - please report it.",
            None,
        )
    })?;

    if let Ok(existing_pages) = wrapper.browser().pages().await {
        for page in existing_pages {
            // Pages may already be closed or unresponsive.
            let _ = page.close().await;
        }
    }

    let page = crate::browser::create_blank_page(wrapper)
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    let timeout = validate_navigation_timeout(args.timeout_ms, 30_000)?;
    tokio::time::timeout(timeout, page.goto(&args.url))
        .await
        .map_err(|_| {
            McpError::internal_error(
                format!(
                    "Navigation timeout after {}ms for URL: {}. \
                     Try: (1) Increase timeout_ms (default: 30000), \
                     (2) Verify the URL is reachable in a browser, \
                     (3) Check whether the site blocks headless browsers.",
                    timeout.as_millis(),
                    args.url
                ),
                None,
            )
        })?
        .map_err(|e| {
            McpError::internal_error(
                format!(
                    "Navigation failed for URL: {}. \
                     Check: (1) URL formatting, (2) network connectivity, \
                     (3) that the URL returns a valid HTTP response. Error: {e}",
                    args.url
                ),
                None,
            )
        })?;

    page.wait_for_navigation().await.map_err(|e| {
        McpError::internal_error(format!("Failed to wait for page load completion: {e}"), None)
    })?;

    if let Some(selector) = &args.wait_for_selector {
        crate::utils::wait_for_element(&page, selector, timeout).await?;
    }

    let final_url = page
        .url()
        .await
        .map_err(|e| McpError::internal_error(format!("Failed to get URL: {e}"), None))?
        .unwrap_or_else(|| args.url.clone());

    // Navigation invalidates every cached element handle.
    let dropped = registry.clear();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} stale element handles after navigation");
    }

    manager.set_current_page(page).await;

    Ok(json!({
        "success": true,
        "url": final_url,
        "requested_url": args.url,
        "redirected": final_url != args.url,
        "message": format!("Navigated to {final_url}")
    }))
}
