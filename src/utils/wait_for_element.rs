//! Element polling for SPA support
//!
//! SPAs render elements from JavaScript well after the load event fires,
//! so a single `find_element` call is not enough. Poll with exponential
//! backoff until the element appears or the timeout expires.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use rmcp::ErrorData as McpError;

/// Wait for `selector` to match an element, polling with exponential
/// backoff (100ms start, doubling, capped at 1s).
pub async fn wait_for_element(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Element, McpError> {
    let start = std::time::Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }

        if start.elapsed() >= timeout {
            return Err(McpError::internal_error(
                format!(
                    "Element not found (timeout after {}ms): '{}'. \
                     Try: (1) Verify selector with browser dev tools, \
                     (2) Ensure the element is loaded and visible, \
                     (3) Increase timeout_ms.",
                    timeout.as_millis(),
                    selector
                ),
                None,
            ));
        }

        tokio::time::sleep(poll_interval).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}
