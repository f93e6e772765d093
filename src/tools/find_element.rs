//! Element lookup tools - locate elements and cache their handles
//!
//! Lookup supports two strategies: a CSS selector, or a fuzzy text match.
//! Text matching has no CSS equivalent, so matching leaf elements are
//! tagged with a transient data attribute from JavaScript and then
//! collected with an attribute selector.

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools::active_page;
use crate::utils::{validate_interaction_timeout, wait_for_element};

const HIT_ATTRIBUTE: &str = "data-pagescan-hit";

/// Cap on the outer-HTML snippet returned per element.
const HTML_SNIPPET_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// CSS selector match
    Css,
    /// Fuzzy text-content match on leaf elements
    Text,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindElementArgs {
    /// Locator strategy: "css" or "text"
    pub by: LocatorStrategy,
    /// Selector or text fragment to match
    pub value: String,
    /// How long to keep polling for the element (default 5000, max 30000)
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindElementsArgs {
    /// Locator strategy: "css" or "text"
    pub by: LocatorStrategy,
    /// Selector or text fragment to match
    pub value: String,
    /// Maximum number of elements to return (default 20)
    pub limit: Option<usize>,
}

/// Find one element, cache its handle, return its id plus identifying
/// content.
pub async fn find_element(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: FindElementArgs,
) -> Result<Value, McpError> {
    if args.value.trim().is_empty() {
        return Err(McpError::invalid_params("Locator value cannot be empty", None));
    }

    let page = active_page(manager).await?;
    let timeout = validate_interaction_timeout(args.timeout_ms, 5_000)?;

    let element = match args.by {
        LocatorStrategy::Css => wait_for_element(&page, &args.value, timeout).await?,
        LocatorStrategy::Text => {
            let mut matches = find_by_text(&page, &args.value, 1).await?;
            matches.pop().ok_or_else(|| text_not_found(&args.value))?
        }
    };

    let description = describe_element(&element).await;
    let element_id = registry.insert(element);

    Ok(json!({
        "element_id": element_id,
        "text": description.text,
        "html": description.html,
    }))
}

/// Find multiple elements, cache each handle.
pub async fn find_elements(
    manager: &BrowserManager,
    registry: &ElementRegistry,
    args: FindElementsArgs,
) -> Result<Value, McpError> {
    if args.value.trim().is_empty() {
        return Err(McpError::invalid_params("Locator value cannot be empty", None));
    }

    let page = active_page(manager).await?;
    let limit = args.limit.unwrap_or(20).max(1);

    let elements = match args.by {
        LocatorStrategy::Css => page.find_elements(&args.value).await.map_err(|e| {
            McpError::internal_error(
                format!(
                    "Element query failed for selector '{}'. \
                     Verify the selector syntax is valid CSS. Error: {e}",
                    args.value
                ),
                None,
            )
        })?,
        LocatorStrategy::Text => find_by_text(&page, &args.value, limit).await?,
    };

    if elements.is_empty() {
        return Err(match args.by {
            LocatorStrategy::Css => McpError::internal_error(
                format!("No elements found for selector '{}'", args.value),
                None,
            ),
            LocatorStrategy::Text => text_not_found(&args.value),
        });
    }

    let mut results = Vec::new();
    for element in elements.into_iter().take(limit) {
        let description = describe_element(&element).await;
        let element_id = registry.insert(element);
        results.push(json!({
            "element_id": element_id,
            "text": description.text,
        }));
    }

    Ok(json!({ "elements": results }))
}

/// Drop every cached element handle.
///
/// Recommended after major page changes (navigation does this
/// automatically) so stale handles cannot be interacted with.
pub fn clear_elements(registry: &ElementRegistry) -> Result<Value, McpError> {
    let removed = registry.clear();
    Ok(json!({
        "success": true,
        "removed": removed,
        "message": format!("Element registry cleared. {removed} handles removed."),
    }))
}

fn text_not_found(needle: &str) -> McpError {
    McpError::internal_error(
        format!(
            "No element found containing text '{needle}'. \
             Try: (1) A shorter or exact fragment of the visible text, \
             (2) browser_extract_text to inspect what the page renders, \
             (3) A CSS selector instead."
        ),
        None,
    )
}

struct ElementDescription {
    text: Option<String>,
    html: Option<String>,
}

/// Best-effort identifying content for an element. Failures here should
/// never fail the lookup itself.
async fn describe_element(element: &Element) -> ElementDescription {
    let text = element.inner_text().await.ok().flatten();
    let html = element
        .call_js_fn("function() { return this.outerHTML; }", false)
        .await
        .ok()
        .and_then(|v| v.result.value)
        .and_then(|value| value.as_str().map(|s| s.to_string()))
        .map(|html| {
            if html.chars().count() > HTML_SNIPPET_CHARS {
                let truncated: String = html.chars().take(HTML_SNIPPET_CHARS).collect();
                format!("{truncated}…")
            } else {
                html
            }
        });
    ElementDescription { text, html }
}

/// Tag leaf elements whose text contains `needle`, then collect them via
/// an attribute selector. The tag is removed once handles are obtained so
/// repeated searches start clean.
async fn find_by_text(page: &Page, needle: &str, limit: usize) -> Result<Vec<Element>, McpError> {
    // Serialize the needle through serde_json so quoting is safe inside
    // the script.
    let needle_literal = Value::String(needle.to_string()).to_string();
    let script = format!(
        r#"(() => {{
            const needle = {needle_literal};
            const limit = {limit};
            for (const stale of document.querySelectorAll('[{HIT_ATTRIBUTE}]')) {{
                stale.removeAttribute('{HIT_ATTRIBUTE}');
            }}
            let hits = 0;
            const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT);
            while (walker.nextNode() && hits < limit) {{
                const el = walker.currentNode;
                if (el.childElementCount === 0 && el.textContent && el.textContent.includes(needle)) {{
                    el.setAttribute('{HIT_ATTRIBUTE}', String(hits));
                    hits += 1;
                }}
            }}
            return hits;
        }})()"#
    );

    let evaluation = page
        .evaluate(script)
        .await
        .map_err(|e| McpError::internal_error(format!("Text search script failed: {e}"), None))?;
    let hits = evaluation.value().and_then(Value::as_u64).unwrap_or(0);

    if hits == 0 {
        return Ok(Vec::new());
    }

    let elements = page
        .find_elements(format!("[{HIT_ATTRIBUTE}]"))
        .await
        .map_err(|e| {
            McpError::internal_error(format!("Failed to collect text matches: {e}"), None)
        })?;

    for element in &elements {
        let _ = element
            .call_js_fn(
                &format!("function() {{ this.removeAttribute('{HIT_ATTRIBUTE}'); }}"),
                false,
            )
            .await;
    }

    Ok(elements)
}
