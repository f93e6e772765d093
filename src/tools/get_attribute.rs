//! Attribute reader for previously located elements

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::elements::ElementRegistry;
use crate::tools::cached_element;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAttributeArgs {
    /// Element id returned by browser_find_element
    pub element_id: String,
    /// Attribute to read, e.g. "href", "value", "class"
    pub attribute_name: String,
}

/// Read one HTML attribute from a cached element. A missing attribute is
/// reported as a null value, not an error.
pub async fn get_attribute(
    registry: &ElementRegistry,
    args: GetAttributeArgs,
) -> Result<Value, McpError> {
    if args.attribute_name.trim().is_empty() {
        return Err(McpError::invalid_params("Attribute name cannot be empty", None));
    }

    let element = cached_element(registry, &args.element_id)?;

    let value = element.attribute(&args.attribute_name).await.map_err(|e| {
        McpError::internal_error(
            format!(
                "Failed to read attribute '{}' from element '{}'. \
                 The handle may be stale; re-run browser_find_element. Error: {e}",
                args.attribute_name, args.element_id
            ),
            None,
        )
    })?;

    Ok(json!({
        "element_id": args.element_id,
        "attribute_name": args.attribute_name,
        "attribute_value": value,
    }))
}
