//! Arbitrary JavaScript execution tool
//!
//! Escape hatch for information the standard tools cannot reach. Script
//! errors are returned as data so the agent can read the message and fix
//! its own code, instead of surfacing as a tool failure.

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::manager::BrowserManager;
use crate::tools::active_page;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunJsArgs {
    /// JavaScript to evaluate in the page. The value of the final
    /// expression is returned, e.g. "document.title"
    pub script: String,
}

pub async fn run_js(manager: &BrowserManager, args: RunJsArgs) -> Result<Value, McpError> {
    if args.script.trim().is_empty() {
        return Err(McpError::invalid_params("Script cannot be empty", None));
    }

    let page = active_page(manager).await?;

    match page.evaluate(args.script).await {
        Ok(evaluation) => {
            let result = evaluation.value().cloned().unwrap_or(Value::Null);
            Ok(json!({ "result": result }))
        }
        Err(e) => Ok(json!({
            "error": format!("JavaScript execution failed: {e}")
        })),
    }
}
