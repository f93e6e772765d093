//! Special key dispatch tool

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::keys::{SpecialKey, press_key};
use crate::manager::BrowserManager;
use crate::tools::active_page;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendKeyArgs {
    /// Key to send: Enter, Escape, Backspace, Tab, PageUp, PageDown, End
    /// or Home
    pub key: SpecialKey,
}

/// Send a special key to whatever element currently has focus. Useful for
/// submitting forms (Enter) or dismissing dialogs (Escape).
pub async fn send_key(manager: &BrowserManager, args: SendKeyArgs) -> Result<Value, McpError> {
    let page = active_page(manager).await?;

    press_key(&page, args.key)
        .await
        .map_err(|e| McpError::internal_error(format!("Key dispatch failed: {e}"), None))?;

    Ok(json!({
        "success": true,
        "action": "send_key",
        "key": args.key.key_name(),
    }))
}
