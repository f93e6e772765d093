//! Named key dispatch
//!
//! Maps the small set of special keys the agent may send to CDP
//! `Input.dispatchKeyEvent` parameters. Keys are dispatched as a
//! keyDown/keyUp pair against the page, not against a specific element.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide_cdp::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType,
};
use schemars::JsonSchema;
use serde::Deserialize;

/// Special keys supported by `browser_send_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
pub enum SpecialKey {
    Enter,
    Escape,
    Backspace,
    Tab,
    PageUp,
    PageDown,
    End,
    Home,
}

impl SpecialKey {
    /// DOM `key` value for the event.
    pub fn key_name(&self) -> &'static str {
        match self {
            SpecialKey::Enter => "Enter",
            SpecialKey::Escape => "Escape",
            SpecialKey::Backspace => "Backspace",
            SpecialKey::Tab => "Tab",
            SpecialKey::PageUp => "PageUp",
            SpecialKey::PageDown => "PageDown",
            SpecialKey::End => "End",
            SpecialKey::Home => "Home",
        }
    }

    /// Windows virtual key code, which Chrome uses to resolve the key on
    /// all platforms.
    pub fn virtual_key_code(&self) -> i64 {
        match self {
            SpecialKey::Enter => 13,
            SpecialKey::Escape => 27,
            SpecialKey::Backspace => 8,
            SpecialKey::Tab => 9,
            SpecialKey::PageUp => 33,
            SpecialKey::PageDown => 34,
            SpecialKey::End => 35,
            SpecialKey::Home => 36,
        }
    }

    /// Text payload for keys that produce input. Enter must carry "\r" for
    /// form submission to fire.
    pub fn text(&self) -> Option<&'static str> {
        match self {
            SpecialKey::Enter => Some("\r"),
            _ => None,
        }
    }
}

/// Dispatch a keyDown/keyUp pair for `key` to the focused element.
pub async fn press_key(page: &Page, key: SpecialKey) -> Result<()> {
    let mut down = DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::KeyDown)
        .key(key.key_name())
        .windows_virtual_key_code(key.virtual_key_code())
        .native_virtual_key_code(key.virtual_key_code());
    if let Some(text) = key.text() {
        down = down.text(text);
    }
    let down = down
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build keyDown event: {e}"))?;
    page.execute(down)
        .await
        .with_context(|| format!("keyDown dispatch failed for {:?}", key))?;

    let up = DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::KeyUp)
        .key(key.key_name())
        .windows_virtual_key_code(key.virtual_key_code())
        .native_virtual_key_code(key.virtual_key_code())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build keyUp event: {e}"))?;
    page.execute(up)
        .await
        .with_context(|| format!("keyUp dispatch failed for {:?}", key))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [SpecialKey; 8] = [
        SpecialKey::Enter,
        SpecialKey::Escape,
        SpecialKey::Backspace,
        SpecialKey::Tab,
        SpecialKey::PageUp,
        SpecialKey::PageDown,
        SpecialKey::End,
        SpecialKey::Home,
    ];

    #[test]
    fn every_key_maps_to_a_dom_key_name() {
        for key in ALL_KEYS {
            assert!(!key.key_name().is_empty());
            assert!(key.virtual_key_code() > 0);
        }
    }

    #[test]
    fn only_enter_carries_text() {
        for key in ALL_KEYS {
            match key {
                SpecialKey::Enter => assert_eq!(key.text(), Some("\r")),
                _ => assert_eq!(key.text(), None),
            }
        }
    }

    #[test]
    fn key_names_deserialize_from_wire_form() {
        let key: SpecialKey = serde_json::from_str("\"PageDown\"").unwrap();
        assert_eq!(key, SpecialKey::PageDown);
    }
}
