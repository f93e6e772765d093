//! Browser automation and network-capture tools for AI agents
//!
//! Exposes navigation, element interaction and CDP network capture as MCP
//! tools, plus a bounded-depth structural summarizer that turns captured
//! API responses into compact schemas an LLM can reason about.

pub mod browser;
pub mod browser_setup;
pub mod capture;
pub mod elements;
pub mod keys;
mod manager;
mod server;
mod tools;
mod utils;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub use capture::{
    CapturedPacket, DEFAULT_MAX_DEPTH, FailInfo, NetworkCapture, PacketBody, PacketStatus,
    PacketSummary, ResponseInfo, summarize_json, summarize_packet, summarize_packet_with_depth,
    summarize_packets, summarize_packets_with_depth,
};
pub use elements::ElementRegistry;
pub use manager::BrowserManager;
pub use server::PagescanServer;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Network capture and summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Recursion ceiling for JSON schema summaries
    #[serde(default = "default_summary_max_depth")]
    pub summary_max_depth: usize,
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_summary_max_depth() -> usize {
    capture::DEFAULT_MAX_DEPTH
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            summary_max_depth: default_summary_max_depth(),
        }
    }
}

/// Load config from config.yaml in the package root, falling back to
/// defaults when the file is absent.
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_headless_and_secure() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert!(!config.browser.disable_security);
        assert_eq!(config.capture.summary_max_depth, capture::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("browser:\n  headless: false\n").unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window.width, 1280);
        assert_eq!(config.capture.summary_max_depth, capture::DEFAULT_MAX_DEPTH);
    }
}
