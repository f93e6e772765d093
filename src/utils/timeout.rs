//! Timeout validation for browser operations

use rmcp::ErrorData as McpError;
use std::time::Duration;

/// Ceiling for navigation operations; covers slow sites and heavy SPAs.
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// Ceiling for element interaction; covers dynamic rendering and
/// animations.
pub const MAX_INTERACTION_TIMEOUT_MS: u64 = 30_000; // 30 seconds

/// Validate a navigation timeout (navigate, wait_for_selector), applying
/// `default_ms` when none was given.
pub fn validate_navigation_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration, McpError> {
    let ms = timeout_ms.unwrap_or(default_ms);

    if ms > MAX_NAVIGATION_TIMEOUT_MS {
        return Err(McpError::invalid_params(
            format!(
                "Timeout cannot exceed {}ms ({} minutes). Received: {}ms",
                MAX_NAVIGATION_TIMEOUT_MS,
                MAX_NAVIGATION_TIMEOUT_MS / 60_000,
                ms
            ),
            None,
        ));
    }

    Ok(Duration::from_millis(ms))
}

/// Validate an interaction timeout (find, click, input).
pub fn validate_interaction_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration, McpError> {
    let ms = timeout_ms.unwrap_or(default_ms);

    if ms > MAX_INTERACTION_TIMEOUT_MS {
        return Err(McpError::invalid_params(
            format!(
                "Timeout cannot exceed {}ms ({} seconds). Received: {}ms",
                MAX_INTERACTION_TIMEOUT_MS,
                MAX_INTERACTION_TIMEOUT_MS / 1000,
                ms
            ),
            None,
        ));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applies_when_unset() {
        let timeout = validate_navigation_timeout(None, 30_000).unwrap();
        assert_eq!(timeout, Duration::from_millis(30_000));
    }

    #[test]
    fn explicit_value_wins_over_default() {
        let timeout = validate_interaction_timeout(Some(2_500), 5_000).unwrap();
        assert_eq!(timeout, Duration::from_millis(2_500));
    }

    #[test]
    fn ceilings_are_enforced() {
        assert!(validate_navigation_timeout(Some(MAX_NAVIGATION_TIMEOUT_MS + 1), 30_000).is_err());
        assert!(validate_interaction_timeout(Some(MAX_INTERACTION_TIMEOUT_MS + 1), 5_000).is_err());
        assert!(validate_navigation_timeout(Some(MAX_NAVIGATION_TIMEOUT_MS), 30_000).is_ok());
    }
}
