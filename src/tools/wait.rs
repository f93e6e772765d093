//! Bounded pause tool for letting asynchronous page work settle

use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Longest pause a single call may request.
pub const MAX_WAIT_SECONDS: f64 = 60.0;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WaitArgs {
    /// Seconds to pause (max 60)
    pub seconds: f64,
}

pub async fn wait(args: WaitArgs) -> Result<Value, McpError> {
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        return Err(McpError::invalid_params(
            "seconds must be a non-negative number",
            None,
        ));
    }
    if args.seconds > MAX_WAIT_SECONDS {
        return Err(McpError::invalid_params(
            format!("seconds cannot exceed {MAX_WAIT_SECONDS}"),
            None,
        ));
    }

    tokio::time::sleep(Duration::from_secs_f64(args.seconds)).await;

    Ok(json!({
        "success": true,
        "message": format!("Waited for {} seconds", args.seconds)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_negative_and_oversized_waits() {
        assert!(wait(WaitArgs { seconds: -1.0 }).await.is_err());
        assert!(wait(WaitArgs { seconds: f64::NAN }).await.is_err());
        assert!(wait(WaitArgs { seconds: 61.0 }).await.is_err());
    }

    #[tokio::test]
    async fn short_wait_completes() {
        let result = wait(WaitArgs { seconds: 0.01 }).await.unwrap();
        assert_eq!(result["success"], true);
    }
}
