//! MCP server surface
//!
//! One router hosts the whole tool set; the operations themselves live in
//! `crate::tools`, one module per tool, and share the browser manager,
//! element registry and capture session held here.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde_json::Value;
use std::sync::Arc;

use crate::Config;
use crate::capture::NetworkCapture;
use crate::elements::ElementRegistry;
use crate::manager::BrowserManager;
use crate::tools;

const INSTRUCTIONS: &str = "Browser automation tools for web scanning and API discovery.\n\
    Typical flow: (1) browser_navigate to the target page, \
    (2) browser_find_element / browser_extract_text to locate content, \
    (3) browser_click / browser_input_text / browser_send_key to interact.\n\
    To capture API data: network_start_capture, then navigate or interact to \
    trigger requests, then network_traffic_summary to list them, then \
    network_summarize (compact structural summaries) or \
    network_response_body (one full body). export_csv writes JSON record \
    arrays to disk.";

fn json_result(value: Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::json(value)?]))
}

pub struct PagescanServer {
    manager: Arc<BrowserManager>,
    elements: Arc<ElementRegistry>,
    capture: Arc<NetworkCapture>,
    summary_max_depth: usize,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PagescanServer {
    pub fn new(config: Config) -> Self {
        Self {
            manager: Arc::new(BrowserManager::new(config.browser)),
            elements: Arc::new(ElementRegistry::new()),
            capture: Arc::new(NetworkCapture::new()),
            summary_max_depth: config.capture.summary_max_depth,
            tool_router: Self::tool_router(),
        }
    }

    /// Shared manager handle, for shutdown from the binary.
    pub fn manager(&self) -> Arc<BrowserManager> {
        self.manager.clone()
    }

    #[tool(
        description = "Navigate to a URL and wait for load completion. Closes any previous page; cached element ids become invalid. Returns the final URL (redirects followed)."
    )]
    async fn browser_navigate(
        &self,
        Parameters(args): Parameters<tools::navigate::NavigateArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::navigate::navigate(&self.manager, &self.elements, args).await?)
    }

    #[tool(
        description = "Find one element by CSS selector or fuzzy text match and cache its handle. Returns an element_id for the interaction tools plus the element's text and HTML snippet."
    )]
    async fn browser_find_element(
        &self,
        Parameters(args): Parameters<tools::find_element::FindElementArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::find_element::find_element(&self.manager, &self.elements, args).await?)
    }

    #[tool(
        description = "Find multiple elements by CSS selector or fuzzy text match. Returns an element_id and text per match."
    )]
    async fn browser_find_elements(
        &self,
        Parameters(args): Parameters<tools::find_element::FindElementsArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::find_element::find_elements(&self.manager, &self.elements, args).await?)
    }

    #[tool(description = "Click a previously found element by its element_id.")]
    async fn browser_click(
        &self,
        Parameters(args): Parameters<tools::click::ClickArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::click::click(&self.manager, &self.elements, args).await?)
    }

    #[tool(
        description = "Type text into a previously found element. Clears the field first unless clear_first is false."
    )]
    async fn browser_input_text(
        &self,
        Parameters(args): Parameters<tools::input_text::InputTextArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::input_text::input_text(&self.manager, &self.elements, args).await?)
    }

    #[tool(
        description = "Read one HTML attribute (href, value, class, ...) from a previously found element."
    )]
    async fn browser_get_attribute(
        &self,
        Parameters(args): Parameters<tools::get_attribute::GetAttributeArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::get_attribute::get_attribute(&self.elements, args).await?)
    }

    #[tool(
        description = "Send a special key (Enter, Escape, Backspace, Tab, PageUp, PageDown, End, Home) to the focused element. Enter submits forms, Escape closes dialogs."
    )]
    async fn browser_send_key(
        &self,
        Parameters(args): Parameters<tools::send_key::SendKeyArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::send_key::send_key(&self.manager, args).await?)
    }

    #[tool(
        description = "Screenshot the page, or one cached element via element_id. Returns a base64-encoded image."
    )]
    async fn browser_screenshot(
        &self,
        Parameters(args): Parameters<tools::screenshot::ScreenshotArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::screenshot::screenshot(&self.manager, &self.elements, args).await?)
    }

    #[tool(
        description = "Extract rendered text from the page body or a CSS-selected element."
    )]
    async fn browser_extract_text(
        &self,
        Parameters(args): Parameters<tools::extract_text::ExtractTextArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::extract_text::extract_text(&self.manager, args).await?)
    }

    #[tool(
        description = "Evaluate JavaScript in the page and return the result. Script errors come back as data so they can be read and fixed."
    )]
    async fn browser_run_js(
        &self,
        Parameters(args): Parameters<tools::run_js::RunJsArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::run_js::run_js(&self.manager, args).await?)
    }

    #[tool(description = "Pause for the given number of seconds (max 60).")]
    async fn browser_wait(
        &self,
        Parameters(args): Parameters<tools::wait::WaitArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::wait::wait(args).await?)
    }

    #[tool(description = "Drop all cached element handles.")]
    async fn browser_clear_elements(&self) -> Result<CallToolResult, McpError> {
        json_result(tools::find_element::clear_elements(&self.elements)?)
    }

    #[tool(
        description = "Step 1 of API discovery: start capturing network traffic on the current page. Resets any previous capture."
    )]
    async fn network_start_capture(&self) -> Result<CallToolResult, McpError> {
        json_result(tools::network::start_capture(&self.manager, &self.capture).await?)
    }

    #[tool(
        description = "Step 2 of API discovery: list captured requests (id, URL, method, status, MIME type) without bodies, to pick the interesting ones."
    )]
    async fn network_traffic_summary(&self) -> Result<CallToolResult, McpError> {
        json_result(tools::network::traffic_summary(&self.capture).await?)
    }

    #[tool(
        description = "Fetch one captured response body by request_id, classified as json, text or binary."
    )]
    async fn network_response_body(
        &self,
        Parameters(args): Parameters<tools::network::ResponseBodyArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::network::response_body(&self.manager, &self.capture, args).await?)
    }

    #[tool(
        description = "Step 3 of API discovery: compact structural summaries of captured responses. JSON bodies become bounded-depth schemas (lists sampled by their first element); binary and text bodies become short descriptions. Summarizes everything, or one request via request_id."
    )]
    async fn network_summarize(
        &self,
        Parameters(args): Parameters<tools::network::SummarizeArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(
            tools::network::summarize(
                &self.manager,
                &self.capture,
                self.summary_max_depth,
                args,
            )
            .await?,
        )
    }

    #[tool(
        description = "Write a JSON array of records to a CSV file. Nested objects become dotted columns. Filename must end with .csv."
    )]
    async fn export_csv(
        &self,
        Parameters(args): Parameters<tools::export_csv::ExportCsvArgs>,
    ) -> Result<CallToolResult, McpError> {
        json_result(tools::export_csv::export_csv(args).await?)
    }
}

#[tool_handler]
impl ServerHandler for PagescanServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}
