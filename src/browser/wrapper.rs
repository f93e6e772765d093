//! Browser instance wrapper tying together the Chrome process, its CDP
//! event-handler task and the temporary profile directory.

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BrowserError, BrowserResult};

/// Owns a launched browser and its handler task.
///
/// The handler task MUST be aborted when the browser is done, otherwise it
/// keeps polling a dead websocket. `Drop` takes care of that; the profile
/// directory is only removed on the explicit shutdown path, after Chrome
/// has released its file handles.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    pub(crate) fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Remove the profile directory. Must run after `browser.wait()` so
    /// Chrome no longer holds files in it.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Removing profile dir: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to remove profile dir {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if let Some(path) = self.user_data_dir.as_ref() {
            warn!(
                "BrowserWrapper dropped without shutdown; profile dir orphaned: {}",
                path.display()
            );
        }
    }
}

/// Launch a browser instance with an isolated profile directory.
pub async fn launch_browser(config: &crate::BrowserConfig) -> BrowserResult<BrowserWrapper> {
    let user_data_dir =
        std::env::temp_dir().join(format!("pagescan_profile_{}", std::process::id()));
    let (browser, handler, user_data_dir) =
        crate::browser_setup::launch_browser(config, user_data_dir)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}

/// Create a fresh blank page.
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> BrowserResult<Page> {
    wrapper
        .browser()
        .new_page("about:blank")
        .await
        .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))
}

/// Get the active page.
///
/// Under the single-page model the first page is the only page; callers
/// get an actionable error when navigation has not happened yet.
pub async fn get_current_page(wrapper: &BrowserWrapper) -> BrowserResult<Page> {
    let pages = wrapper
        .browser()
        .pages()
        .await
        .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

    pages.into_iter().next().ok_or(BrowserError::NoActivePage)
}
