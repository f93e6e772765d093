//! Shared browser instance manager
//!
//! One browser process serves every tool. The manager lazy-launches it on
//! first use, health-checks it on every access and relaunches after a
//! crash, so a dead Chrome never requires a server restart.
//!
//! Browser access is async end to end, so the instance lives behind a
//! `tokio::sync::Mutex` (a sync lock must not be held across `.await`).

use anyhow::Result;
use chromiumoxide::page::Page;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserWrapper, launch_browser};

pub struct BrowserManager {
    config: BrowserConfig,
    browser: Arc<Mutex<Option<BrowserWrapper>>>,
    current_page: Arc<Mutex<Option<Page>>>,
}

impl BrowserManager {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            browser: Arc::new(Mutex::new(None)),
            current_page: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the shared browser, launching or relaunching as needed.
    ///
    /// The health check is a `Browser.version` round-trip; when it fails
    /// the crashed instance is cleaned up and a fresh one launched, which
    /// is transparent to the caller apart from the ~2-3s launch cost.
    ///
    /// Returns the browser mutex; callers lock it to reach the wrapper.
    pub async fn get_or_launch(&self) -> Result<Arc<Mutex<Option<BrowserWrapper>>>> {
        let mut guard = self.browser.lock().await;

        if let Some(wrapper) = guard.as_ref() {
            match wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed");
                    drop(guard);
                    return Ok(self.browser.clone());
                }
                Err(e) => {
                    warn!("Browser health check failed: {e}. Relaunching...");
                    if let Some(mut crashed) = guard.take() {
                        let _ = crashed.browser_mut().close().await;
                        let _ = crashed.browser_mut().wait().await;
                        crashed.cleanup_temp_dir();
                    }
                    // A crashed browser takes its pages with it.
                    self.current_page.lock().await.take();
                }
            }
        }

        info!("Launching browser");
        *guard = Some(launch_browser(&self.config).await?);
        drop(guard);

        Ok(self.browser.clone())
    }

    /// Close the browser process and clean up its profile directory.
    ///
    /// `close()` asks Chrome to exit and `wait()` blocks until the process
    /// is gone; skipping `wait()` leaves a zombie and a locked profile
    /// directory. Safe to call repeatedly.
    pub async fn shutdown(&self) -> Result<()> {
        self.current_page.lock().await.take();

        let mut guard = self.browser.lock().await;
        if let Some(mut wrapper) = guard.take() {
            info!("Shutting down browser");
            if let Err(e) = wrapper.browser_mut().close().await {
                warn!("Failed to close browser cleanly: {e}");
            }
            if let Err(e) = wrapper.browser_mut().wait().await {
                warn!("Failed to wait for browser exit: {e}");
            }
            wrapper.cleanup_temp_dir();
        }

        Ok(())
    }

    /// Page set by the most recent navigation, if any.
    pub async fn get_current_page(&self) -> Option<Page> {
        self.current_page.lock().await.clone()
    }

    /// Store the page for other tools to act on. Replaces any previous
    /// page.
    pub async fn set_current_page(&self, page: Page) {
        *self.current_page.lock().await = Some(page);
    }

    pub async fn is_browser_running(&self) -> bool {
        self.browser.lock().await.is_some()
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        // Drop only aborts the handler task via BrowserWrapper::drop; a
        // clean exit goes through shutdown() first.
        info!("BrowserManager dropping");
    }
}
