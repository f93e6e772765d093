//! Browser infrastructure for launching and managing Chrome instances

mod wrapper;

pub use crate::browser_setup::find_browser_executable;
pub use wrapper::{BrowserWrapper, create_blank_page, get_current_page, launch_browser};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("No page loaded. Call browser_navigate first.")]
    NoActivePage,
}

pub type BrowserResult<T> = Result<T, BrowserError>;
