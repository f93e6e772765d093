//! Shared utilities for browser tools

mod timeout;
mod wait_for_element;

pub use timeout::{
    MAX_INTERACTION_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS, validate_interaction_timeout,
    validate_navigation_timeout,
};
pub use wait_for_element::wait_for_element;
