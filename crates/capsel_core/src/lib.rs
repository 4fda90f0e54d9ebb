//! Capsel Core - capture-to-selection pipeline for a media picker
//!
//! This crate contains the pipeline logic with zero UI dependencies. Camera
//! UIs, the transcoder, the system library and every view are reached
//! through the traits in [`services`].

pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod services;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
