//! Platform-independent core for supervising a local web-service backend.
//!
//! This crate provides the launch configuration, output-event model, the
//! pure log-line classifier, the line-capture plumbing, and the platform
//! seam for forced termination. The `webui-launcher` crate wires these into
//! the actual supervisor.

pub mod capture;
pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod terminate;

pub use config::*;
pub use error::*;
pub use events::*;
pub use terminate::*;
