//! Launches and supervises a local Open WebUI backend process.
//!
//! The supervisor owns the lifecycle of exactly one child process: it
//! spawns the backend with both output streams piped, classifies every
//! captured line, delivers the result to a registered sink, and exposes a
//! running/stopped status to observers. Presentation and configuration
//! persistence are left to the embedding application.

mod factory;
mod supervisor;

pub use factory::{platform_name, platform_terminator};
pub use supervisor::{ProcessHandle, ProcessSupervisor};

// Re-export core functionality
pub use webui_launcher_core::*;
