use thiserror::Error;

/// Errors surfaced synchronously from `ProcessSupervisor::start`.
///
/// None of these are fatal to the supervisor: the caller decides what to do
/// next and the supervisor stays in its previous state.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("failed to spawn backend process: {0}")]
    SpawnFailed(String),

    #[error("working directory does not exist: {0}")]
    InvalidWorkingDirectory(String),

    #[error("a supervised process is already running")]
    AlreadyRunning,
}

/// Errors surfaced from `ProcessSupervisor::terminate`.
///
/// Always recoverable: the caller may retry or ignore them.
#[derive(Error, Debug)]
pub enum TerminationError {
    #[error("termination signal failed: {0}")]
    SignalFailed(String),

    #[error("timed out waiting for the supervised process to exit")]
    Timeout,
}
