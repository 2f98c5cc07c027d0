use async_trait::async_trait;

/// OS process identifier of the supervised child.
pub type ProcessId = u32;

/// Outcome of a platform termination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The process (and its descendants, where the platform allows) was
    /// signalled successfully.
    Terminated,
    /// The process was already gone.
    NotFound,
    /// Insufficient privileges to signal the process.
    AccessDenied,
    /// Platform-specific failure.
    Failed(String),
}

/// Platform seam for forcibly ending the supervised process.
///
/// Implementations only signal; the supervisor observes the resulting exit
/// through its wait loop, so `terminate` must be safe to call while the
/// capture loops are still reading.
#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    async fn terminate(&self, pid: ProcessId) -> TerminationOutcome;
}
