#[cfg(unix)]
mod unix_impl {
    use async_trait::async_trait;
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid as NixPid;
    use std::time::Duration;
    use tracing::{info, warn};
    use webui_launcher_core::{ProcessId, ProcessTerminator, TerminationOutcome};

    /// Terminates the supervised process group: SIGTERM first for a graceful
    /// shutdown, then SIGKILL after a short grace period.
    ///
    /// The supervisor spawns the backend into its own process group, so
    /// signalling the group also reaches any workers the backend forked.
    pub struct UnixProcessTerminator;

    #[async_trait]
    impl ProcessTerminator for UnixProcessTerminator {
        async fn terminate(&self, pid: ProcessId) -> TerminationOutcome {
            let pgid = NixPid::from_raw(pid as i32);

            match signal::killpg(pgid, Signal::SIGTERM) {
                Ok(()) => {
                    info!("Sent SIGTERM to process group {}", pid);

                    // Give the group a moment to shut down before escalating
                    tokio::time::sleep(Duration::from_millis(500)).await;

                    match signal::killpg(pgid, Signal::SIGKILL) {
                        Ok(()) => {
                            info!("Sent SIGKILL to process group {}", pid);
                            TerminationOutcome::Terminated
                        }
                        Err(Errno::ESRCH) => {
                            info!("Process group {} already exited", pid);
                            TerminationOutcome::Terminated
                        }
                        Err(e) => {
                            warn!("Failed to send SIGKILL to process group {}: {}", pid, e);
                            TerminationOutcome::Failed(format!("SIGKILL failed: {e}"))
                        }
                    }
                }
                Err(Errno::ESRCH) => {
                    info!("Process group {} not found (already terminated)", pid);
                    TerminationOutcome::NotFound
                }
                Err(Errno::EPERM) => {
                    warn!("Permission denied to terminate process group {}", pid);
                    TerminationOutcome::AccessDenied
                }
                Err(e) => {
                    warn!("Failed to send SIGTERM to process group {}: {}", pid, e);
                    TerminationOutcome::Failed(format!("SIGTERM failed: {e}"))
                }
            }
        }
    }
}

#[cfg(unix)]
pub use unix_impl::UnixProcessTerminator;

// Stub so the crate still compiles when pulled in on non-Unix systems
#[cfg(not(unix))]
pub struct UnixProcessTerminator;
