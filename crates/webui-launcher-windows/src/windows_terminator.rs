use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};
use webui_launcher_core::{ProcessId, ProcessTerminator, TerminationOutcome};

// taskkill exits with 128 when the target PID does not exist
const TASKKILL_NOT_FOUND: i32 = 128;

/// Terminates the supervised process tree with `taskkill /F /T`.
pub struct WindowsProcessTerminator;

#[async_trait]
impl ProcessTerminator for WindowsProcessTerminator {
    async fn terminate(&self, pid: ProcessId) -> TerminationOutcome {
        let output = Command::new("taskkill")
            .args(["/F", "/T", "/PID", &pid.to_string()])
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                info!("Terminated process tree for PID {}", pid);
                TerminationOutcome::Terminated
            }
            Ok(out) if out.status.code() == Some(TASKKILL_NOT_FOUND) => {
                info!("Process {} not found (already terminated)", pid);
                TerminationOutcome::NotFound
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                warn!("taskkill failed for PID {}: {}", pid, stderr.trim());
                TerminationOutcome::Failed(format!("taskkill failed: {}", stderr.trim()))
            }
            Err(e) => {
                warn!("Failed to run taskkill for PID {}: {}", pid, e);
                TerminationOutcome::Failed(format!("taskkill could not be run: {e}"))
            }
        }
    }
}
