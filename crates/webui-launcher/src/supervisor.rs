use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use webui_launcher_core::capture::capture_lines;
use webui_launcher_core::{
    EventSink, FORCED_ENV, LaunchError, LaunchSpec, ProcessId, ProcessTerminator, StreamChannel,
    SupervisorStatus, TerminationError, TerminationOutcome,
};

// How long terminate() waits for the exit to be observed before giving up
const EXIT_WAIT: Duration = Duration::from_secs(10);

/// Identifier for a live supervised process.
///
/// The handle is only an identifier: the `tokio::process::Child` itself is
/// owned by the supervisor's exit watcher task. A handle is valid from a
/// successful `start` until the exit is observed, and is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pid: ProcessId,
    command: String,
}

impl ProcessHandle {
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// Owns the lifecycle of exactly one supervised backend process.
///
/// `start` spawns the child with both output streams piped and wires each
/// stream through the classifier into the sink registered at construction.
/// Status is held in a watch channel: reads never block on the child, and
/// every transition notifies subscribed observers without stalling the
/// capture loops.
pub struct ProcessSupervisor {
    sink: Arc<dyn EventSink>,
    terminator: Arc<dyn ProcessTerminator>,
    status_tx: watch::Sender<SupervisorStatus>,
    live: Arc<Mutex<Option<ProcessHandle>>>,
}

impl ProcessSupervisor {
    /// Create a supervisor delivering classified output to `sink`, using
    /// the termination implementation for the current platform.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        info!(
            "Created supervisor with platform terminator: {}",
            crate::factory::platform_name()
        );
        Self::with_terminator(sink, crate::factory::platform_terminator())
    }

    /// Create a supervisor with an explicit terminator implementation.
    pub fn with_terminator(
        sink: Arc<dyn EventSink>,
        terminator: Arc<dyn ProcessTerminator>,
    ) -> Self {
        let (status_tx, _) = watch::channel(SupervisorStatus::NotStarted);
        Self {
            sink,
            terminator,
            status_tx,
            live: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the backend described by `spec` and begin capturing its
    /// output.
    ///
    /// Returns as soon as the child is running; the capture loops and the
    /// exit watcher continue in the background. The spec's environment
    /// overrides are merged over the inherited environment, and the forced
    /// UTF-8 variables are applied last.
    pub async fn start(&self, spec: &LaunchSpec) -> Result<ProcessHandle, LaunchError> {
        let args = spec
            .split_arguments()
            .map_err(|e| LaunchError::SpawnFailed(format!("unparseable arguments: {e}")))?;

        if !spec.working_directory.trim().is_empty()
            && !Path::new(&spec.working_directory).is_dir()
        {
            return Err(LaunchError::InvalidWorkingDirectory(
                spec.working_directory.clone(),
            ));
        }

        let mut live = self.live.lock().unwrap();
        if live.is_some() {
            return Err(LaunchError::AlreadyRunning);
        }

        let mut cmd = Command::new(&spec.command);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = spec.effective_working_directory() {
            cmd.current_dir(dir);
        }

        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        for (key, value) in FORCED_ENV {
            cmd.env(key, value);
        }

        // Own process group so termination reaches any forked workers
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LaunchError::ExecutableNotFound(spec.command.clone()),
            _ => LaunchError::SpawnFailed(e.to_string()),
        })?;

        let pid = child.id().ok_or_else(|| {
            LaunchError::SpawnFailed("process exited before it could be tracked".to_string())
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(capture_lines(
                stdout,
                StreamChannel::Stdout,
                self.sink.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(capture_lines(
                stderr,
                StreamChannel::Stderr,
                self.sink.clone(),
            ));
        }

        let handle = ProcessHandle {
            pid,
            command: spec.command.clone(),
        };
        *live = Some(handle.clone());
        drop(live);
        self.status_tx.send_replace(SupervisorStatus::Running);
        info!(
            "Spawned backend process: {} (PID: {}) with args: {:?}",
            spec.command, pid, args
        );

        let status_tx = self.status_tx.clone();
        let live = self.live.clone();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => {
                    info!("Backend process {} exited with {}", pid, status);
                    // Exit code reported verbatim; None when the OS gives
                    // none (e.g. death by signal)
                    status.code()
                }
                Err(e) => {
                    warn!("Failed to wait for backend process {}: {}", pid, e);
                    None
                }
            };
            live.lock().unwrap().take();
            status_tx.send_replace(SupervisorStatus::Exited(code));
        });

        Ok(handle)
    }

    /// Current lifecycle state. Never blocks on the child.
    pub fn status(&self) -> SupervisorStatus {
        *self.status_tx.borrow()
    }

    /// Subscribe to status transitions.
    pub fn watch_status(&self) -> watch::Receiver<SupervisorStatus> {
        self.status_tx.subscribe()
    }

    /// Forcibly end the supervised process.
    ///
    /// Idempotent: calling on a supervisor that never started, or whose
    /// child already exited, is a no-op success. Otherwise the platform
    /// terminator signals the child and this method waits (bounded) for the
    /// exit watcher to observe the exit.
    pub async fn terminate(&self) -> Result<(), TerminationError> {
        let handle = self.live.lock().unwrap().clone();
        let Some(handle) = handle else {
            return Ok(());
        };

        debug!("Terminating supervised process {}", handle.pid);
        match self.terminator.terminate(handle.pid).await {
            TerminationOutcome::Terminated | TerminationOutcome::NotFound => {}
            TerminationOutcome::AccessDenied => {
                return Err(TerminationError::SignalFailed("access denied".to_string()));
            }
            TerminationOutcome::Failed(reason) => {
                return Err(TerminationError::SignalFailed(reason));
            }
        }

        let mut rx = self.status_tx.subscribe();
        let observed_exit = async move {
            loop {
                if matches!(*rx.borrow_and_update(), SupervisorStatus::Exited(_)) {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };
        tokio::time::timeout(EXIT_WAIT, observed_exit)
            .await
            .map_err(|_| TerminationError::Timeout)
    }
}

// Emergency cleanup if the supervisor is dropped with a live child. We
// can't use async in Drop, so this is a best-effort synchronous kill.
impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        let Some(handle) = self.live.lock().unwrap().take() else {
            return;
        };

        warn!(
            "Supervisor dropped with live process {} - attempting emergency cleanup",
            handle.pid
        );

        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid as NixPid;

            let nix_pid = NixPid::from_raw(handle.pid as i32);
            if let Err(e) = signal::kill(nix_pid, Signal::SIGTERM) {
                warn!("Emergency cleanup failed for process {}: {}", handle.pid, e);
            }
        }

        #[cfg(windows)]
        {
            use std::process::Command;

            if let Err(e) = Command::new("taskkill")
                .args(["/F", "/T", "/PID", &handle.pid.to_string()])
                .output()
            {
                warn!("Emergency cleanup failed for process {}: {}", handle.pid, e);
            }
        }
    }
}
