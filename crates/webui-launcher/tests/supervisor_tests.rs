use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use webui_launcher::{
    LaunchError, LaunchSpec, LineEvent, ProcessSupervisor, RenderedEvent, StreamChannel,
    SupervisorStatus,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_line_number(true)
        .try_init();
}

fn new_supervisor() -> (ProcessSupervisor, mpsc::UnboundedReceiver<LineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProcessSupervisor::new(Arc::new(tx)), rx)
}

#[cfg(unix)]
fn shell_spec(script: &str) -> LaunchSpec {
    LaunchSpec::builder()
        .command("sh")
        .arguments(format!("-c '{script}'"))
        .build()
        .expect("valid launch spec")
}

#[cfg(windows)]
fn shell_spec(script: &str) -> LaunchSpec {
    LaunchSpec::builder()
        .command("cmd")
        .arguments(format!("/C {script}"))
        .build()
        .expect("valid launch spec")
}

async fn wait_for_exit(supervisor: &ProcessSupervisor) -> SupervisorStatus {
    let mut rx = supervisor.watch_status();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let status = *rx.borrow_and_update();
            if let SupervisorStatus::Exited(_) = status {
                return status;
            }
            rx.changed().await.expect("status channel closed");
        }
    })
    .await
    .expect("process did not exit in time")
}

async fn recv_event(rx: &mut mpsc::UnboundedReceiver<LineEvent>) -> LineEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an output event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_unknown_executable_reports_not_found() {
    init_tracing();
    let (supervisor, _rx) = new_supervisor();

    let spec = LaunchSpec::builder()
        .command("webui-launcher-no-such-binary")
        .arguments("serve")
        .build()
        .unwrap();

    let err = supervisor.start(&spec).await.unwrap_err();
    assert!(matches!(err, LaunchError::ExecutableNotFound(_)));
    assert_eq!(supervisor.status(), SupervisorStatus::NotStarted);
}

#[tokio::test]
async fn test_missing_working_directory_is_rejected() {
    init_tracing();
    let (supervisor, _rx) = new_supervisor();

    let spec = LaunchSpec::builder()
        .working_directory("/definitely/not/a/real/directory")
        .build()
        .unwrap();

    let err = supervisor.start(&spec).await.unwrap_err();
    assert!(matches!(err, LaunchError::InvalidWorkingDirectory(_)));
    assert_eq!(supervisor.status(), SupervisorStatus::NotStarted);
}

#[tokio::test]
async fn test_single_line_child_delivers_one_event() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    let handle = supervisor.start(&shell_spec("echo hello")).await.unwrap();
    assert!(handle.pid() > 0);

    let event = recv_event(&mut rx).await;
    assert_eq!(event.channel, StreamChannel::Stdout);
    assert_eq!(event.sequence, 0);
    assert_eq!(
        event.rendered,
        RenderedEvent::Plain {
            message: "hello".to_string()
        }
    );

    assert_eq!(
        wait_for_exit(&supervisor).await,
        SupervisorStatus::Exited(Some(0))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_exit_code_is_reported_verbatim() {
    init_tracing();
    let (supervisor, _rx) = new_supervisor();

    supervisor.start(&shell_spec("exit 7")).await.unwrap();
    assert_eq!(
        wait_for_exit(&supervisor).await,
        SupervisorStatus::Exited(Some(7))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_lines_arrive_in_channel_order() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    supervisor
        .start(&shell_spec("echo one; echo two; echo three"))
        .await
        .unwrap();
    wait_for_exit(&supervisor).await;

    for (sequence, expected) in ["one", "two", "three"].iter().enumerate() {
        let event = recv_event(&mut rx).await;
        assert_eq!(event.channel, StreamChannel::Stdout);
        assert_eq!(event.sequence, sequence as u64);
        assert_eq!(
            event.rendered,
            RenderedEvent::Plain {
                message: expected.to_string()
            }
        );
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_stderr_lines_are_classified_on_their_channel() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    supervisor
        .start(&shell_spec("echo UnicodeEncodeError: boom 1>&2"))
        .await
        .unwrap();
    wait_for_exit(&supervisor).await;

    let event = recv_event(&mut rx).await;
    assert_eq!(event.channel, StreamChannel::Stderr);
    assert_eq!(
        event.rendered,
        RenderedEvent::PlainError {
            message: webui_launcher::classify::UNICODE_ERROR_MESSAGE.to_string()
        }
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_structured_log_survives_the_pipeline() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    supervisor
        .start(&shell_spec(
            "echo \"2025-09-17 01:56:34.800 | INFO | Server started\"",
        ))
        .await
        .unwrap();
    wait_for_exit(&supervisor).await;

    let event = recv_event(&mut rx).await;
    assert_eq!(
        event.rendered,
        RenderedEvent::StructuredLog {
            timestamp: "2025-09-17 01:56:34.800".to_string(),
            level: "INFO".to_string(),
            message: "Server started".to_string(),
        }
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_env_overrides_and_forced_utf8_reach_the_child() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    let spec = LaunchSpec::builder()
        .command("sh")
        .arguments(r#"-c 'echo "$WEBUI_CHECK-$PYTHONIOENCODING"'"#)
        .env("WEBUI_CHECK", "forwarded")
        .build()
        .unwrap();

    supervisor.start(&spec).await.unwrap();
    wait_for_exit(&supervisor).await;

    let event = recv_event(&mut rx).await;
    assert_eq!(
        event.rendered,
        RenderedEvent::Plain {
            message: "forwarded-utf-8".to_string()
        }
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_working_directory_is_applied() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    let dir = tempfile::tempdir().unwrap();
    let spec = LaunchSpec::builder()
        .command("sh")
        .arguments("-c pwd")
        .working_directory(dir.path().to_str().unwrap())
        .build()
        .unwrap();

    supervisor.start(&spec).await.unwrap();
    wait_for_exit(&supervisor).await;

    let event = recv_event(&mut rx).await;
    let RenderedEvent::Plain { message } = event.rendered else {
        panic!("expected a plain line, got {:?}", event.rendered);
    };
    assert_eq!(
        std::path::PathBuf::from(message),
        dir.path().canonicalize().unwrap()
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_terminate_right_after_start_produces_no_events() {
    init_tracing();
    let (supervisor, mut rx) = new_supervisor();

    supervisor.start(&shell_spec("sleep 5")).await.unwrap();
    supervisor.terminate().await.unwrap();

    assert!(matches!(
        supervisor.status(),
        SupervisorStatus::Exited(_)
    ));

    // Give the capture loops a moment to drain end-of-stream
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_terminate_is_idempotent() {
    init_tracing();
    let (supervisor, _rx) = new_supervisor();

    // Never started: no-op success
    supervisor.terminate().await.unwrap();
    assert_eq!(supervisor.status(), SupervisorStatus::NotStarted);

    // Already exited: also a no-op success
    supervisor.start(&shell_spec("echo done")).await.unwrap();
    wait_for_exit(&supervisor).await;
    supervisor.terminate().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_second_start_while_running_is_rejected() {
    init_tracing();
    let (supervisor, _rx) = new_supervisor();

    supervisor.start(&shell_spec("sleep 3")).await.unwrap();
    let err = supervisor.start(&shell_spec("echo nope")).await.unwrap_err();
    assert!(matches!(err, LaunchError::AlreadyRunning));

    supervisor.terminate().await.unwrap();
}
