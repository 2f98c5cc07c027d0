//! Console front-end for the supervisor: the presentation and config
//! collaborator rolled into one small binary.
//!
//! Reads an optional JSON config file (first argument), applies
//! `OPENWEBUI_*` environment overrides, starts the backend, and renders
//! classified output with ANSI colors until the backend exits or Ctrl-C.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use webui_launcher::{
    LaunchSpec, LineEvent, ProcessSupervisor, RenderedEvent, SupervisorStatus,
};

const RESET: &str = "\x1b[0m";
const GRAY: &str = "\x1b[90m";
const RED: &str = "\x1b[31m";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleConfig {
    /// Where the backend serves its UI once it is up.
    #[serde(default = "default_web_url")]
    web_url: String,

    /// How long after start to wait before announcing the URL, in
    /// milliseconds.
    #[serde(default = "default_startup_delay")]
    startup_delay: u64,

    #[serde(flatten)]
    launch: LaunchSpec,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            web_url: default_web_url(),
            startup_delay: default_startup_delay(),
            launch: LaunchSpec::default(),
        }
    }
}

fn default_web_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_startup_delay() -> u64 {
    20_000
}

fn load_config(path: &str) -> Result<ConsoleConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse config file {path}"))
}

/// Environment overrides on top of the config file.
fn apply_env_overrides(config: &mut ConsoleConfig) {
    let set = |target: &mut String, name: &str| {
        if let Ok(value) = std::env::var(name) {
            if !value.trim().is_empty() {
                *target = value;
            }
        }
    };

    set(&mut config.web_url, "OPENWEBUI_URL");
    set(&mut config.launch.command, "OPENWEBUI_COMMAND");
    set(&mut config.launch.arguments, "OPENWEBUI_ARGS");
    set(&mut config.launch.working_directory, "OPENWEBUI_WORKING_DIR");

    if let Ok(value) = std::env::var("OPENWEBUI_STARTUP_DELAY") {
        if let Ok(delay) = value.trim().parse() {
            config.startup_delay = delay;
        }
    }
}

fn level_color(level: &str) -> &'static str {
    match level.to_uppercase().as_str() {
        "INFO" => "\x1b[34m",             // Blue
        "ERROR" => "\x1b[31m",            // Red
        "CRITICAL" => "\x1b[1;31m",       // Bold red
        "WARNING" | "WARN" => "\x1b[33m", // Yellow
        "DEBUG" => "\x1b[32m",            // Green
        "TRACE" => "\x1b[35m",            // Magenta
        _ => "",
    }
}

/// Turn a classified line into its console rendering, or `None` for lines
/// the classifier marked as noise.
fn render(event: &LineEvent) -> Option<String> {
    match &event.rendered {
        RenderedEvent::Suppressed => None,
        RenderedEvent::PlainError { message } => Some(format!("{RED}{message}{RESET}")),
        RenderedEvent::StructuredLog {
            timestamp,
            level,
            message,
        } => {
            let color = level_color(level);
            Some(format!(
                "{GRAY}{timestamp} | {RESET}{color}{level}{RESET}{GRAY} | {RESET}{message}"
            ))
        }
        RenderedEvent::Plain { message } => Some(message.clone()),
    }
}

fn print_line(line: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => ConsoleConfig::default(),
    };
    apply_env_overrides(&mut config);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let supervisor = ProcessSupervisor::new(Arc::new(tx));

    info!(
        "Starting backend: {} {}",
        config.launch.command, config.launch.arguments
    );
    let handle = supervisor.start(&config.launch).await?;
    print_line(&format!(
        "Started {} (PID {})",
        handle.command(),
        handle.pid()
    ));

    let mut status_rx = supervisor.watch_status();
    let banner = tokio::time::sleep(Duration::from_millis(config.startup_delay));
    tokio::pin!(banner);
    let mut banner_shown = false;

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                if let Some(line) = render(&event) {
                    print_line(&line);
                }
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let SupervisorStatus::Exited(code) = *status_rx.borrow_and_update() {
                    // Drain whatever the capture loops already delivered
                    while let Ok(event) = rx.try_recv() {
                        if let Some(line) = render(&event) {
                            print_line(&line);
                        }
                    }
                    print_line(&match code {
                        Some(code) => format!("Backend stopped (exit code {code})"),
                        None => "Backend stopped".to_string(),
                    });
                    std::process::exit(code.unwrap_or(0));
                }
            }
            _ = &mut banner, if !banner_shown => {
                banner_shown = true;
                print_line(&format!("Web UI should now be available at {}", config.web_url));
            }
            _ = tokio::signal::ctrl_c() => {
                print_line("Stopping backend...");
                supervisor.terminate().await?;
            }
        }
    }

    Ok(())
}
