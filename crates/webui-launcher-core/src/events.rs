use tokio::sync::mpsc;

/// Which output channel of the supervised process a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamChannel {
    Stdout,
    Stderr,
}

/// One complete line captured from the supervised process.
///
/// `bytes` carries the raw line content (line terminator stripped) without
/// any decoding; the classifier owns the UTF-8 handling. `sequence` starts
/// at 0 and increases by exactly one per line within a channel for the
/// lifetime of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub channel: StreamChannel,
    pub bytes: Vec<u8>,
    pub sequence: u64,
}

/// Rendering instruction produced by classifying one captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedEvent {
    /// Internal diagnostic noise; the presentation layer should drop it.
    Suppressed,
    /// An error line to render without further structure.
    PlainError { message: String },
    /// A recognized structured log record. `level` is surfaced exactly as
    /// the backend printed it so the presentation layer can apply its own
    /// mapping.
    StructuredLog {
        timestamp: String,
        level: String,
        message: String,
    },
    /// Anything else, rendered verbatim with default styling.
    Plain { message: String },
}

/// Lifecycle state of the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorStatus {
    #[default]
    NotStarted,
    Running,
    /// The process exited; the code is reported verbatim from the OS and is
    /// `None` when the OS reports none (e.g. death by signal).
    Exited(Option<i32>),
}

impl SupervisorStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SupervisorStatus::Running)
    }
}

/// A classified line as delivered to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEvent {
    pub channel: StreamChannel,
    pub sequence: u64,
    pub rendered: RenderedEvent,
}

/// Consumer of classified output lines.
///
/// `deliver` is called once per captured line, from the capture tasks, with
/// no supervisor lock held. Implementations must not block: a slow consumer
/// should buffer (see the `UnboundedSender` impl) rather than stall the
/// capture loops.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: LineEvent);
}

impl EventSink for mpsc::UnboundedSender<LineEvent> {
    fn deliver(&self, event: LineEvent) {
        // A dropped receiver means the presentation side went away; output
        // is discarded rather than treated as an error.
        let _ = self.send(event);
    }
}
