use std::sync::Arc;
use webui_launcher_core::ProcessTerminator;

/// Select the termination implementation for the current platform at
/// compile time.
pub fn platform_terminator() -> Arc<dyn ProcessTerminator> {
    #[cfg(unix)]
    return Arc::new(webui_launcher_unix::UnixProcessTerminator);

    #[cfg(windows)]
    return Arc::new(webui_launcher_windows::WindowsProcessTerminator);
}

/// Platform name for logging and debugging.
pub fn platform_name() -> &'static str {
    #[cfg(unix)]
    return "unix";

    #[cfg(windows)]
    return "windows";
}
