mod windows_terminator;

pub use windows_terminator::WindowsProcessTerminator;
