mod unix_terminator;

pub use unix_terminator::UnixProcessTerminator;
