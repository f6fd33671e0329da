//! Line-oriented output for command results.

use std::fmt;
use std::io::{self, Write};

/// Destination for user-facing command output, one line at a time.
pub trait DisplaySink {
    /// Writes `line` followed by a newline and makes it visible immediately.
    fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()>;
}

impl<W: Write + ?Sized> DisplaySink for W {
    fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_fmt(line)?;
        self.write_all(b"\n")?;
        self.flush()
    }
}
