//! Stdin-based line source for piped input.

use super::LineSource;
use crate::model::error::InputError;
use std::io::{BufRead, BufReader, ErrorKind, IsTerminal, Read};

/// Longest line kept, in bytes. The rest of a longer line is discarded.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Line reader over piped stdin (or any reader, for tests).
///
/// - Strips the trailing `\n` / `\r\n`
/// - Truncates lines longer than [`MAX_LINE_BYTES`]
/// - Replaces invalid UTF-8 lossily
/// - Delivers a final line that has no trailing newline
pub struct StdinSource<R: Read> {
    reader: BufReader<R>,
    complete: bool,
}

impl StdinSource<std::io::Stdin> {
    /// Create a new StdinSource from stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is a TTY (interactive terminal).
    /// This prevents the TUI from blocking on keyboard input when the user
    /// forgot to pipe data.
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(stdin))
    }
}

impl<R: Read> StdinSource<R> {
    /// Create a source from any reader, without the TTY check.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            complete: false,
        }
    }

    /// Check if EOF has been reached (no more data will arrive).
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Read one physical line, keeping at most `MAX_LINE_BYTES` of it.
    ///
    /// Returns `None` at EOF when nothing was read.
    fn read_capped(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut read_any = false;
        let mut dropped = 0usize;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                break;
            }
            read_any = true;

            let newline = available.iter().position(|&b| b == b'\n');
            let chunk = &available[..newline.unwrap_or(available.len())];
            let room = MAX_LINE_BYTES - line.len();
            let kept = chunk.len().min(room);
            line.extend_from_slice(&chunk[..kept]);
            dropped += chunk.len() - kept;

            let consumed = newline.map_or(available.len(), |i| i + 1);
            self.reader.consume(consumed);

            if newline.is_some() {
                break;
            }
        }

        if !read_any {
            return Ok(None);
        }
        if dropped > 0 {
            tracing::warn!(
                kept = line.len(),
                dropped,
                "Input line exceeded the line length cap and was truncated"
            );
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

impl<R: Read + Send> LineSource for StdinSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, InputError> {
        if self.complete {
            return Ok(None);
        }

        match self.read_capped() {
            Ok(Some(bytes)) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Ok(None) => {
                self.complete = true;
                Ok(None)
            }
            Err(e) => {
                self.complete = true;
                Err(InputError::Io(e))
            }
        }
    }
}
