//! Raw line sources.
//!
//! The ingestion pipeline only needs "the next raw line, or end of stream".
//! [`LineSource`] is that seam; [`StdinSource`] is the production implementation.

use crate::model::error::InputError;

pub mod stdin;

pub use stdin::{StdinSource, MAX_LINE_BYTES};

/// A blocking source of raw lines.
pub trait LineSource: Send {
    /// Read the next line without its line terminator.
    ///
    /// Blocks until a line is available. Returns `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` when the underlying read fails. Callers treat
    /// this like end of stream.
    fn next_line(&mut self) -> Result<Option<String>, InputError>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<Option<String>, InputError> {
        (**self).next_line()
    }
}
