//! Command dispatch and the multi-call output protocol.
//!
//! A handler fills one [`OutputChunk`] per invocation and says whether more
//! output is pending. The dispatcher transmits the chunk after every call
//! and keeps calling until the handler is done. Commands whose output does
//! not fit one chunk (task-stats) resume through the [`DispatchCursor`].

use core::fmt::{self, Write};

use crate::hal::{Peripherals, TaskSnapshot};

use super::commands::COMMANDS;
use super::io::ConsoleIo;
use super::parser::parse_line;
use super::ConsoleError;

/// Output buffer capacity. Sized to the largest single-call output,
/// the clock-info table.
pub const OUTPUT_SIZE: usize = 512;

/// Buffer filled by one handler invocation, transmitted, then discarded.
pub struct OutputChunk {
    buf: [u8; OUTPUT_SIZE],
    len: usize,
}

impl OutputChunk {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; OUTPUT_SIZE],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Write for OutputChunk {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let available = self.buf.len() - self.len;
        let to_copy = bytes.len().min(available);
        self.buf[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}

/// Per-command resume state for multi-call handlers.
///
/// Created when a command starts executing, destroyed when the handler
/// signals completion. Handlers that need to iterate past one chunk keep
/// their progress here, never in hidden statics.
pub struct DispatchCursor {
    call_index: u32,
    snapshot: Option<TaskSnapshot>,
}

impl DispatchCursor {
    pub(crate) fn new() -> Self {
        Self {
            call_index: 0,
            snapshot: None,
        }
    }

    /// Number of handler calls already completed for this command.
    pub fn call_index(&self) -> u32 {
        self.call_index
    }

    pub(crate) fn advance(&mut self) {
        self.call_index += 1;
    }

    pub fn snapshot(&self) -> Option<&TaskSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn store_snapshot(&mut self, snapshot: TaskSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Drop the captured snapshot once the last record has been emitted.
    pub fn release_snapshot(&mut self) {
        self.snapshot = None;
    }
}

/// Tokenize, resolve and run one submitted line to completion.
///
/// Each filled chunk is transmitted before the handler runs again. Protocol
/// and handler errors come back as the `Err` variant after the one-line
/// error message has already been written to the transport.
pub fn dispatch(
    line: &str,
    peripherals: &mut dyn Peripherals,
    io: &mut dyn ConsoleIo,
) -> Result<(), ConsoleError> {
    let cmd = parse_line(line);
    if cmd.command.is_empty() {
        return Ok(());
    }

    let mut chunk = OutputChunk::new();

    let descriptor = match COMMANDS.iter().find(|c| c.name == cmd.command) {
        Some(d) => d,
        None => return fail(ConsoleError::UnknownCommand, &mut chunk, io),
    };

    if cmd.arg_count() != descriptor.param_count {
        return fail(ConsoleError::SyntaxError, &mut chunk, io);
    }

    let mut cursor = DispatchCursor::new();
    loop {
        chunk.clear();
        match (descriptor.handler)(&cmd, &mut cursor, peripherals, &mut chunk) {
            Ok(more_output) => {
                let _ = io.transmit(chunk.as_bytes());
                if !more_output {
                    return Ok(());
                }
                cursor.advance();
            }
            Err(err) => {
                // A failed invocation produces the error line and nothing else.
                chunk.clear();
                return fail(err, &mut chunk, io);
            }
        }
    }
}

fn fail(
    err: ConsoleError,
    chunk: &mut OutputChunk,
    io: &mut dyn ConsoleIo,
) -> Result<(), ConsoleError> {
    let _ = writeln!(chunk, "{}", err);
    let _ = io.transmit(chunk.as_bytes());
    Err(err)
}
