//! Serial console for peripheral control and diagnostics
//!
//! One long-lived task owns all console state. Bytes arrive through the
//! [`ConsoleIo`] transport, the line editor assembles them into command
//! lines, and the dispatcher runs each line to completion through the
//! multi-call output protocol.

pub mod commands;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod line_buffer;
pub mod parser;

pub use commands::{CommandDescriptor, COMMANDS};
pub use console::Console;
pub use dispatch::{dispatch, DispatchCursor, OutputChunk};
pub use error::ConsoleError;
pub use io::{ConsoleIo, IoError};
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedCommand};
