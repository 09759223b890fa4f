//! Line editor state machine and console task loop

use crate::hal::Peripherals;

use super::dispatch::dispatch;
use super::io::ConsoleIo;
use super::line_buffer::LineBuffer;
use super::ConsoleError;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const TAB: u8 = 0x09;
const FORM_FEED: u8 = 0x0C;
const NAK: u8 = 0x15;
const DEL: u8 = 0x7F;

/// ANSI clear screen + cursor home
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

/// Console engine: the input line plus the one-level recall slot.
///
/// Constructed once at startup and owned by the console task for the
/// lifetime of the firmware. Every byte-driven transition returns to the
/// same awaiting-byte state.
pub struct Console {
    line: LineBuffer,
    previous: LineBuffer,
}

impl Console {
    /// Create new console
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            previous: LineBuffer::new(),
        }
    }

    /// Blocking console task body: banner, prompt, then one byte forever.
    pub fn run(&mut self, peripherals: &mut dyn Peripherals, io: &mut dyn ConsoleIo) -> ! {
        self.print_banner(io);
        self.print_prompt(io);

        loop {
            let byte = io.receive_byte();
            io.rearm_receive();

            // Pending log entries surface at line boundaries, never
            // mid-edit, so the operator's input stays visually intact.
            if self.process_byte(byte, peripherals, io).is_some()
                && crate::logging::LOG.has_entries()
            {
                crate::logging::drain_logs(io);
                self.print_prompt(io);
            }
        }
    }

    /// Process a single input byte.
    ///
    /// Returns Some(result) when a complete line was submitted to the
    /// dispatcher, None while more input is needed.
    pub fn process_byte(
        &mut self,
        byte: u8,
        peripherals: &mut dyn Peripherals,
        io: &mut dyn ConsoleIo,
    ) -> Option<Result<(), ConsoleError>> {
        match byte {
            // Enter
            b'\r' | b'\n' => {
                let _ = io.transmit(b"\r\n");

                if self.line.is_empty() {
                    self.print_prompt(io);
                    return None;
                }

                let result = dispatch(self.line.as_str(), peripherals, io);
                self.previous.copy_from(&self.line);
                self.line.clear();
                self.print_prompt(io);
                Some(result)
            }

            // Ctrl+L on a terminal sends form feed
            FORM_FEED => {
                let _ = io.transmit(CLEAR_SCREEN);
                self.print_prompt(io);
                None
            }

            // Ctrl+C: abort the line being typed, never a running command
            CTRL_C => {
                let _ = io.transmit(b"^C\r\n");
                self.line.clear();
                self.print_prompt(io);
                None
            }

            // Backspace; empty buffer is a no-op, nothing echoed
            BACKSPACE | NAK => {
                if !self.line.is_empty() {
                    self.line.backspace();
                    // Echo: backspace, space, backspace
                    let _ = io.transmit(b"\x08 \x08");
                }
                None
            }

            // Tab: recall the last submitted line
            TAB => {
                self.erase_line_echo(io);
                self.line.copy_from(&self.previous);
                let _ = io.transmit(self.line.as_bytes());
                None
            }

            // Delete: wipe the line being typed
            DEL => {
                self.erase_line_echo(io);
                self.line.clear();
                None
            }

            // Printable character; dropped silently once the buffer is full
            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = io.transmit(&[byte]);
                }
                None
            }

            _ => None,
        }
    }

    /// Visually clear the typed line with erase sequences.
    fn erase_line_echo(&self, io: &mut dyn ConsoleIo) {
        for _ in 0..self.line.len() {
            let _ = io.transmit(b"\x08 \x08");
        }
    }

    /// The line currently being edited.
    pub fn current_line(&self) -> &str {
        self.line.as_str()
    }

    /// Print the prompt
    pub fn print_prompt(&self, io: &mut dyn ConsoleIo) {
        let _ = io.transmit(VERSION.as_bytes());
        let _ = io.transmit(b"> ");
    }

    /// Print welcome banner
    pub fn print_banner(&self, io: &mut dyn ConsoleIo) {
        let _ = io.transmit(b"\r\n");
        let _ = io.transmit(VERSION.as_bytes());
        let _ = io.transmit(
            b"\r\nWelcome to the console. Enter 'help' to view a list of available commands.\r\n",
        );
    }
}
