//! Transport contract between the console task and the serial driver.
//!
//! The receive side is fed from interrupt context into a bounded queue;
//! the console task is the only consumer. Queue sizing and overflow are
//! the transport's concern, not the console's.

/// Transmit failure. Reported to the caller; the session keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoError;

/// Byte channel and transmit surface consumed by the console task.
pub trait ConsoleIo {
    /// Block until the next received byte is available, in receipt order.
    fn receive_byte(&mut self) -> u8;

    /// Re-arm single-byte reception.
    ///
    /// Called once per consumed byte. Transports whose driver re-arms
    /// reception internally leave this as a no-op.
    fn rearm_receive(&mut self) {}

    /// Blocking transmit with unbounded wait.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), IoError>;
}
