//! # RustUartConsole
//!
//! Interactive UART console for on-board peripheral control.
//!
//! ## Architecture
//!
//! ```text
//! UART ISR ──▶ bounded RX ring ──▶ Line Editor ──▶ Dispatcher ──▶ handlers
//!                                  (per byte)      (per line)     (per chunk)
//! ```
//!
//! One long-lived task owns all console state. Received bytes drive the
//! line editor one at a time; a completed line goes through the dispatcher,
//! which runs the resolved handler through the multi-call output protocol
//! until its output is complete. Peripheral access stays behind the
//! [`hal::Peripherals`] trait so the whole engine runs host-side in tests.

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod hal;
pub mod logging;

#[cfg(all(not(test), target_arch = "xtensa"))]
pub mod uart;

pub use console::{Console, ConsoleError, ConsoleIo};
pub use hal::Peripherals;
