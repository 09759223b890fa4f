//! Line editor state machine tests
//!
//! Drives Console::process_byte directly; the transport and peripherals
//! are host-side mocks.

use core::fmt::Write;

use rust_uart_console::console::{Console, ConsoleIo, IoError};
use rust_uart_console::hal::{
    DriverError, GpioPort, HeapInfo, Peripherals, PinIndex, PinState, PwmChannel, TaskSnapshot,
};

// Transport mock capturing everything the console transmits
struct TestIo {
    sent: Vec<u8>,
}

impl TestIo {
    fn new() -> Self {
        Self { sent: Vec::new() }
    }

    fn output(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }

    fn clear(&mut self) {
        self.sent.clear();
    }
}

impl ConsoleIo for TestIo {
    fn receive_byte(&mut self) -> u8 {
        0
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        self.sent.extend_from_slice(bytes);
        Ok(())
    }
}

// Peripheral mock counting every driver call
#[derive(Default)]
struct CountingBoard {
    calls: usize,
}

impl Peripherals for CountingBoard {
    fn gpio_read(&mut self, _port: GpioPort, _pin: PinIndex) -> Result<PinState, DriverError> {
        self.calls += 1;
        Ok(PinState::Low)
    }

    fn gpio_write(
        &mut self,
        _port: GpioPort,
        _pin: PinIndex,
        _state: PinState,
    ) -> Result<(), DriverError> {
        self.calls += 1;
        Ok(())
    }

    fn pwm_set_frequency(&mut self, _hz: u32) -> Result<(), DriverError> {
        self.calls += 1;
        Ok(())
    }

    fn pwm_set_duty(&mut self, _percent: u8, _channel: PwmChannel) -> Result<(), DriverError> {
        self.calls += 1;
        Ok(())
    }

    fn heap_info(&mut self) -> HeapInfo {
        self.calls += 1;
        HeapInfo {
            free_bytes: 0,
            min_free_bytes: 0,
        }
    }

    fn clock_info(&mut self, _out: &mut dyn Write) -> core::fmt::Result {
        self.calls += 1;
        Ok(())
    }

    fn task_snapshot(&mut self) -> TaskSnapshot {
        self.calls += 1;
        TaskSnapshot::default()
    }
}

fn feed(console: &mut Console, board: &mut CountingBoard, io: &mut TestIo, bytes: &[u8]) {
    for b in bytes {
        console.process_byte(*b, board, io);
    }
}

#[test]
fn test_printable_bytes_append_and_echo() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"gpio-read a 2");

    assert_eq!(console.current_line(), "gpio-read a 2");
    // Echo fidelity: exactly the typed bytes went back out
    assert_eq!(io.output(), "gpio-read a 2");
}

#[test]
fn test_submit_hands_line_and_resets_buffer() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"echo hi");
    let result = console.process_byte(b'\r', &mut board, &mut io);

    assert!(matches!(result, Some(Ok(()))));
    assert_eq!(console.current_line(), "");
    // Dispatcher ran: the echoed parameter is in the output
    assert!(io.output().contains("hi\n"));
}

#[test]
fn test_submit_on_lf() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"heap-info");
    let result = console.process_byte(b'\n', &mut board, &mut io);

    assert!(matches!(result, Some(Ok(()))));
    assert_eq!(board.calls, 1);
}

#[test]
fn test_enter_on_empty_line_reprints_prompt_only() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    let result = console.process_byte(b'\r', &mut board, &mut io);

    assert!(result.is_none());
    assert_eq!(board.calls, 0);
    assert!(io.output().contains("> "));
}

#[test]
fn test_backspace_removes_last_byte() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"abcd");
    io.clear();
    console.process_byte(0x08, &mut board, &mut io);
    console.process_byte(0x08, &mut board, &mut io);

    assert_eq!(console.current_line(), "ab");
    // Erase echo: backspace, space, backspace per removed glyph
    assert_eq!(io.output(), "\x08 \x08\x08 \x08");
}

#[test]
fn test_nak_acts_as_backspace() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"ab");
    console.process_byte(0x15, &mut board, &mut io);

    assert_eq!(console.current_line(), "a");
}

#[test]
fn test_backspace_on_empty_buffer_is_noop() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    console.process_byte(0x08, &mut board, &mut io);

    assert_eq!(console.current_line(), "");
    assert_eq!(io.output(), "");
}

#[test]
fn test_tab_restores_previous_line() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"echo hi\r");
    io.clear();
    console.process_byte(b'\t', &mut board, &mut io);

    assert_eq!(console.current_line(), "echo hi");
    // Restored text is echoed back
    assert!(io.output().contains("echo hi"));
}

#[test]
fn test_tab_with_no_previous_line() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    console.process_byte(b'\t', &mut board, &mut io);

    assert_eq!(console.current_line(), "");
}

#[test]
fn test_tab_erases_current_input_first() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"echo hi\r");
    feed(&mut console, &mut board, &mut io, b"gpio");
    console.process_byte(b'\t', &mut board, &mut io);

    assert_eq!(console.current_line(), "echo hi");
}

#[test]
fn test_del_clears_line() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"abc");
    io.clear();
    console.process_byte(0x7F, &mut board, &mut io);

    assert_eq!(console.current_line(), "");
    // One erase sequence per buffered glyph
    assert_eq!(io.output(), "\x08 \x08".repeat(3));
}

#[test]
fn test_ctrl_c_aborts_line_without_dispatch() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"gpio-write a 2 1");
    let result = console.process_byte(0x03, &mut board, &mut io);

    assert!(result.is_none());
    assert_eq!(console.current_line(), "");
    assert_eq!(board.calls, 0);
    assert!(io.output().contains("^C"));
}

#[test]
fn test_form_feed_clears_screen() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    feed(&mut console, &mut board, &mut io, b"abc");
    console.process_byte(0x0C, &mut board, &mut io);

    // Buffer unchanged, screen cleared, prompt reprinted
    assert_eq!(console.current_line(), "abc");
    assert!(io.output().contains("\x1b[2J"));
}

#[test]
fn test_full_buffer_drops_silently() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    for _ in 0..200 {
        console.process_byte(b'a', &mut board, &mut io);
    }

    let len = console.current_line().len();
    assert!(len < 200);
    // No echo for dropped bytes
    assert_eq!(io.output().len(), len);
}

#[test]
fn test_unprintable_bytes_are_ignored() {
    let mut console = Console::new();
    let mut board = CountingBoard::default();
    let mut io = TestIo::new();

    console.process_byte(0x01, &mut board, &mut io);
    console.process_byte(0x1B, &mut board, &mut io);
    console.process_byte(0x80, &mut board, &mut io);

    assert_eq!(console.current_line(), "");
    assert_eq!(io.output(), "");
}
