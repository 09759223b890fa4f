//! Line buffer tests

use rust_uart_console::console::line_buffer::{LineBuffer, LINE_SIZE};

#[test]
fn test_line_buffer_push() {
    let mut buf = LineBuffer::new();

    buf.push(b'h');
    buf.push(b'e');
    buf.push(b'l');
    buf.push(b'p');

    assert_eq!(buf.as_str(), "help");
}

#[test]
fn test_line_buffer_backspace() {
    let mut buf = LineBuffer::new();

    buf.push(b'h');
    buf.push(b'e');
    buf.push(b'l');
    buf.push(b'p');
    buf.backspace();
    buf.backspace();

    assert_eq!(buf.as_str(), "he");
}

#[test]
fn test_line_buffer_backspace_empty() {
    let mut buf = LineBuffer::new();

    buf.backspace(); // should not panic
    assert_eq!(buf.as_str(), "");
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_backspace_keeps_leading_bytes() {
    let mut buf = LineBuffer::new();

    for b in b"gpio-read" {
        buf.push(*b);
    }
    for _ in 0..4 {
        buf.backspace();
    }

    assert_eq!(buf.as_str(), "gpio-");
    assert_eq!(buf.len(), 5);
}

#[test]
fn test_line_buffer_clear() {
    let mut buf = LineBuffer::new();

    buf.push(b'h');
    buf.push(b'e');
    buf.push(b'l');
    buf.push(b'p');
    buf.clear();

    assert_eq!(buf.as_str(), "");
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_copy_from() {
    let mut previous = LineBuffer::new();
    for b in b"echo hi" {
        previous.push(*b);
    }

    let mut buf = LineBuffer::new();
    buf.push(b'x');
    buf.copy_from(&previous);

    assert_eq!(buf.as_str(), "echo hi");
}

#[test]
fn test_line_buffer_reserves_last_slot() {
    let mut buf = LineBuffer::new();

    // Push well past capacity
    for i in 0..(LINE_SIZE + 40) {
        buf.push(b'a' + (i % 26) as u8);
    }

    // One slot stays free
    assert_eq!(buf.len(), LINE_SIZE - 1);
}

#[test]
fn test_line_buffer_push_reports_drop() {
    let mut buf = LineBuffer::new();

    for _ in 0..(LINE_SIZE - 1) {
        assert!(buf.push(b'x'));
    }
    assert!(!buf.push(b'y'));
    assert_eq!(buf.len(), LINE_SIZE - 1);
}
