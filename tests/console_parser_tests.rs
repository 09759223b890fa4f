//! Parser tests for console command line parsing

use rust_uart_console::console::parser::parse_line;

#[test]
fn test_parse_simple_command() {
    let cmd = parse_line("help");
    assert_eq!(cmd.command, "help");
    assert_eq!(cmd.arg(0), None);
    assert_eq!(cmd.arg_count(), 0);
}

#[test]
fn test_parse_command_with_one_arg() {
    let cmd = parse_line("echo hello");
    assert_eq!(cmd.command, "echo");
    assert_eq!(cmd.arg(0), Some("hello"));
    assert_eq!(cmd.arg(1), None);
    assert_eq!(cmd.arg_count(), 1);
}

#[test]
fn test_parse_command_with_three_args() {
    let cmd = parse_line("gpio-write a 2 1");
    assert_eq!(cmd.command, "gpio-write");
    assert_eq!(cmd.arg(0), Some("a"));
    assert_eq!(cmd.arg(1), Some("2"));
    assert_eq!(cmd.arg(2), Some("1"));
    assert_eq!(cmd.arg_count(), 3);
}

#[test]
fn test_parse_trims_whitespace() {
    let cmd = parse_line("  gpio-read   b  7  ");
    assert_eq!(cmd.command, "gpio-read");
    assert_eq!(cmd.arg(0), Some("b"));
    assert_eq!(cmd.arg(1), Some("7"));
    assert_eq!(cmd.arg_count(), 2);
}

#[test]
fn test_parse_empty_line() {
    let cmd = parse_line("");
    assert_eq!(cmd.command, "");
    assert_eq!(cmd.arg_count(), 0);
}

#[test]
fn test_parse_counts_excess_args() {
    let cmd = parse_line("echo one two three four");
    assert_eq!(cmd.command, "echo");
    assert_eq!(cmd.arg(0), Some("one"));
    assert_eq!(cmd.arg(2), Some("three"));
    // "four" does not fit the argument array but still counts
    assert_eq!(cmd.arg_count(), 4);
}
