//! Command registry and handlers

use core::fmt::Write;

use crate::hal::{GpioPort, Peripherals, PinIndex, PinState, PwmChannel};

use super::dispatch::DispatchCursor;
use super::parser::ParsedCommand;
use super::ConsoleError;

/// Handler invoked once per output chunk.
///
/// Returns `Ok(true)` while more output is pending, `Ok(false)` when the
/// command is complete.
pub type CommandHandler = fn(
    &ParsedCommand<'_>,
    &mut DispatchCursor,
    &mut dyn Peripherals,
    &mut dyn Write,
) -> Result<bool, ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
    /// Exact number of parameters the command takes.
    pub param_count: usize,
}

/// All available commands.
///
/// Fixed and insertion-ordered; built once, never mutated.
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        help: "List available commands",
        handler: cmd_help,
        param_count: 0,
    },
    CommandDescriptor {
        name: "echo",
        help: "echo [string]: Write the string back to the console",
        handler: cmd_echo,
        param_count: 1,
    },
    CommandDescriptor {
        name: "gpio-read",
        help: "gpio-read [port] [pin]: Read the logical level of a GPIO pin, example: gpio-read a 2",
        handler: cmd_gpio_read,
        param_count: 2,
    },
    CommandDescriptor {
        name: "gpio-write",
        help: "gpio-write [port] [pin] [0|1]: Write a logical value to a GPIO pin, example: gpio-write a 2 1",
        handler: cmd_gpio_write,
        param_count: 3,
    },
    CommandDescriptor {
        name: "pwm-set-frequency",
        help: "pwm-set-frequency [hz]: Update the PWM timer frequency",
        handler: cmd_pwm_set_frequency,
        param_count: 1,
    },
    CommandDescriptor {
        name: "pwm-set-duty",
        help: "pwm-set-duty [percent] [channel]: Update the duty cycle of a PWM channel",
        handler: cmd_pwm_set_duty,
        param_count: 2,
    },
    CommandDescriptor {
        name: "heap-info",
        help: "Show free heap and minimum-ever free heap",
        handler: cmd_heap_info,
        param_count: 0,
    },
    CommandDescriptor {
        name: "clock-info",
        help: "Show system and peripheral clock frequencies",
        handler: cmd_clock_info,
        param_count: 0,
    },
    CommandDescriptor {
        name: "task-stats",
        help: "Display a table with the state of each task",
        handler: cmd_task_stats,
        param_count: 0,
    },
];

// --- Token validation helpers ---

fn parse_port(token: &str) -> Result<GpioPort, ConsoleError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => GpioPort::from_letter(letter).ok_or(ConsoleError::OutOfRange),
        _ => Err(ConsoleError::InvalidValue),
    }
}

fn parse_pin(token: &str) -> Result<PinIndex, ConsoleError> {
    let index: u8 = token.parse().map_err(|_| ConsoleError::InvalidValue)?;
    PinIndex::new(index).ok_or(ConsoleError::OutOfRange)
}

fn parse_pin_state(token: &str) -> Result<PinState, ConsoleError> {
    PinState::from_token(token).ok_or(ConsoleError::InvalidValue)
}

/// Fetch a parameter the count check already guaranteed.
fn required_arg<'a>(cmd: &ParsedCommand<'a>, idx: usize) -> Result<&'a str, ConsoleError> {
    cmd.arg(idx).ok_or(ConsoleError::SyntaxError)
}

// --- Command Implementations ---

fn cmd_help(
    _cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    _peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    for c in COMMANDS {
        let _ = writeln!(out, "  {:<18} {}", c.name, c.help);
    }
    Ok(false)
}

fn cmd_echo(
    cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    _peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let text = required_arg(cmd, 0)?;
    let _ = writeln!(out, "{}", text);
    Ok(false)
}

fn cmd_gpio_read(
    cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let port = parse_port(required_arg(cmd, 0)?)?;
    let pin = parse_pin(required_arg(cmd, 1)?)?;

    let state = peripherals
        .gpio_read(port, pin)
        .map_err(|_| ConsoleError::DriverFault)?;
    let _ = writeln!(out, "{}", state.as_str());
    Ok(false)
}

fn cmd_gpio_write(
    cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let port = parse_port(required_arg(cmd, 0)?)?;
    let pin = parse_pin(required_arg(cmd, 1)?)?;
    let state = parse_pin_state(required_arg(cmd, 2)?)?;

    peripherals
        .gpio_write(port, pin, state)
        .map_err(|_| ConsoleError::DriverFault)?;
    let _ = writeln!(
        out,
        "port {} pin {} = {}",
        port.letter(),
        pin.index(),
        state.as_str()
    );
    Ok(false)
}

fn cmd_pwm_set_frequency(
    cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let hz: u32 = required_arg(cmd, 0)?
        .parse()
        .map_err(|_| ConsoleError::InvalidValue)?;
    if hz == 0 {
        return Err(ConsoleError::OutOfRange);
    }

    peripherals
        .pwm_set_frequency(hz)
        .map_err(|_| ConsoleError::DriverFault)?;
    let _ = writeln!(out, "PWM frequency set to {} Hz", hz);
    Ok(false)
}

fn cmd_pwm_set_duty(
    cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let percent: u8 = required_arg(cmd, 0)?
        .parse()
        .map_err(|_| ConsoleError::InvalidValue)?;
    if percent > 100 {
        return Err(ConsoleError::OutOfRange);
    }
    let channel_number: u32 = required_arg(cmd, 1)?
        .parse()
        .map_err(|_| ConsoleError::InvalidValue)?;
    let channel = PwmChannel::from_number(channel_number).ok_or(ConsoleError::OutOfRange)?;

    peripherals
        .pwm_set_duty(percent, channel)
        .map_err(|_| ConsoleError::DriverFault)?;
    let _ = writeln!(out, "PWM channel {} duty set to {}%", channel.number(), percent);
    Ok(false)
}

fn cmd_heap_info(
    _cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let heap = peripherals.heap_info();
    let _ = writeln!(out, "heap free: {} bytes", heap.free_bytes);
    let _ = writeln!(out, "heap min:  {} bytes", heap.min_free_bytes);
    Ok(false)
}

fn cmd_clock_info(
    _cmd: &ParsedCommand<'_>,
    _cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    let _ = peripherals.clock_info(out);
    Ok(false)
}

static TASK_LIST_HEADER: &str = "Task states: RU = Running  RE = Ready  BL = Blocked  SU = Suspended  DE = Deleted\n\n\
Task name         State  Priority  Stack headroom  CPU usage  Run time\n\
================  =====  ========  ==============  =========  ========\n";

/// Multi-call: the first invocation captures the snapshot and emits the
/// header, each following one emits a single row. The snapshot lives in
/// the cursor and is released with the last row.
fn cmd_task_stats(
    _cmd: &ParsedCommand<'_>,
    cursor: &mut DispatchCursor,
    peripherals: &mut dyn Peripherals,
    out: &mut dyn Write,
) -> Result<bool, ConsoleError> {
    if cursor.call_index() == 0 {
        let snapshot = peripherals.task_snapshot();
        let _ = out.write_str(TASK_LIST_HEADER);
        let more_output = !snapshot.tasks.is_empty();
        if more_output {
            cursor.store_snapshot(snapshot);
        }
        return Ok(more_output);
    }

    let row = cursor.call_index() as usize - 1;
    let more_output = match cursor.snapshot() {
        Some(snapshot) => match snapshot.tasks.get(row) {
            Some(task) => {
                let per_percent = (snapshot.total_run_time / 100).max(1);
                let _ = writeln!(
                    out,
                    "{:<16}  {:>5}  {:>8}  {:>14}  {:>8}%  {:>8}",
                    task.name.as_str(),
                    task.state.code(),
                    task.priority,
                    task.stack_headroom,
                    task.run_time / per_percent,
                    task.run_time
                );
                row + 1 < snapshot.tasks.len()
            }
            None => false,
        },
        None => false,
    };

    if !more_output {
        cursor.release_snapshot();
    }
    Ok(more_output)
}
