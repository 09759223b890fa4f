//! Peripheral driver contracts consumed by the console.
//!
//! The console never touches registers itself. Command handlers go through
//! the [`Peripherals`] trait; the on-target implementation lives in
//! [`esp`] and host tests substitute call-recording mocks.

use core::fmt;

#[cfg(all(not(test), target_arch = "xtensa"))]
pub mod esp;

#[cfg(all(not(test), target_arch = "xtensa"))]
pub use esp::EspBoard;

/// Maximum number of tasks a snapshot can hold.
pub const MAX_TASKS: usize = 16;

/// Maximum task name length, matching the FreeRTOS name field.
pub const TASK_NAME_LEN: usize = 16;

/// GPIO port identifiers available on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioPort {
    A,
    B,
    C,
    D,
    E,
    H,
}

impl GpioPort {
    /// Map a user-typed port letter to a port. Accepts both cases.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' | 'A' => Some(GpioPort::A),
            'b' | 'B' => Some(GpioPort::B),
            'c' | 'C' => Some(GpioPort::C),
            'd' | 'D' => Some(GpioPort::D),
            'e' | 'E' => Some(GpioPort::E),
            'h' | 'H' => Some(GpioPort::H),
            _ => None,
        }
    }

    /// Lowercase letter for user-facing output.
    pub fn letter(self) -> char {
        match self {
            GpioPort::A => 'a',
            GpioPort::B => 'b',
            GpioPort::C => 'c',
            GpioPort::D => 'd',
            GpioPort::E => 'e',
            GpioPort::H => 'h',
        }
    }
}

/// Pin index within a port, validated 0..=15.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinIndex(u8);

impl PinIndex {
    pub const MAX: u8 = 15;

    pub fn new(index: u8) -> Option<Self> {
        if index <= Self::MAX {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Logical state of a GPIO pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
    Low,
    High,
}

impl PinState {
    /// Parse the user token: `0` is low, `1` is high.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0" => Some(PinState::Low),
            "1" => Some(PinState::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinState::Low => "LOW",
            PinState::High => "HIGH",
        }
    }
}

/// PWM output channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmChannel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

impl PwmChannel {
    /// Map the user-facing channel number (1-based) to a channel.
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(PwmChannel::Ch1),
            2 => Some(PwmChannel::Ch2),
            3 => Some(PwmChannel::Ch3),
            4 => Some(PwmChannel::Ch4),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PwmChannel::Ch1 => 1,
            PwmChannel::Ch2 => 2,
            PwmChannel::Ch3 => 3,
            PwmChannel::Ch4 => 4,
        }
    }
}

/// Scheduler state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Ready,
    Blocked,
    Suspended,
    Deleted,
    Invalid,
}

impl TaskState {
    /// Two-letter code used in the task-stats table.
    pub fn code(self) -> &'static str {
        match self {
            TaskState::Running => "RU",
            TaskState::Ready => "RE",
            TaskState::Blocked => "BL",
            TaskState::Suspended => "SU",
            TaskState::Deleted => "DE",
            TaskState::Invalid => "??",
        }
    }
}

/// Snapshot row for one task.
#[derive(Clone, Debug)]
pub struct TaskInfo {
    pub name: heapless::String<TASK_NAME_LEN>,
    pub state: TaskState,
    pub priority: u32,
    /// Stack high-water mark: minimum free stack ever observed, in words.
    pub stack_headroom: u32,
    /// Cumulative run-time counter.
    pub run_time: u32,
}

/// Ordered capture of every task at one instant.
///
/// Bounded: boards with more than [`MAX_TASKS`] tasks truncate the capture.
#[derive(Clone, Debug, Default)]
pub struct TaskSnapshot {
    pub tasks: heapless::Vec<TaskInfo, MAX_TASKS>,
    pub total_run_time: u32,
}

/// Heap statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapInfo {
    pub free_bytes: u32,
    pub min_free_bytes: u32,
}

/// Failure reported by a peripheral call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverError;

/// Peripheral surface the command handlers call into.
pub trait Peripherals {
    fn gpio_read(&mut self, port: GpioPort, pin: PinIndex) -> Result<PinState, DriverError>;

    fn gpio_write(
        &mut self,
        port: GpioPort,
        pin: PinIndex,
        state: PinState,
    ) -> Result<(), DriverError>;

    fn pwm_set_frequency(&mut self, hz: u32) -> Result<(), DriverError>;

    fn pwm_set_duty(&mut self, percent: u8, channel: PwmChannel) -> Result<(), DriverError>;

    fn heap_info(&mut self) -> HeapInfo;

    /// Write the formatted clock-tree table into `out`.
    fn clock_info(&mut self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Capture the state of every task at this instant.
    fn task_snapshot(&mut self) -> TaskSnapshot;
}
