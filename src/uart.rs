//! UART transport for the console.
//!
//! The ESP-IDF UART driver feeds received bytes from interrupt context
//! into its bounded RX ring; the console task is the only consumer and
//! blocks on [`ConsoleIo::receive_byte`]. The driver re-arms reception
//! internally, so the per-byte re-arm hook stays a no-op here.

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use crate::console::{ConsoleIo, IoError};

/// Console UART configuration.
pub struct UartConsoleConfig {
    pub baud_rate: u32,
}

impl Default for UartConsoleConfig {
    fn default() -> Self {
        Self { baud_rate: 115_200 }
    }
}

/// Interrupt-fed UART transport owned by the console task.
pub struct UartConsoleIo<'d> {
    driver: UartDriver<'d>,
}

impl<'d> UartConsoleIo<'d> {
    /// Install the interrupt-driven UART driver for the console port.
    pub fn new(
        uart: impl Peripheral<P = impl uart::Uart> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
        config: &UartConsoleConfig,
    ) -> Result<Self, EspError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

        let driver = UartDriver::new(
            uart,
            tx_pin,
            rx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )?;

        Ok(Self { driver })
    }
}

impl ConsoleIo for UartConsoleIo<'_> {
    fn receive_byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        loop {
            match self.driver.read(&mut byte, BLOCK) {
                Ok(n) if n > 0 => return byte[0],
                _ => continue,
            }
        }
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        let mut written = 0;
        while written < bytes.len() {
            match self.driver.write(&bytes[written..]) {
                Ok(n) => written += n,
                Err(_) => return Err(IoError),
            }
        }
        Ok(())
    }
}
