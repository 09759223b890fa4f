//! RustUartConsole - Main entry point
//!
//! Bring-up order: take the peripherals, install the UART transport,
//! initialize the board, spawn the heartbeat task, then run the console
//! loop in the main task.

#![cfg_attr(target_arch = "xtensa", no_std)]
#![cfg_attr(target_arch = "xtensa", no_main)]

#[cfg(target_arch = "xtensa")]
mod firmware {
    use esp_idf_svc::sys as esp_idf_sys;

    use rust_uart_console::console::Console;
    use rust_uart_console::hal::EspBoard;
    use rust_uart_console::uart::{UartConsoleConfig, UartConsoleIo};
    use rust_uart_console::{console_info, console_warn};

    /* Heart beat settings */
    const HEART_BEAT_LED_GPIO: i32 = 2;
    const HEART_BEAT_BLINK_DELAY_TICKS: u32 = 50; // 500 ms at the default 100 Hz tick

    /// Task to indicate the firmware is alive.
    unsafe extern "C" fn heart_beat_task(_params: *mut core::ffi::c_void) {
        esp_idf_sys::gpio_set_direction(
            HEART_BEAT_LED_GPIO,
            esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
        );

        let mut level = 0u32;
        loop {
            level ^= 1;
            esp_idf_sys::gpio_set_level(HEART_BEAT_LED_GPIO, level);
            esp_idf_sys::vTaskDelay(HEART_BEAT_BLINK_DELAY_TICKS);
        }
    }

    fn timestamp_us() -> i64 {
        unsafe { esp_idf_sys::esp_timer_get_time() }
    }

    /// Bring-up failed; park the main task.
    fn halt() -> ! {
        loop {
            unsafe {
                esp_idf_sys::vTaskDelay(1000);
            }
        }
    }

    #[no_mangle]
    fn main() {
        // Initialize ESP-IDF
        esp_idf_sys::link_patches();

        let peripherals = match esp_idf_svc::hal::peripherals::Peripherals::take() {
            Ok(p) => p,
            Err(_) => halt(),
        };

        let config = UartConsoleConfig::default();
        let mut io = match UartConsoleIo::new(
            peripherals.uart1,
            peripherals.pins.gpio17,
            peripherals.pins.gpio18,
            &config,
        ) {
            Ok(io) => io,
            Err(_) => halt(),
        };

        let mut board = EspBoard::new();
        if board.pwm_init().is_err() {
            console_warn!(
                timestamp_us(),
                "PWM init failed, pwm commands will report errors"
            );
        }

        unsafe {
            esp_idf_sys::xTaskCreatePinnedToCore(
                Some(heart_beat_task),
                b"heart-beat\0".as_ptr().cast(),
                2048,
                core::ptr::null_mut(),
                1,
                core::ptr::null_mut(),
                1,
            );
        }

        console_info!(timestamp_us(), "console up");

        // The one console instance for the firmware's lifetime.
        let mut console = Console::new();
        console.run(&mut board, &mut io)
    }
}

// The firmware entry only exists for the target; host builds (tests,
// tooling) get an inert binary.
#[cfg(not(target_arch = "xtensa"))]
fn main() {}
