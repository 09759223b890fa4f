//! On-target peripheral drivers backed by ESP-IDF.
//!
//! The console's lettered port model maps onto the flat ESP32 GPIO space
//! in blocks of 16 pins. PWM runs on LEDC timer 0 with four channels.

use core::fmt::Write;

use esp_idf_svc::sys as esp_idf_sys;

use super::{
    DriverError, GpioPort, HeapInfo, Peripherals, PinIndex, PinState, PwmChannel, TaskInfo,
    TaskSnapshot, TaskState, MAX_TASKS,
};

/// LEDC duty resolution: 10 bits, duty range 0..=1023.
const PWM_DUTY_MAX: u32 = 1023;

/// Default PWM frequency programmed at init.
const PWM_DEFAULT_FREQ_HZ: u32 = 1000;

/// Output pins driven by the four PWM channels.
const PWM_PINS: [i32; 4] = [4, 5, 6, 7];

/// Board peripherals reached through ESP-IDF.
pub struct EspBoard;

impl EspBoard {
    pub fn new() -> Self {
        Self
    }

    /// Configure LEDC timer 0 and its four output channels.
    pub fn pwm_init(&mut self) -> Result<(), DriverError> {
        unsafe {
            let mut timer_cfg: esp_idf_sys::ledc_timer_config_t = core::mem::zeroed();
            timer_cfg.speed_mode = esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE;
            timer_cfg.duty_resolution = esp_idf_sys::ledc_timer_bit_t_LEDC_TIMER_10_BIT;
            timer_cfg.timer_num = esp_idf_sys::ledc_timer_t_LEDC_TIMER_0;
            timer_cfg.freq_hz = PWM_DEFAULT_FREQ_HZ;
            timer_cfg.clk_cfg = esp_idf_sys::ledc_clk_cfg_t_LEDC_AUTO_CLK;
            check(esp_idf_sys::ledc_timer_config(&timer_cfg))?;

            for (index, pin) in PWM_PINS.iter().enumerate() {
                let mut channel_cfg: esp_idf_sys::ledc_channel_config_t = core::mem::zeroed();
                channel_cfg.gpio_num = *pin;
                channel_cfg.speed_mode = esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE;
                channel_cfg.channel = esp_idf_sys::ledc_channel_t_LEDC_CHANNEL_0 + index as u32;
                channel_cfg.timer_sel = esp_idf_sys::ledc_timer_t_LEDC_TIMER_0;
                channel_cfg.duty = 0;
                channel_cfg.hpoint = 0;
                check(esp_idf_sys::ledc_channel_config(&channel_cfg))?;
            }
        }
        Ok(())
    }
}

impl Default for EspBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn check(err: esp_idf_sys::esp_err_t) -> Result<(), DriverError> {
    if err != esp_idf_sys::ESP_OK {
        return Err(DriverError);
    }
    Ok(())
}

/// Flatten (port, pin) into a GPIO number. Ports beyond the chip's pin
/// count stay unmapped and report a driver error.
fn gpio_num(port: GpioPort, pin: PinIndex) -> Result<i32, DriverError> {
    let base = match port {
        GpioPort::A => 0,
        GpioPort::B => 16,
        GpioPort::C => 32,
        GpioPort::D | GpioPort::E | GpioPort::H => return Err(DriverError),
    };
    Ok(base + pin.index() as i32)
}

fn ledc_channel(channel: PwmChannel) -> u32 {
    esp_idf_sys::ledc_channel_t_LEDC_CHANNEL_0 + (channel.number() - 1) as u32
}

#[allow(non_upper_case_globals)]
fn map_task_state(state: esp_idf_sys::eTaskState) -> TaskState {
    match state {
        esp_idf_sys::eTaskState_eRunning => TaskState::Running,
        esp_idf_sys::eTaskState_eReady => TaskState::Ready,
        esp_idf_sys::eTaskState_eBlocked => TaskState::Blocked,
        esp_idf_sys::eTaskState_eSuspended => TaskState::Suspended,
        esp_idf_sys::eTaskState_eDeleted => TaskState::Deleted,
        _ => TaskState::Invalid,
    }
}

impl Peripherals for EspBoard {
    fn gpio_read(&mut self, port: GpioPort, pin: PinIndex) -> Result<PinState, DriverError> {
        let num = gpio_num(port, pin)?;
        let level = unsafe { esp_idf_sys::gpio_get_level(num) };
        if level == 0 {
            Ok(PinState::Low)
        } else {
            Ok(PinState::High)
        }
    }

    fn gpio_write(
        &mut self,
        port: GpioPort,
        pin: PinIndex,
        state: PinState,
    ) -> Result<(), DriverError> {
        let num = gpio_num(port, pin)?;
        let level = match state {
            PinState::Low => 0,
            PinState::High => 1,
        };
        unsafe {
            check(esp_idf_sys::gpio_set_direction(
                num,
                esp_idf_sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            ))?;
            check(esp_idf_sys::gpio_set_level(num, level))?;
        }
        Ok(())
    }

    fn pwm_set_frequency(&mut self, hz: u32) -> Result<(), DriverError> {
        unsafe {
            check(esp_idf_sys::ledc_set_freq(
                esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
                esp_idf_sys::ledc_timer_t_LEDC_TIMER_0,
                hz,
            ))
        }
    }

    fn pwm_set_duty(&mut self, percent: u8, channel: PwmChannel) -> Result<(), DriverError> {
        let duty = (percent as u32 * PWM_DUTY_MAX) / 100;
        let channel = ledc_channel(channel);
        unsafe {
            check(esp_idf_sys::ledc_set_duty(
                esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel,
                duty,
            ))?;
            check(esp_idf_sys::ledc_update_duty(
                esp_idf_sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel,
            ))
        }
    }

    fn heap_info(&mut self) -> HeapInfo {
        unsafe {
            HeapInfo {
                free_bytes: esp_idf_sys::esp_get_free_heap_size(),
                min_free_bytes: esp_idf_sys::esp_get_minimum_free_heap_size(),
            }
        }
    }

    fn clock_info(&mut self, out: &mut dyn Write) -> core::fmt::Result {
        let (cpu, apb, xtal) = unsafe {
            (
                esp_idf_sys::esp_clk_cpu_freq() as u32,
                esp_idf_sys::esp_clk_apb_freq() as u32,
                esp_idf_sys::esp_clk_xtal_freq() as u32,
            )
        };

        writeln!(out, "Clock name          Hz         kHz       MHz")?;
        writeln!(out, "==========          ========== ========  ====")?;
        writeln!(
            out,
            "CPU                 {:<10} {:<8}  {}",
            cpu,
            cpu / 1_000,
            cpu / 1_000_000
        )?;
        writeln!(
            out,
            "APB peripheral      {:<10} {:<8}  {}",
            apb,
            apb / 1_000,
            apb / 1_000_000
        )?;
        writeln!(
            out,
            "Crystal             {:<10} {:<8}  {}",
            xtal,
            xtal / 1_000,
            xtal / 1_000_000
        )
    }

    fn task_snapshot(&mut self) -> TaskSnapshot {
        let mut snapshot = TaskSnapshot::default();
        let mut statuses: [esp_idf_sys::TaskStatus_t; MAX_TASKS] = unsafe { core::mem::zeroed() };
        let mut total_run_time = 0u32;

        let count = unsafe {
            esp_idf_sys::uxTaskGetSystemState(
                statuses.as_mut_ptr(),
                MAX_TASKS as u32,
                &mut total_run_time,
            )
        } as usize;

        snapshot.total_run_time = total_run_time;

        for status in statuses.iter().take(count) {
            let mut name = heapless::String::new();
            if !status.pcTaskName.is_null() {
                let mut p = status.pcTaskName;
                unsafe {
                    while *p != 0 {
                        if name.push(*p as u8 as char).is_err() {
                            break;
                        }
                        p = p.add(1);
                    }
                }
            }

            let info = TaskInfo {
                name,
                state: map_task_state(status.eCurrentState),
                priority: status.uxCurrentPriority,
                stack_headroom: status.usStackHighWaterMark as u32,
                run_time: status.ulRunTimeCounter,
            };
            if snapshot.tasks.push(info).is_err() {
                break;
            }
        }

        snapshot
    }
}
