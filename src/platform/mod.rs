//! Platform abstraction layer
//!
//! The simulation only sees the handheld through these narrow traits:
//! - `Display`: 84x48 monochrome LCD
//! - `Telemetry`: USB serial debug line (fire-and-forget)
//! - `AimInput`: potentiometer on the ADC
//! - `ButtonInput`: the six digital buttons
//!
//! `host` provides in-memory stand-ins used by the native driver and tests.

pub mod host;

use core::fmt::{self, Write as _};

use crate::consts::NUM_BUTTONS;

pub trait Display {
    fn clear(&mut self);
    fn draw_pixel(&mut self, x: i32, y: i32, on: bool);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
    /// Flush the drawn frame to the panel
    fn present(&mut self);
}

pub trait Telemetry {
    /// Whether a host is listening; writes are dropped otherwise
    fn connected(&self) -> bool {
        true
    }

    fn write_line(&mut self, text: &str);

    /// One byte typed on the serial console, if any
    fn poll_key(&mut self) -> Option<u8> {
        None
    }
}

pub trait AimInput {
    /// 10-bit ADC reading, 0..=1023
    fn read_aim(&mut self) -> u16;
}

pub trait ButtonInput {
    /// Pin states in logical order: left, right, up, down, fire-left, fire-right
    fn read_raw_buttons(&mut self) -> [bool; NUM_BUTTONS];
}

/// Longest debug line sent over telemetry; longer messages are cut short
pub const DEBUG_LINE_CAPACITY: usize = 96;

/// Send `[DEBUG @ sss.mmm] message` without allocating
pub fn send_debug<T: Telemetry + ?Sized>(telemetry: &mut T, time: f64, message: fmt::Arguments<'_>) {
    if !telemetry.connected() {
        return;
    }
    let mut line = Line::default();
    let _ = write!(line, "[DEBUG @ {:07.3}] ", time);
    let _ = line.write_fmt(message);
    telemetry.write_line(&line.0);
}

/// Fixed-capacity line that keeps whatever fits
#[derive(Default)]
struct Line(heapless::String<DEBUG_LINE_CAPACITY>);

impl fmt::Write for Line {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
