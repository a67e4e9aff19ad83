//! Alien Advance - an interrupt-driven shooter for an 84x48 monochrome handheld
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clocks, debouncing, cooldowns, entities, collisions)
//! - `platform`: Display/telemetry/input collaborators and host stand-ins
//! - `console`: Menu, countdown, session and game-over phases
//! - `settings`: Data-driven tuning loaded from JSON

pub mod console;
pub mod platform;
pub mod settings;
pub mod sim;

pub use console::{Console, Phase};
pub use settings::Settings;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Display dimensions (pixels)
    pub const LCD_X: i32 = 84;
    pub const LCD_Y: i32 = 48;

    /// Row of the status bar's bottom border; the playfield starts below it
    pub const STATUS_BORDER_Y: i32 = 9;
    /// First row entities may occupy
    pub const PLAYFIELD_TOP: i32 = 10;

    /// Timer input clock (8 MHz CPU, /1024 prescaler)
    pub const CPU_HZ: f64 = 8_000_000.0;
    pub const PRESCALER: f64 = 1024.0;
    /// Seconds per counter increment for both clocks
    pub const COUNTER_PERIOD: f64 = PRESCALER / CPU_HZ;
    /// 8-bit counter behind the play-time display
    pub const COARSE_RANGE: u32 = 1 << 8;
    /// 16-bit counter behind per-tick deltas and debug timestamps
    pub const FINE_RANGE: u32 = 1 << 16;
    /// Counter increments between two tick interrupts (8 MHz / 128 / 256)
    pub const COUNTS_PER_TICK: u32 = 32;

    /// Fixed pool sizes
    pub const NUM_BUTTONS: usize = 6;
    pub const BULLET_COUNT: usize = 5;
    pub const ALIEN_COUNT: usize = 5;

    /// Speeds in pixels per step
    pub const CRAFT_SPEED: f64 = 1.0;
    pub const BULLET_SPEED: f64 = 1.5;
    pub const ALIEN_SPEED: f64 = 0.8;
    pub const MOTHERSHIP_SPEED: f64 = 0.5;

    /// Aim line length from the craft centre
    pub const AIM_LINE_LENGTH: i32 = 5;
    /// ADC reading (0..=1023) to degrees
    pub const AIM_SCALE: f64 = 0.705;

    /// Cooldown draw range: values land in [-ARM_HIGH, -ARM_LOW]
    pub const ARM_LOW: f64 = 2.0;
    pub const ARM_HIGH: f64 = 4.0;

    /// Points for a mothership kill
    pub const MOTHERSHIP_BOUNTY: u32 = 10;
}

/// Angle (radians) of the vector pointing from `from` to `to`
#[inline]
pub fn angle_to(from: DVec2, to: DVec2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit direction for an angle in radians
#[inline]
pub fn direction(radians: f64) -> DVec2 {
    DVec2::new(radians.cos(), radians.sin())
}

/// Round a sub-pixel coordinate to the pixel it is drawn on
#[inline]
pub fn to_pixel(v: f64) -> i32 {
    v.round() as i32
}
