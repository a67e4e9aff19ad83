//! Game settings
//!
//! Tuning that is not fixed by the hardware, loaded from a JSON file.

use serde::{Deserialize, Serialize};

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "ALIEN_ADVANCE_SETTINGS";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Session ===
    /// Lives at the start of a session
    pub starting_lives: u8,
    /// Hits a mothership takes
    pub boss_health: u8,
    /// Seconds between countdown digits
    pub countdown_step_secs: f64,

    // === Spawning ===
    /// Random draws before placement falls back to a scan
    pub spawn_retry_cap: u32,
    /// Fixed RNG seed; `None` seeds from the timer when leaving the menu
    pub seed: Option<u64>,

    // === Telemetry ===
    /// Send debug lines over the serial link
    pub telemetry: bool,
    /// Seconds between status lines while playing (0 disables)
    pub status_interval_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            boss_health: 10,
            countdown_step_secs: 0.3,

            spawn_retry_cap: 64,
            seed: None,

            telemetry: true,
            status_interval_secs: 0.5,
        }
    }
}

impl Settings {
    /// Parse settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// A session needs at least one life and a mothership that can be hit
    pub fn sanitized(mut self) -> Self {
        if self.starting_lives == 0 {
            log::warn!("starting_lives must be at least 1; using 1");
            self.starting_lives = 1;
        }
        if self.boss_health == 0 {
            log::warn!("boss_health must be at least 1; using 1");
            self.boss_health = 1;
        }
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from the file named by `ALIEN_ADVANCE_SETTINGS`, or defaults
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings in {}: {}; using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "starting_lives": 5, "seed": 42 }"#).unwrap();
        assert_eq!(s.starting_lives, 5);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.boss_health, 10);
        assert!(s.telemetry);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut s = Settings::default();
        s.spawn_retry_cap = 8;
        s.telemetry = false;
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_zero_counts_are_raised_to_one() {
        let s = Settings::from_json(r#"{ "starting_lives": 0, "boss_health": 0 }"#).unwrap();
        assert_eq!(s.starting_lives, 1);
        assert_eq!(s.boss_health, 1);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ starting_lives: }").is_err());
        assert!(Settings::from_json(r#"{ "boss_health": -1 }"#).is_err());
    }
}
