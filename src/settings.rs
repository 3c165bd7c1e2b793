//! Runtime settings
//!
//! Read from a JSON file at startup. Missing fields take their defaults and a
//! file that cannot be read or parsed falls back to the defaults entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{RUN_DT, SHOWER_DT};

/// Which step policy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// The player game
    #[default]
    Run,
    /// Asteroids raining onto a single platform
    Shower,
    /// The player bouncing on two stiff pads
    SpringTestbed,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Run => "run",
            ScenarioKind::Shower => "shower",
            ScenarioKind::SpringTestbed => "spring_testbed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "run" | "bernard" => Some(ScenarioKind::Run),
            "shower" | "asteroids" => Some(ScenarioKind::Shower),
            "spring_testbed" | "spring" | "testbed" => Some(ScenarioKind::SpringTestbed),
            _ => None,
        }
    }

    /// Fixed step this scenario was tuned for
    pub fn default_fixed_step(&self) -> f32 {
        match self {
            ScenarioKind::Shower => SHOWER_DT,
            ScenarioKind::Run | ScenarioKind::SpringTestbed => RUN_DT,
        }
    }
}

/// Settings for a headless session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scenario: ScenarioKind,
    /// Overrides the scenario's fixed step
    pub fixed_step: Option<f32>,
    /// Multiplier on frame times (negative runs time backwards)
    pub time_scale: f32,
    /// RNG seed for spawning
    pub seed: u64,

    // === Headless driver ===
    /// Frames to simulate
    pub frames: u32,
    /// Nominal display rate the frames are generated at
    pub frame_rate: f32,
    /// Random variation of each frame's duration (fraction of the nominal)
    pub frame_jitter: f32,
    /// Where the best-times leaderboard is kept, if anywhere
    pub highscores_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::Run,
            fixed_step: None,
            time_scale: 1.0,
            seed: 42,
            frames: 3600,
            frame_rate: 60.0,
            frame_jitter: 0.2,
            highscores_path: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a file, falling back to defaults on any failure
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Fixed step to run with; invalid overrides fall back to the scenario's own
    pub fn effective_fixed_step(&self) -> f32 {
        match self.fixed_step {
            Some(dt) if dt.is_finite() && dt > 0.0 => dt,
            Some(dt) => {
                log::warn!("Ignoring invalid fixed step {}", dt);
                self.scenario.default_fixed_step()
            }
            None => self.scenario.default_fixed_step(),
        }
    }

    /// Nominal duration of one displayed frame
    pub fn frame_time(&self) -> f32 {
        if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            1.0 / 60.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "scenario": "shower", "seed": 7 }"#).unwrap();
        assert_eq!(s.scenario, ScenarioKind::Shower);
        assert_eq!(s.seed, 7);
        assert_eq!(s.time_scale, 1.0);
        assert_eq!(s.effective_fixed_step(), SHOWER_DT);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{ scenario: ").is_err());
        assert!(Settings::from_json(r#"{ "scenario": "platformer" }"#).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let s = Settings::load_from("/nonexistent/bernard/settings.json");
        assert_eq!(s.scenario, ScenarioKind::Run);
        assert_eq!(s.frames, Settings::default().frames);
    }

    #[test]
    fn test_fixed_step_override() {
        let mut s = Settings {
            fixed_step: Some(0.01),
            ..Default::default()
        };
        assert_eq!(s.effective_fixed_step(), 0.01);
        s.fixed_step = Some(-1.0);
        assert_eq!(s.effective_fixed_step(), RUN_DT);
        s.fixed_step = Some(f32::NAN);
        assert_eq!(s.effective_fixed_step(), RUN_DT);
    }

    #[test]
    fn test_json_round_trip() {
        let s = Settings {
            scenario: ScenarioKind::SpringTestbed,
            frames: 10,
            ..Default::default()
        };
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back.scenario, ScenarioKind::SpringTestbed);
        assert_eq!(back.frames, 10);
    }

    #[test]
    fn test_scenario_names() {
        assert_eq!(ScenarioKind::from_str("Spring"), Some(ScenarioKind::SpringTestbed));
        assert_eq!(ScenarioKind::from_str(ScenarioKind::Shower.as_str()), Some(ScenarioKind::Shower));
        assert_eq!(ScenarioKind::from_str("platformer"), None);
    }
}
