//! System configuration parameters
//!
//! All tunable parameters for the canopy installation.
//! Values can be overridden from a JSON file through [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::animation::rainbow::{Spectrum, parse_colour};
use crate::app::ports::ConfigError;
use crate::sensors::MAX_PADS;

/// Colour spectrum for one animation zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// Ordered anchor colours (CSS names or `#rrggbb`), at least two.
    pub anchors: Vec<String>,
    /// Number of discrete colour stops; steps map onto `[1, range]`.
    pub range: u32,
}

/// Strip geometry plus spectrum of one zone (cap or stem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub strip_count: u16,
    pub leds_per_strip: u16,
    pub spectrum: SpectrumConfig,
}

/// What the canopy shows while Safety is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SafetyAnimation {
    /// Freeze on the last rendered step.
    Halt,
    /// Flat fill of a fixed colour per zone.
    Solid { cap: String, stem: String },
}

/// Core system configuration.  Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- LED canopy ---
    pub cap: ZoneConfig,
    pub stem: ZoneConfig,
    pub safety_animation: SafetyAnimation,

    // --- Weight pads ---
    /// Number of physical pads; valid pad ids are `0..pad_count`
    pub pad_count: u8,
    /// Readings at or above this value mark a pad as stepped on
    pub step_threshold: f32,
    /// Consecutive readings needed on the other side of the threshold to flip
    pub debounce_readings: u8,

    // --- Actuator ---
    /// Transit time after which a motion is assumed complete (milliseconds)
    pub actuator_transit_timeout_ms: u32,
    /// Immediate retries of a failed retract before holding position
    pub retract_retries: u8,

    // --- Interaction ---
    /// Minimum time Active is held after the last trigger (milliseconds)
    pub active_hold_ms: u32,
    /// Animation steps per tick while Idle
    pub idle_step_increment: u32,
    /// Animation steps per tick while Active
    pub active_step_increment: u32,

    // --- Timing ---
    /// Control loop tick interval (milliseconds)
    pub tick_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Canopy
            cap: ZoneConfig {
                strip_count: 6,
                leds_per_strip: 90,
                spectrum: SpectrumConfig {
                    anchors: vec!["blue".into(), "purple".into(), "blue".into()],
                    range: 400,
                },
            },
            stem: ZoneConfig {
                strip_count: 2,
                leds_per_strip: 240,
                spectrum: SpectrumConfig {
                    anchors: vec!["white".into(), "white".into(), "white".into()],
                    range: 400,
                },
            },
            safety_animation: SafetyAnimation::Solid {
                cap: "red".into(),
                stem: "#400000".into(),
            },

            // Pads
            pad_count: 4,
            step_threshold: 60.0,
            debounce_readings: 1,

            // Actuator
            actuator_transit_timeout_ms: 4000,
            retract_retries: 1,

            // Interaction
            active_hold_ms: 5000,
            idle_step_increment: 1,
            active_step_increment: 4,

            // Timing
            tick_interval_ms: 50, // 20 Hz
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_zone(&self.cap, "cap")?;
        validate_zone(&self.stem, "stem")?;

        if let SafetyAnimation::Solid { cap, stem } = &self.safety_animation {
            if parse_colour(cap).is_none() || parse_colour(stem).is_none() {
                return Err(ConfigError::ValidationFailed(
                    "safety_animation: unknown colour",
                ));
            }
        }

        if self.pad_count == 0 || self.pad_count as usize > MAX_PADS {
            return Err(ConfigError::ValidationFailed("pad_count out of range"));
        }
        if !self.step_threshold.is_finite() || self.step_threshold < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "step_threshold must be finite and >= 0",
            ));
        }
        if self.debounce_readings == 0 {
            return Err(ConfigError::ValidationFailed("debounce_readings must be >= 1"));
        }
        if self.actuator_transit_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "actuator_transit_timeout_ms must be > 0",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.active_step_increment < self.idle_step_increment {
            return Err(ConfigError::ValidationFailed(
                "active_step_increment below idle_step_increment",
            ));
        }
        Ok(())
    }
}

fn validate_zone(zone: &ZoneConfig, name: &'static str) -> Result<(), ConfigError> {
    if zone.strip_count == 0 || zone.leds_per_strip == 0 {
        return Err(ConfigError::ValidationFailed(match name {
            "cap" => "cap: empty strip geometry",
            _ => "stem: empty strip geometry",
        }));
    }
    Spectrum::from_config(&zone.spectrum).map_err(|e| {
        log::warn!("{} spectrum rejected: {}", name, e);
        ConfigError::ValidationFailed(match name {
            "cap" => "cap: invalid spectrum",
            _ => "stem: invalid spectrum",
        })
    })?;
    Ok(())
}
