//! Animation frame generator.
//!
//! Projects the animation step through the cap and stem spectra into a
//! full per-strip, per-LED colour buffer.  Every LED of a zone carries the
//! same colour for a given step (flat fill, no per-pixel chase).

use serde::Serialize;

use super::rainbow::{Colour, Spectrum, SpectrumError};
use crate::config::{SystemConfig, ZoneConfig};

/// LED grouping with its own geometry and spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Cap,
    Stem,
}

/// Strip count × LEDs-per-strip of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneGeometry {
    pub strip_count: u16,
    pub leds_per_strip: u16,
}

impl From<&ZoneConfig> for ZoneGeometry {
    fn from(z: &ZoneConfig) -> Self {
        Self {
            strip_count: z.strip_count,
            leds_per_strip: z.leds_per_strip,
        }
    }
}

/// One rendered frame.  `cap[i]` / `stem[i]` is the ordered LED buffer of
/// strip `i`.  Frames are regenerated, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationFrame {
    pub step_index: u64,
    pub cap: Vec<Vec<Colour>>,
    pub stem: Vec<Vec<Colour>>,
}

impl AnimationFrame {
    /// LED buffer of one strip, `None` if the strip index is out of range.
    pub fn strip(&self, zone: Zone, index: usize) -> Option<&[Colour]> {
        let strips = match zone {
            Zone::Cap => &self.cap,
            Zone::Stem => &self.stem,
        };
        strips.get(index).map(Vec::as_slice)
    }
}

pub struct FrameGenerator {
    cap: Spectrum,
    stem: Spectrum,
    cap_geometry: ZoneGeometry,
    stem_geometry: ZoneGeometry,
}

impl FrameGenerator {
    pub fn new(
        cap: Spectrum,
        cap_geometry: ZoneGeometry,
        stem: Spectrum,
        stem_geometry: ZoneGeometry,
    ) -> Self {
        Self {
            cap,
            stem,
            cap_geometry,
            stem_geometry,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Result<Self, SpectrumError> {
        Ok(Self::new(
            Spectrum::from_config(&config.cap.spectrum)?,
            ZoneGeometry::from(&config.cap),
            Spectrum::from_config(&config.stem.spectrum)?,
            ZoneGeometry::from(&config.stem),
        ))
    }

    /// Rainbow frame for `step`.
    pub fn frame(&self, step: u64) -> AnimationFrame {
        self.solid(
            step,
            self.cap.colour_at_step(step),
            self.stem.colour_at_step(step),
        )
    }

    /// Frame with a fixed colour per zone (used for the safety palette).
    pub fn solid(&self, step: u64, cap: Colour, stem: Colour) -> AnimationFrame {
        AnimationFrame {
            step_index: step,
            cap: fill(self.cap_geometry, cap),
            stem: fill(self.stem_geometry, stem),
        }
    }
}

fn fill(geometry: ZoneGeometry, colour: Colour) -> Vec<Vec<Colour>> {
    vec![vec![colour; geometry.leds_per_strip as usize]; geometry.strip_count as usize]
}
