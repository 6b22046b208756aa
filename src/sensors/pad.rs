//! Weight pad readings and per-pad classification.
//!
//! A pad reports a raw intensity.  Classification is a plain threshold
//! (at/above ⇒ stepped) with an optional debounce: the pad only flips after
//! `debounce` consecutive readings on the other side of the threshold.

use serde::Serialize;

/// One raw reading.  Superseded by the next reading for the same pad,
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    pub pad_id: u8,
    pub value: f32,
    /// Milliseconds on the controller's monotonic clock.
    pub observed_at_ms: u64,
}

/// Derived state of one pad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PadState {
    pub pad_id: u8,
    pub last_reading: SensorReading,
    pub is_stepped: bool,
}

/// Edge produced by a reading that flipped the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEdge {
    /// not stepped → stepped
    Pressed,
    /// stepped → not stepped
    Released,
}

/// Result of registering one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadUpdate {
    pub is_stepped: bool,
    pub edge: Option<PadEdge>,
}

/// Threshold + debounce classifier for a single pad.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PadClassifier {
    state: PadState,
    /// Consecutive readings disagreeing with `state.is_stepped`.
    streak: u8,
}

impl PadClassifier {
    pub(crate) fn new(reading: SensorReading) -> Self {
        Self {
            state: PadState {
                pad_id: reading.pad_id,
                last_reading: reading,
                is_stepped: false,
            },
            streak: 0,
        }
    }

    pub(crate) fn ingest(&mut self, reading: SensorReading, threshold: f32, debounce: u8) -> PadUpdate {
        self.state.last_reading = reading;

        let above = reading.value >= threshold;
        if above == self.state.is_stepped {
            self.streak = 0;
            return PadUpdate {
                is_stepped: self.state.is_stepped,
                edge: None,
            };
        }

        self.streak = self.streak.saturating_add(1);
        if self.streak < debounce.max(1) {
            return PadUpdate {
                is_stepped: self.state.is_stepped,
                edge: None,
            };
        }

        self.streak = 0;
        self.state.is_stepped = above;
        PadUpdate {
            is_stepped: above,
            edge: Some(if above { PadEdge::Pressed } else { PadEdge::Released }),
        }
    }

    pub(crate) fn state(&self) -> PadState {
        self.state
    }
}
