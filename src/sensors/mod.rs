//! Weight sensor subsystem: per-pad classification and the aggregating
//! [`PadAggregator`].
//!
//! The aggregator keeps the latest reading per pad and answers the control
//! loop's one cross-pad question: is anybody standing on the installation?

pub mod pad;

use heapless::FnvIndexMap;
use log::{debug, info};

use crate::config::SystemConfig;
use crate::error::InputError;
use pad::{PadClassifier, PadEdge, PadState, PadUpdate, SensorReading};

/// Upper bound on physical pads.  Power of two for the index map.
pub const MAX_PADS: usize = 16;

/// Latest state of every pad that has reported at least once.
pub struct PadAggregator {
    pad_count: u8,
    threshold: f32,
    debounce: u8,
    pads: FnvIndexMap<u8, PadClassifier, MAX_PADS>,
}

impl PadAggregator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            pad_count: config.pad_count.min(MAX_PADS as u8),
            threshold: config.step_threshold,
            debounce: config.debounce_readings,
            pads: FnvIndexMap::new(),
        }
    }

    /// Validate and store a reading, reclassify the pad, and report the
    /// new `is_stepped` value plus any edge.  Malformed readings are
    /// rejected without touching state.
    pub fn register_reading(
        &mut self,
        pad_id: u8,
        value: f32,
        now_ms: u64,
    ) -> Result<PadUpdate, InputError> {
        if pad_id >= self.pad_count {
            return Err(InputError::UnknownPad(pad_id));
        }
        if !value.is_finite() {
            return Err(InputError::NonFiniteValue);
        }
        if value < 0.0 {
            return Err(InputError::NegativeValue);
        }

        let reading = SensorReading {
            pad_id,
            value,
            observed_at_ms: now_ms,
        };

        if !self.pads.contains_key(&pad_id) {
            // Capacity is MAX_PADS and pad_id < pad_count <= MAX_PADS.
            let _ = self.pads.insert(pad_id, PadClassifier::new(reading));
        }
        let Some(classifier) = self.pads.get_mut(&pad_id) else {
            return Err(InputError::UnknownPad(pad_id));
        };

        let update = classifier.ingest(reading, self.threshold, self.debounce);
        match update.edge {
            Some(PadEdge::Pressed) => info!("PAD {}: stepped on ({:.1})", pad_id, value),
            Some(PadEdge::Released) => info!("PAD {}: released ({:.1})", pad_id, value),
            None => debug!("PAD {}: reading {:.1}", pad_id, value),
        }
        Ok(update)
    }

    /// Current state of one pad, no side effects.
    pub fn classify(&self, pad_id: u8) -> Option<PadState> {
        self.pads.get(&pad_id).map(PadClassifier::state)
    }

    /// Every known pad, ordered by pad id.
    pub fn snapshot_all(&self) -> heapless::Vec<PadState, MAX_PADS> {
        let mut all: heapless::Vec<PadState, MAX_PADS> =
            self.pads.values().map(PadClassifier::state).collect();
        all.sort_unstable_by_key(|p| p.pad_id);
        all
    }

    /// True if at least one pad is currently stepped on.
    pub fn any_stepped(&self) -> bool {
        self.pads.values().any(|p| p.state().is_stepped)
    }
}
