//! Inbound events for the interaction controller.
//!
//! These represent everything the outside world can tell the control
//! loop: pad readings, explicit interaction and safety requests, actuator
//! feedback and the animation clock.  Each variant maps 1:1 to an entry
//! point of [`InteractionController`](super::service::InteractionController).

use crate::drivers::actuator::Motion;
use crate::error::ActuatorError;
use crate::safety::{SIGNAL_CAPACITY, bounded_signal};

/// Asynchronous report from the actuator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorFeedback {
    /// The motion reached its end stop.
    Completed(Motion),
    /// The motion could not be executed.
    Failed(Motion, ActuatorError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Raw weight pad reading.
    SensorReading { pad_id: u8, value: f32 },
    /// Manual (non-sensor) request to begin or continue an interaction.
    InteractionRequest,
    /// Operator safety override with its raw payload.
    SafetyRequest(heapless::String<SIGNAL_CAPACITY>),
    /// Explicit safety deactivation.
    SafetyClear,
    /// Completion / failure report from the actuator.
    ActuatorFeedback(ActuatorFeedback),
    /// Animation clock tick.
    Tick,
}

impl ControlEvent {
    /// Build a safety request, truncating the payload to the latch capacity.
    pub fn safety_request(signal: &str) -> Self {
        Self::SafetyRequest(bounded_signal(signal))
    }
}
