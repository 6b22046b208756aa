//! Outbound application events.
//!
//! The [`InteractionController`](super::service::InteractionController)
//! emits these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use serde::Serialize;

use crate::drivers::actuator::{ActuatorPosition, ActuatorState, Motion};
use crate::error::{ActuatorError, InputError};
use crate::fsm::Mode;
use crate::safety::SafetyState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial mode).
    Started(Mode),

    /// The interaction mode changed.
    StateChanged { from: Mode, to: Mode },

    /// A motion was commanded on the actuator hardware.
    ActuatorCommanded(Motion),

    /// The actuator reached a rest position.
    ActuatorSettled(ActuatorPosition),

    /// The actuator could not execute a motion.  `retried` is true when
    /// the retract retry budget was spent.
    ActuatorFault {
        motion: Motion,
        error: ActuatorError,
        retried: bool,
    },

    /// Safety latched on.
    SafetyActivated(SafetyState),

    /// Safety latch released.
    SafetyCleared,

    /// A malformed payload was dropped.
    InputRejected(InputError),

    /// An event arrived during Safety and was only recorded.
    EventSuppressed(SuppressedEvent),
}

/// What was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SuppressedKind {
    SensorReading { pad_id: u8, value: f32 },
    InteractionRequest,
}

/// Audit record of an event received while Safety was active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuppressedEvent {
    pub at_ms: u64,
    pub kind: SuppressedKind,
}

/// Point-in-time status suitable for a polling endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub mode: Mode,
    pub step: u64,
    pub any_stepped: bool,
    pub actuator: ActuatorState,
    pub safety: SafetyState,
    /// Events suppressed by Safety since startup.
    pub suppressed_total: u64,
}
