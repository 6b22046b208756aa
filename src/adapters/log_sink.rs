//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  A future OSC or WebSocket adapter would
//! implement the same trait.

use log::{error, info, warn};

use crate::app::events::{AppEvent, SuppressedKind};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={:?}", mode);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ActuatorCommanded(motion) => {
                info!("ACTUATOR | commanded {:?}", motion);
            }
            AppEvent::ActuatorSettled(position) => {
                info!("ACTUATOR | settled at {:?}", position);
            }
            AppEvent::ActuatorFault {
                motion,
                error: e,
                retried,
            } => {
                error!("ACTUATOR | {:?} failed: {} (retried={})", motion, e, retried);
            }
            AppEvent::SafetyActivated(state) => {
                warn!(
                    "SAFETY | activated signal='{}' at={:?}",
                    state.signal, state.activated_at_ms
                );
            }
            AppEvent::SafetyCleared => {
                info!("SAFETY | cleared");
            }
            AppEvent::InputRejected(e) => {
                warn!("INPUT | rejected: {}", e);
            }
            AppEvent::EventSuppressed(record) => match record.kind {
                SuppressedKind::SensorReading { pad_id, value } => {
                    info!(
                        "SUPPRESS | t={}ms pad={} value={:.1}",
                        record.at_ms, pad_id, value
                    );
                }
                SuppressedKind::InteractionRequest => {
                    info!("SUPPRESS | t={}ms interaction request", record.at_ms);
                }
            },
        }
    }
}
