//! Inbound event funnel.
//!
//! Events are produced by:
//! - Pad polling threads (weight readings)
//! - Operator surfaces (interaction and safety requests, safety clear)
//! - The actuator backend (completion / failure feedback)
//! - The animation clock (ticks)
//!
//! They are consumed by a single control loop that owns the
//! [`InteractionController`] and drains them in arrival order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ Pad poller  │────▶│              │     │                │
//! │ Operator    │────▶│  EventQueue  │────▶│  Control loop  │
//! │ Actuator    │────▶│  (bounded)   │     │  (consumer)    │
//! │ Clock       │────▶│              │     │                │
//! └─────────────┘     └──────────────┘     └────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::{debug, warn};

use crate::app::commands::{ActuatorFeedback, ControlEvent};
use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::InteractionController;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Bounded MPMC queue shared between producers and the control loop.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, ControlEvent, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue an event.  Returns the event back if the queue is full.
    pub fn push(&self, event: ControlEvent) -> Result<(), ControlEvent> {
        self.channel.try_send(event).map_err(|TrySendError::Full(event)| {
            warn!("EVENTS: queue full, dropping {:?}", event);
            event
        })
    }

    pub fn submit_sensor_reading(&self, pad_id: u8, value: f32) -> Result<(), ControlEvent> {
        self.push(ControlEvent::SensorReading { pad_id, value })
    }

    pub fn submit_interaction_request(&self) -> Result<(), ControlEvent> {
        self.push(ControlEvent::InteractionRequest)
    }

    pub fn submit_safety_request(&self, signal: &str) -> Result<(), ControlEvent> {
        self.push(ControlEvent::safety_request(signal))
    }

    pub fn submit_safety_clear(&self) -> Result<(), ControlEvent> {
        self.push(ControlEvent::SafetyClear)
    }

    pub fn submit_feedback(&self, feedback: ActuatorFeedback) -> Result<(), ControlEvent> {
        self.push(ControlEvent::ActuatorFeedback(feedback))
    }

    pub fn submit_tick(&self) -> Result<(), ControlEvent> {
        self.push(ControlEvent::Tick)
    }

    /// Dequeue the oldest pending event, if any.
    pub fn pop(&self) -> Option<ControlEvent> {
        self.channel.try_receive().ok()
    }

    /// Handle every pending event to completion, oldest first.
    ///
    /// Per-event errors are logged and do not stop the drain.  Returns the
    /// number of events handled.
    pub fn drain_into(
        &self,
        controller: &mut InteractionController,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Some(event) = self.pop() {
            debug!("EVENTS: handling {:?}", event);
            if let Err(e) = controller.handle(event, now_ms, hw, sink) {
                warn!("EVENTS: {}", e);
            }
            handled += 1;
        }
        handled
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
