//! Fuzz target: `InteractionController` event handling
//!
//! Decodes arbitrary bytes into a stream of control events and feeds them
//! to a controller backed by the simulated actuator.  Asserts that nothing
//! panics and that the safety latch and Safety mode never disagree.
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use canopy::adapters::simulated::SimulatedActuator;
use canopy::app::commands::{ActuatorFeedback, ControlEvent};
use canopy::app::events::AppEvent;
use canopy::app::ports::EventSink;
use canopy::app::service::InteractionController;
use canopy::config::SystemConfig;
use canopy::drivers::actuator::Motion;
use canopy::error::ActuatorError;
use canopy::fsm::Mode;
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn decode(chunk: &[u8]) -> ControlEvent {
    let motion = if chunk[1] & 1 == 0 { Motion::Extend } else { Motion::Retract };
    match chunk[0] % 8 {
        0 => ControlEvent::SensorReading {
            pad_id: chunk[1] % 6,
            value: f32::from_le_bytes([chunk[2], chunk[3], 0, 0x42]),
        },
        1 => ControlEvent::InteractionRequest,
        2 => ControlEvent::safety_request("fuzz"),
        3 => ControlEvent::SafetyClear,
        4 => ControlEvent::ActuatorFeedback(ActuatorFeedback::Completed(motion)),
        5 => ControlEvent::ActuatorFeedback(ActuatorFeedback::Failed(motion, ActuatorError::Stalled)),
        6 => ControlEvent::SensorReading {
            pad_id: chunk[1] % 6,
            value: f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
        },
        _ => ControlEvent::Tick,
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut ctrl) = InteractionController::new(SystemConfig::default()) else {
        return;
    };
    let mut hw = SimulatedActuator::new();
    let mut sink = NullSink;
    ctrl.start(0, &mut sink);

    let mut now_ms = 0u64;
    for chunk in data.chunks_exact(4) {
        now_ms += u64::from(chunk[3]) * 10;
        let _ = ctrl.handle(decode(chunk), now_ms, &mut hw, &mut sink);
        assert_eq!(ctrl.safety_state().active, ctrl.mode() == Mode::Safety);
    }
});
