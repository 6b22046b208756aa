//! Integration tests for the safety override.

use crate::mock_hw::{ActuatorCall, make_controller};

use canopy::app::commands::ActuatorFeedback;
use canopy::app::events::{AppEvent, SuppressedKind};
use canopy::drivers::actuator::{ActuatorPosition, Motion};
use canopy::error::{ActuatorError, Error, TransitionError};
use canopy::fsm::Mode;

#[test]
fn safety_overrides_extend_in_flight() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    ctrl.on_sensor_event(0, 80.0, 0, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Extending);

    ctrl.on_safety_request("E-STOP", 200, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(hw.calls, vec![ActuatorCall::Extend, ActuatorCall::Retract]);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Retracting);

    assert_eq!(
        ctrl.on_interaction_request(300, &mut hw, &mut sink),
        Err(Error::Transition(TransitionError::SuppressedBySafety))
    );
    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(hw.retracts(), 1);
    assert_eq!(hw.extends(), 1);
}

#[test]
fn clear_outside_safety_is_rejected() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    let before = sink.events.len();

    assert_eq!(
        ctrl.on_safety_clear(10, &mut sink),
        Err(Error::Transition(TransitionError::NotInSafety))
    );
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert_eq!(sink.events.len(), before);

    ctrl.on_interaction_request(20, &mut hw, &mut sink).unwrap();
    assert_eq!(
        ctrl.on_safety_clear(30, &mut sink),
        Err(Error::Transition(TransitionError::NotInSafety))
    );
    assert_eq!(ctrl.mode(), Mode::Active);
}

#[test]
fn safety_from_idle_still_commands_retract() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_safety_request("door", 5, &mut hw, &mut sink).unwrap();

    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(hw.calls, vec![ActuatorCall::Retract]);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Parked);

    let state = ctrl.safety_state();
    assert!(state.active);
    assert_eq!(state.signal.as_str(), "door");
    assert_eq!(state.activated_at_ms, Some(5));
}

#[test]
fn retrigger_updates_signal_and_parks_again() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_safety_request("first", 0, &mut hw, &mut sink).unwrap();
    ctrl.on_safety_request("second", 50, &mut hw, &mut sink).unwrap();

    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(ctrl.safety_state().signal.as_str(), "second");
    assert_eq!(hw.retracts(), 2);
    assert_eq!(sink.transitions(), vec![(Mode::Idle, Mode::Safety)]);
}

#[test]
fn oversized_signal_is_truncated() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    let long = "S".repeat(200);
    ctrl.on_safety_request(&long, 0, &mut hw, &mut sink).unwrap();
    assert!(ctrl.safety_state().active);
    assert_eq!(ctrl.safety_state().signal.len(), 32);
}

#[test]
fn readings_during_safety_are_recorded_not_acted_on() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.tick(50, &mut hw, &mut sink).unwrap();
    ctrl.on_safety_request("E-STOP", 60, &mut hw, &mut sink).unwrap();
    let frozen = ctrl.step();

    let update = ctrl.on_sensor_event(0, 90.0, 70, &mut hw, &mut sink).unwrap();
    assert!(update.is_stepped);
    for t in 2..=20 {
        ctrl.tick(t * 50, &mut hw, &mut sink).unwrap();
    }

    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(ctrl.step(), frozen);
    assert_eq!(hw.extends(), 0);
    assert!(ctrl.classify(0).unwrap().is_stepped);

    let audit: Vec<_> = ctrl.suppressed_events().copied().collect();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].at_ms, 70);
    assert_eq!(
        audit[0].kind,
        SuppressedKind::SensorReading {
            pad_id: 0,
            value: 90.0
        }
    );
    assert_eq!(ctrl.status().suppressed_total, 1);
}

#[test]
fn audit_keeps_most_recent_records() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_safety_request("E-STOP", 0, &mut hw, &mut sink).unwrap();
    for t in 1..=40u64 {
        let _ = ctrl.on_interaction_request(t, &mut hw, &mut sink);
    }

    let audit: Vec<_> = ctrl.suppressed_events().map(|r| r.at_ms).collect();
    assert_eq!(audit.len(), 32);
    assert_eq!(audit.first(), Some(&9));
    assert_eq!(audit.last(), Some(&40));
    assert_eq!(ctrl.status().suppressed_total, 40);
}

#[test]
fn clear_returns_to_idle_and_resumes() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_safety_request("E-STOP", 0, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 90.0, 10, &mut hw, &mut sink).unwrap();

    ctrl.on_safety_clear(100, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert!(!ctrl.safety_state().active);
    assert!(sink.events.contains(&AppEvent::SafetyCleared));

    // Still standing from before the clear: no fresh edge.
    ctrl.on_sensor_event(0, 95.0, 150, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);

    ctrl.tick(200, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.step(), 1);

    ctrl.on_sensor_event(0, 0.0, 250, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 95.0, 300, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.extends(), 1);

    assert_eq!(
        sink.transitions(),
        vec![
            (Mode::Idle, Mode::Safety),
            (Mode::Safety, Mode::Idle),
            (Mode::Idle, Mode::Active),
        ]
    );
}

#[test]
fn failed_retract_is_retried_then_held() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();
    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Extend), 500, &mut hw, &mut sink)
        .unwrap();

    hw.fail_next_retract(ActuatorError::NotResponding);
    hw.fail_next_retract(ActuatorError::NotResponding);

    assert_eq!(
        ctrl.on_safety_request("E-STOP", 600, &mut hw, &mut sink),
        Err(Error::Actuator(ActuatorError::NotResponding))
    );
    assert_eq!(ctrl.mode(), Mode::Safety);
    assert!(ctrl.safety_state().active);
    assert_eq!(hw.retracts(), 2);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Extended);
    assert!(sink.events.contains(&AppEvent::ActuatorFault {
        motion: Motion::Retract,
        error: ActuatorError::NotResponding,
        retried: true,
    }));
}

#[test]
fn single_retract_failure_recovers_on_retry() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();
    hw.fail_next_retract(ActuatorError::Stalled);

    ctrl.on_safety_request("E-STOP", 100, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.retracts(), 2);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Retracting);

    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Retract), 900, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Parked);
}

#[test]
fn status_report_serialises() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_safety_request("E-STOP", 42, &mut hw, &mut sink).unwrap();

    let json = serde_json::to_value(ctrl.status()).unwrap();
    assert_eq!(json["mode"], "Safety");
    assert_eq!(json["safety"]["active"], true);
    assert_eq!(json["safety"]["signal"], "E-STOP");
    assert_eq!(json["actuator"]["position"], "Parked");
}

#[test]
fn retried_retract_restarts_transit_clock() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();
    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Extend), 10, &mut hw, &mut sink)
        .unwrap();
    ctrl.on_safety_request("E-STOP", 100, &mut hw, &mut sink).unwrap();

    // The motor reports the retract failed late; it is re-sent once.
    ctrl.on_actuator_feedback(
        ActuatorFeedback::Failed(Motion::Retract, ActuatorError::Stalled),
        4000,
        &mut hw,
        &mut sink,
    )
    .unwrap();
    assert_eq!(hw.retracts(), 2);
    assert_eq!(ctrl.actuator_state().last_commanded_at_ms, 4000);
    assert_eq!(
        sink.count(|e| *e == AppEvent::ActuatorCommanded(Motion::Retract)),
        2
    );

    ctrl.tick(4150, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Retracting);

    // A new visitor after the clear must wait for the canopy to come down.
    ctrl.on_safety_clear(4200, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 80.0, 4300, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.extends(), 1);

    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Retract), 5000, &mut hw, &mut sink)
        .unwrap();
    ctrl.tick(5050, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.extends(), 2);
}
