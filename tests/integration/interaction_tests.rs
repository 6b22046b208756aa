//! Integration tests for the pads → controller → actuator pipeline.

use crate::mock_hw::{ActuatorCall, make_controller, make_controller_with};

use canopy::app::commands::ActuatorFeedback;
use canopy::app::events::AppEvent;
use canopy::config::SystemConfig;
use canopy::drivers::actuator::{ActuatorPosition, Motion};
use canopy::error::{ActuatorError, Error, InputError};
use canopy::events::EventQueue;
use canopy::fsm::Mode;

// ── Stepped transition ───────────────────────────────────────

#[test]
fn stepping_on_pad_starts_interaction_with_single_extend() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    ctrl.on_sensor_event(0, 5.0, 0, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert!(hw.calls.is_empty());

    let update = ctrl.on_sensor_event(0, 70.0, 10, &mut hw, &mut sink).unwrap();
    assert!(update.is_stepped);
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.calls, vec![ActuatorCall::Extend]);
    assert!(ctrl.classify(0).unwrap().is_stepped);

    // Still stepped: no new edge, no second extend.
    ctrl.on_sensor_event(0, 72.0, 20, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.extends(), 1);
    assert_eq!(sink.transitions(), vec![(Mode::Idle, Mode::Active)]);
}

#[test]
fn second_pad_during_active_does_not_extend_again() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_sensor_event(0, 80.0, 0, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(1, 80.0, 50, &mut hw, &mut sink).unwrap();
    ctrl.on_interaction_request(60, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.extends(), 1);
}

#[test]
fn snapshot_lists_every_reported_pad() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_sensor_event(2, 10.0, 5, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 61.0, 6, &mut hw, &mut sink).unwrap();

    let snap = ctrl.pad_snapshot();
    let ids: Vec<u8> = snap.iter().map(|p| p.pad_id).collect();
    assert_eq!(ids, vec![0, 2]);
    assert!(snap[0].is_stepped);
    assert!(!snap[1].is_stepped);
    assert_eq!(snap[1].last_reading.observed_at_ms, 5);
    assert!(ctrl.classify(3).is_none());
}

#[test]
fn debounce_requires_consecutive_readings() {
    let cfg = SystemConfig {
        debounce_readings: 3,
        ..SystemConfig::default()
    };
    let (mut ctrl, mut hw, mut sink) = make_controller_with(cfg);

    ctrl.on_sensor_event(0, 70.0, 0, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 70.0, 10, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);

    // A dip resets the streak.
    ctrl.on_sensor_event(0, 10.0, 20, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 70.0, 30, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 70.0, 40, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);

    ctrl.on_sensor_event(0, 70.0, 50, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Active);
}

// ── Malformed input ──────────────────────────────────────────

#[test]
fn malformed_readings_are_rejected_without_state_change() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    assert_eq!(
        ctrl.on_sensor_event(9, 80.0, 0, &mut hw, &mut sink),
        Err(Error::Input(InputError::UnknownPad(9)))
    );
    assert_eq!(
        ctrl.on_sensor_event(0, f32::NAN, 0, &mut hw, &mut sink),
        Err(Error::Input(InputError::NonFiniteValue))
    );
    assert_eq!(
        ctrl.on_sensor_event(0, -1.0, 0, &mut hw, &mut sink),
        Err(Error::Input(InputError::NegativeValue))
    );

    assert_eq!(ctrl.mode(), Mode::Idle);
    assert!(ctrl.pad_snapshot().is_empty());
    assert!(hw.calls.is_empty());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::InputRejected(_))),
        3
    );
}

// ── Animation clock ──────────────────────────────────────────

#[test]
fn active_animates_faster_than_idle() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    for t in 1..=10 {
        ctrl.tick(t * 50, &mut hw, &mut sink).unwrap();
    }
    assert_eq!(ctrl.step(), 10);

    ctrl.on_interaction_request(550, &mut hw, &mut sink).unwrap();
    for t in 12..=21 {
        ctrl.tick(t * 50, &mut hw, &mut sink).unwrap();
    }
    assert_eq!(ctrl.step(), 50);
}

#[test]
fn frame_tracks_step() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.tick(50, &mut hw, &mut sink).unwrap();
    let frame = ctrl.animation_frame();
    assert_eq!(frame.step_index, 1);
    assert_eq!(frame.cap.len(), 6);
    assert_eq!(frame.cap[0].len(), 90);
    assert_eq!(frame.stem.len(), 2);
    assert_eq!(frame.stem[0].len(), 240);
}

// ── Idle decay ───────────────────────────────────────────────

#[test]
fn active_decays_to_idle_after_hold() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    ctrl.on_sensor_event(0, 80.0, 0, &mut hw, &mut sink).unwrap();
    ctrl.on_sensor_event(0, 10.0, 100, &mut hw, &mut sink).unwrap();

    for t in (50..5000).step_by(50) {
        ctrl.tick(t, &mut hw, &mut sink).unwrap();
        assert_eq!(ctrl.mode(), Mode::Active, "t={t}");
    }
    // Transit timeout assumed the extend complete.
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Extended);

    ctrl.tick(5000, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert_eq!(hw.calls, vec![ActuatorCall::Extend, ActuatorCall::Retract]);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Retracting);
}

#[test]
fn stepped_pad_holds_active() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_sensor_event(0, 80.0, 0, &mut hw, &mut sink).unwrap();

    for t in (50..=12_000).step_by(50) {
        ctrl.tick(t, &mut hw, &mut sink).unwrap();
    }
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.retracts(), 0);
}

#[test]
fn late_extension_is_parked_from_idle() {
    let cfg = SystemConfig {
        actuator_transit_timeout_ms: 8000,
        ..SystemConfig::default()
    };
    let (mut ctrl, mut hw, mut sink) = make_controller_with(cfg);

    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();
    ctrl.tick(5000, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);
    // Retract deferred: extend still in flight.
    assert_eq!(hw.retracts(), 0);

    ctrl.tick(8000, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.calls, vec![ActuatorCall::Extend, ActuatorCall::Retract]);
}

// ── Actuator feedback and faults ─────────────────────────────

#[test]
fn extend_failure_is_not_retried() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    hw.fail_next_extend(ActuatorError::Stalled);

    assert_eq!(
        ctrl.on_interaction_request(0, &mut hw, &mut sink),
        Err(Error::Actuator(ActuatorError::Stalled))
    );
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Parked);

    for t in (50..1000).step_by(50) {
        ctrl.tick(t, &mut hw, &mut sink).unwrap();
    }
    assert_eq!(hw.extends(), 1);
    assert!(sink.events.contains(&AppEvent::ActuatorFault {
        motion: Motion::Extend,
        error: ActuatorError::Stalled,
        retried: false,
    }));
}

#[test]
fn reported_extend_failure_reverts_to_parked() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();

    let result = ctrl.on_actuator_feedback(
        ActuatorFeedback::Failed(Motion::Extend, ActuatorError::LimitSwitch),
        100,
        &mut hw,
        &mut sink,
    );
    assert_eq!(result, Err(Error::Actuator(ActuatorError::LimitSwitch)));
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Parked);
    ctrl.tick(150, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.extends(), 1);
}

#[test]
fn stale_feedback_is_ignored() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Retract), 0, &mut hw, &mut sink)
        .unwrap();
    ctrl.on_actuator_feedback(
        ActuatorFeedback::Failed(Motion::Extend, ActuatorError::Stalled),
        0,
        &mut hw,
        &mut sink,
    )
    .unwrap();

    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Parked);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorSettled(_) | AppEvent::ActuatorFault { .. })),
        0
    );
}

#[test]
fn reentry_while_retracting_defers_extend() {
    let (mut ctrl, mut hw, mut sink) = make_controller();

    ctrl.on_interaction_request(0, &mut hw, &mut sink).unwrap();
    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Extend), 1000, &mut hw, &mut sink)
        .unwrap();
    ctrl.tick(5000, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert_eq!(ctrl.actuator_state().position, ActuatorPosition::Retracting);

    // New visitor while the canopy is still coming down.
    ctrl.on_interaction_request(5100, &mut hw, &mut sink).unwrap();
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.extends(), 1);

    ctrl.on_actuator_feedback(ActuatorFeedback::Completed(Motion::Retract), 5500, &mut hw, &mut sink)
        .unwrap();
    ctrl.tick(5550, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.extends(), 2);

    ctrl.tick(5600, &mut hw, &mut sink).unwrap();
    assert_eq!(hw.extends(), 2);
}

// ── Event queue ──────────────────────────────────────────────

#[test]
fn queue_drains_in_order() {
    let (mut ctrl, mut hw, mut sink) = make_controller();
    let queue = EventQueue::new();

    queue.submit_sensor_reading(1, 90.0).unwrap();
    queue.submit_tick().unwrap();
    queue.submit_safety_request("E-STOP").unwrap();
    queue.submit_interaction_request().unwrap();

    assert_eq!(queue.drain_into(&mut ctrl, 100, &mut hw, &mut sink), 4);
    assert!(queue.is_empty());
    assert_eq!(ctrl.mode(), Mode::Safety);
    assert_eq!(ctrl.step(), 4);
    assert_eq!(hw.calls, vec![ActuatorCall::Extend, ActuatorCall::Retract]);
    assert_eq!(ctrl.suppressed_events().count(), 1);
}

#[test]
fn custom_threshold_flips_idle_to_active_once() {
    let cfg = SystemConfig {
        step_threshold: 50.0,
        ..SystemConfig::default()
    };
    let (mut ctrl, mut hw, mut sink) = make_controller_with(cfg);

    let update = ctrl.on_sensor_event(3, 30.0, 0, &mut hw, &mut sink).unwrap();
    assert!(!update.is_stepped);
    assert_eq!(ctrl.mode(), Mode::Idle);
    assert!(hw.calls.is_empty());

    let update = ctrl.on_sensor_event(3, 60.0, 50, &mut hw, &mut sink).unwrap();
    assert!(update.is_stepped);
    assert_eq!(ctrl.mode(), Mode::Active);
    assert_eq!(hw.calls, vec![ActuatorCall::Extend]);
    assert_eq!(sink.transitions(), vec![(Mode::Idle, Mode::Active)]);
}
