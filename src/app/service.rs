//! Interaction controller, the hexagonal core.
//!
//! [`InteractionController`] is the single authority over the interaction
//! epoch, the safety latch and the actuator tracker.  Every inbound event
//! is handled to completion (including the actuator command it causes)
//! before the next one is accepted; callers that receive events on several
//! threads funnel them through [`EventQueue`](crate::events::EventQueue).
//!
//! ```text
//!  pad readings ──┐
//!  interaction  ──┤   ┌───────────────────────────┐ ──▶ ActuatorPort
//!  safety       ──┼──▶│   InteractionController   │
//!  feedback     ──┤   │ FSM · Pads · Safety · Act │ ──▶ EventSink
//!  tick         ──┘   └───────────────────────────┘
//! ```
//!
//! ## Arbitration (highest first)
//!
//! 1. Safety request: unconditional, always parks.
//! 2. Stepped transition / interaction request: Idle → Active.
//! 3. Idle decay: Active → Idle once nobody is on the pads.

use heapless::HistoryBuffer;
use log::{debug, error, info, warn};

use crate::animation::frame::{AnimationFrame, FrameGenerator};
use crate::animation::rainbow::{Colour, parse_colour};
use crate::config::{SafetyAnimation, SystemConfig};
use crate::drivers::actuator::{ActuatorPosition, ActuatorState, ActuatorTracker, CommandOutcome, Motion};
use crate::error::{Error, TransitionError};
use crate::fsm::context::{ActuatorRequest, LoopContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Mode};
use crate::safety::{SafetyLatch, SafetyState};
use crate::sensors::pad::{PadEdge, PadState, PadUpdate};
use crate::sensors::{MAX_PADS, PadAggregator};

use super::commands::{ActuatorFeedback, ControlEvent};
use super::events::{AppEvent, StatusReport, SuppressedEvent, SuppressedKind};
use super::ports::{ActuatorPort, ConfigError, EventSink};

/// Suppressed events kept for audit.
pub const AUDIT_CAPACITY: usize = 32;

// ───────────────────────────────────────────────────────────────
// InteractionController
// ───────────────────────────────────────────────────────────────

pub struct InteractionController {
    fsm: Fsm,
    ctx: LoopContext,
    pads: PadAggregator,
    actuator: ActuatorTracker,
    safety: SafetyLatch,
    frames: FrameGenerator,
    /// Cap / stem fill while Safety is active; `None` freezes the rainbow.
    safety_palette: Option<(Colour, Colour)>,
    audit: HistoryBuffer<SuppressedEvent, AUDIT_CAPACITY>,
    suppressed_total: u64,
    /// Failed attempts of the retract currently in flight.
    retract_failures: u8,
}

impl InteractionController {
    /// Construct the controller from a validated configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let frames = FrameGenerator::from_config(&config)
            .map_err(|_| ConfigError::ValidationFailed("invalid spectrum"))?;
        let safety_palette = match &config.safety_animation {
            SafetyAnimation::Halt => None,
            SafetyAnimation::Solid { cap, stem } => Some((
                parse_colour(cap).ok_or(ConfigError::ValidationFailed("safety cap colour"))?,
                parse_colour(stem).ok_or(ConfigError::ValidationFailed("safety stem colour"))?,
            )),
        };
        let pads = PadAggregator::new(&config);

        Ok(Self {
            fsm: Fsm::new(build_state_table(), Mode::Idle),
            ctx: LoopContext::new(config),
            pads,
            actuator: ActuatorTracker::new(),
            safety: SafetyLatch::new(),
            frames,
            safety_palette,
            audit: HistoryBuffer::new(),
            suppressed_total: 0,
            retract_failures: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start in Idle with step 0.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.mode()));
        info!("InteractionController started in {:?}", self.mode());
    }

    /// Dispatch one inbound event to its entry point.
    pub fn handle(
        &mut self,
        event: ControlEvent,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        match event {
            ControlEvent::SensorReading { pad_id, value } => self
                .on_sensor_event(pad_id, value, now_ms, hw, sink)
                .map(|_| ()),
            ControlEvent::InteractionRequest => self.on_interaction_request(now_ms, hw, sink),
            ControlEvent::SafetyRequest(signal) => {
                self.on_safety_request(&signal, now_ms, hw, sink)
            }
            ControlEvent::SafetyClear => self.on_safety_clear(now_ms, sink),
            ControlEvent::ActuatorFeedback(fb) => self.on_actuator_feedback(fb, now_ms, hw, sink),
            ControlEvent::Tick => self.tick(now_ms, hw, sink),
        }
    }

    // ── Entry points ──────────────────────────────────────────

    /// A pad reading.  A fresh stepped transition while Idle starts an
    /// interaction; in Safety the reading is stored and audited only.
    pub fn on_sensor_event(
        &mut self,
        pad_id: u8,
        value: f32,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<PadUpdate, Error> {
        self.sync(now_ms);

        let update = match self.pads.register_reading(pad_id, value, now_ms) {
            Ok(update) => update,
            Err(e) => {
                warn!("SENSOR: dropped reading for pad {}: {}", pad_id, e);
                sink.emit(&AppEvent::InputRejected(e));
                return Err(e.into());
            }
        };
        self.ctx.any_stepped = self.pads.any_stepped();

        let pressed = update.edge == Some(PadEdge::Pressed);
        match self.mode() {
            Mode::Safety => {
                self.suppress(SuppressedKind::SensorReading { pad_id, value }, sink);
            }
            Mode::Idle if pressed => {
                info!("SENSOR: pad {} stepped on while idle", pad_id);
                self.begin_interaction(hw, sink)?;
            }
            Mode::Active if pressed => {
                self.ctx.last_trigger_ms = now_ms;
            }
            _ => {}
        }
        Ok(update)
    }

    /// Manual / test trigger.  Same arbitration as a stepped transition.
    pub fn on_interaction_request(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.sync(now_ms);

        match self.mode() {
            Mode::Safety => {
                warn!("INTERACTION: ignored while in safety mode");
                self.suppress(SuppressedKind::InteractionRequest, sink);
                Err(TransitionError::SuppressedBySafety.into())
            }
            Mode::Idle => self.begin_interaction(hw, sink),
            Mode::Active => {
                debug!("INTERACTION: continued");
                self.ctx.last_trigger_ms = now_ms;
                Ok(())
            }
        }
    }

    /// Safety override.  Always latches, always enters Safety and always
    /// commands a retract.  An `Err` only reports that the actuator
    /// hardware failed; the state change has been applied regardless.
    pub fn on_safety_request(
        &mut self,
        signal: &str,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.sync(now_ms);

        self.safety.activate(signal, now_ms);
        self.ctx.safety_active = true;
        sink.emit(&AppEvent::SafetyActivated(self.safety.state().clone()));

        if self.mode() == Mode::Safety {
            self.ctx.request = Some(ActuatorRequest::ForceRetract);
        } else {
            self.enter(Mode::Safety, sink);
        }
        self.apply_request(hw, sink)
    }

    /// Explicit safety deactivation.  Only valid in Safety; returns to Idle.
    pub fn on_safety_clear(&mut self, now_ms: u64, sink: &mut impl EventSink) -> Result<(), Error> {
        self.sync(now_ms);

        if self.mode() != Mode::Safety {
            warn!("SAFETY: clear rejected in {:?}", self.mode());
            return Err(TransitionError::NotInSafety.into());
        }
        self.safety.clear()?;
        self.ctx.safety_active = false;
        sink.emit(&AppEvent::SafetyCleared);
        self.enter(Mode::Idle, sink);
        Ok(())
    }

    /// Completion or failure reported by the actuator backend.
    pub fn on_actuator_feedback(
        &mut self,
        feedback: ActuatorFeedback,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.sync(now_ms);

        match feedback {
            ActuatorFeedback::Completed(motion) => {
                if self.actuator.complete(motion) {
                    sink.emit(&AppEvent::ActuatorSettled(self.actuator.position()));
                } else {
                    warn!("ACTUATOR: ignoring stale {:?} completion", motion);
                }
                Ok(())
            }
            ActuatorFeedback::Failed(Motion::Extend, e) => {
                if self.actuator.position() != ActuatorPosition::Extending {
                    warn!("ACTUATOR: ignoring stale extend failure ({})", e);
                    return Ok(());
                }
                error!("ACTUATOR: extend failed ({}), not retrying", e);
                self.actuator.fail(Motion::Extend);
                sink.emit(&AppEvent::ActuatorFault {
                    motion: Motion::Extend,
                    error: e,
                    retried: false,
                });
                Err(e.into())
            }
            ActuatorFeedback::Failed(Motion::Retract, e) => {
                if self.actuator.position() != ActuatorPosition::Retracting {
                    warn!("ACTUATOR: ignoring stale retract failure ({})", e);
                    return Ok(());
                }
                if let Some(err) = self.on_retract_failure(e, sink) {
                    return Err(err);
                }
                self.actuator.restart(now_ms);
                sink.emit(&AppEvent::ActuatorCommanded(Motion::Retract));
                self.drive_retract(hw, sink)
            }
        }
    }

    /// Animation clock.  Settles timed-out motions, advances the step
    /// (faster while Active), runs idle decay and applies any actuator
    /// request the mode handlers left.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.sync(now_ms);

        let timeout = self.ctx.config.actuator_transit_timeout_ms;
        if self.actuator.expire(now_ms, timeout).is_some() {
            sink.emit(&AppEvent::ActuatorSettled(self.actuator.position()));
        }
        self.ctx.actuator = self.actuator.position();

        let from = self.mode();
        self.fsm.tick(&mut self.ctx);
        let to = self.mode();
        if from != to {
            sink.emit(&AppEvent::StateChanged { from, to });
        }

        self.apply_request(hw, sink)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.fsm.current_mode()
    }

    /// Current animation step (`InteractionEpoch.currentStep`).
    pub fn step(&self) -> u64 {
        self.ctx.step
    }

    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    pub fn pad_snapshot(&self) -> heapless::Vec<PadState, MAX_PADS> {
        self.pads.snapshot_all()
    }

    pub fn classify(&self, pad_id: u8) -> Option<PadState> {
        self.pads.classify(pad_id)
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator.current_state()
    }

    pub fn safety_state(&self) -> &SafetyState {
        self.safety.state()
    }

    /// Frame for the LED driver.  In Safety the safety palette (or the
    /// frozen rainbow) replaces the normal animation.
    pub fn animation_frame(&self) -> AnimationFrame {
        match (self.mode(), self.safety_palette) {
            (Mode::Safety, Some((cap, stem))) => self.frames.solid(self.ctx.step, cap, stem),
            _ => self.frames.frame(self.ctx.step),
        }
    }

    /// Suppressed events, oldest first.
    pub fn suppressed_events(&self) -> impl Iterator<Item = &SuppressedEvent> {
        self.audit.oldest_ordered()
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            mode: self.mode(),
            step: self.ctx.step,
            any_stepped: self.pads.any_stepped(),
            actuator: self.actuator.current_state(),
            safety: self.safety.state().clone(),
            suppressed_total: self.suppressed_total,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Refresh the context inputs before running any handler.
    fn sync(&mut self, now_ms: u64) {
        self.ctx.now_ms = now_ms;
        self.ctx.any_stepped = self.pads.any_stepped();
        self.ctx.actuator = self.actuator.position();
        self.ctx.safety_active = self.safety.is_active();
    }

    fn enter(&mut self, mode: Mode, sink: &mut impl EventSink) {
        let from = self.mode();
        self.fsm.force_transition(mode, &mut self.ctx);
        if from != mode {
            sink.emit(&AppEvent::StateChanged { from, to: mode });
        }
    }

    fn begin_interaction(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        self.enter(Mode::Active, sink);
        self.apply_request(hw, sink)
    }

    fn suppress(&mut self, kind: SuppressedKind, sink: &mut impl EventSink) {
        let record = SuppressedEvent {
            at_ms: self.ctx.now_ms,
            kind,
        };
        self.audit.write(record);
        self.suppressed_total += 1;
        sink.emit(&AppEvent::EventSuppressed(record));
    }

    /// Translate the pending mode-handler request into tracker + port calls.
    fn apply_request(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        let Some(request) = self.ctx.request.take() else {
            return Ok(());
        };
        let now_ms = self.ctx.now_ms;

        let outcome = match request {
            ActuatorRequest::Extend => self.actuator.command_extend(now_ms),
            ActuatorRequest::Retract => self.actuator.command_retract(now_ms),
            ActuatorRequest::ForceRetract => self.actuator.force_retract(now_ms),
        };

        match outcome {
            CommandOutcome::Issued(Motion::Extend) => {
                self.ctx.extend_pending = false;
                sink.emit(&AppEvent::ActuatorCommanded(Motion::Extend));
                if let Err(e) = hw.extend() {
                    // Extension is never retried: repeated attempts are
                    // motion-unsafe.
                    error!("ACTUATOR: extend failed ({}), not retrying", e);
                    self.actuator.fail(Motion::Extend);
                    sink.emit(&AppEvent::ActuatorFault {
                        motion: Motion::Extend,
                        error: e,
                        retried: false,
                    });
                    return Err(e.into());
                }
                Ok(())
            }
            CommandOutcome::Issued(Motion::Retract) => {
                self.retract_failures = 0;
                sink.emit(&AppEvent::ActuatorCommanded(Motion::Retract));
                self.drive_retract(hw, sink)
            }
            CommandOutcome::NoOp => {
                if request == ActuatorRequest::Extend {
                    self.ctx.extend_pending = false;
                }
                Ok(())
            }
            CommandOutcome::Rejected => {
                debug!("ACTUATOR: {:?} deferred, motion in flight", request);
                Ok(())
            }
        }
    }

    fn drive_retract(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        loop {
            match hw.retract() {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if let Some(err) = self.on_retract_failure(e, sink) {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Count a retract failure.  `None` means a retry is allowed; `Some`
    /// means the budget is spent and the tracker now holds the last
    /// confirmed position.
    fn on_retract_failure(
        &mut self,
        e: crate::error::ActuatorError,
        sink: &mut impl EventSink,
    ) -> Option<Error> {
        self.retract_failures = self.retract_failures.saturating_add(1);
        let retries = self.ctx.config.retract_retries;
        if self.retract_failures <= retries {
            warn!(
                "ACTUATOR: retract failed ({}), retry {}/{}",
                e, self.retract_failures, retries
            );
            return None;
        }

        let held = self.actuator.fail(Motion::Retract);
        self.ctx.retract_held = true;
        error!("ACTUATOR: retract failed ({}), holding {:?}", e, held);
        sink.emit(&AppEvent::ActuatorFault {
            motion: Motion::Retract,
            error: e,
            retried: retries > 0,
        });
        Some(e.into())
    }
}
