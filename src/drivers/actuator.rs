//! Linear actuator state tracker.
//!
//! Holds the last known / commanded position.  It never moves on its own:
//! every transition is a command from the control loop or completion
//! feedback from the hardware.
//!
//! ```text
//!   PARKED ──[extend]──▶ EXTENDING ──[done]──▶ EXTENDED
//!     ▲                                            │
//!     └──────[done]────── RETRACTING ◀──[retract]──┘
//!
//!   EXTENDING ──[force_retract]──▶ RETRACTING   (safety override)
//! ```
//!
//! ## Contention rules
//!
//! - extend while Extending/Extended: no-op.
//! - extend while Retracting: rejected, state unchanged.
//! - retract while Extending: rejected unless forced.
//! - retract while Retracting/Parked: no-op.

use log::{debug, info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActuatorPosition {
    Parked,
    Extending,
    Extended,
    Retracting,
}

/// Direction of a commanded motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Motion {
    Extend,
    Retract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorState {
    pub position: ActuatorPosition,
    pub last_commanded_at_ms: u64,
}

/// What a command did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new motion was started; the hardware must be driven.
    Issued(Motion),
    /// Already moving / resting where the command points.
    NoOp,
    /// Refused to avoid motor contention; state unchanged.
    Rejected,
}

pub struct ActuatorTracker {
    state: ActuatorState,
    /// Last rest position the hardware confirmed.
    confirmed: ActuatorPosition,
}

impl ActuatorTracker {
    pub fn new() -> Self {
        Self {
            state: ActuatorState {
                position: ActuatorPosition::Parked,
                last_commanded_at_ms: 0,
            },
            confirmed: ActuatorPosition::Parked,
        }
    }

    pub fn command_extend(&mut self, now_ms: u64) -> CommandOutcome {
        match self.state.position {
            ActuatorPosition::Parked => {
                self.begin(ActuatorPosition::Extending, now_ms);
                CommandOutcome::Issued(Motion::Extend)
            }
            ActuatorPosition::Extending | ActuatorPosition::Extended => CommandOutcome::NoOp,
            ActuatorPosition::Retracting => {
                debug!("ACTUATOR: extend rejected while retracting");
                CommandOutcome::Rejected
            }
        }
    }

    pub fn command_retract(&mut self, now_ms: u64) -> CommandOutcome {
        match self.state.position {
            ActuatorPosition::Extended => {
                self.begin(ActuatorPosition::Retracting, now_ms);
                CommandOutcome::Issued(Motion::Retract)
            }
            ActuatorPosition::Retracting | ActuatorPosition::Parked => CommandOutcome::NoOp,
            ActuatorPosition::Extending => {
                debug!("ACTUATOR: retract rejected while extending");
                CommandOutcome::Rejected
            }
        }
    }

    /// Safety override: retract from any position, superseding an
    /// in-flight extend.  Always asks the hardware to park, even when the
    /// tracker already believes it is parked.
    pub fn force_retract(&mut self, now_ms: u64) -> CommandOutcome {
        let next = match self.state.position {
            ActuatorPosition::Parked => ActuatorPosition::Parked,
            _ => ActuatorPosition::Retracting,
        };
        if self.state.position == ActuatorPosition::Extending {
            warn!("ACTUATOR: forced retract overrides in-flight extend");
        }
        self.begin(next, now_ms);
        CommandOutcome::Issued(Motion::Retract)
    }

    /// Apply completion feedback.  Returns `false` for stale feedback
    /// (a motion that is no longer in flight), which is ignored.
    pub fn complete(&mut self, motion: Motion) -> bool {
        let settled = match (motion, self.state.position) {
            (Motion::Extend, ActuatorPosition::Extending) => ActuatorPosition::Extended,
            (Motion::Retract, ActuatorPosition::Retracting) => ActuatorPosition::Parked,
            (motion, position) => {
                debug!("ACTUATOR: stale {:?} completion while {:?}", motion, position);
                return false;
            }
        };
        info!("ACTUATOR: {:?} -> {:?}", self.state.position, settled);
        self.state.position = settled;
        self.confirmed = settled;
        true
    }

    /// The hardware could not execute `motion`: fall back to the last
    /// confirmed rest position.  Returns the position now held.
    pub fn fail(&mut self, motion: Motion) -> ActuatorPosition {
        let in_flight = matches!(
            (motion, self.state.position),
            (Motion::Extend, ActuatorPosition::Extending)
                | (Motion::Retract, ActuatorPosition::Retracting)
        );
        if in_flight {
            warn!(
                "ACTUATOR: {:?} failed, holding last confirmed {:?}",
                motion, self.confirmed
            );
            self.state.position = self.confirmed;
        }
        self.state.position
    }

    /// Re-stamp the motion in flight after it was re-sent to the hardware,
    /// so the transit timeout counts from the new command.
    pub fn restart(&mut self, now_ms: u64) {
        if matches!(
            self.state.position,
            ActuatorPosition::Extending | ActuatorPosition::Retracting
        ) {
            self.state.last_commanded_at_ms = now_ms;
        }
    }

    /// Elapsed-time completion: a motion in flight for at least
    /// `timeout_ms` is assumed done.  Returns the motion that settled.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u32) -> Option<Motion> {
        let motion = match self.state.position {
            ActuatorPosition::Extending => Motion::Extend,
            ActuatorPosition::Retracting => Motion::Retract,
            _ => return None,
        };
        let elapsed = now_ms.saturating_sub(self.state.last_commanded_at_ms);
        if elapsed < u64::from(timeout_ms) {
            return None;
        }
        info!("ACTUATOR: no feedback after {}ms, assuming {:?} done", elapsed, motion);
        self.complete(motion).then_some(motion)
    }

    pub fn current_state(&self) -> ActuatorState {
        self.state
    }

    pub fn position(&self) -> ActuatorPosition {
        self.state.position
    }

    fn begin(&mut self, next: ActuatorPosition, now_ms: u64) {
        info!("ACTUATOR: {:?} -> {:?}", self.state.position, next);
        self.state.position = next;
        self.state.last_commanded_at_ms = now_ms;
    }
}

impl Default for ActuatorTracker {
    fn default() -> Self {
        Self::new()
    }
}
