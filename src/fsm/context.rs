//! Shared mutable context threaded through every FSM handler.
//!
//! `LoopContext` is the single struct that mode handlers read from and
//! write to: the interaction epoch (animation step), a summary of the
//! inputs, the actuator request for this cycle, and configuration.
//! Handlers never touch hardware; they only leave a request here and the
//! controller applies it.

use crate::config::SystemConfig;
use crate::drivers::actuator::ActuatorPosition;

/// Actuator motion requested by a mode handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorRequest {
    Extend,
    Retract,
    /// Safety override; supersedes an in-flight extend.
    ForceRetract,
}

pub struct LoopContext {
    // -- Timing --
    /// Controller clock for the event being processed (milliseconds).
    pub now_ms: u64,
    /// When the current mode was entered.
    pub entered_at_ms: u64,

    // -- Epoch --
    /// Animation step counter (`InteractionEpoch.currentStep`).
    pub step: u64,

    // -- Inputs --
    /// At least one pad is currently stepped on.
    pub any_stepped: bool,
    /// Last stepped transition or interaction request while Active.
    pub last_trigger_ms: u64,
    /// Mirror of the safety latch.
    pub safety_active: bool,
    /// Tracker position at the start of this cycle.
    pub actuator: ActuatorPosition,
    /// A retract failed after its retries; do not re-request until the
    /// mode changes.
    pub retract_held: bool,

    // -- Outputs --
    /// Motion to apply after the handler returns.  Last write wins.
    pub request: Option<ActuatorRequest>,
    /// The single extend of the current Active epoch has not been issued yet.
    pub extend_pending: bool,

    // -- Configuration --
    pub config: SystemConfig,
}

impl LoopContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            entered_at_ms: 0,
            step: 0,
            any_stepped: false,
            last_trigger_ms: 0,
            safety_active: false,
            actuator: ActuatorPosition::Parked,
            retract_held: false,
            request: None,
            extend_pending: false,
            config,
        }
    }

    /// Milliseconds spent in the current mode.
    pub fn ms_in_mode(&self) -> u64 {
        self.now_ms.saturating_sub(self.entered_at_ms)
    }

    /// Milliseconds since the last Active trigger.
    pub fn ms_since_trigger(&self) -> u64 {
        self.now_ms.saturating_sub(self.last_trigger_ms)
    }

    pub fn advance_step(&mut self, increment: u32) {
        self.step = self.step.wrapping_add(u64::from(increment));
    }
}
