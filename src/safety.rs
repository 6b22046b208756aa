//! Safety latch.
//!
//! Holds the process-wide [`SafetyState`].  Activation is unconditional:
//! it succeeds from any state, with any payload, and re-activation while
//! already active simply records the newer signal.  The latch is cleared
//! only by an explicit deactivation, never by a timeout.
//!
//! ## Lifecycle
//!
//! 1. An operator (or an e-stop relay) submits a safety request.
//! 2. The latch records the signal and timestamp and sets `active`.
//! 3. The control loop forces Safety mode and parks the actuator.
//! 4. An explicit safety clear resets the latch; the loop returns to Idle.

use log::{error, info, warn};
use serde::Serialize;

use crate::error::TransitionError;

/// Longest signal payload retained; longer payloads are truncated.
pub const SIGNAL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyState {
    pub active: bool,
    /// Raw payload of the most recent safety request.
    pub signal: heapless::String<SIGNAL_CAPACITY>,
    /// When the most recent activation happened.
    pub activated_at_ms: Option<u64>,
}

/// Copy `signal` into fixed capacity, cutting at a char boundary.
pub fn bounded_signal(signal: &str) -> heapless::String<SIGNAL_CAPACITY> {
    let mut stored = heapless::String::new();
    for ch in signal.chars() {
        if stored.push(ch).is_err() {
            break;
        }
    }
    stored
}

pub struct SafetyLatch {
    state: SafetyState,
}

impl SafetyLatch {
    pub fn new() -> Self {
        Self {
            state: SafetyState {
                active: false,
                signal: heapless::String::new(),
                activated_at_ms: None,
            },
        }
    }

    /// Latch safety on.  Never fails.
    pub fn activate(&mut self, signal: &str, now_ms: u64) {
        let stored = bounded_signal(signal);
        if stored.len() < signal.len() {
            warn!("SAFETY: signal truncated to {} bytes", stored.len());
        }

        if self.state.active {
            info!("SAFETY: re-triggered while active, signal='{}'", stored);
        } else {
            error!("SAFETY ACTIVATED: signal='{}'", stored);
        }
        self.state.active = true;
        self.state.signal = stored;
        self.state.activated_at_ms = Some(now_ms);
    }

    /// Release the latch.  Only valid while active.
    pub fn clear(&mut self) -> Result<(), TransitionError> {
        if !self.state.active {
            return Err(TransitionError::NotInSafety);
        }
        info!("SAFETY CLEARED: was '{}'", self.state.signal);
        self.state.active = false;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }
}

impl Default for SafetyLatch {
    fn default() -> Self {
        Self::new()
    }
}
