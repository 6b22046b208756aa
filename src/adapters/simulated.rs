//! Simulated actuator adapter.
//!
//! Stands in for [`MotorDriver`](crate::drivers::motor::MotorDriver) on a
//! development host.  Every accepted motion is queued as a completion
//! report which the caller feeds back into the control loop, mimicking
//! the limit switches of the real linear actuator.  Failures can be
//! injected per motion.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::app::commands::ActuatorFeedback;
use crate::app::ports::ActuatorPort;
use crate::drivers::actuator::Motion;
use crate::error::ActuatorError;

#[derive(Default)]
pub struct SimulatedActuator {
    commanded: Vec<Motion>,
    feedback: VecDeque<ActuatorFeedback>,
    fail_extend: VecDeque<ActuatorError>,
    fail_retract: VecDeque<ActuatorError>,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `motion` command fail with `error`.  Calls stack.
    pub fn fail_next(&mut self, motion: Motion, error: ActuatorError) {
        match motion {
            Motion::Extend => self.fail_extend.push_back(error),
            Motion::Retract => self.fail_retract.push_back(error),
        }
    }

    /// Every motion accepted or attempted so far, in order.
    pub fn commanded(&self) -> &[Motion] {
        &self.commanded
    }

    /// Take the oldest pending completion report.
    pub fn take_feedback(&mut self) -> Option<ActuatorFeedback> {
        self.feedback.pop_front()
    }

    fn run(&mut self, motion: Motion) -> Result<(), ActuatorError> {
        self.commanded.push(motion);
        let injected = match motion {
            Motion::Extend => self.fail_extend.pop_front(),
            Motion::Retract => self.fail_retract.pop_front(),
        };
        if let Some(e) = injected {
            warn!("SIM: {:?} failed ({})", motion, e);
            return Err(e);
        }
        debug!("SIM: {:?} started", motion);
        self.feedback.push_back(ActuatorFeedback::Completed(motion));
        Ok(())
    }
}

impl ActuatorPort for SimulatedActuator {
    fn extend(&mut self) -> Result<(), ActuatorError> {
        self.run(Motion::Extend)
    }

    fn retract(&mut self) -> Result<(), ActuatorError> {
        self.run(Motion::Retract)
    }
}
