//! Linear actuator motor driver (H-bridge with enable + direction pins).
//!
//! Direction pin high = extend, low = retract; enable pin gates the motor.
//! The actuator's built-in end-stop switches cut the motor at either end,
//! so the driver only starts motions.  Completion is reported back to the
//! control loop as feedback or assumed after the transit timeout.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator: it never refuses a retract.  Contention
//! rules live in [`ActuatorTracker`](super::actuator::ActuatorTracker).

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::ports::ActuatorPort;
use crate::drivers::actuator::Motion;
use crate::error::ActuatorError;

pub struct MotorDriver<EN, DIR> {
    enable: EN,
    direction: DIR,
    last_motion: Option<Motion>,
}

impl<EN: OutputPin, DIR: OutputPin> MotorDriver<EN, DIR> {
    pub fn new(enable: EN, direction: DIR) -> Self {
        Self {
            enable,
            direction,
            last_motion: None,
        }
    }

    /// Cut motor power.
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.enable.set_low().map_err(|_| pin_fault("enable"))
    }

    pub fn last_motion(&self) -> Option<Motion> {
        self.last_motion
    }

    fn drive(&mut self, motion: Motion) -> Result<(), ActuatorError> {
        // Drop enable before flipping direction so the bridge never
        // shoots through.
        self.stop()?;
        let dir = match motion {
            Motion::Extend => self.direction.set_high(),
            Motion::Retract => self.direction.set_low(),
        };
        dir.map_err(|_| pin_fault("direction"))?;
        self.enable.set_high().map_err(|_| pin_fault("enable"))?;
        self.last_motion = Some(motion);
        Ok(())
    }
}

impl<EN: OutputPin, DIR: OutputPin> ActuatorPort for MotorDriver<EN, DIR> {
    fn extend(&mut self) -> Result<(), ActuatorError> {
        self.drive(Motion::Extend)
    }

    fn retract(&mut self) -> Result<(), ActuatorError> {
        self.drive(Motion::Retract)
    }
}

fn pin_fault(pin: &'static str) -> ActuatorError {
    error!("MOTOR: {} pin write failed", pin);
    ActuatorError::DriverFault
}
