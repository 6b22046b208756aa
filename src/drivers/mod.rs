//! Actuator state tracking and the motor driver.

pub mod actuator;
pub mod motor;
