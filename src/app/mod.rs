//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the interaction rules for the installation:
//! mode arbitration, safety override, actuator sequencing and the
//! animation clock.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals or a network layer.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
