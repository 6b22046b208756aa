//! Canopy interaction controller library.
//!
//! Exposes the control loop for a walk-in installation: weight pads
//! trigger an interaction, a linear actuator raises the canopy, LED
//! strips cycle a colour spectrum, and an operator safety override
//! parks everything.  Hardware is reached only through the port traits
//! in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod animation;
pub mod app;
pub mod config;
pub mod drivers;
pub mod events;
pub mod fsm;
pub mod safety;
pub mod sensors;

pub mod error;

pub use error::{Error, Result};
