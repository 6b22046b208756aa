//! LED canopy animation: spectra and frame generation.
//!
//! Both pieces are pure.  The control loop owns the step counter and asks
//! for frames; nothing here holds mutable state.

pub mod frame;
pub mod rainbow;
