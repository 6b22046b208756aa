//! Unified error types for the canopy controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be handed back from every entry point without allocation.
//!
//! None of these errors is fatal: the controller stays available for the
//! next event whatever is returned.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible control-loop operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range sensor / request payload.  Dropped, no
    /// state change.
    Input(InputError),
    /// The actuator could not execute a commanded transition.
    Actuator(ActuatorError),
    /// An entry point was invoked in a mode that forbids it.
    Transition(TransitionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Transition(e) => write!(f, "transition: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Pad id is outside the configured pad range.
    UnknownPad(u8),
    /// Reading is NaN or infinite.
    NonFiniteValue,
    /// Weight intensity cannot be negative.
    NegativeValue,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPad(pad) => write!(f, "unknown pad {pad}"),
            Self::NonFiniteValue => write!(f, "reading is not a finite number"),
            Self::NegativeValue => write!(f, "reading is negative"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Failures reported by an actuator backend when it cannot move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Motor stalled (over-current) before reaching the end stop.
    Stalled,
    /// Motor controller reported a driver fault.
    DriverFault,
    /// Controller did not acknowledge the command.
    NotResponding,
    /// An end-stop switch refused the requested direction.
    LimitSwitch,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stalled => write!(f, "motor stalled"),
            Self::DriverFault => write!(f, "motor driver fault"),
            Self::NotResponding => write!(f, "controller not responding"),
            Self::LimitSwitch => write!(f, "limit switch engaged"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Transition errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Safety clear requested while the installation is not in Safety.
    NotInSafety,
    /// The request is suppressed while Safety is active.
    SuppressedBySafety,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInSafety => write!(f, "not in safety mode"),
            Self::SuppressedBySafety => write!(f, "suppressed by safety mode"),
        }
    }
}

impl From<TransitionError> for Error {
    fn from(e: TransitionError) -> Self {
        Self::Transition(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
