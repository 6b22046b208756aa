//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ InteractionController (domain)
//! ```
//!
//! Driven adapters (actuator backends, event sinks, config storage)
//! implement these traits.  The
//! [`InteractionController`](super::service::InteractionController) consumes
//! them via generics, so the domain core never touches hardware directly
//! and every backend can be swapped for a fake in tests.

use crate::config::SystemConfig;
use crate::error::ActuatorError;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → motor controller)
// ───────────────────────────────────────────────────────────────

/// Command-side port for the linear actuator.
///
/// Calls only *start* a motion and must not block until the end stop is
/// reached.  Completion comes back later as
/// [`ControlEvent::ActuatorFeedback`](super::commands::ControlEvent::ActuatorFeedback).
pub trait ActuatorPort {
    /// Start driving towards the extended end stop.
    fn extend(&mut self) -> Result<(), ActuatorError>;

    /// Start driving towards the parked end stop.
    fn retract(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, a status page,
/// an operator console).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
