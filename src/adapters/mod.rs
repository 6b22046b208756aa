//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to               |
//! |----------------|--------------|---------------------------|
//! | `config_store` | ConfigPort   | JSON file on disk         |
//! | `log_sink`     | EventSink    | `log` facade              |
//! | `simulated`    | ActuatorPort | In-memory actuator model  |
//!
//! The real motor lives in [`drivers::motor`](crate::drivers::motor) and
//! implements `ActuatorPort` directly over `embedded-hal` pins.

pub mod config_store;
pub mod log_sink;
pub mod simulated;
