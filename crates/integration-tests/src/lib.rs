//! # Integration Tests Crate
//!
//! End-to-end scenarios driving the assembled coordinator (service,
//! in-memory repository, mock bridge, event dispatcher) under a frozen
//! clock.
//!
//! ## Structure
//!
//! ```text
//! integration-tests/
//! └── src/
//!     ├── lib.rs         # This file
//!     ├── harness.rs     # Shared wiring for all scenarios
//!     ├── scenarios.rs   # Literal end-to-end protocol scenarios
//!     └── properties.rs  # Universal properties of the protocol
//! ```

pub mod harness;

#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;
