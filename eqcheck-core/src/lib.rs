//! Core types for the eqcheck quantum-circuit equivalence checker
//!
//! This crate provides the circuit model consumed by the checking engine:
//! - [`QubitId`]: Type-safe qubit addressing
//! - [`Gate`]: The closed set of supported gate kinds
//! - [`Operation`]: A gate applied to concrete qubits (with controls)
//! - [`Circuit`]: Gate sequence plus the metadata the checker relies on
//!   (initial layout, output permutation, ancillary/garbage qubits)
//! - [`passes`]: The preprocessing passes the manager applies before
//!   checking (dynamic-circuit transformation, diagonal-gate removal, …)
//!
//! # Example
//! ```
//! use eqcheck_core::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new(2);
//! circuit.h(0);
//! circuit.cx(0, 1);
//! assert_eq!(circuit.len(), 2);
//! ```

pub mod algorithms;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod operation;
pub mod passes;
pub mod permutation;
pub mod qubit;

// Re-exports for convenience
pub use circuit::Circuit;
pub use error::CircuitError;
pub use gate::Gate;
pub use num_complex::Complex64;
pub use operation::Operation;
pub use permutation::Permutation;
pub use qubit::QubitId;

/// Type alias for results in eqcheck-core
pub type Result<T> = std::result::Result<T, CircuitError>;
