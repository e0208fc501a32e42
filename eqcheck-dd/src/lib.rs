//! Decision-diagram package for quantum states and unitaries
//!
//! Implements the QMDD representation the equivalence checker runs on:
//! - [`VectorDD`]: a 2ⁿ state vector as a weighted, hash-consed DAG
//! - [`MatrixDD`]: a 2ⁿ × 2ⁿ matrix in the same style
//! - [`Package`]: owns the node stores and compute caches and provides
//!   construction (gates, states), arithmetic (multiply, add, inner
//!   product, trace), reference counting and garbage collection
//!
//! Diagrams from one [`Package`] are meaningless in another; the edge
//! handles are indices into the owning package's arenas.
//!
//! # Example
//! ```
//! use eqcheck_dd::Package;
//! use eqcheck_core::gate::PAULI_X;
//!
//! let mut pkg = Package::new(1);
//! let x = pkg.gate_dd(&PAULI_X, 0, &[]);
//! let squared = pkg.multiply_mm(x, x);
//! assert!(pkg.is_close_to_identity(squared, 0.0));
//! ```

pub mod edge;
pub mod error;
mod node;
pub mod package;

pub use edge::{MatrixDD, VectorDD, TOLERANCE};
pub use error::DdError;
pub use package::Package;
