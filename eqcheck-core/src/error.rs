//! Error types for eqcheck-core

use crate::QubitId;
use thiserror::Error;

/// Errors that can occur while building or transforming circuits
#[derive(Debug, Error)]
pub enum CircuitError {
    /// Invalid qubit index used
    #[error("Invalid qubit index {0}: circuit has only {1} qubits")]
    InvalidQubit(usize, usize),

    /// Gate applied to wrong number of qubits
    #[error("Gate '{gate}' requires {expected} target qubits, but {actual} were provided")]
    InvalidQubitCount {
        gate: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Duplicate qubit in gate operation
    #[error("Duplicate qubit {0} in gate operation")]
    DuplicateQubit(QubitId),

    /// Invalid classical bit index used
    #[error("Invalid classical bit {0}: circuit has only {1} bits")]
    InvalidBit(usize, usize),

    /// A classically controlled operation references a bit that no
    /// measurement has written yet
    #[error("Classical bit {0} is used as a control before being measured")]
    UnwrittenBit(usize),

    /// Generic circuit validation error
    #[error("Circuit validation failed: {0}")]
    ValidationError(String),
}

impl CircuitError {
    /// Create an invalid qubit error
    pub fn invalid_qubit(qubit: usize, num_qubits: usize) -> Self {
        Self::InvalidQubit(qubit, num_qubits)
    }
}
