//! Gate operations applied to concrete qubits

use crate::{CircuitError, Gate, QubitId, Result};
use smallvec::SmallVec;
use std::fmt;

/// A gate applied to specific qubits
///
/// Combines a [`Gate`] kind with its target qubits, an optional list of
/// (positive) control qubits and, for measurements and classically
/// controlled gates, the classical bits involved.
///
/// # Example
/// ```
/// use eqcheck_core::{Gate, Operation, QubitId};
///
/// let cx = Operation::controlled(Gate::X, QubitId::new(1), &[QubitId::new(0)]).unwrap();
/// assert_eq!(cx.controls().len(), 1);
/// ```
#[derive(Clone, PartialEq)]
pub struct Operation {
    gate: Gate,
    targets: SmallVec<[QubitId; 2]>,
    controls: SmallVec<[QubitId; 2]>,
    /// Classical bits: measurement destination, or the bits gating a
    /// classically controlled gate.
    bits: SmallVec<[usize; 1]>,
    /// Whether `bits` act as classical controls (dynamic circuits).
    classically_controlled: bool,
}

impl Operation {
    /// Create an uncontrolled operation
    pub fn new(gate: Gate, targets: &[QubitId]) -> Result<Self> {
        Self::with_controls(gate, targets, &[])
    }

    /// Create a controlled operation with a single target
    pub fn controlled(gate: Gate, target: QubitId, controls: &[QubitId]) -> Result<Self> {
        Self::with_controls(gate, &[target], controls)
    }

    /// Create an operation with explicit target and control lists
    ///
    /// # Errors
    /// Returns an error if the target count does not match the gate kind
    /// or if any qubit appears twice.
    pub fn with_controls(gate: Gate, targets: &[QubitId], controls: &[QubitId]) -> Result<Self> {
        if targets.len() != gate.num_targets() {
            return Err(CircuitError::InvalidQubitCount {
                gate: gate.name(),
                expected: gate.num_targets(),
                actual: targets.len(),
            });
        }

        let all: SmallVec<[QubitId; 4]> =
            targets.iter().chain(controls.iter()).copied().collect();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                if all[i] == all[j] {
                    return Err(CircuitError::DuplicateQubit(all[i]));
                }
            }
        }

        Ok(Self {
            gate,
            targets: SmallVec::from_slice(targets),
            controls: SmallVec::from_slice(controls),
            bits: SmallVec::new(),
            classically_controlled: false,
        })
    }

    /// Create a measurement of `qubit` into classical bit `bit`
    pub fn measure(qubit: QubitId, bit: usize) -> Self {
        Self {
            gate: Gate::Measure,
            targets: SmallVec::from_slice(&[qubit]),
            controls: SmallVec::new(),
            bits: SmallVec::from_slice(&[bit]),
            classically_controlled: false,
        }
    }

    /// Gate this operation on a classical bit being 1
    pub fn with_classical_control(mut self, bit: usize) -> Self {
        self.bits.push(bit);
        self.classically_controlled = true;
        self
    }

    /// The gate kind
    #[inline]
    pub fn gate(&self) -> Gate {
        self.gate
    }

    /// The target qubits
    #[inline]
    pub fn targets(&self) -> &[QubitId] {
        &self.targets
    }

    /// The control qubits
    #[inline]
    pub fn controls(&self) -> &[QubitId] {
        &self.controls
    }

    /// The classical bits referenced by this operation
    #[inline]
    pub fn bits(&self) -> &[usize] {
        &self.bits
    }

    /// Whether this operation is gated on classical bits
    #[inline]
    pub fn is_classically_controlled(&self) -> bool {
        self.classically_controlled
    }

    /// All qubits touched by this operation
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.targets.iter().chain(self.controls.iter()).copied()
    }

    /// Whether this operation contributes to the circuit unitary
    #[inline]
    pub fn is_unitary(&self) -> bool {
        self.gate.is_unitary() && !self.classically_controlled
    }

    /// Whether the full (controlled) operation is diagonal
    ///
    /// A controlled gate is diagonal iff its base gate is: the control
    /// only selects between identity and the (diagonal) base matrix.
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self.gate.is_diagonal()
    }

    /// The inverse operation (same qubits, inverted gate kind)
    pub fn inverse(&self) -> Operation {
        Operation {
            gate: self.gate.inverse(),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
            bits: self.bits.clone(),
            classically_controlled: self.classically_controlled,
        }
    }

    /// Replace every qubit through `f` (used by circuit rewrites)
    pub(crate) fn map_qubits(&self, f: impl Fn(QubitId) -> QubitId) -> Operation {
        Operation {
            gate: self.gate,
            targets: self.targets.iter().map(|&q| f(q)).collect(),
            controls: self.controls.iter().map(|&q| f(q)).collect(),
            bits: self.bits.clone(),
            classically_controlled: self.classically_controlled,
        }
    }

    /// Promote classical controls into quantum controls on `qubits`
    pub(crate) fn promote_classical_controls(&self, qubits: &[QubitId]) -> Operation {
        let mut op = self.clone();
        op.controls.extend(qubits.iter().copied());
        op.bits.clear();
        op.classically_controlled = false;
        op
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.controls.is_empty() {
            write!(f, "c[")?;
            for (i, q) in self.controls.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", q)?;
            }
            write!(f, "] ")?;
        }
        write!(f, "{}(", self.gate.name())?;
        for (i, q) in self.targets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")?;
        if !self.bits.is_empty() {
            write!(f, " -> {:?}", &self.bits[..])?;
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
