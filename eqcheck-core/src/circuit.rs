//! Quantum circuit representation

use crate::gate::Gate;
use crate::{CircuitError, Operation, Permutation, QubitId, Result};

/// A quantum circuit
///
/// An ordered sequence of gate operations over a fixed qubit register,
/// plus the metadata the equivalence checker consumes: the initial wire
/// layout, the expected output permutation and the sets of ancillary and
/// garbage qubits.
///
/// # Example
/// ```
/// use eqcheck_core::Circuit;
///
/// let mut circuit = Circuit::new(2);
/// circuit.h(0);
/// circuit.cx(0, 1);
/// assert_eq!(circuit.num_qubits(), 2);
/// assert_eq!(circuit.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Circuit {
    num_qubits: usize,
    num_bits: usize,
    operations: Vec<Operation>,
    initial_layout: Permutation,
    output_permutation: Permutation,
    ancillary: Vec<bool>,
    garbage: Vec<bool>,
}

impl Circuit {
    /// Create a new circuit with the specified number of qubits
    ///
    /// # Panics
    /// Panics if `num_qubits` is 0
    pub fn new(num_qubits: usize) -> Self {
        Self::with_bits(num_qubits, 0)
    }

    /// Create a circuit with classical bits (for measurements)
    pub fn with_bits(num_qubits: usize, num_bits: usize) -> Self {
        assert!(num_qubits > 0, "Circuit must have at least one qubit");
        Self {
            num_qubits,
            num_bits,
            operations: Vec::new(),
            initial_layout: Permutation::identity(num_qubits),
            output_permutation: Permutation::identity(num_qubits),
            ancillary: vec![false; num_qubits],
            garbage: vec![false; num_qubits],
        }
    }

    /// Number of qubits in the register
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of classical bits
    #[inline]
    pub const fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of operations
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the circuit contains no operations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations that contribute to the unitary
    pub fn num_unitary_ops(&self) -> usize {
        self.operations.iter().filter(|op| op.is_unitary()).count()
    }

    /// Append an operation
    ///
    /// # Errors
    /// Returns an error if any qubit or bit index is out of bounds.
    pub fn add(&mut self, op: Operation) -> Result<()> {
        for q in op.qubits() {
            if q.index() >= self.num_qubits {
                return Err(CircuitError::invalid_qubit(q.index(), self.num_qubits));
            }
        }
        for &b in op.bits() {
            if b >= self.num_bits {
                return Err(CircuitError::InvalidBit(b, self.num_bits));
            }
        }
        self.operations.push(op);
        Ok(())
    }

    /// Iterator over the operations
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Random-access lookup of an operation
    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    /// Mutable access for the rewrite passes
    pub(crate) fn operations_mut(&mut self) -> &mut Vec<Operation> {
        &mut self.operations
    }

    /// The initial wire layout
    pub fn initial_layout(&self) -> &Permutation {
        &self.initial_layout
    }

    /// Replace the initial wire layout
    pub fn set_initial_layout(&mut self, layout: Permutation) {
        assert_eq!(layout.len(), self.num_qubits);
        self.initial_layout = layout;
    }

    /// The expected output permutation
    pub fn output_permutation(&self) -> &Permutation {
        &self.output_permutation
    }

    /// Replace the output permutation
    pub fn set_output_permutation(&mut self, perm: Permutation) {
        assert_eq!(perm.len(), self.num_qubits);
        self.output_permutation = perm;
    }

    /// Mark a qubit as ancillary (|0⟩ at input and output)
    pub fn set_ancillary(&mut self, qubit: usize) {
        self.ancillary[qubit] = true;
    }

    /// Mark a qubit as garbage (output not observed)
    pub fn set_garbage(&mut self, qubit: usize) {
        self.garbage[qubit] = true;
    }

    /// Per-qubit ancillary flags
    pub fn ancillary(&self) -> &[bool] {
        &self.ancillary
    }

    /// Per-qubit garbage flags
    pub fn garbage(&self) -> &[bool] {
        &self.garbage
    }

    /// Whether the circuit is dynamic: it contains resets, classically
    /// controlled operations, or operations acting on a qubit after it
    /// has been measured.
    pub fn is_dynamic(&self) -> bool {
        let mut measured = vec![false; self.num_qubits];
        for op in &self.operations {
            if op.is_classically_controlled() || op.gate() == Gate::Reset {
                return true;
            }
            if op.gate() == Gate::Measure {
                measured[op.targets()[0].index()] = true;
            } else if op.qubits().any(|q| measured[q.index()]) {
                return true;
            }
        }
        false
    }

    /// The inverse circuit: reversed operations with inverted gates
    ///
    /// Non-unitary operations are dropped; inverting a circuit is only
    /// meaningful for its unitary part.
    pub fn invert(&self) -> Circuit {
        let mut inv = Circuit::with_bits(self.num_qubits, self.num_bits);
        for op in self.operations.iter().rev() {
            if op.is_unitary() {
                inv.operations.push(op.inverse());
            }
        }
        inv
    }

    /// Validate all operations against the register bounds
    pub fn validate(&self) -> Result<()> {
        for (i, op) in self.operations.iter().enumerate() {
            for q in op.qubits() {
                if q.index() >= self.num_qubits {
                    return Err(CircuitError::ValidationError(format!(
                        "Operation {} uses invalid qubit {}",
                        i, q
                    )));
                }
            }
        }
        Ok(())
    }

    // Builder shorthands, one per common gate.

    /// Append a Pauli-X
    pub fn x(&mut self, q: usize) {
        self.push_1q(Gate::X, q);
    }

    /// Append a Pauli-Y
    pub fn y(&mut self, q: usize) {
        self.push_1q(Gate::Y, q);
    }

    /// Append a Pauli-Z
    pub fn z(&mut self, q: usize) {
        self.push_1q(Gate::Z, q);
    }

    /// Append a Hadamard
    pub fn h(&mut self, q: usize) {
        self.push_1q(Gate::H, q);
    }

    /// Append an S gate
    pub fn s(&mut self, q: usize) {
        self.push_1q(Gate::S, q);
    }

    /// Append a T gate
    pub fn t(&mut self, q: usize) {
        self.push_1q(Gate::T, q);
    }

    /// Append an identity
    pub fn i(&mut self, q: usize) {
        self.push_1q(Gate::I, q);
    }

    /// Append an X-rotation
    pub fn rx(&mut self, theta: f64, q: usize) {
        self.push_1q(Gate::Rx(theta), q);
    }

    /// Append a Y-rotation
    pub fn ry(&mut self, theta: f64, q: usize) {
        self.push_1q(Gate::Ry(theta), q);
    }

    /// Append a Z-rotation
    pub fn rz(&mut self, theta: f64, q: usize) {
        self.push_1q(Gate::Rz(theta), q);
    }

    /// Append a phase gate
    pub fn p(&mut self, lambda: f64, q: usize) {
        self.push_1q(Gate::Phase(lambda), q);
    }

    /// Append a CNOT with control `c` and target `t`
    pub fn cx(&mut self, c: usize, t: usize) {
        let op = Operation::controlled(Gate::X, QubitId::new(t), &[QubitId::new(c)])
            .expect("valid CX operation");
        self.add(op).expect("CX qubits in range");
    }

    /// Append a controlled-Z
    pub fn cz(&mut self, c: usize, t: usize) {
        let op = Operation::controlled(Gate::Z, QubitId::new(t), &[QubitId::new(c)])
            .expect("valid CZ operation");
        self.add(op).expect("CZ qubits in range");
    }

    /// Append a Toffoli with controls `c0`, `c1` and target `t`
    pub fn ccx(&mut self, c0: usize, c1: usize, t: usize) {
        let op = Operation::controlled(
            Gate::X,
            QubitId::new(t),
            &[QubitId::new(c0), QubitId::new(c1)],
        )
        .expect("valid CCX operation");
        self.add(op).expect("CCX qubits in range");
    }

    /// Append a SWAP
    pub fn swap(&mut self, a: usize, b: usize) {
        let op = Operation::new(Gate::Swap, &[QubitId::new(a), QubitId::new(b)])
            .expect("valid SWAP operation");
        self.add(op).expect("SWAP qubits in range");
    }

    /// Append a measurement of qubit `q` into bit `b`
    pub fn measure(&mut self, q: usize, b: usize) {
        self.add(Operation::measure(QubitId::new(q), b))
            .expect("measurement indices in range");
    }

    /// Append a reset of qubit `q` to |0⟩
    pub fn reset(&mut self, q: usize) {
        self.push_1q(Gate::Reset, q);
    }

    fn push_1q(&mut self, gate: Gate, q: usize) {
        let op = Operation::new(gate, &[QubitId::new(q)]).expect("single-target operation");
        self.add(op).expect("qubit in range");
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} operations)",
            self.num_qubits,
            self.len()
        )?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "  {}: {}", i, op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_creation() {
        let circuit = Circuit::new(3);
        assert_eq!(circuit.num_qubits(), 3);
        assert!(circuit.is_empty());
        assert!(circuit.initial_layout().is_identity());
    }

    #[test]
    #[should_panic(expected = "at least one qubit")]
    fn test_circuit_zero_qubits() {
        Circuit::new(0);
    }

    #[test]
    fn test_builder_and_bounds() {
        let mut circuit = Circuit::new(2);
        circuit.h(0);
        circuit.cx(0, 1);
        assert_eq!(circuit.len(), 2);

        let bad = Operation::new(Gate::X, &[QubitId::new(5)]).unwrap();
        assert!(matches!(
            circuit.add(bad),
            Err(CircuitError::InvalidQubit(5, 2))
        ));
    }

    #[test]
    fn test_measure_requires_bits() {
        let mut circuit = Circuit::new(1);
        let op = Operation::measure(QubitId::new(0), 0);
        assert!(matches!(circuit.add(op), Err(CircuitError::InvalidBit(0, 0))));

        let mut circuit = Circuit::with_bits(1, 1);
        circuit.measure(0, 0);
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn test_is_dynamic() {
        let mut staticc = Circuit::with_bits(2, 2);
        staticc.h(0);
        staticc.measure(0, 0);
        staticc.measure(1, 1);
        assert!(!staticc.is_dynamic());

        let mut dynamic = Circuit::with_bits(1, 1);
        dynamic.h(0);
        dynamic.measure(0, 0);
        dynamic.reset(0);
        assert!(dynamic.is_dynamic());

        let mut reuse = Circuit::with_bits(1, 1);
        reuse.measure(0, 0);
        reuse.h(0);
        assert!(reuse.is_dynamic());
    }

    #[test]
    fn test_invert() {
        let mut circuit = Circuit::with_bits(2, 2);
        circuit.h(0);
        circuit.s(0);
        circuit.cx(0, 1);
        circuit.measure(0, 0);

        let inv = circuit.invert();
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.get(0).unwrap().gate(), Gate::X);
        assert_eq!(inv.get(1).unwrap().gate(), Gate::Sdg);
        assert_eq!(inv.get(2).unwrap().gate(), Gate::H);
    }

    #[test]
    fn test_num_unitary_ops() {
        let mut circuit = Circuit::with_bits(2, 1);
        circuit.x(0);
        circuit.swap(0, 1);
        circuit.measure(0, 0);
        assert_eq!(circuit.num_unitary_ops(), 2);
    }

    #[test]
    fn test_display() {
        let mut circuit = Circuit::new(2);
        circuit.h(0);
        let s = format!("{}", circuit);
        assert!(s.contains("2 qubits"));
        assert!(s.contains("h(q0)"));
    }
}
