//! Circuit rewrite passes used before equivalence checking
//!
//! These passes normalize circuits so that the decision-diagram checkers
//! only ever see static, measurement-free gate sequences of equal width.

use crate::gate::Gate;
use crate::{Circuit, CircuitError, Operation, Permutation, QubitId, Result};

/// Drop diagonal gates that are immediately followed by measurements
///
/// A diagonal gate right before a measurement of all its qubits cannot
/// change the measurement outcome distribution, so removing it preserves
/// the observable behavior of the circuit.
pub fn remove_diagonal_gates_before_measure(circuit: &mut Circuit) {
    let num_qubits = circuit.num_qubits();
    let ops = circuit.operations_mut();

    // Reverse scan. A qubit is "quiescent" while the remaining suffix
    // touches it only through measurements.
    let mut quiescent = vec![false; num_qubits];
    let mut keep = vec![true; ops.len()];
    for (i, op) in ops.iter().enumerate().rev() {
        if op.gate() == Gate::Measure {
            quiescent[op.targets()[0].index()] = true;
        } else if op.is_unitary()
            && op.is_diagonal()
            && op.qubits().all(|q| quiescent[q.index()])
        {
            keep[i] = false;
        } else {
            for q in op.qubits() {
                quiescent[q.index()] = false;
            }
        }
    }

    let mut it = keep.iter();
    ops.retain(|_| *it.next().unwrap());
}

/// Rewrite a dynamic circuit into an equivalent static one
///
/// Applies the deferred measurement principle: every reset allocates a
/// fresh qubit, classical controls become quantum controls on the qubit
/// that produced the controlling bit, and all measurements move to the
/// end of the circuit. The output permutation records which final qubit
/// carries each measured bit; everything unmeasured becomes garbage.
///
/// # Errors
/// Fails with [`CircuitError::UnwrittenBit`] if a classical control
/// reads a bit before any measurement has written it.
pub fn transform_dynamic_circuit(circuit: &Circuit) -> Result<Circuit> {
    let n = circuit.num_qubits();
    let num_bits = circuit.num_bits();

    // Physical qubit currently backing each logical wire.
    let mut wire_to_qubit: Vec<usize> = (0..n).collect();
    let mut next_qubit = n;
    // Qubit whose deferred measurement produces each classical bit.
    let mut bit_to_qubit: Vec<Option<usize>> = vec![None; num_bits];
    let mut staged: Vec<Operation> = Vec::with_capacity(circuit.len());

    for op in circuit.operations() {
        match op.gate() {
            Gate::Measure => {
                let w = op.targets()[0].index();
                bit_to_qubit[op.bits()[0]] = Some(wire_to_qubit[w]);
            }
            Gate::Reset => {
                let w = op.targets()[0].index();
                wire_to_qubit[w] = next_qubit;
                next_qubit += 1;
            }
            Gate::Barrier => {}
            _ => {
                let mapped =
                    op.map_qubits(|q| QubitId::new(wire_to_qubit[q.index()]));
                if op.is_classically_controlled() {
                    let mut control_qubits = Vec::with_capacity(op.bits().len());
                    for &b in op.bits() {
                        let q = bit_to_qubit[b].ok_or(CircuitError::UnwrittenBit(b))?;
                        control_qubits.push(QubitId::new(q));
                    }
                    staged.push(mapped.promote_classical_controls(&control_qubits));
                } else {
                    staged.push(mapped);
                }
            }
        }
    }

    let mut out = Circuit::with_bits(next_qubit, num_bits);
    for op in staged {
        out.add(op)?;
    }
    let mut measured = vec![false; next_qubit];
    for (bit, backing) in bit_to_qubit.iter().enumerate() {
        if let Some(q) = backing {
            out.measure(*q, bit);
            measured[*q] = true;
        }
    }

    // Measured bit b is read off the level its qubit is permuted to.
    let mut levels: Vec<usize> = (0..next_qubit).collect();
    for (bit, backing) in bit_to_qubit.iter().enumerate() {
        if let Some(q) = backing {
            if levels[*q] != bit {
                let j = levels
                    .iter()
                    .position(|&l| l == bit)
                    .expect("levels stay a permutation");
                levels.swap(*q, j);
            }
        }
    }
    out.set_output_permutation(Permutation::from_map(levels));

    for q in 0..next_qubit {
        if q >= n {
            out.set_ancillary(q);
        }
        if !measured[q] {
            out.set_garbage(q);
        }
    }
    Ok(out)
}

/// Mark mismatched output assignments as garbage in both circuits
///
/// When the two circuits route their logical outputs to different
/// physical qubits and the mismatch cannot be reconciled, the affected
/// wires carry no comparable information and are excluded from the
/// equivalence check.
pub fn fix_output_permutation_mismatch(lhs: &mut Circuit, rhs: &mut Circuit) {
    let shared = lhs.num_qubits().min(rhs.num_qubits());
    for w in 0..shared {
        if lhs.output_permutation()[w] != rhs.output_permutation()[w] {
            lhs.set_garbage(w);
            rhs.set_garbage(w);
        }
    }
}

/// Widen a circuit to `width` qubits
///
/// The added qubits are idle, start in |0⟩ and are never observed, so
/// they are marked both ancillary and garbage.
pub fn pad_to_width(circuit: &Circuit, width: usize) -> Result<Circuit> {
    assert!(width >= circuit.num_qubits());
    if width == circuit.num_qubits() {
        return Ok(circuit.clone());
    }

    let mut out = Circuit::with_bits(width, circuit.num_bits());
    for op in circuit.operations() {
        out.add(op.clone())?;
    }

    let mut layout = circuit.initial_layout().clone();
    layout.extend_identity(width);
    out.set_initial_layout(layout);
    let mut perm = circuit.output_permutation().clone();
    perm.extend_identity(width);
    out.set_output_permutation(perm);

    for q in 0..circuit.num_qubits() {
        if circuit.ancillary()[q] {
            out.set_ancillary(q);
        }
        if circuit.garbage()[q] {
            out.set_garbage(q);
        }
    }
    for q in circuit.num_qubits()..width {
        out.set_ancillary(q);
        out.set_garbage(q);
    }
    Ok(out)
}
