//! Small benchmark circuit generators
//!
//! The Bernstein-Vazirani construction exists in both a static and a
//! dynamic (measure-and-reset) form, which makes it a convenient probe
//! for the dynamic-circuit transformation.

use crate::Circuit;

/// Static Bernstein-Vazirani circuit for the hidden bitstring `s`
///
/// Uses one qubit per bit of the string. The phase-oracle formulation
/// folds the oracle into single-qubit Z gates, so each qubit runs
/// `H (Z)? H` and is then measured into its own bit.
pub fn bernstein_vazirani(s: u64, num_bits: usize) -> Circuit {
    assert!(num_bits > 0 && num_bits <= 64);
    let mut circuit = Circuit::with_bits(num_bits, num_bits);
    for i in 0..num_bits {
        circuit.h(i);
        if (s >> i) & 1 == 1 {
            circuit.z(i);
        }
        circuit.h(i);
        circuit.measure(i, i);
    }
    circuit
}

/// Dynamic Bernstein-Vazirani circuit for the hidden bitstring `s`
///
/// The single-qubit variant: the working qubit is measured and reset
/// between rounds, trading circuit width for mid-circuit measurements.
pub fn bernstein_vazirani_dynamic(s: u64, num_bits: usize) -> Circuit {
    assert!(num_bits > 0 && num_bits <= 64);
    let mut circuit = Circuit::with_bits(1, num_bits);
    for i in 0..num_bits {
        circuit.h(0);
        if (s >> i) & 1 == 1 {
            circuit.z(0);
        }
        circuit.h(0);
        circuit.measure(0, i);
        if i + 1 < num_bits {
            circuit.reset(0);
        }
    }
    circuit
}
