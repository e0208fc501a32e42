//! Flavor abstraction over matrix and vector diagrams
//!
//! The checkers share one driver loop; what differs is whether the
//! running diagram is a matrix (alternating, construction) or a state
//! vector (simulation). This trait captures exactly the operations the
//! driver needs from either flavor.

use crate::equivalence::EquivalenceCriterion;
use eqcheck_dd::{MatrixDD, Package, VectorDD, TOLERANCE};

/// Operations a running diagram must support during checking
pub trait DdFunction: Copy {
    /// `op · state`
    fn apply_left(pkg: &mut Package, op: MatrixDD, state: Self) -> Self;

    /// `state · op`; only meaningful for matrix diagrams
    fn apply_right(pkg: &mut Package, state: Self, op: MatrixDD) -> Self;

    fn inc_ref(pkg: &mut Package, state: Self);

    fn dec_ref(pkg: &mut Package, state: Self);

    fn size(pkg: &Package, state: Self) -> usize;

    /// Restrict ancillary inputs to |0⟩; a no-op for state vectors,
    /// whose ancillaries already start there
    fn reduce_ancillae(pkg: &mut Package, state: Self, ancillary: &[bool]) -> Self;

    /// Sum out garbage outputs
    fn reduce_garbage(pkg: &mut Package, state: Self, garbage: &[bool]) -> Self;

    /// High-water mark of referenced nodes of this flavor
    fn max_active_nodes(pkg: &Package) -> usize;

    /// Verdict from two diagrams of this flavor
    ///
    /// `tolerance` is the trace threshold for matrices and the fidelity
    /// threshold for vectors.
    fn equals(pkg: &mut Package, e: Self, f: Self, tolerance: f64) -> EquivalenceCriterion;
}

fn weights_agree(a: num_complex::Complex64, b: num_complex::Complex64) -> bool {
    (a - b).norm() <= TOLERANCE
}

impl DdFunction for MatrixDD {
    fn apply_left(pkg: &mut Package, op: MatrixDD, state: Self) -> Self {
        pkg.multiply_mm(op, state)
    }

    fn apply_right(pkg: &mut Package, state: Self, op: MatrixDD) -> Self {
        pkg.multiply_mm(state, op)
    }

    fn inc_ref(pkg: &mut Package, state: Self) {
        pkg.inc_ref_m(state);
    }

    fn dec_ref(pkg: &mut Package, state: Self) {
        pkg.dec_ref_m(state);
    }

    fn size(pkg: &Package, state: Self) -> usize {
        pkg.size_m(state)
    }

    fn reduce_ancillae(pkg: &mut Package, state: Self, ancillary: &[bool]) -> Self {
        pkg.reduce_ancillae(state, ancillary)
    }

    fn reduce_garbage(pkg: &mut Package, state: Self, garbage: &[bool]) -> Self {
        pkg.reduce_garbage_m(state, garbage)
    }

    fn max_active_nodes(pkg: &Package) -> usize {
        pkg.max_active_matrix_nodes()
    }

    fn equals(pkg: &mut Package, e: Self, f: Self, tolerance: f64) -> EquivalenceCriterion {
        if e.same_node(&f) {
            return if weights_agree(e.weight(), f.weight()) {
                EquivalenceCriterion::Equivalent
            } else {
                EquivalenceCriterion::EquivalentUpToGlobalPhase
            };
        }
        // e · f† collapses to a scaled identity iff the two agree up to
        // phase; the multiply is cheap when either side carries the
        // identity flag.
        let f_dag = pkg.conjugate_transpose(f);
        let g = pkg.multiply_mm(e, f_dag);
        if pkg.is_close_to_identity(g, tolerance) {
            if weights_agree(e.weight(), f.weight()) {
                EquivalenceCriterion::Equivalent
            } else {
                EquivalenceCriterion::EquivalentUpToGlobalPhase
            }
        } else {
            EquivalenceCriterion::NotEquivalent
        }
    }
}

impl DdFunction for VectorDD {
    fn apply_left(pkg: &mut Package, op: MatrixDD, state: Self) -> Self {
        pkg.multiply_mv(op, state)
    }

    fn apply_right(_pkg: &mut Package, _state: Self, _op: MatrixDD) -> Self {
        panic!("state vectors are only multiplied from the left");
    }

    fn inc_ref(pkg: &mut Package, state: Self) {
        pkg.inc_ref_v(state);
    }

    fn dec_ref(pkg: &mut Package, state: Self) {
        pkg.dec_ref_v(state);
    }

    fn size(pkg: &Package, state: Self) -> usize {
        pkg.size_v(state)
    }

    fn reduce_ancillae(_pkg: &mut Package, state: Self, _ancillary: &[bool]) -> Self {
        state
    }

    fn reduce_garbage(pkg: &mut Package, state: Self, garbage: &[bool]) -> Self {
        pkg.reduce_garbage_v(state, garbage)
    }

    fn max_active_nodes(pkg: &Package) -> usize {
        pkg.max_active_vector_nodes()
    }

    fn equals(pkg: &mut Package, e: Self, f: Self, tolerance: f64) -> EquivalenceCriterion {
        if e.same_node(&f) {
            return if weights_agree(e.weight(), f.weight()) {
                EquivalenceCriterion::Equivalent
            } else {
                EquivalenceCriterion::EquivalentUpToGlobalPhase
            };
        }
        let overlap = pkg.inner_product(e, f);
        if (overlap.re - 1.0).abs() < tolerance {
            EquivalenceCriterion::Equivalent
        } else if (overlap.norm_sqr() - 1.0).abs() < tolerance {
            EquivalenceCriterion::EquivalentUpToPhase
        } else {
            EquivalenceCriterion::NotEquivalent
        }
    }
}
