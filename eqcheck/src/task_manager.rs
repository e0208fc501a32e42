//! Cursor over one circuit during a checking run

use crate::dd_function::DdFunction;
use crate::error::CheckError;
use eqcheck_core::{Circuit, Gate, Operation, Permutation};
use eqcheck_dd::{MatrixDD, Package};

/// How a task manager composes its circuit's gates onto the running DD
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Apply each gate from the left
    Forward,
    /// Apply each gate's inverse from the right
    Reverse,
}

/// Walks one circuit, applying its gates to a running diagram
///
/// The running diagram itself lives with the checker (the alternating
/// checker shares one diagram between two task managers), so every
/// advancing method takes it as a parameter. The task manager owns the
/// cursor and the wire permutation; SWAP gates are elided by rewriting
/// the permutation instead of multiplying.
pub struct TaskManager<'c> {
    circuit: &'c Circuit,
    cursor: usize,
    direction: Direction,
    permutation: Permutation,
}

impl<'c> TaskManager<'c> {
    pub fn new(circuit: &'c Circuit, direction: Direction) -> Self {
        Self {
            circuit,
            cursor: 0,
            direction,
            permutation: circuit.initial_layout().clone(),
        }
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.cursor >= self.circuit.len()
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The next operation, if any
    pub fn peek(&self) -> Option<&Operation> {
        self.circuit.get(self.cursor)
    }

    /// Elide any uncontrolled SWAPs at the cursor into the permutation
    pub fn apply_swap_operations(&mut self) {
        while let Some(op) = self.peek() {
            if op.gate() == Gate::Swap && op.controls().is_empty() && op.is_unitary() {
                let a = op.targets()[0].index();
                let b = op.targets()[1].index();
                self.permutation.swap_wires(a, b);
                self.cursor += 1;
            } else {
                break;
            }
        }
    }

    /// Build the matrix DD for the next gate and move the cursor past it
    ///
    /// Trailing measurements and barriers are consumed silently;
    /// uncontrolled SWAPs fold into the permutation. Returns `None`
    /// once the circuit is exhausted. For a [`Direction::Reverse`]
    /// manager the inverse gate's diagram is built.
    pub fn next_op_dd(&mut self, pkg: &mut Package) -> Result<Option<MatrixDD>, CheckError> {
        while let Some(op) = self.circuit.get(self.cursor) {
            self.cursor += 1;
            match op.gate() {
                Gate::Measure | Gate::Barrier => continue,
                Gate::Swap if op.controls().is_empty() => {
                    let a = op.targets()[0].index();
                    let b = op.targets()[1].index();
                    self.permutation.swap_wires(a, b);
                    continue;
                }
                _ => {
                    if op.is_classically_controlled() {
                        return Err(CheckError::InvalidGate(format!(
                            "classically controlled operation '{}' in a static circuit",
                            op
                        )));
                    }
                    let inverted = self.direction == Direction::Reverse;
                    let dd = pkg.operation_dd(op, &self.permutation, inverted)?;
                    return Ok(Some(dd));
                }
            }
        }
        Ok(None)
    }

    /// Apply up to `steps` gates of this circuit to `state`
    ///
    /// Each application follows the reference discipline: the new
    /// diagram is referenced before the old one is released, then dead
    /// nodes may be collected and the node limit is polled.
    pub fn advance<F: DdFunction>(
        &mut self,
        pkg: &mut Package,
        state: &mut F,
        steps: usize,
    ) -> Result<(), CheckError> {
        for _ in 0..steps {
            if self.finished() {
                break;
            }
            let dd = match self.next_op_dd(pkg)? {
                Some(dd) => dd,
                None => break,
            };
            self.apply(pkg, state, dd)?;
        }
        Ok(())
    }

    fn apply<F: DdFunction>(
        &self,
        pkg: &mut Package,
        state: &mut F,
        op: MatrixDD,
    ) -> Result<(), CheckError> {
        let saved = *state;
        *state = match self.direction {
            Direction::Forward => F::apply_left(pkg, op, saved),
            Direction::Reverse => F::apply_right(pkg, saved, op),
        };
        F::inc_ref(pkg, *state);
        F::dec_ref(pkg, saved);
        pkg.garbage_collect(false);
        pkg.check_node_limit()?;
        Ok(())
    }

    /// Rearrange the diagram's levels until this side's wires sit at `goal`
    ///
    /// Used after the gate walk to realize the circuit's output
    /// permutation: each out-of-place wire is fixed with one SWAP
    /// diagram, applied per this manager's direction.
    pub fn change_permutation<F: DdFunction>(
        &mut self,
        pkg: &mut Package,
        state: &mut F,
        goal: &Permutation,
    ) -> Result<(), CheckError> {
        let n = self.permutation.len();
        for i in 0..n {
            if self.permutation[i] == goal[i] {
                continue;
            }
            let j = (i + 1..n)
                .find(|&j| self.permutation[j] == goal[i])
                .expect("goal is a permutation of the same levels");
            let swap = pkg.swap_dd(self.permutation[i], self.permutation[j]);
            self.apply(pkg, state, swap)?;
            self.permutation.swap_wires(i, j);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqcheck_dd::VectorDD;

    #[test]
    fn test_swap_elision() {
        let mut circuit = Circuit::new(2);
        circuit.swap(0, 1);
        circuit.x(0);

        let mut tm = TaskManager::new(&circuit, Direction::Forward);
        tm.apply_swap_operations();
        assert_eq!(tm.permutation()[0], 1);
        assert!(!tm.finished());

        // The X on wire 0 now lands on level 1.
        let mut pkg = Package::new(2);
        let dd = tm.next_op_dd(&mut pkg).unwrap().unwrap();
        let x_level1 = pkg.gate_dd(&eqcheck_core::gate::PAULI_X, 1, &[]);
        assert!(dd.same_node(&x_level1));
        assert!(tm.finished());
    }

    #[test]
    fn test_skips_measurements_and_barriers() {
        let mut circuit = Circuit::with_bits(1, 1);
        circuit.x(0);
        circuit.measure(0, 0);

        let mut pkg = Package::new(1);
        let mut tm = TaskManager::new(&circuit, Direction::Forward);
        assert!(tm.next_op_dd(&mut pkg).unwrap().is_some());
        assert!(tm.next_op_dd(&mut pkg).unwrap().is_none());
        assert!(tm.finished());
    }

    #[test]
    fn test_advance_applies_gates() {
        let mut circuit = Circuit::new(1);
        circuit.x(0);

        let mut pkg = Package::new(1);
        let mut tm = TaskManager::new(&circuit, Direction::Forward);
        let mut state: VectorDD = pkg.zero_state();
        pkg.inc_ref_v(state);
        tm.advance(&mut pkg, &mut state, 1).unwrap();

        let one = pkg.basis_state(&[true]);
        let overlap = pkg.inner_product(one, state);
        assert!((overlap.re - 1.0).abs() < 1e-12);
        pkg.dec_ref_v(state);
    }

    #[test]
    fn test_reverse_applies_inverse_from_right() {
        let mut circuit = Circuit::new(1);
        circuit.s(0);

        let mut pkg = Package::new(1);
        let mut tm = TaskManager::new(&circuit, Direction::Reverse);
        // Start from S; applying S's inverse from the right cancels it.
        let mut state: MatrixDD = pkg.gate_dd(&eqcheck_core::gate::S_GATE, 0, &[]);
        pkg.inc_ref_m(state);
        tm.advance(&mut pkg, &mut state, 1).unwrap();
        assert!(pkg.is_close_to_identity(state, 1e-10));
        pkg.dec_ref_m(state);
    }

    #[test]
    fn test_change_permutation_restores_identity() {
        let mut circuit = Circuit::new(2);
        circuit.swap(0, 1);

        let mut pkg = Package::new(2);
        let mut tm = TaskManager::new(&circuit, Direction::Forward);
        let mut state: MatrixDD = pkg.identity();
        pkg.inc_ref_m(state);

        tm.apply_swap_operations();
        assert!(tm.finished());

        // Undoing the elided SWAP multiplies a real SWAP diagram in.
        let goal = Permutation::identity(2);
        tm.change_permutation(&mut pkg, &mut state, &goal).unwrap();
        let swap = pkg.swap_dd(0, 1);
        assert!(state.same_node(&swap));
        pkg.dec_ref_m(state);
    }
}
