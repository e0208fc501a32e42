//! Alternating equivalence checker
//!
//! Keeps one running diagram G, initialized to the identity. Gates of
//! circuit 1 multiply onto G from the left while inverted gates of
//! circuit 2 multiply from the right, so G tracks U1 · U2† as both
//! cursors move forward. When the circuits agree, G never strays far
//! from the identity and stays small.

use crate::application_scheme::{ApplicationScheme, ApplicationSchemeType, LookaheadScheme};
use crate::checker::run_checking_loop;
use crate::configuration::Configuration;
use crate::dd_function::DdFunction;
use crate::equivalence::{CheckResult, CheckerKind, EquivalenceCriterion};
use crate::error::CheckError;
use crate::task_manager::{Direction, TaskManager};
use eqcheck_core::Circuit;
use eqcheck_dd::{MatrixDD, Package, TOLERANCE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub(crate) struct AlternatingChecker<'a> {
    circ1: &'a Circuit,
    circ2: &'a Circuit,
    config: &'a Configuration,
    done: &'a AtomicBool,
}

impl<'a> AlternatingChecker<'a> {
    pub(crate) fn new(
        circ1: &'a Circuit,
        circ2: &'a Circuit,
        config: &'a Configuration,
        done: &'a AtomicBool,
    ) -> Self {
        Self {
            circ1,
            circ2,
            config,
            done,
        }
    }

    pub(crate) fn run(&self) -> Result<CheckResult, CheckError> {
        let start = Instant::now();

        if gates_are_identical(self.circ1, self.circ2) {
            return Ok(CheckResult {
                checker: CheckerKind::Alternating,
                criterion: EquivalenceCriterion::Equivalent,
                runtime_seconds: start.elapsed().as_secs_f64(),
                max_active_nodes: 0,
            });
        }

        let n = self.circ1.num_qubits();
        let mut pkg = match self.config.execution.node_limit {
            Some(limit) => Package::with_node_limit(n, limit),
            None => Package::new(n),
        };

        let mut tm1 = TaskManager::new(self.circ1, Direction::Forward);
        let mut tm2 = TaskManager::new(self.circ2, Direction::Reverse);
        let mut state = pkg.identity();
        pkg.inc_ref_m(state);

        let completed = match self.config.application.alternating_scheme {
            ApplicationSchemeType::Lookahead => {
                self.run_lookahead(&mut pkg, &mut tm1, &mut tm2, &mut state)?
            }
            kind => {
                let scheme = ApplicationScheme::build(
                    kind,
                    self.circ1,
                    self.circ2,
                    &self.config.application,
                    "alternating",
                )?;
                run_checking_loop(
                    &mut pkg,
                    &scheme,
                    &mut tm1,
                    &mut tm2,
                    &mut state,
                    None,
                    self.done,
                )?
            }
        };

        let criterion = if completed {
            tm1.change_permutation(&mut pkg, &mut state, self.circ1.output_permutation())?;
            tm2.change_permutation(&mut pkg, &mut state, self.circ2.output_permutation())?;
            state = reduce(&mut pkg, state, self.circ1);
            self.verdict(&mut pkg, state)
        } else {
            EquivalenceCriterion::NoInformation
        };

        pkg.dec_ref_m(state);
        Ok(CheckResult {
            checker: CheckerKind::Alternating,
            criterion,
            runtime_seconds: start.elapsed().as_secs_f64(),
            max_active_nodes: pkg.max_active_matrix_nodes(),
        })
    }

    fn run_lookahead(
        &self,
        pkg: &mut Package,
        tm1: &mut TaskManager<'_>,
        tm2: &mut TaskManager<'_>,
        state: &mut MatrixDD,
    ) -> Result<bool, CheckError> {
        let mut scheme = LookaheadScheme::new();
        scheme.init();
        loop {
            if self.done.load(Ordering::Relaxed) {
                scheme.teardown(pkg);
                return Ok(false);
            }
            tm1.apply_swap_operations();
            tm2.apply_swap_operations();
            if tm1.finished() && tm2.finished() && scheme.is_drained() {
                return Ok(true);
            }
            if let Err(e) = scheme.step(pkg, tm1, tm2, state) {
                scheme.teardown(pkg);
                return Err(e);
            }
        }
    }

    /// Compare the reduced running diagram against the goal diagram
    ///
    /// The goal is the identity put through the same ancillary and
    /// garbage reductions as the running diagram. Without any marked
    /// qubits it is the plain identity and the check degenerates to
    /// closeness-to-identity of the running diagram itself.
    fn verdict(&self, pkg: &mut Package, state: MatrixDD) -> EquivalenceCriterion {
        let ident = pkg.identity();
        pkg.inc_ref_m(ident);
        let goal = reduce(pkg, ident, self.circ1);

        let goal_ct = pkg.conjugate_transpose(goal);
        let g = pkg.multiply_mm(state, goal_ct);
        let criterion =
            if pkg.is_close_to_identity(g, self.config.functionality.trace_threshold) {
                if (state.weight() - goal.weight()).norm() <= TOLERANCE {
                    EquivalenceCriterion::Equivalent
                } else {
                    EquivalenceCriterion::EquivalentUpToGlobalPhase
                }
            } else {
                EquivalenceCriterion::NotEquivalent
            };
        pkg.dec_ref_m(goal);
        criterion
    }
}

/// Reduce ancillary inputs and garbage outputs, keeping the running
/// diagram referenced across each rewrite
pub(crate) fn reduce<F: DdFunction>(pkg: &mut Package, state: F, circuit: &Circuit) -> F {
    let reduced = F::reduce_ancillae(pkg, state, circuit.ancillary());
    F::inc_ref(pkg, reduced);
    F::dec_ref(pkg, state);

    let garbage = circuit.garbage();
    let summed = F::reduce_garbage(pkg, reduced, garbage);
    F::inc_ref(pkg, summed);
    F::dec_ref(pkg, reduced);
    summed
}

/// Shortcut for byte-identical gate lists
fn gates_are_identical(circ1: &Circuit, circ2: &Circuit) -> bool {
    circ1.num_qubits() == circ2.num_qubits()
        && circ1.len() == circ2.len()
        && circ1.operations().zip(circ2.operations()).all(|(a, b)| a == b)
        && circ1.initial_layout() == circ2.initial_layout()
        && circ1.output_permutation() == circ2.output_permutation()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(circ1: &Circuit, circ2: &Circuit, config: &Configuration) -> EquivalenceCriterion {
        let done = AtomicBool::new(false);
        AlternatingChecker::new(circ1, circ2, config, &done)
            .run()
            .unwrap()
            .criterion
    }

    #[test]
    fn test_identical_circuits_shortcut() {
        let mut c1 = Circuit::new(1);
        c1.h(0);
        let c2 = c1.clone();
        let config = Configuration::default();
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_cx_vs_hczh() {
        let mut c1 = Circuit::new(2);
        c1.cx(0, 1);
        let mut c2 = Circuit::new(2);
        c2.h(1);
        c2.cz(0, 1);
        c2.h(1);
        let config = Configuration::default();
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_global_phase() {
        // ZX = -XZ on one qubit.
        let mut c1 = Circuit::new(1);
        c1.z(0);
        c1.x(0);
        let mut c2 = Circuit::new(1);
        c2.x(0);
        c2.z(0);
        let config = Configuration::default();
        assert_eq!(
            check(&c1, &c2, &config),
            EquivalenceCriterion::EquivalentUpToGlobalPhase
        );
    }

    #[test]
    fn test_not_equivalent() {
        let mut c1 = Circuit::new(1);
        c1.x(0);
        let mut c2 = Circuit::new(1);
        c2.z(0);
        let config = Configuration::default();
        assert_eq!(
            check(&c1, &c2, &config),
            EquivalenceCriterion::NotEquivalent
        );
    }

    #[test]
    fn test_lookahead_scheme() {
        let mut c1 = Circuit::new(2);
        c1.cx(0, 1);
        let mut c2 = Circuit::new(2);
        c2.h(1);
        c2.cz(0, 1);
        c2.h(1);
        let mut config = Configuration::default();
        config.application.alternating_scheme = ApplicationSchemeType::Lookahead;
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_swap_vs_three_cnots() {
        let mut c1 = Circuit::new(2);
        c1.swap(0, 1);
        let mut c2 = Circuit::new(2);
        c2.cx(0, 1);
        c2.cx(1, 0);
        c2.cx(0, 1);
        let config = Configuration::default();
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_garbage_output_is_ignored() {
        // X on a wire whose output is never read cannot be observed.
        let mut c1 = Circuit::new(2);
        c1.x(0);
        c1.set_garbage(0);
        let mut c2 = Circuit::new(2);
        c2.set_garbage(0);
        let config = Configuration::default();
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_garbage_input_still_counts() {
        // The control wire's output is unread, but the observed target
        // still computes the XOR of both inputs.
        let mut c1 = Circuit::new(2);
        c1.cx(0, 1);
        c1.set_garbage(0);
        let mut c2 = Circuit::new(2);
        c2.set_garbage(0);
        let config = Configuration::default();
        assert_eq!(
            check(&c1, &c2, &config),
            EquivalenceCriterion::NotEquivalent
        );
    }

    #[test]
    fn test_cancelled_run_gives_no_information() {
        let mut c1 = Circuit::new(1);
        c1.x(0);
        let c2 = Circuit::new(1);
        let config = Configuration::default();
        let done = AtomicBool::new(true);
        let result = AlternatingChecker::new(&c1, &c2, &config, &done)
            .run()
            .unwrap();
        assert_eq!(result.criterion, EquivalenceCriterion::NoInformation);
    }
}
