//! Simulation equivalence checker
//!
//! Runs both circuits on the same randomly drawn initial state and
//! compares the resulting state vectors. A mismatch is a proof of
//! non-equivalence; a match is only evidence, which the manager reports
//! as "probably equivalent".

use crate::alternating::reduce;
use crate::application_scheme::ApplicationScheme;
use crate::checker::run_checking_loop;
use crate::configuration::Configuration;
use crate::dd_function::DdFunction;
use crate::equivalence::{CheckResult, CheckerKind, EquivalenceCriterion};
use crate::error::CheckError;
use crate::state_generator::StateGenerator;
use crate::task_manager::{Direction, TaskManager};
use eqcheck_core::Circuit;
use eqcheck_dd::{Package, VectorDD};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

pub(crate) struct SimulationChecker<'a> {
    circ1: &'a Circuit,
    circ2: &'a Circuit,
    config: &'a Configuration,
    done: &'a AtomicBool,
}

impl<'a> SimulationChecker<'a> {
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

        let n = self.circ1.num_qubits();
        let mut pkg = match self.config.execution.node_limit {
            Some(limit) => Package::with_node_limit(n, limit),
            None => Package::new(n),
        };

        let mut generator = StateGenerator::new(self.config.simulation.seed);
        let initial = generator.generate(
            &mut pkg,
            self.config.simulation.state_type,
            self.circ1.ancillary(),
        );

        let mut state1: VectorDD = initial;
        let mut state2: VectorDD = initial;
        pkg.inc_ref_v(state1);
        pkg.inc_ref_v(state2);

        let scheme = ApplicationScheme::build(
            self.config.application.simulation_scheme,
            self.circ1,
            self.circ2,
            &self.config.application,
            "simulation",
        )?;

        let mut tm1 = TaskManager::new(self.circ1, Direction::Forward);
        let mut tm2 = TaskManager::new(self.circ2, Direction::Forward);
        let completed = run_checking_loop(
            &mut pkg,
            &scheme,
            &mut tm1,
            &mut tm2,
            &mut state1,
            Some(&mut state2),
            self.done,
        )?;

        let criterion = if completed {
            tm1.change_permutation(&mut pkg, &mut state1, self.circ1.output_permutation())?;
            tm2.change_permutation(&mut pkg, &mut state2, self.circ2.output_permutation())?;
            state1 = reduce(&mut pkg, state1, self.circ1);
            state2 = reduce(&mut pkg, state2, self.circ2);
            VectorDD::equals(
                &mut pkg,
                state1,
                state2,
                self.config.simulation.fidelity_threshold,
            )
        } else {
            EquivalenceCriterion::NoInformation
        };

        pkg.dec_ref_v(state1);
        pkg.dec_ref_v(state2);
        Ok(CheckResult {
            checker: CheckerKind::Simulation,
            criterion,
            runtime_seconds: start.elapsed().as_secs_f64(),
            max_active_nodes: pkg.max_active_vector_nodes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::StateType;

    fn check(circ1: &Circuit, circ2: &Circuit, config: &Configuration) -> EquivalenceCriterion {
        let done = AtomicBool::new(false);
        SimulationChecker::new(circ1, circ2, config, &done)
            .run()
            .unwrap()
            .criterion
    }

    #[test]
    fn test_equivalent_circuits() {
        let mut c1 = Circuit::new(2);
        c1.h(0);
        c1.cx(0, 1);
        let mut c2 = Circuit::new(2);
        c2.h(0);
        c2.h(1);
        c2.cz(0, 1);
        c2.h(1);
        let mut config = Configuration::default();
        config.simulation.seed = Some(11);
        assert_eq!(check(&c1, &c2, &config), EquivalenceCriterion::Equivalent);
    }

    #[test]
    fn test_distinguishes_x_from_z() {
        // X flips any computational basis state, Z never does, so the
        // outcome is the same for every seed.
        let mut c1 = Circuit::new(1);
        c1.x(0);
        let mut c2 = Circuit::new(1);
        c2.z(0);
        let mut config = Configuration::default();
        config.simulation.seed = Some(1);
        assert_eq!(
            check(&c1, &c2, &config),
            EquivalenceCriterion::NotEquivalent
        );
    }

    #[test]
    fn test_richer_state_types_accept_equal_unitaries() {
        let mut c1 = Circuit::new(2);
        c1.cx(0, 1);
        let mut c2 = Circuit::new(2);
        c2.h(1);
        c2.cz(0, 1);
        c2.h(1);
        for state_type in [StateType::Random1QBasis, StateType::Stabilizer] {
            let mut config = Configuration::default();
            config.simulation.state_type = state_type;
            config.simulation.seed = Some(5);
            assert!(check(&c1, &c2, &config).considered_equivalent());
        }
    }

    #[test]
    fn test_cancelled_run_gives_no_information() {
        let mut c1 = Circuit::new(1);
        c1.x(0);
        let mut c2 = Circuit::new(1);
        c2.x(0);
        let config = Configuration::default();
        let done = AtomicBool::new(true);
        let result = SimulationChecker::new(&c1, &c2, &config, &done)
            .run()
            .unwrap();
        assert_eq!(result.criterion, EquivalenceCriterion::NoInformation);
    }
}
