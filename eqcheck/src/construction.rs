//! Construction equivalence checker
//!
//! Builds each circuit's full functionality as its own matrix diagram
//! and compares the two at the end. More memory-hungry than the
//! alternating strategy, but its intermediate diagrams are independent
//! of how well the circuits' gate structures line up.

use crate::alternating::reduce;
use crate::application_scheme::ApplicationScheme;
use crate::checker::run_checking_loop;
use crate::configuration::Configuration;
use crate::dd_function::DdFunction;
use crate::equivalence::{CheckResult, CheckerKind, EquivalenceCriterion};
use crate::error::CheckError;
use crate::task_manager::{Direction, TaskManager};
use eqcheck_core::Circuit;
use eqcheck_dd::{MatrixDD, Package};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

pub(crate) struct ConstructionChecker<'a> {
    circ1: &'a Circuit,
    circ2: &'a Circuit,
    config: &'a Configuration,
    done: &'a AtomicBool,
}

impl<'a> ConstructionChecker<'a> {
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

        let scheme = ApplicationScheme::build(
            self.config.application.construction_scheme,
            self.circ1,
            self.circ2,
            &self.config.application,
            "construction",
        )?;

        let mut tm1 = TaskManager::new(self.circ1, Direction::Forward);
        let mut tm2 = TaskManager::new(self.circ2, Direction::Forward);
        let mut state1: MatrixDD = pkg.identity();
        let mut state2: MatrixDD = state1;
        pkg.inc_ref_m(state1);
        pkg.inc_ref_m(state2);

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
            MatrixDD::equals(
                &mut pkg,
                state1,
                state2,
                self.config.functionality.trace_threshold,
            )
        } else {
            EquivalenceCriterion::NoInformation
        };

        pkg.dec_ref_m(state1);
        pkg.dec_ref_m(state2);
        Ok(CheckResult {
            checker: CheckerKind::Construction,
            criterion,
            runtime_seconds: start.elapsed().as_secs_f64(),
            max_active_nodes: pkg.max_active_matrix_nodes(),
        })
    }
}
