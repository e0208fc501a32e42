//! Orchestration of a full equivalence checking run

use crate::alternating::AlternatingChecker;
use crate::configuration::Configuration;
use crate::construction::ConstructionChecker;
use crate::equivalence::{
    CheckResult, CheckerKind, EquivalenceCheckingResults, EquivalenceCriterion,
};
use crate::error::CheckError;
use crate::simulation::SimulationChecker;
use eqcheck_core::passes;
use eqcheck_core::Circuit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Runs the configured checkers over a pair of circuits
///
/// Construction preprocesses both circuits once (dynamic-circuit
/// transformation, optional rewrites, width padding); [`run`] may then
/// be called to execute the checkers and aggregate their verdicts.
///
/// [`run`]: EquivalenceCheckingManager::run
///
/// # Example
/// ```
/// use eqcheck::{Configuration, EquivalenceCheckingManager};
/// use eqcheck_core::Circuit;
///
/// let mut circ1 = Circuit::new(2);
/// circ1.cx(0, 1);
/// let mut circ2 = Circuit::new(2);
/// circ2.h(1);
/// circ2.cz(0, 1);
/// circ2.h(1);
///
/// let manager =
///     EquivalenceCheckingManager::new(circ1, circ2, Configuration::default()).unwrap();
/// let results = manager.run().unwrap();
/// assert!(results.considered_equivalent());
/// ```
#[derive(Debug)]
pub struct EquivalenceCheckingManager {
    circ1: Circuit,
    circ2: Circuit,
    config: Configuration,
    preprocessing_seconds: f64,
    done: Arc<AtomicBool>,
}

impl EquivalenceCheckingManager {
    /// Validate the configuration and preprocess the circuits
    ///
    /// # Errors
    /// Fails with [`CheckError::DynamicCircuitUnsupported`] when a
    /// circuit uses mid-circuit measurement, reset or classical control
    /// and the dynamic-circuit transformation is disabled, and with
    /// [`CheckError::InvalidConfiguration`] for out-of-range settings.
    pub fn new(
        mut circ1: Circuit,
        mut circ2: Circuit,
        config: Configuration,
    ) -> Result<Self, CheckError> {
        config.validate()?;
        let start = Instant::now();

        for circ in [&mut circ1, &mut circ2] {
            if circ.is_dynamic() {
                if !config.optimizations.transform_dynamic_circuit {
                    return Err(CheckError::DynamicCircuitUnsupported);
                }
                *circ = passes::transform_dynamic_circuit(circ)?;
            }
        }

        if config.optimizations.remove_diagonal_gates_before_measure {
            passes::remove_diagonal_gates_before_measure(&mut circ1);
            passes::remove_diagonal_gates_before_measure(&mut circ2);
        }
        if config.optimizations.fix_output_permutation_mismatch {
            passes::fix_output_permutation_mismatch(&mut circ1, &mut circ2);
        }

        let width = circ1.num_qubits().max(circ2.num_qubits());
        circ1 = passes::pad_to_width(&circ1, width)?;
        circ2 = passes::pad_to_width(&circ2, width)?;

        // The checkers treat ancillary and garbage sets symmetrically,
        // so both circuits carry the union.
        for q in 0..width {
            if circ1.ancillary()[q] || circ2.ancillary()[q] {
                circ1.set_ancillary(q);
                circ2.set_ancillary(q);
            }
            if circ1.garbage()[q] || circ2.garbage()[q] {
                circ1.set_garbage(q);
                circ2.set_garbage(q);
            }
        }

        Ok(Self {
            circ1,
            circ2,
            config,
            preprocessing_seconds: start.elapsed().as_secs_f64(),
            done: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The circuits as the checkers will see them
    pub fn circuits(&self) -> (&Circuit, &Circuit) {
        (&self.circ1, &self.circ2)
    }

    /// Handle for cancelling a running check from another thread
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.done)
    }

    /// Request that any in-flight checkers stop at the next gate
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }

    /// Execute the enabled checkers and aggregate their verdicts
    ///
    /// Checkers run in order of expected cost: alternating, then
    /// simulation, then construction. A conclusive verdict from a
    /// functionality checker, or a proven difference from any checker,
    /// stops the remaining ones via the shared cancellation flag.
    pub fn run(&self) -> Result<EquivalenceCheckingResults, CheckError> {
        let mut overall = EquivalenceCriterion::NoInformation;
        let mut checks: Vec<CheckResult> = Vec::new();

        let mut record = |result: CheckResult,
                          overall: &mut EquivalenceCriterion,
                          done: &AtomicBool| {
            match result.criterion {
                EquivalenceCriterion::NotEquivalent => {
                    *overall = EquivalenceCriterion::NotEquivalent;
                    done.store(true, Ordering::Relaxed);
                }
                EquivalenceCriterion::Equivalent
                | EquivalenceCriterion::EquivalentUpToPhase
                | EquivalenceCriterion::EquivalentUpToGlobalPhase => {
                    if result.checker == CheckerKind::Simulation {
                        // Simulation agreement is evidence, not proof.
                        if *overall == EquivalenceCriterion::NoInformation {
                            *overall = EquivalenceCriterion::ProbablyEquivalent;
                        }
                    } else {
                        *overall = result.criterion;
                        done.store(true, Ordering::Relaxed);
                    }
                }
                EquivalenceCriterion::ProbablyEquivalent => {
                    if *overall == EquivalenceCriterion::NoInformation {
                        *overall = EquivalenceCriterion::ProbablyEquivalent;
                    }
                }
                EquivalenceCriterion::NoInformation => {}
            }
            checks.push(result);
        };

        if self.config.execution.run_alternating_checker {
            let result =
                AlternatingChecker::new(&self.circ1, &self.circ2, &self.config, &self.done).run()?;
            record(result, &mut overall, &self.done);
        }
        if self.config.execution.run_simulation_checker && !self.done.load(Ordering::Relaxed) {
            let result =
                SimulationChecker::new(&self.circ1, &self.circ2, &self.config, &self.done).run()?;
            record(result, &mut overall, &self.done);
        }
        if self.config.execution.run_construction_checker && !self.done.load(Ordering::Relaxed) {
            let result =
                ConstructionChecker::new(&self.circ1, &self.circ2, &self.config, &self.done)
                    .run()?;
            record(result, &mut overall, &self.done);
        }

        Ok(EquivalenceCheckingResults::new(
            overall,
            self.preprocessing_seconds,
            checks,
        ))
    }
}
