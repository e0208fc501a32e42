//! Configuration for equivalence checking runs

use crate::application_scheme::{ApplicationSchemeType, CostFunction};
use crate::error::CheckError;
use serde::Serialize;
use std::path::PathBuf;

/// The state distribution the simulation checker samples from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    /// Uniformly random computational basis states
    ComputationalBasis,
    /// Products of random single-qubit basis states (the six cardinal
    /// states of the Bloch sphere)
    Random1QBasis,
    /// Random stabilizer states
    Stabilizer,
}

/// Which checkers run and the global resource bounds
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionOptions {
    pub run_alternating_checker: bool,
    pub run_construction_checker: bool,
    pub run_simulation_checker: bool,
    /// Abort a checker once its package holds more live nodes than this
    pub node_limit: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            run_alternating_checker: true,
            run_construction_checker: false,
            run_simulation_checker: true,
            node_limit: None,
        }
    }
}

/// Circuit rewrites applied before any checker runs
#[derive(Clone, Debug, Default, Serialize)]
pub struct OptimizationOptions {
    /// Rewrite dynamic circuits via deferred measurement
    pub transform_dynamic_circuit: bool,
    /// Drop diagonal gates that sit directly before measurements
    pub remove_diagonal_gates_before_measure: bool,
    /// Mark wires with conflicting output assignments as garbage
    pub fix_output_permutation_mismatch: bool,
}

/// Application scheme selection per checker kind
#[derive(Clone, Debug, Serialize)]
pub struct ApplicationOptions {
    pub alternating_scheme: ApplicationSchemeType,
    pub construction_scheme: ApplicationSchemeType,
    pub simulation_scheme: ApplicationSchemeType,
    /// Cost-profile file for the gate-cost scheme
    pub profile_location: Option<PathBuf>,
    /// In-process cost function; the built-in default applies when the
    /// gate-cost scheme runs without a profile and without this.
    #[serde(skip)]
    pub cost_function: Option<CostFunction>,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            alternating_scheme: ApplicationSchemeType::Proportional,
            construction_scheme: ApplicationSchemeType::Proportional,
            simulation_scheme: ApplicationSchemeType::Proportional,
            profile_location: None,
            cost_function: None,
        }
    }
}

/// Tolerances for the functionality (matrix) checkers
#[derive(Clone, Debug, Serialize)]
pub struct FunctionalityOptions {
    /// Closeness-to-identity tolerance; zero demands exact identity
    pub trace_threshold: f64,
}

impl Default for FunctionalityOptions {
    fn default() -> Self {
        Self {
            trace_threshold: 1e-8,
        }
    }
}

/// Options for the simulation checker
#[derive(Clone, Debug, Serialize)]
pub struct SimulationOptions {
    /// Inner-product tolerance for state comparison
    pub fidelity_threshold: f64,
    pub state_type: StateType,
    /// Seed for the initial-state generator; entropy-seeded if absent
    pub seed: Option<u64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            fidelity_threshold: 1e-8,
            state_type: StateType::ComputationalBasis,
            seed: None,
        }
    }
}

/// Full configuration of an equivalence checking run
#[derive(Clone, Debug, Default, Serialize)]
pub struct Configuration {
    pub execution: ExecutionOptions,
    pub optimizations: OptimizationOptions,
    pub application: ApplicationOptions,
    pub functionality: FunctionalityOptions,
    pub simulation: SimulationOptions,
}

impl Configuration {
    /// Check value ranges before a run
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.functionality.trace_threshold < 0.0 || !self.functionality.trace_threshold.is_finite()
        {
            return Err(CheckError::InvalidConfiguration(format!(
                "trace threshold must be a non-negative finite value, got {}",
                self.functionality.trace_threshold
            )));
        }
        if self.simulation.fidelity_threshold < 0.0
            || !self.simulation.fidelity_threshold.is_finite()
        {
            return Err(CheckError::InvalidConfiguration(format!(
                "fidelity threshold must be a non-negative finite value, got {}",
                self.simulation.fidelity_threshold
            )));
        }
        if self.execution.node_limit == Some(0) {
            return Err(CheckError::InvalidConfiguration(
                "node limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert!(config.execution.run_alternating_checker);
        assert!(config.execution.run_simulation_checker);
        assert!(!config.execution.run_construction_checker);
        assert_eq!(
            config.application.alternating_scheme,
            ApplicationSchemeType::Proportional
        );
        assert_eq!(config.functionality.trace_threshold, 1e-8);
        assert_eq!(config.simulation.fidelity_threshold, 1e-8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut config = Configuration::default();
        config.functionality.trace_threshold = -1.0;
        assert!(matches!(
            config.validate(),
            Err(CheckError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_serializes_without_cost_function() {
        let mut config = Configuration::default();
        config.application.cost_function = Some(crate::application_scheme::default_cost_function);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("proportional"));
        assert!(!json.contains("cost_function"));
    }
}
