//! Equivalence checking of quantum circuits with decision diagrams
//!
//! Decides whether two circuits implement the same unitary. Three
//! complementary strategies are available:
//!
//! - **Alternating**: keeps a single diagram for U1 · U2† and applies
//!   gates from both circuits so it stays near the identity.
//! - **Construction**: builds both functionalities separately and
//!   compares them.
//! - **Simulation**: runs both circuits on random initial states; fast
//!   at finding counterexamples but only ever yields "probably
//!   equivalent".
//!
//! [`EquivalenceCheckingManager`] preprocesses a circuit pair and runs
//! the configured checkers:
//!
//! ```
//! use eqcheck::{Configuration, EquivalenceCheckingManager, EquivalenceCriterion};
//! use eqcheck_core::Circuit;
//!
//! let mut circ1 = Circuit::new(2);
//! circ1.swap(0, 1);
//! let mut circ2 = Circuit::new(2);
//! circ2.cx(0, 1);
//! circ2.cx(1, 0);
//! circ2.cx(0, 1);
//!
//! let manager =
//!     EquivalenceCheckingManager::new(circ1, circ2, Configuration::default()).unwrap();
//! let results = manager.run().unwrap();
//! assert_eq!(results.equivalence(), EquivalenceCriterion::Equivalent);
//! ```

mod alternating;
mod application_scheme;
mod checker;
mod configuration;
mod construction;
mod dd_function;
mod equivalence;
mod error;
mod manager;
mod simulation;
mod state_generator;
mod task_manager;

pub use application_scheme::{default_cost_function, ApplicationSchemeType, CostFunction};
pub use configuration::{
    ApplicationOptions, Configuration, ExecutionOptions, FunctionalityOptions,
    OptimizationOptions, SimulationOptions, StateType,
};
pub use equivalence::{
    CheckResult, CheckerKind, EquivalenceCheckingResults, EquivalenceCriterion,
};
pub use error::CheckError;
pub use manager::EquivalenceCheckingManager;

/// Convenience alias for fallible checking operations
pub type Result<T> = std::result::Result<T, CheckError>;
