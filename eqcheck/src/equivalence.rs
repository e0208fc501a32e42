//! Verdicts and result reporting

use serde::Serialize;
use std::fmt;

/// The possible outcomes of an equivalence check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceCriterion {
    /// No checker produced a usable answer
    NoInformation,
    /// The circuits implement different functionality
    NotEquivalent,
    /// The circuits implement exactly the same functionality
    Equivalent,
    /// Output states match up to individual relative phases
    EquivalentUpToPhase,
    /// The unitaries differ only by a global phase factor
    EquivalentUpToGlobalPhase,
    /// Simulation evidence only; no functional proof
    ProbablyEquivalent,
}

impl EquivalenceCriterion {
    /// Whether this verdict counts as "the circuits agree"
    ///
    /// Phase-only differences and simulation-level evidence all count;
    /// only a proven difference or a missing answer do not.
    pub fn considered_equivalent(&self) -> bool {
        matches!(
            self,
            EquivalenceCriterion::Equivalent
                | EquivalenceCriterion::EquivalentUpToPhase
                | EquivalenceCriterion::EquivalentUpToGlobalPhase
                | EquivalenceCriterion::ProbablyEquivalent
        )
    }
}

impl fmt::Display for EquivalenceCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EquivalenceCriterion::NoInformation => "no information",
            EquivalenceCriterion::NotEquivalent => "not equivalent",
            EquivalenceCriterion::Equivalent => "equivalent",
            EquivalenceCriterion::EquivalentUpToPhase => "equivalent up to phase",
            EquivalenceCriterion::EquivalentUpToGlobalPhase => "equivalent up to global phase",
            EquivalenceCriterion::ProbablyEquivalent => "probably equivalent",
        };
        write!(f, "{}", s)
    }
}

/// Which checker produced a result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerKind {
    Alternating,
    Construction,
    Simulation,
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckerKind::Alternating => "alternating",
            CheckerKind::Construction => "construction",
            CheckerKind::Simulation => "simulation",
        };
        write!(f, "{}", s)
    }
}

/// Result of one checker run
#[derive(Clone, Debug, Serialize)]
pub struct CheckResult {
    pub checker: CheckerKind,
    pub criterion: EquivalenceCriterion,
    /// Wall-clock time of the run in seconds
    pub runtime_seconds: f64,
    /// High-water mark of simultaneously referenced DD nodes
    pub max_active_nodes: usize,
}

/// Aggregated report of a full equivalence checking run
#[derive(Clone, Debug, Serialize)]
pub struct EquivalenceCheckingResults {
    criterion: EquivalenceCriterion,
    preprocessing_seconds: f64,
    checks: Vec<CheckResult>,
}

impl EquivalenceCheckingResults {
    pub(crate) fn new(
        criterion: EquivalenceCriterion,
        preprocessing_seconds: f64,
        checks: Vec<CheckResult>,
    ) -> Self {
        Self {
            criterion,
            preprocessing_seconds,
            checks,
        }
    }

    /// The overall verdict
    pub fn equivalence(&self) -> EquivalenceCriterion {
        self.criterion
    }

    /// Whether the overall verdict counts as "the circuits agree"
    pub fn considered_equivalent(&self) -> bool {
        self.criterion.considered_equivalent()
    }

    /// Per-checker results, in execution order
    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    /// Time spent preprocessing the circuits, in seconds
    pub fn preprocessing_seconds(&self) -> f64 {
        self.preprocessing_seconds
    }

    /// The report as pretty-printed JSON
    pub fn json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for EquivalenceCheckingResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "verdict: {}", self.criterion)?;
        for check in &self.checks {
            writeln!(
                f,
                "  {}: {} ({:.6}s, {} nodes)",
                check.checker, check.criterion, check.runtime_seconds, check.max_active_nodes
            )?;
        }
        Ok(())
    }
}
