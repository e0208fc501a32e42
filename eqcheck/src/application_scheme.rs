//! Application schemes: how many gates each side applies per step
//!
//! The checkers interleave the two circuits' gates onto their running
//! diagrams. The scheme decides the interleaving: naive one-to-one,
//! proportional to circuit length, weighted by per-gate cost, or (for
//! the alternating checker only) a greedy lookahead on DD size.

use crate::error::CheckError;
use crate::task_manager::TaskManager;
use ahash::AHashMap;
use eqcheck_core::{Circuit, Gate, Operation};
use eqcheck_dd::{MatrixDD, Package};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The available application scheme kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSchemeType {
    OneToOne,
    Proportional,
    GateCost,
    Lookahead,
}

impl fmt::Display for ApplicationSchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationSchemeType::OneToOne => "one-to-one",
            ApplicationSchemeType::Proportional => "proportional",
            ApplicationSchemeType::GateCost => "gate-cost",
            ApplicationSchemeType::Lookahead => "lookahead",
        };
        write!(f, "{}", s)
    }
}

/// In-process gate cost callable
pub type CostFunction = fn(&Operation) -> usize;

/// The built-in gate cost model
///
/// Approximates the number of two-qubit gates a transpiler spends:
/// singly-controlled and plain gates cost 1, a `k`-controlled gate
/// costs `2^(k+1) - 3` (its Toffoli-ladder decomposition), a SWAP
/// costs its three CNOTs.
pub fn default_cost_function(op: &Operation) -> usize {
    if op.gate() == Gate::Swap {
        return 3;
    }
    let controls = op.controls().len();
    if controls <= 1 {
        1
    } else {
        (1usize << (controls + 1)) - 3
    }
}

/// Parsed cost-profile file: `(gate name, control count) → cost`
///
/// The file format is line oriented: `name controls cost`, with `#`
/// starting a comment and blank lines ignored.
pub(crate) fn parse_profile(path: &Path) -> Result<AHashMap<(String, usize), usize>, CheckError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CheckError::ProfileUnreadable(format!("{}: {}", path.display(), e)))?;
    let mut profile = AHashMap::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let entry = (|| {
            let name = fields.next()?.to_string();
            let controls = fields.next()?.parse::<usize>().ok()?;
            let cost = fields.next()?.parse::<usize>().ok()?;
            if fields.next().is_some() {
                return None;
            }
            Some(((name, controls), cost))
        })();
        match entry {
            Some((key, cost)) => {
                profile.insert(key, cost);
            }
            None => {
                return Err(CheckError::ProfileUnreadable(format!(
                    "{}: malformed line {}: '{}'",
                    path.display(),
                    lineno + 1,
                    raw
                )))
            }
        }
    }
    Ok(profile)
}

pub(crate) enum GateCosts {
    Function(CostFunction),
    Profile(AHashMap<(String, usize), usize>),
}

impl GateCosts {
    pub(crate) fn cost(&self, op: &Operation) -> usize {
        match self {
            GateCosts::Function(f) => f(op),
            GateCosts::Profile(map) => map
                .get(&(op.gate().name().to_string(), op.controls().len()))
                .copied()
                .unwrap_or(1),
        }
    }
}

/// A count-based application scheme, ready to drive a checking loop
///
/// Lookahead is not representable here; it steps the running diagram
/// itself and lives in [`LookaheadScheme`].
pub(crate) enum ApplicationScheme {
    OneToOne,
    Proportional { left: usize, right: usize },
    GateCost(GateCosts),
}

impl ApplicationScheme {
    /// Instantiate a count-based scheme for a pair of circuits
    ///
    /// # Errors
    /// Fails with [`CheckError::ProfileUnreadable`] if a gate-cost
    /// profile is configured but cannot be parsed, and with
    /// [`CheckError::UnsupportedScheme`] for the lookahead kind.
    pub(crate) fn build(
        kind: ApplicationSchemeType,
        circ1: &Circuit,
        circ2: &Circuit,
        options: &crate::configuration::ApplicationOptions,
        checker: &'static str,
    ) -> Result<Self, CheckError> {
        match kind {
            ApplicationSchemeType::OneToOne => Ok(ApplicationScheme::OneToOne),
            ApplicationSchemeType::Proportional => {
                let n1 = circ1.num_unitary_ops().max(1);
                let n2 = circ2.num_unitary_ops().max(1);
                let (left, right) = if n2 >= n1 {
                    (1, ((n2 as f64 / n1 as f64).round() as usize).max(1))
                } else {
                    (((n1 as f64 / n2 as f64).round() as usize).max(1), 1)
                };
                Ok(ApplicationScheme::Proportional { left, right })
            }
            ApplicationSchemeType::GateCost => {
                let costs = match &options.profile_location {
                    Some(path) => GateCosts::Profile(parse_profile(path)?),
                    None => {
                        GateCosts::Function(options.cost_function.unwrap_or(default_cost_function))
                    }
                };
                Ok(ApplicationScheme::GateCost(costs))
            }
            ApplicationSchemeType::Lookahead => {
                Err(CheckError::UnsupportedScheme(kind, checker))
            }
        }
    }

    /// Gate counts `(side 1, side 2)` for the next step
    pub(crate) fn step_counts(&self, tm1: &TaskManager<'_>) -> (usize, usize) {
        match self {
            ApplicationScheme::OneToOne => (1, 1),
            ApplicationScheme::Proportional { left, right } => (*left, *right),
            ApplicationScheme::GateCost(costs) => {
                let cost = tm1.peek().map(|op| costs.cost(op)).unwrap_or(1);
                (1, cost.max(1))
            }
        }
    }
}

/// The lookahead scheme for the alternating checker
///
/// Greedily applies either the next gate of circuit 1 from the left or
/// the inverse of the next gate of circuit 2 from the right, whichever
/// keeps the running diagram smaller. Fetched operation diagrams are
/// cached (and referenced) until their side is chosen.
pub(crate) struct LookaheadScheme {
    op1: Option<MatrixDD>,
    op2: Option<MatrixDD>,
    initialized: bool,
}

impl LookaheadScheme {
    pub(crate) fn new() -> Self {
        Self {
            op1: None,
            op2: None,
            initialized: false,
        }
    }

    /// Wire the scheme to the running diagram before stepping
    pub(crate) fn init(&mut self) {
        self.initialized = true;
    }

    /// Whether cached operations still await application
    pub(crate) fn is_drained(&self) -> bool {
        self.op1.is_none() && self.op2.is_none()
    }

    /// Perform one lookahead step on the shared running diagram
    pub(crate) fn step(
        &mut self,
        pkg: &mut Package,
        tm1: &mut TaskManager<'_>,
        tm2: &mut TaskManager<'_>,
        state: &mut MatrixDD,
    ) -> Result<(), CheckError> {
        if !self.initialized {
            return Err(CheckError::UninitializedScheme);
        }

        if self.op1.is_none() {
            if let Some(dd) = tm1.next_op_dd(pkg)? {
                pkg.inc_ref_m(dd);
                self.op1 = Some(dd);
            }
        }
        if self.op2.is_none() {
            if let Some(dd) = tm2.next_op_dd(pkg)? {
                pkg.inc_ref_m(dd);
                self.op2 = Some(dd);
            }
        }

        let new_state = match (self.op1, self.op2) {
            (None, None) => return Ok(()),
            (Some(a), None) => {
                let r = pkg.multiply_mm(a, *state);
                pkg.dec_ref_m(a);
                self.op1 = None;
                r
            }
            (None, Some(b)) => {
                let r = pkg.multiply_mm(*state, b);
                pkg.dec_ref_m(b);
                self.op2 = None;
                r
            }
            (Some(a), Some(b)) => {
                let left = pkg.multiply_mm(a, *state);
                let right = pkg.multiply_mm(*state, b);
                // Tie goes to circuit 1.
                if pkg.size_m(left) <= pkg.size_m(right) {
                    pkg.dec_ref_m(a);
                    self.op1 = None;
                    left
                } else {
                    pkg.dec_ref_m(b);
                    self.op2 = None;
                    right
                }
            }
        };

        pkg.inc_ref_m(new_state);
        pkg.dec_ref_m(*state);
        *state = new_state;
        pkg.garbage_collect(false);
        pkg.check_node_limit()?;
        Ok(())
    }

    /// Release any cached operation diagrams
    pub(crate) fn teardown(&mut self, pkg: &mut Package) {
        if let Some(a) = self.op1.take() {
            pkg.dec_ref_m(a);
        }
        if let Some(b) = self.op2.take() {
            pkg.dec_ref_m(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqcheck_core::QubitId;
    use std::io::Write;

    #[test]
    fn test_default_cost_function() {
        let x = Operation::new(Gate::X, &[QubitId::new(0)]).unwrap();
        assert_eq!(default_cost_function(&x), 1);

        let cx = Operation::controlled(Gate::X, QubitId::new(1), &[QubitId::new(0)]).unwrap();
        assert_eq!(default_cost_function(&cx), 1);

        let ccx = Operation::controlled(
            Gate::X,
            QubitId::new(2),
            &[QubitId::new(0), QubitId::new(1)],
        )
        .unwrap();
        assert_eq!(default_cost_function(&ccx), 5);

        let swap =
            Operation::new(Gate::Swap, &[QubitId::new(0), QubitId::new(1)]).unwrap();
        assert_eq!(default_cost_function(&swap), 3);
    }

    #[test]
    fn test_proportional_ratio() {
        let mut c1 = Circuit::new(1);
        c1.x(0);
        let mut c2 = Circuit::new(1);
        c2.x(0);
        c2.x(0);
        c2.x(0);
        let options = crate::configuration::ApplicationOptions::default();
        let scheme =
            ApplicationScheme::build(ApplicationSchemeType::Proportional, &c1, &c2, &options, "test")
                .unwrap();
        assert!(matches!(
            scheme,
            ApplicationScheme::Proportional { left: 1, right: 3 }
        ));
    }

    #[test]
    fn test_profile_parsing() {
        let mut path = std::env::temp_dir();
        path.push("eqcheck_profile_parse_test.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# two-qubit costs").unwrap();
        writeln!(file, "x 1 1").unwrap();
        writeln!(file, "x 2 5  # toffoli").unwrap();
        writeln!(file).unwrap();
        drop(file);

        let profile = parse_profile(&path).unwrap();
        assert_eq!(profile.get(&("x".to_string(), 2)), Some(&5));
        assert_eq!(profile.len(), 2);

        let costs = GateCosts::Profile(profile);
        let h = Operation::new(Gate::H, &[QubitId::new(0)]).unwrap();
        assert_eq!(costs.cost(&h), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_profile_malformed() {
        let mut path = std::env::temp_dir();
        path.push("eqcheck_profile_malformed_test.txt");
        std::fs::write(&path, "x one 1\n").unwrap();
        assert!(matches!(
            parse_profile(&path),
            Err(CheckError::ProfileUnreadable(_))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_profile_missing_file() {
        let path = std::path::Path::new("/nonexistent/eqcheck-profile.txt");
        assert!(matches!(
            parse_profile(path),
            Err(CheckError::ProfileUnreadable(_))
        ));
    }

    #[test]
    fn test_lookahead_requires_init() {
        let mut scheme = LookaheadScheme::new();
        let mut pkg = Package::new(1);
        let c = Circuit::new(1);
        let mut tm1 = TaskManager::new(&c, crate::task_manager::Direction::Forward);
        let mut tm2 = TaskManager::new(&c, crate::task_manager::Direction::Reverse);
        let mut state = pkg.identity();
        assert!(matches!(
            scheme.step(&mut pkg, &mut tm1, &mut tm2, &mut state),
            Err(CheckError::UninitializedScheme)
        ));
    }
}
