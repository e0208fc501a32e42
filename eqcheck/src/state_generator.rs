//! Random initial states for the simulation checker

use crate::configuration::StateType;
use eqcheck_core::gate::PAULI_X;
use eqcheck_core::Complex64;
use eqcheck_dd::{Package, VectorDD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SQRT1_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Amplitude pairs of the six cardinal states of the Bloch sphere
const CARDINAL_STATES: [[Complex64; 2]; 6] = [
    [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
    [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
    [Complex64::new(SQRT1_2, 0.0), Complex64::new(SQRT1_2, 0.0)],
    [Complex64::new(SQRT1_2, 0.0), Complex64::new(-SQRT1_2, 0.0)],
    [Complex64::new(SQRT1_2, 0.0), Complex64::new(0.0, SQRT1_2)],
    [Complex64::new(SQRT1_2, 0.0), Complex64::new(0.0, -SQRT1_2)],
];

/// Draws initial states for simulation runs
///
/// Ancillary qubits are always pinned to |0⟩ so that padded or
/// transformed circuits see the inputs the functionality checkers
/// assume. Only the remaining data qubits are randomized.
pub(crate) struct StateGenerator {
    rng: StdRng,
}

impl StateGenerator {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Draw one initial state of the requested kind
    ///
    /// The returned diagram is unreferenced; callers reference it for
    /// as long as they keep it.
    pub(crate) fn generate(
        &mut self,
        pkg: &mut Package,
        state_type: StateType,
        ancillary: &[bool],
    ) -> VectorDD {
        match state_type {
            StateType::ComputationalBasis => self.computational_basis(pkg, ancillary),
            StateType::Random1QBasis => self.random_1q_basis(pkg, ancillary),
            StateType::Stabilizer => self.stabilizer(pkg, ancillary),
        }
    }

    fn computational_basis(&mut self, pkg: &mut Package, ancillary: &[bool]) -> VectorDD {
        let bits: Vec<bool> = ancillary
            .iter()
            .map(|&anc| !anc && self.rng.gen_bool(0.5))
            .collect();
        pkg.basis_state(&bits)
    }

    /// Product of random single-qubit cardinal states
    fn random_1q_basis(&mut self, pkg: &mut Package, ancillary: &[bool]) -> VectorDD {
        let amplitudes: Vec<[Complex64; 2]> = ancillary
            .iter()
            .map(|&anc| {
                if anc {
                    CARDINAL_STATES[0]
                } else {
                    CARDINAL_STATES[self.rng.gen_range(0..CARDINAL_STATES.len())]
                }
            })
            .collect();
        pkg.product_state(&amplitudes)
    }

    /// Cardinal product state entangled by a layer of random CNOTs
    fn stabilizer(&mut self, pkg: &mut Package, ancillary: &[bool]) -> VectorDD {
        let mut state = self.random_1q_basis(pkg, ancillary);
        let data: Vec<usize> = (0..ancillary.len()).filter(|&q| !ancillary[q]).collect();
        if data.len() < 2 {
            return state;
        }
        for pair in data.windows(2) {
            if !self.rng.gen_bool(0.5) {
                continue;
            }
            let (c, t) = if self.rng.gen_bool(0.5) {
                (pair[0], pair[1])
            } else {
                (pair[1], pair[0])
            };
            let cx = pkg.gate_dd(&PAULI_X, t, &[c]);
            state = pkg.multiply_mv(cx, state);
        }
        state
    }
}
