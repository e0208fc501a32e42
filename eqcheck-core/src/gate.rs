//! Quantum gate kinds and their matrices
//!
//! Gates are a closed enum rather than trait objects: the equivalence
//! checker needs syntactic gate comparison, exact inverses and
//! cost-profile keys, all of which are awkward through `dyn` indirection.
//! Controlled gates are expressed at the [`Operation`](crate::Operation)
//! level via a control list, so `CX` is an `X` with one control.

use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = 0.7071067811865476; // 1/√2

/// Identity gate matrix
pub const IDENTITY: [[Complex64; 2]; 2] = [[ONE, ZERO], [ZERO, ONE]];

/// Pauli-X gate matrix (NOT gate)
pub const PAULI_X: [[Complex64; 2]; 2] = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y gate matrix
pub const PAULI_Y: [[Complex64; 2]; 2] = [[ZERO, NEG_I], [I, ZERO]];

/// Pauli-Z gate matrix
pub const PAULI_Z: [[Complex64; 2]; 2] = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// Hadamard gate matrix
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: [[Complex64; 2]; 2] = [
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(INV_SQRT2, 0.0),
    ],
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(-INV_SQRT2, 0.0),
    ],
];

/// S gate matrix (√Z)
pub const S_GATE: [[Complex64; 2]; 2] = [[ONE, ZERO], [ZERO, I]];

/// S† gate matrix
pub const S_GATE_DAGGER: [[Complex64; 2]; 2] = [[ONE, ZERO], [ZERO, NEG_I]];

/// T gate matrix (√S)
/// T = [[1, 0], [0, e^(iπ/4)]]
pub const T_GATE: [[Complex64; 2]; 2] = [
    [ONE, ZERO],
    [ZERO, Complex64::new(INV_SQRT2, INV_SQRT2)],
];

/// T† gate matrix
pub const T_GATE_DAGGER: [[Complex64; 2]; 2] = [
    [ONE, ZERO],
    [ZERO, Complex64::new(INV_SQRT2, -INV_SQRT2)],
];

/// SX gate matrix (√X)
pub const SX_GATE: [[Complex64; 2]; 2] = [
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
];

/// SX† gate matrix
pub const SX_GATE_DAGGER: [[Complex64; 2]; 2] = [
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
];

/// The closed set of gate kinds understood by the checker
///
/// Single-target kinds carry their 2×2 matrix; `Swap` acts on two
/// targets; `Measure`, `Reset` and `Barrier` are non-unitary markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Identity
    I,
    /// Pauli-X
    X,
    /// Pauli-Y
    Y,
    /// Pauli-Z
    Z,
    /// Hadamard
    H,
    /// Phase gate √Z
    S,
    /// Adjoint of S
    Sdg,
    /// π/8 gate √S
    T,
    /// Adjoint of T
    Tdg,
    /// √X
    Sx,
    /// Adjoint of √X
    Sxdg,
    /// Rotation about the X axis by the given angle
    Rx(f64),
    /// Rotation about the Y axis by the given angle
    Ry(f64),
    /// Rotation about the Z axis by the given angle
    Rz(f64),
    /// Phase rotation diag(1, e^{iλ})
    Phase(f64),
    /// Exchange of two qubits
    Swap,
    /// Projective measurement into a classical bit
    Measure,
    /// Reset to |0⟩
    Reset,
    /// Scheduling barrier; no effect on the unitary
    Barrier,
}

impl Gate {
    /// The gate mnemonic, as used in cost-profile files
    pub const fn name(&self) -> &'static str {
        match self {
            Gate::I => "i",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::Sx => "sx",
            Gate::Sxdg => "sxdg",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::Phase(_) => "p",
            Gate::Swap => "swap",
            Gate::Measure => "measure",
            Gate::Reset => "reset",
            Gate::Barrier => "barrier",
        }
    }

    /// Number of target qubits the kind acts on
    pub const fn num_targets(&self) -> usize {
        match self {
            Gate::Swap => 2,
            _ => 1,
        }
    }

    /// Whether this kind describes a unitary operation
    pub const fn is_unitary(&self) -> bool {
        !matches!(self, Gate::Measure | Gate::Reset | Gate::Barrier)
    }

    /// Whether the gate matrix is diagonal in the computational basis
    ///
    /// Diagonal gates commute with measurements, which is what the
    /// diagonal-gate removal pass exploits.
    pub const fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Gate::I | Gate::Z | Gate::S | Gate::Sdg | Gate::T | Gate::Tdg | Gate::Rz(_) | Gate::Phase(_)
        )
    }

    /// The single-qubit matrix of this kind
    ///
    /// Returns `None` for `Swap` and the non-unitary kinds.
    pub fn matrix(&self) -> Option<[[Complex64; 2]; 2]> {
        let mat = match self {
            Gate::I => IDENTITY,
            Gate::X => PAULI_X,
            Gate::Y => PAULI_Y,
            Gate::Z => PAULI_Z,
            Gate::H => HADAMARD,
            Gate::S => S_GATE,
            Gate::Sdg => S_GATE_DAGGER,
            Gate::T => T_GATE,
            Gate::Tdg => T_GATE_DAGGER,
            Gate::Sx => SX_GATE,
            Gate::Sxdg => SX_GATE_DAGGER,
            Gate::Rx(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                [
                    [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
                    [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)],
                ]
            }
            Gate::Ry(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                [
                    [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
                    [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)],
                ]
            }
            Gate::Rz(theta) => [
                [Complex64::cis(-theta / 2.0), ZERO],
                [ZERO, Complex64::cis(theta / 2.0)],
            ],
            Gate::Phase(lambda) => [[ONE, ZERO], [ZERO, Complex64::cis(*lambda)]],
            Gate::Swap | Gate::Measure | Gate::Reset | Gate::Barrier => return None,
        };
        Some(mat)
    }

    /// The inverse gate kind
    ///
    /// Non-unitary kinds are their own "inverse" so that circuit
    /// inversion can pass them through unchanged.
    pub fn inverse(&self) -> Gate {
        match *self {
            Gate::S => Gate::Sdg,
            Gate::Sdg => Gate::S,
            Gate::T => Gate::Tdg,
            Gate::Tdg => Gate::T,
            Gate::Sx => Gate::Sxdg,
            Gate::Sxdg => Gate::Sx,
            Gate::Rx(theta) => Gate::Rx(-theta),
            Gate::Ry(theta) => Gate::Ry(-theta),
            Gate::Rz(theta) => Gate::Rz(-theta),
            Gate::Phase(lambda) => Gate::Phase(-lambda),
            g => g,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mat_mul(a: [[Complex64; 2]; 2], b: [[Complex64; 2]; 2]) -> [[Complex64; 2]; 2] {
        let mut r = [[ZERO; 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                r[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j];
            }
        }
        r
    }

    fn assert_identity(m: [[Complex64; 2]; 2]) {
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(m[i][j].re, expected, epsilon = 1e-12);
                assert_relative_eq!(m[i][j].im, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_inverse_matrices_cancel() {
        let gates = [
            Gate::X,
            Gate::Y,
            Gate::Z,
            Gate::H,
            Gate::S,
            Gate::T,
            Gate::Sx,
            Gate::Rx(0.7),
            Gate::Ry(-1.2),
            Gate::Rz(2.1),
            Gate::Phase(0.3),
        ];
        for g in gates {
            let m = g.matrix().unwrap();
            let inv = g.inverse().matrix().unwrap();
            assert_identity(mat_mul(m, inv));
        }
    }

    #[test]
    fn test_diagonal_flags() {
        assert!(Gate::Z.is_diagonal());
        assert!(Gate::T.is_diagonal());
        assert!(Gate::Rz(0.5).is_diagonal());
        assert!(!Gate::X.is_diagonal());
        assert!(!Gate::H.is_diagonal());
    }

    #[test]
    fn test_non_unitary_kinds() {
        assert!(!Gate::Measure.is_unitary());
        assert!(!Gate::Reset.is_unitary());
        assert!(Gate::Measure.matrix().is_none());
        assert!(Gate::Swap.matrix().is_none());
    }

    #[test]
    fn test_names() {
        assert_eq!(Gate::X.name(), "x");
        assert_eq!(Gate::Rz(1.0).name(), "rz");
        assert_eq!(Gate::Sdg.name(), "sdg");
    }
}
