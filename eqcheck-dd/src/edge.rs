//! Weighted edges into the node stores
//!
//! A decision diagram is always handed around as a single edge: a node
//! index into the owning [`Package`](crate::Package) plus a complex
//! weight that scales everything below. The zero diagram is the edge to
//! the terminal with weight 0, independent of qubit count.

use num_complex::Complex64;

pub(crate) const C_ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const C_ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Numerical tolerance for weight comparisons inside the package
///
/// Weights closer than this are considered equal during hash-consing,
/// which is what lets numerically drifted duplicates collapse onto one
/// canonical node.
pub const TOLERANCE: f64 = 1e-10;

/// Index of the terminal node in every store
pub(crate) const TERMINAL: u32 = 0;

pub(crate) fn weights_close(a: Complex64, b: Complex64) -> bool {
    (a - b).norm_sqr() <= TOLERANCE * TOLERANCE
}

/// Shared edge behavior, implemented by both diagram flavors
pub(crate) trait EdgeOps: Copy {
    fn make(node: u32, weight: Complex64) -> Self;
    fn node(&self) -> u32;
    fn weight(&self) -> Complex64;

    fn zero() -> Self {
        Self::make(TERMINAL, C_ZERO)
    }

    fn one() -> Self {
        Self::make(TERMINAL, C_ONE)
    }

    fn is_zero(&self) -> bool {
        self.node() == TERMINAL && self.weight() == C_ZERO
    }

    fn scaled(&self, factor: Complex64) -> Self {
        if self.is_zero() {
            *self
        } else {
            Self::make(self.node(), self.weight() * factor)
        }
    }
}

macro_rules! edge_flavor {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name {
            pub(crate) node: u32,
            pub(crate) weight: Complex64,
        }

        impl $name {
            /// The weight on the top edge
            #[inline]
            pub fn weight(&self) -> Complex64 {
                self.weight
            }

            /// Whether this is the all-zero diagram
            #[inline]
            pub fn is_zero(&self) -> bool {
                EdgeOps::is_zero(self)
            }

            /// Whether both edges point at the same canonical node
            ///
            /// With hash-consing this is structural equality of
            /// everything below the edge, ignoring the top weight.
            #[inline]
            pub fn same_node(&self, other: &Self) -> bool {
                self.node == other.node
            }
        }

        impl EdgeOps for $name {
            #[inline]
            fn make(node: u32, weight: Complex64) -> Self {
                Self { node, weight }
            }

            #[inline]
            fn node(&self) -> u32 {
                self.node
            }

            #[inline]
            fn weight(&self) -> Complex64 {
                self.weight
            }
        }
    };
}

edge_flavor! {
    /// Handle to a decision diagram representing a 2ⁿ state vector
    VectorDD
}

edge_flavor! {
    /// Handle to a decision diagram representing a 2ⁿ × 2ⁿ matrix
    MatrixDD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_edge() {
        let z = <VectorDD as EdgeOps>::zero();
        assert!(z.is_zero());
        assert!(!<VectorDD as EdgeOps>::one().is_zero());
    }

    #[test]
    fn test_scaled_zero_stays_zero() {
        let z = <MatrixDD as EdgeOps>::zero();
        let s = z.scaled(Complex64::new(3.0, 1.0));
        assert!(s.is_zero());
    }

    #[test]
    fn test_weights_close() {
        assert!(weights_close(C_ONE, Complex64::new(1.0 + 1e-12, 0.0)));
        assert!(!weights_close(C_ONE, Complex64::new(1.0 + 1e-8, 0.0)));
    }
}
