//! Wire-to-level permutations
//!
//! The checker tracks, for every circuit wire, which decision-diagram
//! level currently carries that wire's state. SWAP gates are elided by
//! rewriting this map instead of multiplying.

use std::fmt;
use std::ops::Index;

/// A total map from circuit wires to DD levels
#[derive(Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity permutation on `n` wires
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Build from an explicit wire → level assignment
    ///
    /// # Panics
    /// Panics if `map` is not a permutation of `0..map.len()`.
    pub fn from_map(map: Vec<usize>) -> Self {
        let n = map.len();
        let mut seen = vec![false; n];
        for &l in &map {
            assert!(l < n && !seen[l], "not a permutation of 0..{}", n);
            seen[l] = true;
        }
        Self(map)
    }

    /// Number of wires
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the permutation is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the identity map
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(w, &l)| w == l)
    }

    /// Exchange the levels of two wires (SWAP elision)
    #[inline]
    pub fn swap_wires(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    /// Assign wire `w` to level `l`
    #[inline]
    pub fn set(&mut self, w: usize, l: usize) {
        self.0[w] = l;
    }

    /// Grow the permutation with identity-mapped wires up to `n`
    pub fn extend_identity(&mut self, n: usize) {
        for l in self.0.len()..n {
            self.0.push(l);
        }
    }

    /// Find the wire currently mapped to level `l`
    pub fn wire_at_level(&self, l: usize) -> Option<usize> {
        self.0.iter().position(|&x| x == l)
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    #[inline]
    fn index(&self, w: usize) -> &usize {
        &self.0[w]
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permutation{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let p = Permutation::identity(3);
        assert!(p.is_identity());
        assert_eq!(p[2], 2);
    }

    #[test]
    fn test_swap_wires() {
        let mut p = Permutation::identity(3);
        p.swap_wires(0, 2);
        assert_eq!(p[0], 2);
        assert_eq!(p[2], 0);
        assert!(!p.is_identity());
        p.swap_wires(0, 2);
        assert!(p.is_identity());
    }

    #[test]
    fn test_wire_at_level() {
        let mut p = Permutation::identity(3);
        p.swap_wires(1, 2);
        assert_eq!(p.wire_at_level(2), Some(1));
        assert_eq!(p.wire_at_level(1), Some(2));
    }

    #[test]
    #[should_panic(expected = "not a permutation")]
    fn test_invalid_map() {
        Permutation::from_map(vec![0, 0, 1]);
    }
}
