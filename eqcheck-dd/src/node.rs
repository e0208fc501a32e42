//! Hash-consed node storage
//!
//! Nodes live in a flat arena indexed by `u32`; a unique table keyed on
//! (level, child node ids) makes structurally equal diagrams share one
//! node, so node identity doubles as structural equality. Child weights
//! are deliberately left out of the key: candidates within a bucket are
//! compared with [`TOLERANCE`](crate::TOLERANCE)-based weight equality,
//! which folds numerically drifted duplicates onto the canonical node.

use crate::edge::{weights_close, EdgeOps, C_ONE, TERMINAL};
use ahash::AHashMap;
use smallvec::SmallVec;

/// Level value marking an arena slot as returned to the free list
const FREE: u32 = u32::MAX;

/// Dead-node count above which a non-forced collection actually runs
const GC_THRESHOLD: usize = 65_536;

pub(crate) struct Node<E, const N: usize> {
    pub(crate) level: u32,
    pub(crate) rc: u32,
    /// Identity-structure flag; only ever set on matrix nodes.
    pub(crate) ident: bool,
    pub(crate) children: [E; N],
}

pub(crate) struct NodeStore<E, const N: usize> {
    nodes: Vec<Node<E, N>>,
    free: Vec<u32>,
    table: AHashMap<(u32, [u32; N]), SmallVec<[u32; 2]>>,
    active: usize,
    max_active: usize,
}

impl<E: EdgeOps, const N: usize> NodeStore<E, N> {
    pub(crate) fn new() -> Self {
        let terminal = Node {
            level: 0,
            rc: 1,
            ident: true,
            children: [E::zero(); N],
        };
        Self {
            nodes: vec![terminal],
            free: Vec::new(),
            table: AHashMap::new(),
            active: 0,
            max_active: 0,
        }
    }

    #[inline]
    pub(crate) fn level(&self, id: u32) -> u32 {
        self.nodes[id as usize].level
    }

    #[inline]
    pub(crate) fn children(&self, id: u32) -> [E; N] {
        self.nodes[id as usize].children
    }

    #[inline]
    pub(crate) fn ident(&self, id: u32) -> bool {
        self.nodes[id as usize].ident
    }

    /// Nodes currently allocated (terminal excluded)
    pub(crate) fn live_nodes(&self) -> usize {
        self.nodes.len() - 1 - self.free.len()
    }

    pub(crate) fn active_nodes(&self) -> usize {
        self.active
    }

    pub(crate) fn max_active_nodes(&self) -> usize {
        self.max_active
    }

    /// Create (or find) the canonical node for `children` at `level`
    ///
    /// Normalizes first: the child with the largest weight magnitude is
    /// scaled to exactly 1 and the divisor becomes the returned edge
    /// weight. An all-zero child list collapses to the zero edge.
    pub(crate) fn make_node(&mut self, level: u32, mut children: [E; N]) -> E {
        debug_assert!(level > 0);
        for c in children.iter_mut() {
            if c.weight().norm_sqr() <= crate::TOLERANCE * crate::TOLERANCE {
                *c = E::zero();
            }
        }

        let mut max_i = 0;
        let mut max_mag = 0.0;
        for (i, c) in children.iter().enumerate() {
            let mag = c.weight().norm_sqr();
            if mag > max_mag {
                max_mag = mag;
                max_i = i;
            }
        }
        if max_mag == 0.0 {
            return E::zero();
        }

        let norm = children[max_i].weight();
        for (i, c) in children.iter_mut().enumerate() {
            if c.is_zero() {
                continue;
            }
            *c = if i == max_i {
                E::make(c.node(), C_ONE)
            } else {
                E::make(c.node(), c.weight() / norm)
            };
        }

        let key = (level, children.map(|c| c.node()));
        let bucket = self.table.entry(key).or_default();
        for &id in bucket.iter() {
            let existing = &self.nodes[id as usize].children;
            if existing
                .iter()
                .zip(children.iter())
                .all(|(a, b)| weights_close(a.weight(), b.weight()))
            {
                return E::make(id, norm);
            }
        }

        let ident = N == 4
            && children[0].node() == children[N - 1].node()
            && (children[0].node() == TERMINAL || self.nodes[children[0].node() as usize].ident)
            && weights_close(children[0].weight(), C_ONE)
            && weights_close(children[N - 1].weight(), C_ONE)
            && (1..N - 1).all(|i| children[i].is_zero());

        let node = Node {
            level,
            rc: 0,
            ident,
            children,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = node;
                id
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as u32
            }
        };
        bucket.push(id);
        E::make(id, norm)
    }

    pub(crate) fn inc_ref(&mut self, edge: E) {
        if !edge.is_zero() {
            self.inc_ref_node(edge.node());
        }
    }

    fn inc_ref_node(&mut self, id: u32) {
        if id == TERMINAL {
            return;
        }
        let node = &mut self.nodes[id as usize];
        node.rc += 1;
        if node.rc == 1 {
            self.active += 1;
            if self.active > self.max_active {
                self.max_active = self.active;
            }
            let children = node.children;
            for c in children {
                if !c.is_zero() {
                    self.inc_ref_node(c.node());
                }
            }
        }
    }

    pub(crate) fn dec_ref(&mut self, edge: E) {
        if !edge.is_zero() {
            self.dec_ref_node(edge.node());
        }
    }

    fn dec_ref_node(&mut self, id: u32) {
        if id == TERMINAL {
            return;
        }
        let node = &mut self.nodes[id as usize];
        assert!(node.rc > 0, "reference count underflow on node {}", id);
        node.rc -= 1;
        if node.rc == 0 {
            self.active -= 1;
            let children = node.children;
            for c in children {
                if !c.is_zero() {
                    self.dec_ref_node(c.node());
                }
            }
        }
    }

    pub(crate) fn should_collect(&self) -> bool {
        self.live_nodes().saturating_sub(self.active) > GC_THRESHOLD
    }

    /// Free every allocated node with a zero reference count
    ///
    /// The caller must have invalidated all compute caches first; cached
    /// result edges do not hold references.
    pub(crate) fn garbage_collect(&mut self) -> usize {
        let mut freed = 0;
        for id in 1..self.nodes.len() as u32 {
            let node = &self.nodes[id as usize];
            if node.level == FREE || node.rc > 0 {
                continue;
            }
            let key = (node.level, node.children.map(|c| c.node()));
            if let Some(bucket) = self.table.get_mut(&key) {
                bucket.retain(|x| *x != id);
                if bucket.is_empty() {
                    self.table.remove(&key);
                }
            }
            self.nodes[id as usize].level = FREE;
            self.free.push(id);
            freed += 1;
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::VectorDD;
    use num_complex::Complex64;

    fn one() -> VectorDD {
        <VectorDD as EdgeOps>::one()
    }

    fn zero() -> VectorDD {
        <VectorDD as EdgeOps>::zero()
    }

    #[test]
    fn test_hash_consing() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let a = store.make_node(1, [one(), zero()]);
        let b = store.make_node(1, [one(), zero()]);
        assert_eq!(a.node(), b.node());
        assert_eq!(store.live_nodes(), 1);
    }

    #[test]
    fn test_normalization_pulls_out_weight() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let w = Complex64::new(0.0, 2.0);
        let e = store.make_node(1, [VectorDD::make(TERMINAL, w), zero()]);
        assert_eq!(e.weight(), w);
        let child = store.children(e.node())[0];
        assert_eq!(child.weight(), C_ONE);
    }

    #[test]
    fn test_drifted_weights_merge() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let a = store.make_node(1, [one(), one()]);
        let drift = Complex64::new(1.0 + 1e-13, 0.0);
        let b = store.make_node(1, [one(), VectorDD::make(TERMINAL, drift)]);
        assert_eq!(a.node(), b.node());
    }

    #[test]
    fn test_all_zero_children_collapse() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let e = store.make_node(1, [zero(), zero()]);
        assert!(e.is_zero());
        assert_eq!(store.live_nodes(), 0);
    }

    #[test]
    fn test_ref_count_transitions() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let inner = store.make_node(1, [one(), zero()]);
        let outer = store.make_node(2, [inner, zero()]);
        store.inc_ref(outer);
        assert_eq!(store.active_nodes(), 2);
        store.inc_ref(outer);
        assert_eq!(store.active_nodes(), 2);
        store.dec_ref(outer);
        store.dec_ref(outer);
        assert_eq!(store.active_nodes(), 0);
        assert_eq!(store.max_active_nodes(), 2);
    }

    #[test]
    #[should_panic(expected = "reference count underflow")]
    fn test_extra_decrement_panics() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let e = store.make_node(1, [one(), zero()]);
        store.dec_ref(e);
    }

    #[test]
    fn test_garbage_collect_frees_dead_nodes() {
        let mut store: NodeStore<VectorDD, 2> = NodeStore::new();
        let kept = store.make_node(1, [one(), zero()]);
        let _dead = store.make_node(1, [zero(), one()]);
        store.inc_ref(kept);
        assert_eq!(store.garbage_collect(), 1);
        assert_eq!(store.live_nodes(), 1);

        // The freed slot is reused by the next allocation.
        let again = store.make_node(1, [zero(), one()]);
        assert_eq!(store.live_nodes(), 2);
        store.inc_ref(again);
    }

    #[test]
    fn test_ident_flag_on_matrix_nodes() {
        use crate::edge::MatrixDD;
        let mut store: NodeStore<MatrixDD, 4> = NodeStore::new();
        let mone = <MatrixDD as EdgeOps>::one();
        let mzero = <MatrixDD as EdgeOps>::zero();
        let id1 = store.make_node(1, [mone, mzero, mzero, mone]);
        assert!(store.ident(id1.node()));
        let id2 = store.make_node(2, [id1, mzero, mzero, id1]);
        assert!(store.ident(id2.node()));
        let x = store.make_node(1, [mzero, mone, mone, mzero]);
        assert!(!store.ident(x.node()));
    }
}
