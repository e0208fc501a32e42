//! The DD package: construction, arithmetic and memory management

use crate::edge::{EdgeOps, C_ONE, C_ZERO, TERMINAL};
use crate::error::DdError;
use crate::node::NodeStore;
use crate::{MatrixDD, VectorDD, TOLERANCE};
use ahash::{AHashMap, AHashSet};
use eqcheck_core::gate::PAULI_X;
use eqcheck_core::{Complex64, Gate, Operation, Permutation};

/// Owner of all decision-diagram state for one checker run
///
/// Holds the vector and matrix node stores, the compute caches for
/// multiplication and conjugate transposition, and the bookkeeping for
/// reference counting. Level `q + 1` of a diagram splits on qubit `q`;
/// level 0 is the terminal.
///
/// Compute caches key on node indices only. Edge weights factor out of
/// multiplication exactly, so one cache entry serves every weighted
/// instance of the same node pair. Cached edges hold no references,
/// which is why [`garbage_collect`](Package::garbage_collect) clears
/// the caches before freeing nodes.
pub struct Package {
    num_qubits: usize,
    vnodes: NodeStore<VectorDD, 2>,
    mnodes: NodeStore<MatrixDD, 4>,
    mm_cache: AHashMap<(u32, u32), MatrixDD>,
    mv_cache: AHashMap<(u32, u32), VectorDD>,
    ct_cache: AHashMap<u32, MatrixDD>,
    node_limit: Option<usize>,
}

impl Package {
    /// Create a package for diagrams over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        assert!(num_qubits > 0, "package needs at least one qubit");
        Self {
            num_qubits,
            vnodes: NodeStore::new(),
            mnodes: NodeStore::new(),
            mm_cache: AHashMap::new(),
            mv_cache: AHashMap::new(),
            ct_cache: AHashMap::new(),
            node_limit: None,
        }
    }

    /// Create a package that refuses to grow past `limit` live nodes
    ///
    /// The limit is polled via [`check_node_limit`](Self::check_node_limit)
    /// rather than enforced per allocation.
    pub fn with_node_limit(num_qubits: usize, limit: usize) -> Self {
        let mut pkg = Self::new(num_qubits);
        pkg.node_limit = Some(limit);
        pkg
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    // ---------------------------------------------------------------
    // State construction
    // ---------------------------------------------------------------

    /// The all-zeros computational basis state |0…0⟩
    pub fn zero_state(&mut self) -> VectorDD {
        self.basis_state(&vec![false; self.num_qubits])
    }

    /// A computational basis state, `bits[q]` giving the value of qubit `q`
    pub fn basis_state(&mut self, bits: &[bool]) -> VectorDD {
        assert_eq!(bits.len(), self.num_qubits);
        let mut e = VectorDD::one();
        for (q, &bit) in bits.iter().enumerate() {
            let children = if bit {
                [VectorDD::zero(), e]
            } else {
                [e, VectorDD::zero()]
            };
            e = self.vnodes.make_node((q + 1) as u32, children);
        }
        e
    }

    /// A product state from per-qubit amplitude pairs `(⟨0|ψ⟩, ⟨1|ψ⟩)`
    pub fn product_state(&mut self, amplitudes: &[[Complex64; 2]]) -> VectorDD {
        assert_eq!(amplitudes.len(), self.num_qubits);
        let mut e = VectorDD::one();
        for (q, amp) in amplitudes.iter().enumerate() {
            let children = [e.scaled(amp[0]), e.scaled(amp[1])];
            e = self.vnodes.make_node((q + 1) as u32, children);
        }
        e
    }

    // ---------------------------------------------------------------
    // Matrix construction
    // ---------------------------------------------------------------

    /// The identity matrix over the full register
    pub fn identity(&mut self) -> MatrixDD {
        self.ident_chain(self.num_qubits)
    }

    fn ident_chain(&mut self, qubits: usize) -> MatrixDD {
        let mut e = MatrixDD::one();
        for level in 1..=qubits as u32 {
            let zero = MatrixDD::zero();
            e = self.mnodes.make_node(level, [e, zero, zero, e]);
        }
        e
    }

    /// Build the full-register matrix DD for a single-qubit gate
    ///
    /// `target` and `controls` are DD qubit positions (already permuted
    /// by the caller). Controls are positive: the gate fires when every
    /// control reads |1⟩ and the whole operator is identity otherwise.
    pub fn gate_dd(
        &mut self,
        mat: &[[Complex64; 2]; 2],
        target: usize,
        controls: &[usize],
    ) -> MatrixDD {
        debug_assert!(target < self.num_qubits);
        debug_assert!(!controls.contains(&target));

        let zero = MatrixDD::zero();
        let mut em = [zero; 4];
        for r in 0..2 {
            for c in 0..2 {
                em[r * 2 + c] = MatrixDD::make(TERMINAL, mat[r][c]);
            }
        }

        // Below the target each of the four block entries grows a level.
        for z in 0..target {
            let is_control = controls.contains(&z);
            for (i, entry) in em.iter_mut().enumerate() {
                let diagonal = i == 0 || i == 3;
                *entry = if is_control {
                    // Control off: the whole operator is identity, so
                    // diagonal blocks carry an identity chain.
                    let off = if diagonal {
                        self.ident_chain(z)
                    } else {
                        zero
                    };
                    self.mnodes.make_node((z + 1) as u32, [off, zero, zero, *entry])
                } else {
                    self.mnodes
                        .make_node((z + 1) as u32, [*entry, zero, zero, *entry])
                };
            }
        }

        let mut e = self.mnodes.make_node((target + 1) as u32, em);
        for z in target + 1..self.num_qubits {
            e = if controls.contains(&z) {
                let off = self.ident_chain(z);
                self.mnodes.make_node((z + 1) as u32, [off, zero, zero, e])
            } else {
                self.mnodes.make_node((z + 1) as u32, [e, zero, zero, e])
            };
        }
        e
    }

    /// The matrix DD exchanging qubit positions `a` and `b`
    pub fn swap_dd(&mut self, a: usize, b: usize) -> MatrixDD {
        self.controlled_swap_dd(a, b, &[])
    }

    fn controlled_swap_dd(&mut self, a: usize, b: usize, controls: &[usize]) -> MatrixDD {
        assert_ne!(a, b);
        // SWAP as three CNOTs; extra controls attach to the middle one.
        let outer = self.gate_dd(&PAULI_X, b, &[a]);
        let mut mid_controls = vec![b];
        mid_controls.extend_from_slice(controls);
        let middle = self.gate_dd(&PAULI_X, a, &mid_controls);
        let partial = self.multiply_mm(outer, middle);
        self.multiply_mm(partial, outer)
    }

    /// Build the matrix DD for one circuit operation
    ///
    /// Qubits are routed through `perm` to their current DD positions.
    /// With `inverted` the adjoint operation is built instead.
    ///
    /// # Errors
    /// Fails for measurements, resets and other non-unitary operations.
    pub fn operation_dd(
        &mut self,
        op: &Operation,
        perm: &Permutation,
        inverted: bool,
    ) -> Result<MatrixDD, DdError> {
        let gate = if inverted {
            op.gate().inverse()
        } else {
            op.gate()
        };
        let controls: Vec<usize> = op.controls().iter().map(|q| perm[q.index()]).collect();
        match gate {
            Gate::Swap => {
                let a = perm[op.targets()[0].index()];
                let b = perm[op.targets()[1].index()];
                Ok(self.controlled_swap_dd(a, b, &controls))
            }
            g => {
                let mat = g.matrix().ok_or(DdError::NonUnitary(g.name()))?;
                let target = perm[op.targets()[0].index()];
                Ok(self.gate_dd(&mat, target, &controls))
            }
        }
    }

    // ---------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------

    /// Matrix-matrix product `x · y`
    pub fn multiply_mm(&mut self, x: MatrixDD, y: MatrixDD) -> MatrixDD {
        if x.is_zero() || y.is_zero() {
            return MatrixDD::zero();
        }
        let weight = x.weight * y.weight;
        if self.mnodes.ident(x.node) {
            return MatrixDD::make(y.node, weight);
        }
        if self.mnodes.ident(y.node) {
            return MatrixDD::make(x.node, weight);
        }
        let r = self.mm_rec(x.node, y.node, self.num_qubits as u32);
        r.scaled(weight)
    }

    fn mm_rec(&mut self, p: u32, q: u32, level: u32) -> MatrixDD {
        if level == 0 {
            return MatrixDD::one();
        }
        if self.mnodes.ident(p) {
            return MatrixDD::make(q, C_ONE);
        }
        if self.mnodes.ident(q) {
            return MatrixDD::make(p, C_ONE);
        }
        if let Some(&r) = self.mm_cache.get(&(p, q)) {
            return r;
        }

        let a = self.mnodes.children(p);
        let b = self.mnodes.children(q);
        let mut children = [MatrixDD::zero(); 4];
        for i in 0..2 {
            for j in 0..2 {
                let mut sum = MatrixDD::zero();
                for k in 0..2 {
                    let x = a[i * 2 + k];
                    let y = b[k * 2 + j];
                    if x.is_zero() || y.is_zero() {
                        continue;
                    }
                    let sub = self.mm_rec(x.node, y.node, level - 1);
                    let prod = sub.scaled(x.weight * y.weight);
                    sum = self.add_m_rec(sum, prod, level - 1);
                }
                children[i * 2 + j] = sum;
            }
        }
        let r = self.mnodes.make_node(level, children);
        self.mm_cache.insert((p, q), r);
        r
    }

    /// Matrix-vector product `m · v`
    pub fn multiply_mv(&mut self, m: MatrixDD, v: VectorDD) -> VectorDD {
        if m.is_zero() || v.is_zero() {
            return VectorDD::zero();
        }
        let weight = m.weight * v.weight;
        if self.mnodes.ident(m.node) {
            return VectorDD::make(v.node, weight);
        }
        let r = self.mv_rec(m.node, v.node, self.num_qubits as u32);
        r.scaled(weight)
    }

    fn mv_rec(&mut self, p: u32, q: u32, level: u32) -> VectorDD {
        if level == 0 {
            return VectorDD::one();
        }
        if self.mnodes.ident(p) {
            return VectorDD::make(q, C_ONE);
        }
        if let Some(&r) = self.mv_cache.get(&(p, q)) {
            return r;
        }

        let a = self.mnodes.children(p);
        let v = self.vnodes.children(q);
        let mut children = [VectorDD::zero(); 2];
        for (i, child) in children.iter_mut().enumerate() {
            let mut sum = VectorDD::zero();
            for k in 0..2 {
                let x = a[i * 2 + k];
                let y = v[k];
                if x.is_zero() || y.is_zero() {
                    continue;
                }
                let sub = self.mv_rec(x.node, y.node, level - 1);
                let prod = sub.scaled(x.weight * y.weight);
                sum = self.add_v_rec(sum, prod, level - 1);
            }
            *child = sum;
        }
        let r = self.vnodes.make_node(level, children);
        self.mv_cache.insert((p, q), r);
        r
    }

    fn add_m_rec(&mut self, x: MatrixDD, y: MatrixDD, level: u32) -> MatrixDD {
        if x.is_zero() {
            return y;
        }
        if y.is_zero() {
            return x;
        }
        if x.node == y.node {
            let w = x.weight + y.weight;
            if w.norm_sqr() <= TOLERANCE * TOLERANCE {
                return MatrixDD::zero();
            }
            return MatrixDD::make(x.node, w);
        }
        let a = self.mnodes.children(x.node);
        let b = self.mnodes.children(y.node);
        let mut children = [MatrixDD::zero(); 4];
        for i in 0..4 {
            children[i] = self.add_m_rec(a[i].scaled(x.weight), b[i].scaled(y.weight), level - 1);
        }
        self.mnodes.make_node(level, children)
    }

    fn add_v_rec(&mut self, x: VectorDD, y: VectorDD, level: u32) -> VectorDD {
        if x.is_zero() {
            return y;
        }
        if y.is_zero() {
            return x;
        }
        if x.node == y.node {
            let w = x.weight + y.weight;
            if w.norm_sqr() <= TOLERANCE * TOLERANCE {
                return VectorDD::zero();
            }
            return VectorDD::make(x.node, w);
        }
        let a = self.vnodes.children(x.node);
        let b = self.vnodes.children(y.node);
        let c0 = self.add_v_rec(a[0].scaled(x.weight), b[0].scaled(y.weight), level - 1);
        let c1 = self.add_v_rec(a[1].scaled(x.weight), b[1].scaled(y.weight), level - 1);
        self.vnodes.make_node(level, [c0, c1])
    }

    /// The conjugate transpose `m†`
    pub fn conjugate_transpose(&mut self, m: MatrixDD) -> MatrixDD {
        if m.is_zero() {
            return m;
        }
        let r = self.ct_rec(m.node);
        r.scaled(m.weight.conj())
    }

    fn ct_rec(&mut self, p: u32) -> MatrixDD {
        if p == TERMINAL {
            return MatrixDD::one();
        }
        if let Some(&r) = self.ct_cache.get(&p) {
            return r;
        }
        let level = self.mnodes.level(p);
        let c = self.mnodes.children(p);
        let mut children = [MatrixDD::zero(); 4];
        for i in 0..2 {
            for j in 0..2 {
                let src = c[j * 2 + i];
                if src.is_zero() {
                    continue;
                }
                let sub = self.ct_rec(src.node);
                children[i * 2 + j] = sub.scaled(src.weight.conj());
            }
        }
        let r = self.mnodes.make_node(level, children);
        self.ct_cache.insert(p, r);
        r
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// The inner product ⟨x|y⟩
    pub fn inner_product(&self, x: VectorDD, y: VectorDD) -> Complex64 {
        if x.is_zero() || y.is_zero() {
            return C_ZERO;
        }
        let mut cache = AHashMap::new();
        x.weight.conj() * y.weight * self.ip_rec(x.node, y.node, self.num_qubits as u32, &mut cache)
    }

    fn ip_rec(
        &self,
        p: u32,
        q: u32,
        level: u32,
        cache: &mut AHashMap<(u32, u32), Complex64>,
    ) -> Complex64 {
        if level == 0 {
            return C_ONE;
        }
        if let Some(&r) = cache.get(&(p, q)) {
            return r;
        }
        let a = self.vnodes.children(p);
        let b = self.vnodes.children(q);
        let mut r = C_ZERO;
        for k in 0..2 {
            if a[k].is_zero() || b[k].is_zero() {
                continue;
            }
            r += a[k].weight.conj()
                * b[k].weight
                * self.ip_rec(a[k].node, b[k].node, level - 1, cache);
        }
        cache.insert((p, q), r);
        r
    }

    /// The trace of `m`
    pub fn trace(&self, m: MatrixDD) -> Complex64 {
        if m.is_zero() {
            return C_ZERO;
        }
        let mut cache = AHashMap::new();
        m.weight * self.trace_rec(m.node, &mut cache)
    }

    fn trace_rec(&self, p: u32, cache: &mut AHashMap<u32, Complex64>) -> Complex64 {
        if p == TERMINAL {
            return C_ONE;
        }
        if let Some(&t) = cache.get(&p) {
            return t;
        }
        let c = self.mnodes.children(p);
        let mut t = C_ZERO;
        for idx in [0, 3] {
            if !c[idx].is_zero() {
                t += c[idx].weight * self.trace_rec(c[idx].node, cache);
            }
        }
        cache.insert(p, t);
        t
    }

    /// `tr(m) / 2ⁿ`, the fidelity of `m` with the identity up to phase
    pub fn normalized_trace(&self, m: MatrixDD) -> Complex64 {
        self.trace(m) / 2f64.powi(self.num_qubits as i32)
    }

    /// Whether `m` equals the identity up to global phase, within `tol`
    ///
    /// For a product of unitaries the normalized trace has modulus 1
    /// exactly when the product is a phase times the identity, so the
    /// test is `| |tr(m)/2ⁿ| − 1 | ≤ tol`. A zero tolerance demands
    /// exact equality; numerical drift then fails the test.
    pub fn is_close_to_identity(&self, m: MatrixDD, tol: f64) -> bool {
        if m.is_zero() {
            return false;
        }
        let modulus = if self.mnodes.ident(m.node) {
            m.weight.norm()
        } else {
            self.normalized_trace(m).norm()
        };
        (modulus - 1.0).abs() <= tol
    }

    /// Whether `m` carries the structural identity flag
    ///
    /// True exactly when the diagram below the top edge is the identity
    /// matrix; the top weight (a global phase) is not inspected.
    pub fn is_identity(&self, m: MatrixDD) -> bool {
        !m.is_zero() && self.mnodes.ident(m.node)
    }

    /// Number of nodes reachable from `m`, terminal included
    pub fn size_m(&self, m: MatrixDD) -> usize {
        let mut visited = AHashSet::new();
        let mut stack = vec![m.node];
        while let Some(p) = stack.pop() {
            if !visited.insert(p) || p == TERMINAL {
                continue;
            }
            for c in self.mnodes.children(p) {
                if !c.is_zero() {
                    stack.push(c.node);
                }
            }
        }
        visited.len()
    }

    /// Number of nodes reachable from `v`, terminal included
    pub fn size_v(&self, v: VectorDD) -> usize {
        let mut visited = AHashSet::new();
        let mut stack = vec![v.node];
        while let Some(p) = stack.pop() {
            if !visited.insert(p) || p == TERMINAL {
                continue;
            }
            for c in self.vnodes.children(p) {
                if !c.is_zero() {
                    stack.push(c.node);
                }
            }
        }
        visited.len()
    }

    // ---------------------------------------------------------------
    // Ancillary and garbage reductions
    // ---------------------------------------------------------------

    /// Restrict `m` to ancillary inputs being |0⟩
    ///
    /// At every level marked in `ancillary` the |0⟩ input block replaces
    /// the whole node diagonally, so a subsequent identity check ignores
    /// how the operator acts on |1⟩ inputs of those qubits.
    pub fn reduce_ancillae(&mut self, m: MatrixDD, ancillary: &[bool]) -> MatrixDD {
        if m.is_zero() || !ancillary.iter().any(|&a| a) {
            return m;
        }
        let mut cache = AHashMap::new();
        let r = self.reduce_anc_rec(m.node, ancillary, &mut cache);
        r.scaled(m.weight)
    }

    fn reduce_anc_rec(
        &mut self,
        p: u32,
        ancillary: &[bool],
        cache: &mut AHashMap<u32, MatrixDD>,
    ) -> MatrixDD {
        if p == TERMINAL {
            return MatrixDD::one();
        }
        if let Some(&r) = cache.get(&p) {
            return r;
        }
        let level = self.mnodes.level(p);
        let c = self.mnodes.children(p);
        let mut nc = [MatrixDD::zero(); 4];
        for i in 0..4 {
            if !c[i].is_zero() {
                let sub = self.reduce_anc_rec(c[i].node, ancillary, cache);
                nc[i] = sub.scaled(c[i].weight);
            }
        }
        if ancillary[(level - 1) as usize] {
            nc = [nc[0], MatrixDD::zero(), MatrixDD::zero(), nc[0]];
        }
        let r = self.mnodes.make_node(level, nc);
        cache.insert(p, r);
        r
    }

    /// Sum out garbage output qubits of a matrix
    ///
    /// Garbage is an output-only property: at every level marked in
    /// `garbage` the two output blocks of each input column are summed
    /// into the |0⟩ output row, leaving the input columns intact. How
    /// the operator responds to those inputs stays observable; only the
    /// unread output value is erased. Comparisons must reduce both
    /// operands with the same flags.
    pub fn reduce_garbage_m(&mut self, m: MatrixDD, garbage: &[bool]) -> MatrixDD {
        if m.is_zero() || !garbage.iter().any(|&g| g) {
            return m;
        }
        let mut cache = AHashMap::new();
        let r = self.reduce_gar_m_rec(m.node, garbage, &mut cache);
        r.scaled(m.weight)
    }

    fn reduce_gar_m_rec(
        &mut self,
        p: u32,
        garbage: &[bool],
        cache: &mut AHashMap<u32, MatrixDD>,
    ) -> MatrixDD {
        if p == TERMINAL {
            return MatrixDD::one();
        }
        if let Some(&r) = cache.get(&p) {
            return r;
        }
        let level = self.mnodes.level(p);
        let c = self.mnodes.children(p);
        let mut nc = [MatrixDD::zero(); 4];
        for i in 0..4 {
            if !c[i].is_zero() {
                let sub = self.reduce_gar_m_rec(c[i].node, garbage, cache);
                nc[i] = sub.scaled(c[i].weight);
            }
        }
        if garbage[(level - 1) as usize] {
            let col0 = self.add_m_rec(nc[0], nc[2], level - 1);
            let col1 = self.add_m_rec(nc[1], nc[3], level - 1);
            nc = [col0, col1, MatrixDD::zero(), MatrixDD::zero()];
        }
        let r = self.mnodes.make_node(level, nc);
        cache.insert(p, r);
        r
    }

    /// Sum out garbage qubits of a state vector
    pub fn reduce_garbage_v(&mut self, v: VectorDD, garbage: &[bool]) -> VectorDD {
        if v.is_zero() || !garbage.iter().any(|&g| g) {
            return v;
        }
        let mut cache = AHashMap::new();
        let r = self.reduce_gar_v_rec(v.node, garbage, &mut cache);
        r.scaled(v.weight)
    }

    fn reduce_gar_v_rec(
        &mut self,
        p: u32,
        garbage: &[bool],
        cache: &mut AHashMap<u32, VectorDD>,
    ) -> VectorDD {
        if p == TERMINAL {
            return VectorDD::one();
        }
        if let Some(&r) = cache.get(&p) {
            return r;
        }
        let level = self.vnodes.level(p);
        let c = self.vnodes.children(p);
        let mut nc = [VectorDD::zero(); 2];
        for i in 0..2 {
            if !c[i].is_zero() {
                let sub = self.reduce_gar_v_rec(c[i].node, garbage, cache);
                nc[i] = sub.scaled(c[i].weight);
            }
        }
        if garbage[(level - 1) as usize] {
            let s = self.add_v_rec(nc[0], nc[1], level - 1);
            nc = [s, VectorDD::zero()];
        }
        let r = self.vnodes.make_node(level, nc);
        cache.insert(p, r);
        r
    }

    // ---------------------------------------------------------------
    // Reference counting and collection
    // ---------------------------------------------------------------

    pub fn inc_ref_m(&mut self, m: MatrixDD) {
        self.mnodes.inc_ref(m);
    }

    pub fn dec_ref_m(&mut self, m: MatrixDD) {
        self.mnodes.dec_ref(m);
    }

    pub fn inc_ref_v(&mut self, v: VectorDD) {
        self.vnodes.inc_ref(v);
    }

    pub fn dec_ref_v(&mut self, v: VectorDD) {
        self.vnodes.dec_ref(v);
    }

    /// Free dead nodes; a non-forced call only runs past a threshold
    ///
    /// Clears all compute caches first, since cached edges do not hold
    /// references. Returns the number of nodes freed.
    pub fn garbage_collect(&mut self, force: bool) -> usize {
        if !force && !self.vnodes.should_collect() && !self.mnodes.should_collect() {
            return 0;
        }
        self.mm_cache.clear();
        self.mv_cache.clear();
        self.ct_cache.clear();
        self.vnodes.garbage_collect() + self.mnodes.garbage_collect()
    }

    /// Error out if the configured node limit is exceeded
    pub fn check_node_limit(&self) -> Result<(), DdError> {
        if let Some(limit) = self.node_limit {
            if self.vnodes.live_nodes() + self.mnodes.live_nodes() > limit {
                return Err(DdError::OutOfNodes(limit));
            }
        }
        Ok(())
    }

    /// Currently allocated nodes across both stores
    pub fn live_nodes(&self) -> usize {
        self.vnodes.live_nodes() + self.mnodes.live_nodes()
    }

    pub fn active_matrix_nodes(&self) -> usize {
        self.mnodes.active_nodes()
    }

    pub fn active_vector_nodes(&self) -> usize {
        self.vnodes.active_nodes()
    }

    /// High-water mark of simultaneously referenced matrix nodes
    pub fn max_active_matrix_nodes(&self) -> usize {
        self.mnodes.max_active_nodes()
    }

    /// High-water mark of simultaneously referenced vector nodes
    pub fn max_active_vector_nodes(&self) -> usize {
        self.vnodes.max_active_nodes()
    }
}
