use std::collections::VecDeque;
use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, trace};

use crate::bitset::BitSet;
use crate::graph::{cyclomatic_number, proper_bond, MolecularGraph};
use crate::mol::Mol;

const UNREACHABLE: u32 = u32::MAX;

/// One simple cycle of a molecular graph.
///
/// Atoms and bonds are stored in traversal order: `bonds()[i]` joins
/// `atoms()[i]` and `atoms()[(i + 1) % size]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingFragment {
    atoms: Vec<NodeIndex>,
    bonds: Vec<EdgeIndex>,
    bond_set: BitSet,
}

impl RingFragment {
    fn new(atoms: Vec<NodeIndex>, bonds: Vec<EdgeIndex>, bond_bound: usize) -> Self {
        let mut bond_set = BitSet::with_capacity(bond_bound);
        for bond in &bonds {
            bond_set.insert(bond.index());
        }
        Self {
            atoms,
            bonds,
            bond_set,
        }
    }

    pub fn size(&self) -> usize {
        self.bonds.len()
    }

    pub fn atoms(&self) -> &[NodeIndex] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[EdgeIndex] {
        &self.bonds
    }

    pub fn bond_set(&self) -> &BitSet {
        &self.bond_set
    }

    pub fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.atoms.contains(&atom)
    }

    pub fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bond_set.contains(bond.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingSearchConfig {
    /// Rings larger than this are neither searched for nor reported.
    /// `None` searches without limit.
    pub max_ring_size: Option<usize>,
}

/// Extended smallest set of smallest rings.
///
/// For every pair of bonds sharing an atom, the set holds a smallest simple
/// ring running through both bonds (if one exists). Fused and bridged systems
/// therefore also yield their envelope rings, e.g. naphthalene gives two
/// six-membered rings plus the ten-membered perimeter.
///
/// Rings are kept in discovery order. Discovery walks the bonds in graph
/// order and, at each shared atom, the co-bonds in ascending index order, so
/// re-perceiving an unmodified graph reproduces the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedSssr {
    rings: Vec<RingFragment>,
}

impl ExtendedSssr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph<G: MolecularGraph>(graph: &G) -> Self {
        let mut esssr = Self::new();
        esssr.perceive(graph);
        esssr
    }

    /// Replaces the held rings with those of `graph`.
    pub fn perceive<G: MolecularGraph>(&mut self, graph: &G) {
        self.perceive_with(graph, &RingSearchConfig::default());
    }

    pub fn perceive_with<G: MolecularGraph>(&mut self, graph: &G, config: &RingSearchConfig) {
        self.rings.clear();
        let mut search = RingSearch::new(graph, config);
        search.run(&mut self.rings);
        debug!(
            atoms = graph.atom_count(),
            bonds = graph.bond_count(),
            rings = self.rings.len(),
            "perceived extended SSSR"
        );
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RingFragment> {
        self.rings.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RingFragment> {
        self.rings.iter()
    }

    pub fn rings(&self) -> &[RingFragment] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains_atom(atom))
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains_bond(bond))
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains_atom(atom))
            .map(|ring| ring.size())
            .min()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&RingFragment> {
        self.rings
            .iter()
            .filter(|ring| ring.contains_atom(atom))
            .collect()
    }

    /// A smallest set of smallest rings drawn from this set: rings are taken
    /// by ascending size (discovery order among equals) while they are
    /// linearly independent over GF(2), up to the cyclomatic number of
    /// `graph`.
    ///
    /// `graph` must be the graph this set was perceived from.
    pub fn sssr<G: MolecularGraph>(&self, graph: &G) -> Vec<&RingFragment> {
        let num_needed = cyclomatic_number(graph);
        let mut by_size: Vec<&RingFragment> = self.rings.iter().collect();
        by_size.sort_by_key(|ring| ring.size());

        let mut basis: Vec<BitSet> = Vec::with_capacity(num_needed);
        let mut selected = Vec::with_capacity(num_needed);
        for ring in by_size {
            if selected.len() >= num_needed {
                break;
            }
            if try_add_to_basis(&mut basis, ring.bond_set().clone()) {
                selected.push(ring);
            }
        }
        selected
    }
}

impl<'a> IntoIterator for &'a ExtendedSssr {
    type Item = &'a RingFragment;
    type IntoIter = std::slice::Iter<'a, RingFragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.iter()
    }
}

/// Returns the extended SSSR cached on `mol`, perceiving and caching it first
/// if there is none or `overwrite` is set.
pub fn extended_sssr<A, B>(mol: &mut Mol<A, B>, overwrite: bool) -> Arc<ExtendedSssr> {
    if !overwrite {
        if let Some(cached) = &mol.cache().extended_sssr {
            return Arc::clone(cached);
        }
    }
    let rings = Arc::new(ExtendedSssr::from_graph(&*mol));
    mol.cache_mut().extended_sssr = Some(Arc::clone(&rings));
    rings
}

/// Scratch state of one perception run.
struct RingSearch<'g, G> {
    graph: &'g G,
    /// Contained, non-loop `(bond, neighbor)` pairs per atom, ascending bond index.
    adjacency: Vec<Vec<(EdgeIndex, NodeIndex)>>,
    max_ring_size: usize,
    ring_bonds: BitSet,
    curr_bond_path: BitSet,
    curr_atom_path: BitSet,
    bond_path: Vec<EdgeIndex>,
    atom_path: Vec<NodeIndex>,
    smallest_ring_size: usize,
    smallest_ring_atoms: Vec<NodeIndex>,
    smallest_ring_bonds: Vec<EdgeIndex>,
    dist_to_start: Vec<u32>,
    queue: VecDeque<NodeIndex>,
}

impl<'g, G: MolecularGraph> RingSearch<'g, G> {
    fn new(graph: &'g G, config: &RingSearchConfig) -> Self {
        let atom_bound = graph.atom_bound();
        let bond_bound = graph.bond_bound();

        let mut adjacency = vec![Vec::new(); atom_bound];
        for atom in graph.atoms() {
            if !graph.contains_atom(atom) {
                continue;
            }
            let mut incident: Vec<(EdgeIndex, NodeIndex)> = graph
                .contained_incident(atom)
                .filter(|&(_, nbr)| nbr != atom)
                .collect();
            incident.sort_by_key(|&(bond, _)| bond.index());
            adjacency[atom.index()] = incident;
        }

        Self {
            graph,
            adjacency,
            max_ring_size: config.max_ring_size.unwrap_or(usize::MAX),
            ring_bonds: BitSet::with_capacity(bond_bound),
            curr_bond_path: BitSet::with_capacity(bond_bound),
            curr_atom_path: BitSet::with_capacity(atom_bound),
            bond_path: Vec::new(),
            atom_path: Vec::new(),
            smallest_ring_size: usize::MAX,
            smallest_ring_atoms: Vec::new(),
            smallest_ring_bonds: Vec::new(),
            dist_to_start: vec![UNREACHABLE; atom_bound],
            queue: VecDeque::new(),
        }
    }

    fn run(&mut self, rings: &mut Vec<RingFragment>) {
        let bonds: Vec<EdgeIndex> = self.graph.bonds().collect();

        for bond in bonds {
            let Some((u, v)) = proper_bond(self.graph, bond) else {
                continue;
            };

            for (start, shared) in [(u, v), (v, u)] {
                // Each unordered pair of adjacent bonds is seeded once, from
                // its lower-indexed member. A co-bond leading straight back to
                // `start` is a parallel bond and cannot close a proper ring.
                let co_bonds: Vec<(EdgeIndex, NodeIndex)> = self.adjacency[shared.index()]
                    .iter()
                    .copied()
                    .filter(|&(co_bond, far)| co_bond.index() > bond.index() && far != start)
                    .collect();
                if co_bonds.is_empty() {
                    continue;
                }

                self.compute_distances(start, shared);

                for (co_bond, far) in co_bonds {
                    let dist = self.dist_to_start[far.index()];
                    if dist == UNREACHABLE {
                        continue;
                    }
                    let ring_size = dist as usize + 2;
                    if ring_size > self.max_ring_size {
                        continue;
                    }
                    if self.find_ring_containing_bonds(rings, bond, co_bond, ring_size) {
                        continue;
                    }
                    if self.find_smallest_ring(start, shared, far, bond, co_bond, ring_size) {
                        self.process_found_ring(rings);
                    }
                }
            }
        }
    }

    /// Breadth-first distances from `start` with `excluded` removed from the
    /// graph. The distance of the far end of a co-bond is then exactly the
    /// length of the shortest ring closure.
    fn compute_distances(&mut self, start: NodeIndex, excluded: NodeIndex) {
        self.dist_to_start.fill(UNREACHABLE);
        self.queue.clear();
        self.dist_to_start[start.index()] = 0;
        self.queue.push_back(start);

        while let Some(curr) = self.queue.pop_front() {
            let d = self.dist_to_start[curr.index()];
            for &(_, nbr) in &self.adjacency[curr.index()] {
                if nbr == excluded || self.dist_to_start[nbr.index()] != UNREACHABLE {
                    continue;
                }
                self.dist_to_start[nbr.index()] = d + 1;
                self.queue.push_back(nbr);
            }
        }
    }

    fn find_ring_containing_bonds(
        &self,
        rings: &[RingFragment],
        bond1: EdgeIndex,
        bond2: EdgeIndex,
        ring_size: usize,
    ) -> bool {
        if !self.ring_bonds.contains(bond1.index()) || !self.ring_bonds.contains(bond2.index()) {
            return false;
        }
        rings.iter().any(|ring| {
            ring.size() == ring_size && ring.contains_bond(bond1) && ring.contains_bond(bond2)
        })
    }

    /// Depth-first search for a ring through `start -bond- shared -co_bond- far`
    /// of at most `bound` bonds. The first ring found in neighbor order wins.
    fn find_smallest_ring(
        &mut self,
        start: NodeIndex,
        shared: NodeIndex,
        far: NodeIndex,
        bond: EdgeIndex,
        co_bond: EdgeIndex,
        bound: usize,
    ) -> bool {
        self.smallest_ring_size = bound;
        self.smallest_ring_atoms.clear();
        self.smallest_ring_bonds.clear();

        self.enter_atom(start);
        self.enter(bond, shared);
        self.enter(co_bond, far);
        let found = self.perceive_rings(far, start);
        self.leave(co_bond, far);
        self.leave(bond, shared);
        self.leave_atom(start);

        debug_assert!(self.bond_path.is_empty() && self.atom_path.is_empty());
        found
    }

    fn perceive_rings(&mut self, curr: NodeIndex, start: NodeIndex) -> bool {
        let path_len = self.bond_path.len();

        for i in 0..self.adjacency[curr.index()].len() {
            let (bond, nbr) = self.adjacency[curr.index()][i];
            if self.curr_bond_path.contains(bond.index()) {
                continue;
            }

            if nbr == start {
                if path_len + 1 <= self.smallest_ring_size {
                    self.smallest_ring_size = path_len + 1;
                    self.smallest_ring_atoms.clone_from(&self.atom_path);
                    self.smallest_ring_bonds.clone_from(&self.bond_path);
                    self.smallest_ring_bonds.push(bond);
                    return true;
                }
                continue;
            }

            if self.curr_atom_path.contains(nbr.index()) {
                continue;
            }
            let dist = self.dist_to_start[nbr.index()];
            if dist == UNREACHABLE || path_len + 1 + dist as usize > self.smallest_ring_size {
                continue;
            }

            self.enter(bond, nbr);
            let found = self.perceive_rings(nbr, start);
            self.leave(bond, nbr);
            if found {
                return true;
            }
        }
        false
    }

    fn enter_atom(&mut self, atom: NodeIndex) {
        self.curr_atom_path.insert(atom.index());
        self.atom_path.push(atom);
    }

    fn leave_atom(&mut self, atom: NodeIndex) {
        self.curr_atom_path.remove(atom.index());
        self.atom_path.pop();
    }

    fn enter(&mut self, bond: EdgeIndex, atom: NodeIndex) {
        self.curr_bond_path.insert(bond.index());
        self.bond_path.push(bond);
        self.enter_atom(atom);
    }

    fn leave(&mut self, bond: EdgeIndex, atom: NodeIndex) {
        self.leave_atom(atom);
        self.curr_bond_path.remove(bond.index());
        self.bond_path.pop();
    }

    fn process_found_ring(&mut self, rings: &mut Vec<RingFragment>) {
        let ring = RingFragment::new(
            std::mem::take(&mut self.smallest_ring_atoms),
            std::mem::take(&mut self.smallest_ring_bonds),
            self.graph.bond_bound(),
        );
        if rings.iter().any(|r| r.bond_set == ring.bond_set) {
            return;
        }
        trace!(size = ring.size(), atoms = ?ring.atoms, "accepted ring");
        self.ring_bonds.union_with(&ring.bond_set);
        rings.push(ring);
    }
}

fn try_add_to_basis(basis: &mut Vec<BitSet>, candidate: BitSet) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(pivot) = row.first_one() {
            if v.contains(pivot) {
                v.xor_with(row);
            }
        }
    }
    if v.is_clear() {
        return false;
    }
    basis.push(v);
    true
}
