//! The read-only graph interface the perception algorithms run against.
//!
//! [`MolecularGraph`] is implemented by whole molecules ([`Mol`]) and by
//! subgraph views ([`Fragment`]). Adjacency always comes from the underlying
//! molecule; callers filter it with [`MolecularGraph::contains_atom`] and
//! [`MolecularGraph::contains_bond`], which is how a fragment hides the parts
//! of its parent it does not include.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;
use thiserror::Error;

use crate::bitset::BitSet;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("atom index {index} out of range for a molecule with {count} atoms")]
    AtomOutOfRange { index: usize, count: usize },
    #[error("bond index {index} out of range for a molecule with {count} bonds")]
    BondOutOfRange { index: usize, count: usize },
}

pub trait MolecularGraph {
    type Atom;

    fn atom_count(&self) -> usize;

    fn bond_count(&self) -> usize;

    /// Upper bound (exclusive) of atom indices; bit sets are sized by it.
    fn atom_bound(&self) -> usize;

    /// Upper bound (exclusive) of bond indices.
    fn bond_bound(&self) -> usize;

    fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_;

    fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_;

    fn contains_atom(&self, atom: NodeIndex) -> bool;

    fn contains_bond(&self, bond: EdgeIndex) -> bool;

    fn atom(&self, idx: NodeIndex) -> &Self::Atom;

    fn bond_endpoints(&self, bond: EdgeIndex) -> Option<(NodeIndex, NodeIndex)>;

    /// Incident bonds of `atom` in the underlying molecule, each paired with
    /// the atom at the other end. Not filtered by membership.
    fn incident(&self, atom: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_;

    /// Incident bonds whose bond and neighbor atom both belong to this graph.
    fn contained_incident(
        &self,
        atom: NodeIndex,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_
    where
        Self: Sized,
    {
        self.incident(atom)
            .filter(move |&(bond, nbr)| self.contains_bond(bond) && self.contains_atom(nbr))
    }
}

impl<A, B> MolecularGraph for Mol<A, B> {
    type Atom = A;

    fn atom_count(&self) -> usize {
        Mol::atom_count(self)
    }

    fn bond_count(&self) -> usize {
        Mol::bond_count(self)
    }

    fn atom_bound(&self) -> usize {
        Mol::atom_count(self)
    }

    fn bond_bound(&self) -> usize {
        Mol::bond_count(self)
    }

    fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        Mol::atoms(self)
    }

    fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        Mol::bonds(self)
    }

    fn contains_atom(&self, atom: NodeIndex) -> bool {
        atom.index() < Mol::atom_count(self)
    }

    fn contains_bond(&self, bond: EdgeIndex) -> bool {
        bond.index() < Mol::bond_count(self)
    }

    fn atom(&self, idx: NodeIndex) -> &A {
        Mol::atom(self, idx)
    }

    fn bond_endpoints(&self, bond: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        Mol::bond_endpoints(self, bond)
    }

    fn incident(&self, atom: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        Mol::incident(self, atom)
    }
}

/// A subset of a molecule's atoms and bonds, e.g. one ring system or a
/// substituent, viewed as a graph of its own.
///
/// Atoms and bonds iterate in insertion order.
#[derive(Debug, Clone)]
pub struct Fragment<'m, A, B> {
    mol: &'m Mol<A, B>,
    atom_mask: BitSet,
    bond_mask: BitSet,
    atoms: Vec<NodeIndex>,
    bonds: Vec<EdgeIndex>,
}

impl<'m, A, B> Fragment<'m, A, B> {
    pub fn new(mol: &'m Mol<A, B>) -> Self {
        Self {
            mol,
            atom_mask: BitSet::with_capacity(mol.atom_count()),
            bond_mask: BitSet::with_capacity(mol.bond_count()),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    /// The fragment spanned by `atoms` and every bond between two of them.
    pub fn induced(
        mol: &'m Mol<A, B>,
        atoms: impl IntoIterator<Item = NodeIndex>,
    ) -> Result<Self, GraphError> {
        let mut frag = Self::new(mol);
        for atom in atoms {
            frag.add_atom(atom)?;
        }
        for bond in mol.bonds() {
            if let Some((a, b)) = mol.bond_endpoints(bond) {
                if frag.atom_mask.contains(a.index()) && frag.atom_mask.contains(b.index()) {
                    frag.add_bond(bond)?;
                }
            }
        }
        Ok(frag)
    }

    pub fn mol(&self) -> &'m Mol<A, B> {
        self.mol
    }

    /// Returns `false` if the atom was already present.
    pub fn add_atom(&mut self, atom: NodeIndex) -> Result<bool, GraphError> {
        let count = self.mol.atom_count();
        if atom.index() >= count {
            return Err(GraphError::AtomOutOfRange {
                index: atom.index(),
                count,
            });
        }
        if self.atom_mask.contains(atom.index()) {
            return Ok(false);
        }
        self.atom_mask.insert(atom.index());
        self.atoms.push(atom);
        Ok(true)
    }

    /// Adds the bond together with both of its endpoint atoms.
    pub fn add_bond(&mut self, bond: EdgeIndex) -> Result<bool, GraphError> {
        let count = self.mol.bond_count();
        let (a, b) = self
            .mol
            .bond_endpoints(bond)
            .ok_or(GraphError::BondOutOfRange {
                index: bond.index(),
                count,
            })?;
        if self.bond_mask.contains(bond.index()) {
            return Ok(false);
        }
        self.add_atom(a)?;
        self.add_atom(b)?;
        self.bond_mask.insert(bond.index());
        self.bonds.push(bond);
        Ok(true)
    }
}

impl<A, B> MolecularGraph for Fragment<'_, A, B> {
    type Atom = A;

    fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    fn atom_bound(&self) -> usize {
        self.mol.atom_count()
    }

    fn bond_bound(&self) -> usize {
        self.mol.bond_count()
    }

    fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.atoms.iter().copied()
    }

    fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.bonds.iter().copied()
    }

    fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.atom_mask.contains(atom.index())
    }

    fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bond_mask.contains(bond.index())
    }

    fn atom(&self, idx: NodeIndex) -> &A {
        self.mol.atom(idx)
    }

    fn bond_endpoints(&self, bond: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.mol.bond_endpoints(bond)
    }

    fn incident(&self, atom: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.mol.incident(atom)
    }
}

/// Endpoints of `bond` if the bond and both atoms belong to `graph` and the
/// bond is not a self-loop.
pub(crate) fn proper_bond<G: MolecularGraph>(
    graph: &G,
    bond: EdgeIndex,
) -> Option<(NodeIndex, NodeIndex)> {
    if !graph.contains_bond(bond) {
        return None;
    }
    let (a, b) = graph.bond_endpoints(bond)?;
    if a == b || !graph.contains_atom(a) || !graph.contains_atom(b) {
        return None;
    }
    Some((a, b))
}

/// Independent cycle count: bonds + connected components - atoms.
///
/// Self-loops and bonds reaching outside the graph are not counted.
pub fn cyclomatic_number<G: MolecularGraph>(graph: &G) -> usize {
    let mut components: UnionFind<usize> = UnionFind::new(graph.atom_bound());
    let mut num_atoms = 0usize;
    let mut num_bonds = 0usize;
    let mut num_merges = 0usize;

    for atom in graph.atoms() {
        if graph.contains_atom(atom) {
            num_atoms += 1;
        }
    }
    for bond in graph.bonds() {
        if let Some((a, b)) = proper_bond(graph, bond) {
            num_bonds += 1;
            if components.union(a.index(), b.index()) {
                num_merges += 1;
            }
        }
    }

    let num_components = num_atoms - num_merges;
    (num_bonds + num_components).saturating_sub(num_atoms)
}
