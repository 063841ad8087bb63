use petgraph::graph::NodeIndex;

use crate::graph::MolecularGraph;

/// A set of atoms sharing mobile electrons, each with the number of electrons
/// it contributes.
///
/// An atom appears at most once; adding it again increases its contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElectronSystem {
    entries: Vec<(NodeIndex, usize)>,
    num_electrons: usize,
}

impl ElectronSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: NodeIndex, electrons: usize) {
        match self.entries.iter_mut().find(|(a, _)| *a == atom) {
            Some((_, count)) => *count += electrons,
            None => self.entries.push((atom, electrons)),
        }
        self.num_electrons += electrons;
    }

    pub fn num_atoms(&self) -> usize {
        self.entries.len()
    }

    pub fn num_electrons(&self) -> usize {
        self.num_electrons
    }

    /// Electrons `atom` contributes, `0` if it is not part of the system.
    pub fn electron_contribution(&self, atom: NodeIndex) -> usize {
        self.entries
            .iter()
            .find(|(a, _)| *a == atom)
            .map_or(0, |&(_, count)| count)
    }

    pub fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.entries.iter().any(|(a, _)| *a == atom)
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.entries.iter().map(|&(atom, _)| atom)
    }

    /// `(atom, electrons)` pairs in insertion order.
    pub fn entries(&self) -> &[(NodeIndex, usize)] {
        &self.entries
    }

    /// Whether the two systems have an atom in common.
    pub fn overlaps(&self, other: &ElectronSystem) -> bool {
        self.atoms().any(|atom| other.contains_atom(atom))
    }

    /// Whether some bond of `graph` joins an atom of `self` to an atom of
    /// `other`.
    pub fn connected<G: MolecularGraph>(&self, other: &ElectronSystem, graph: &G) -> bool {
        self.atoms().any(|atom| {
            graph
                .contained_incident(atom)
                .any(|(_, nbr)| nbr != atom && other.contains_atom(nbr))
        })
    }

    /// Adds all of `other`'s contributions to `self`.
    pub fn merge(&mut self, other: &ElectronSystem) {
        for &(atom, electrons) in &other.entries {
            self.add_atom(atom, electrons);
        }
    }
}
