//! Pi-electron system perception.
//!
//! Every atom of IUPAC groups 13–17 starts out with one single-atom system
//! per free electron domain (lone pairs, radical electrons, empty orbitals).
//! Those elementary systems are then merged along bonds until nothing more
//! conjugates:
//!
//! * pass 1 pairs single electrons across bonds (one pair per pi bond, so
//!   triple and cumulated bonds yield orthogonal systems that share an atom)
//!   and fuses unsaturated systems that touch without sharing an atom;
//! * pass 2 lets a lone pair join the unsaturated systems bonded to its atom.
//!
//! Systems that share an atom never merge; they describe orthogonal orbitals
//! of that atom.

use std::sync::Arc;

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use crate::electron::ElectronSystem;
use crate::element::{iupac_group, valence_electrons};
use crate::graph::{proper_bond, MolecularGraph};
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount};

const MAX_ELECTRON_DOMAINS: usize = 7;

/// Free electron domains of one atom and the electrons to spread over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectronDomains {
    pub group: u8,
    pub free_domains: usize,
    pub num_electrons: usize,
}

/// Electron domains `atom` offers for mobile electrons, counting only the
/// bonds that belong to `graph`. `None` for atoms outside groups 13–17 and for
/// atoms whose domains are all used by bonds.
pub fn electron_domains<G>(graph: &G, atom: NodeIndex) -> Option<ElectronDomains>
where
    G: MolecularGraph,
    G::Atom: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    let data = graph.atom(atom);
    let atomic_num = data.atomic_num();
    let group = iupac_group(atomic_num)?;
    if !(13..=17).contains(&group) {
        return None;
    }

    let num_bonds = data.hydrogen_count() as usize + graph.contained_incident(atom).count();
    let charge = data.formal_charge() as i32;
    let num_domains = domain_count(group, num_bonds, charge);
    if num_bonds >= num_domains {
        return None;
    }

    let num_electrons = (valence_electrons(atomic_num) as i32 - charge - num_bonds as i32).max(0);
    Some(ElectronDomains {
        group,
        free_domains: num_domains - num_bonds,
        num_electrons: num_electrons as usize,
    })
}

/// Electron domains around an atom, counting bonds.
fn domain_count(group: u8, num_bonds: usize, charge: i32) -> usize {
    match group {
        15 if num_bonds >= 4 => 5,
        16 if num_bonds == 3 && charge == 0 => 5,
        16 if num_bonds >= 4 => 6,
        17 => match num_bonds {
            2 => 5,
            3 => 6,
            b if b >= 4 => 7,
            _ => 4,
        },
        _ => 4,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PiElectronSystemList {
    systems: Vec<ElectronSystem>,
}

impl PiElectronSystemList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph<G>(graph: &G) -> Self
    where
        G: MolecularGraph,
        G::Atom: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    {
        let mut list = Self::new();
        list.perceive(graph);
        list
    }

    /// Replaces the held systems with those perceived for `graph`.
    pub fn perceive<G>(&mut self, graph: &G)
    where
        G: MolecularGraph,
        G::Atom: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    {
        let mut merger = ElectronSystemMerger::new(graph);
        let num_start = merger.init_start_elec_systems();
        merger.merge_elec_systems();
        self.systems = merger.into_systems();
        debug!(
            atoms = graph.atom_count(),
            start_systems = num_start,
            systems = self.systems.len(),
            "perceived pi-electron systems"
        );
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ElectronSystem> {
        self.systems.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElectronSystem> {
        self.systems.iter()
    }

    pub fn systems(&self) -> &[ElectronSystem] {
        &self.systems
    }

    pub fn systems_containing(&self, atom: NodeIndex) -> impl Iterator<Item = &ElectronSystem> + '_ {
        self.systems.iter().filter(move |sys| sys.contains_atom(atom))
    }
}

impl<'a> IntoIterator for &'a PiElectronSystemList {
    type Item = &'a ElectronSystem;
    type IntoIter = std::slice::Iter<'a, ElectronSystem>;

    fn into_iter(self) -> Self::IntoIter {
        self.systems.iter()
    }
}

/// Returns the pi-electron systems cached on `mol`, perceiving and caching
/// them first if there are none or `overwrite` is set.
pub fn pi_electron_systems<A, B>(mol: &mut Mol<A, B>, overwrite: bool) -> Arc<PiElectronSystemList>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    if !overwrite {
        if let Some(cached) = &mol.cache().pi_systems {
            return Arc::clone(cached);
        }
    }
    let systems = Arc::new(PiElectronSystemList::from_graph(&*mol));
    mol.cache_mut().pi_systems = Some(Arc::clone(&systems));
    systems
}

#[derive(Debug)]
struct WorkingSystem {
    system: ElectronSystem,
    /// Holds a half-filled or empty orbital that can take part in a pi bond.
    unsaturated: bool,
}

/// Arena of candidate systems; merged-away entries become `None` so indices
/// stay valid and survivors keep their original order.
struct ElectronSystemMerger<'g, G> {
    graph: &'g G,
    working: Vec<Option<WorkingSystem>>,
}

impl<'g, G> ElectronSystemMerger<'g, G>
where
    G: MolecularGraph,
    G::Atom: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
{
    fn new(graph: &'g G) -> Self {
        Self {
            graph,
            working: Vec::new(),
        }
    }

    fn init_start_elec_systems(&mut self) -> usize {
        let graph = self.graph;
        for atom in graph.atoms() {
            if !graph.contains_atom(atom) {
                continue;
            }
            let Some(domains) = electron_domains(graph, atom) else {
                continue;
            };

            let free = domains.free_domains.min(MAX_ELECTRON_DOMAINS);
            let mut counts = [0usize; MAX_ELECTRON_DOMAINS];
            for i in 0..domains.num_electrons {
                counts[i % free] += 1;
            }

            for &count in &counts[..free] {
                let mut system = ElectronSystem::new();
                system.add_atom(atom, count);
                // An empty domain on a group 15-17 atom is a valence-shell
                // expansion slot, not an acceptor orbital.
                let unsaturated = count < 2 && !(count == 0 && domains.group >= 15);
                self.working.push(Some(WorkingSystem {
                    system,
                    unsaturated,
                }));
            }
        }
        self.working.len()
    }

    fn merge_elec_systems(&mut self) {
        loop {
            let pass1 = self.merge_elec_systems_pass1();
            let pass2 = self.merge_elec_systems_pass2();
            if !pass1 && !pass2 {
                break;
            }
        }
    }

    fn merge_elec_systems_pass1(&mut self) -> bool {
        let paired = self.pair_single_electrons();
        let fused = self.fuse_unsaturated_systems();
        paired || fused
    }

    /// Forms pi bonds: a single-electron domain on each end of a bond.
    fn pair_single_electrons(&mut self) -> bool {
        let graph = self.graph;
        let mut changed = false;
        for bond in graph.bonds() {
            let Some((a, b)) = proper_bond(graph, bond) else {
                continue;
            };
            while let (Some(i), Some(j)) = (self.single_electron_domain(a), self.single_electron_domain(b)) {
                trace!(bond = bond.index(), "paired single electrons");
                self.merge(i, j);
                changed = true;
            }
        }
        changed
    }

    fn fuse_unsaturated_systems(&mut self) -> bool {
        let mut changed = false;
        for i in 0..self.working.len() {
            if !self.is_unsaturated(i) {
                continue;
            }
            let mut j = i + 1;
            while j < self.working.len() {
                if self.can_conjugate(i, j) {
                    self.merge(i, j);
                    changed = true;
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
        }
        changed
    }

    fn merge_elec_systems_pass2(&mut self) -> bool {
        let mut changed = false;
        for d in 0..self.working.len() {
            let Some(donor) = self.lone_pair_atom(d) else {
                continue;
            };
            let acceptors: Vec<usize> = (0..self.working.len())
                .filter(|&k| k != d && self.accepts_lone_pair(k, donor))
                .collect();
            let Some((&first, rest)) = acceptors.split_first() else {
                continue;
            };

            trace!(atom = donor.index(), acceptors = acceptors.len(), "attached lone pair");
            let mut survivor = self.merge(d, first);
            for &k in rest {
                if self.working[k].is_some() && !self.overlaps(survivor, k) {
                    survivor = self.merge(survivor, k);
                }
            }
            changed = true;
        }
        changed
    }

    fn system(&self, idx: usize) -> Option<&WorkingSystem> {
        self.working[idx].as_ref()
    }

    fn is_unsaturated(&self, idx: usize) -> bool {
        self.system(idx).is_some_and(|w| w.unsaturated)
    }

    fn single_electron_domain(&self, atom: NodeIndex) -> Option<usize> {
        self.working.iter().position(|w| {
            w.as_ref().is_some_and(|w| {
                w.system.num_atoms() == 1
                    && w.system.num_electrons() == 1
                    && w.system.contains_atom(atom)
            })
        })
    }

    /// The atom of a filled single-atom domain that can donate into a
    /// neighboring system.
    fn lone_pair_atom(&self, idx: usize) -> Option<NodeIndex> {
        let w = self.system(idx)?;
        if w.unsaturated || w.system.num_atoms() != 1 || w.system.num_electrons() < 2 {
            return None;
        }
        w.system.atoms().next()
    }

    fn accepts_lone_pair(&self, idx: usize, donor: NodeIndex) -> bool {
        let Some(w) = self.system(idx) else {
            return false;
        };
        w.unsaturated
            && !w.system.contains_atom(donor)
            && self
                .graph
                .contained_incident(donor)
                .any(|(_, nbr)| w.system.contains_atom(nbr))
    }

    fn overlaps(&self, i: usize, j: usize) -> bool {
        match (self.system(i), self.system(j)) {
            (Some(a), Some(b)) => a.system.overlaps(&b.system),
            _ => false,
        }
    }

    fn can_conjugate(&self, i: usize, j: usize) -> bool {
        match (self.system(i), self.system(j)) {
            (Some(a), Some(b)) => {
                a.unsaturated
                    && b.unsaturated
                    && !a.system.overlaps(&b.system)
                    && a.system.connected(&b.system, self.graph)
            }
            _ => false,
        }
    }

    /// Merges the two systems into the lower-indexed one and returns its index.
    fn merge(&mut self, i: usize, j: usize) -> usize {
        let (keep, gone) = if i < j { (i, j) } else { (j, i) };
        let Some(absorbed) = self.working[gone].take() else {
            return keep;
        };
        match self.working[keep].as_mut() {
            Some(survivor) => {
                survivor.system.merge(&absorbed.system);
                survivor.unsaturated |= absorbed.unsaturated;
            }
            None => self.working[keep] = Some(absorbed),
        }
        keep
    }

    fn into_systems(self) -> Vec<ElectronSystem> {
        self.working
            .into_iter()
            .flatten()
            .map(|w| w.system)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Fragment;
    use crate::smiles::from_smiles;
    use crate::{Atom, Bond};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn perceive(smiles: &str) -> PiElectronSystemList {
        let mol = from_smiles(smiles).unwrap();
        PiElectronSystemList::from_graph(&mol)
    }

    /// `(num_atoms, num_electrons)` per system, in list order.
    fn shape(list: &PiElectronSystemList) -> Vec<(usize, usize)> {
        list.iter()
            .map(|s| (s.num_atoms(), s.num_electrons()))
            .collect()
    }

    #[test]
    fn empty_graph() {
        let mol = Mol::<Atom, Bond>::new();
        assert!(PiElectronSystemList::from_graph(&mol).is_empty());
    }

    #[test]
    fn saturated_carbon_has_no_systems() {
        assert!(perceive("C").is_empty());
        assert!(perceive("CC(C)(C)C").is_empty());
    }

    #[test]
    fn water_lone_pairs() {
        assert_eq!(shape(&perceive("O")), vec![(1, 2), (1, 2)]);
    }

    #[test]
    fn ethene() {
        assert_eq!(shape(&perceive("C=C")), vec![(2, 2)]);
    }

    #[test]
    fn butadiene_is_one_system() {
        assert_eq!(shape(&perceive("C=CC=C")), vec![(4, 4)]);
    }

    #[test]
    fn benzene_sextet() {
        assert_eq!(shape(&perceive("C1=CC=CC=C1")), vec![(6, 6)]);
        assert_eq!(shape(&perceive("c1ccccc1")), vec![(6, 6)]);
    }

    #[test]
    fn pyrrole_nitrogen_donates() {
        assert_eq!(shape(&perceive("C1=CC=CN1")), vec![(5, 6)]);
    }

    #[test]
    fn pyridine_lone_pair_stays_out() {
        let list = perceive("C1=CC=NC=C1");
        assert_eq!(shape(&list), vec![(6, 6), (1, 2)]);
        assert_eq!(list.systems()[1].atoms().next(), Some(n(3)));
    }

    #[test]
    fn furan_uses_one_oxygen_lone_pair() {
        assert_eq!(shape(&perceive("C1=COC=C1")), vec![(5, 6), (1, 2)]);
    }

    #[test]
    fn carboxylate_is_delocalized() {
        let list = perceive("CC(=O)[O-]");
        let main = list.iter().find(|s| s.num_atoms() > 1).unwrap();
        assert_eq!(main.num_atoms(), 3);
        assert_eq!(main.num_electrons(), 4);
        assert_eq!(main.electron_contribution(n(1)), 1);
        assert_eq!(main.electron_contribution(n(2)), 1);
        assert_eq!(main.electron_contribution(n(3)), 2);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn amide_nitrogen_conjugates_with_carbonyl() {
        let list = perceive("CC(N)=O");
        let main = list.iter().find(|s| s.num_atoms() > 1).unwrap();
        assert!(main.contains_atom(n(2)));
        assert_eq!(main.num_electrons(), 4);
    }

    #[test]
    fn allene_pi_systems_are_orthogonal() {
        let list = perceive("C=C=C");
        assert_eq!(shape(&list), vec![(2, 2), (2, 2)]);
        assert!(list.systems()[0].overlaps(&list.systems()[1]));
        assert_eq!(list.systems_containing(n(1)).count(), 2);
    }

    #[test]
    fn butatriene_outer_bonds_conjugate() {
        let list = perceive("C=C=C=C");
        let mut got = shape(&list);
        got.sort();
        assert_eq!(got, vec![(2, 2), (4, 4)]);
    }

    #[test]
    fn nitrile_has_two_pi_bonds() {
        let list = perceive("CC#N");
        assert_eq!(shape(&list), vec![(2, 2), (2, 2), (1, 2)]);
    }

    #[test]
    fn carbon_dioxide_three_center_systems() {
        let list = perceive("O=C=O");
        let three_center: Vec<_> = list.iter().filter(|s| s.num_atoms() == 3).collect();
        assert_eq!(three_center.len(), 2);
        assert!(three_center.iter().all(|s| s.num_electrons() == 4));
    }

    #[test]
    fn allyl_cation_empty_orbital() {
        assert_eq!(shape(&perceive("C=C[CH2+]")), vec![(3, 2)]);
    }

    #[test]
    fn allyl_radical() {
        assert_eq!(shape(&perceive("C=C[CH2]")), vec![(3, 3)]);
    }

    #[test]
    fn ammonium_expansion_slot_never_conjugates() {
        assert_eq!(shape(&perceive("[NH4+]")), vec![(1, 0)]);
        let list = perceive("[NH3+]C1=CC=CC=C1");
        assert_eq!(shape(&list), vec![(1, 0), (6, 6)]);
    }

    #[test]
    fn aniline_lone_pair_joins_ring() {
        assert_eq!(shape(&perceive("NC1=CC=CC=C1")), vec![(7, 8)]);
    }

    #[test]
    fn hydrazine_lone_pairs_stay_apart() {
        assert_eq!(shape(&perceive("NN")), vec![(1, 2), (1, 2)]);
    }

    #[test]
    fn ester_oxygen_bridges_carbonyl_and_ring() {
        let list = perceive("CC(=O)OC1=CC=CC=C1");
        let main = list.iter().max_by_key(|s| s.num_atoms()).unwrap();
        assert_eq!(main.num_atoms(), 9);
        assert_eq!(main.num_electrons(), 10);
    }

    #[test]
    fn domain_table() {
        assert_eq!(domain_count(14, 3, 0), 4);
        assert_eq!(domain_count(15, 3, 0), 4);
        assert_eq!(domain_count(15, 4, 1), 5);
        assert_eq!(domain_count(16, 3, 0), 5);
        assert_eq!(domain_count(16, 3, 1), 4);
        assert_eq!(domain_count(16, 4, 0), 6);
        assert_eq!(domain_count(17, 1, 0), 4);
        assert_eq!(domain_count(17, 2, 0), 5);
        assert_eq!(domain_count(17, 3, 0), 6);
        assert_eq!(domain_count(17, 5, 0), 7);
    }

    #[test]
    fn sulfone_sulfur_domains() {
        let mol = from_smiles("CS(=O)(=O)C").unwrap();
        let domains = electron_domains(&mol, n(1)).unwrap();
        assert_eq!(domains.free_domains, 2);
        assert_eq!(domains.num_electrons, 2);
    }

    #[test]
    fn electrons_are_conserved() {
        for smiles in [
            "CC(=O)[O-]",
            "C1=CC=NC=C1",
            "O=C=O",
            "CS(=O)(=O)C1=CC=CC=C1",
            "C1=COC=C1",
            "[O-][N+](=O)C1=CC=CC=C1",
            "ClC1=CC=CC=C1",
            "OP(=O)(O)O",
        ] {
            let mol = from_smiles(smiles).unwrap();
            let list = PiElectronSystemList::from_graph(&mol);
            for atom in mol.atoms() {
                let total: usize = list
                    .systems_containing(atom)
                    .map(|s| s.electron_contribution(atom))
                    .sum();
                let expected = electron_domains(&mol, atom).map_or(0, |d| d.num_electrons);
                assert_eq!(total, expected, "{smiles} atom {}", atom.index());
            }
        }
    }

    #[test]
    fn perception_is_repeatable() {
        let mol = from_smiles("CC(=O)OC1=CC=C(C=C1)C(=O)[O-]").unwrap();
        let first = PiElectronSystemList::from_graph(&mol);
        let mut second = PiElectronSystemList::new();
        second.perceive(&mol);
        second.perceive(&mol);
        assert_eq!(first, second);
    }

    #[test]
    fn fragment_counts_only_its_own_bonds() {
        let mol = from_smiles("C=CC=O").unwrap();
        let frag = Fragment::induced(&mol, [n(0), n(1)]).unwrap();
        let list = PiElectronSystemList::from_graph(&frag);
        assert_eq!(shape(&list), vec![(2, 2), (1, 1)]);
        assert!(list.iter().all(|s| !s.contains_atom(n(2))));
    }

    #[test]
    fn cached_perception() {
        let mut mol = from_smiles("C=CC=O").unwrap();
        let first = pi_electron_systems(&mut mol, false);
        assert!(Arc::ptr_eq(&first, &pi_electron_systems(&mut mol, false)));
        assert!(!Arc::ptr_eq(&first, &pi_electron_systems(&mut mol, true)));

        let cached = pi_electron_systems(&mut mol, false);
        mol.atom_mut(n(3)).formal_charge = -1;
        let recomputed = pi_electron_systems(&mut mol, false);
        assert!(!Arc::ptr_eq(&cached, &recomputed));
    }
}
