use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::pi_system::PiElectronSystemList;
use crate::rings::ExtendedSssr;

/// Perception results stored alongside the graph they were computed from.
#[derive(Debug, Clone, Default)]
pub(crate) struct PerceptionCache {
    pub(crate) extended_sssr: Option<Arc<ExtendedSssr>>,
    pub(crate) pi_systems: Option<Arc<PiElectronSystemList>>,
}

impl PerceptionCache {
    fn invalidate(&mut self) {
        self.extended_sssr = None;
        self.pi_systems = None;
    }
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    cache: PerceptionCache,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            cache: PerceptionCache::default(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    /// Mutable access to an atom payload. Drops the cached pi-electron
    /// systems, which depend on charges and hydrogen counts.
    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        self.cache.pi_systems = None;
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.cache.invalidate();
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.cache.invalidate();
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    /// Incident bonds of `idx` paired with the atom on the other end.
    pub fn incident(&self, idx: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (e.id(), other)
        })
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub(crate) fn cache(&self) -> &PerceptionCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut PerceptionCache {
        &mut self.cache
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("has_extended_sssr", &self.cache.extended_sssr.is_some())
            .field("has_pi_systems", &self.cache.pi_systems.is_some())
            .finish()
    }
}
