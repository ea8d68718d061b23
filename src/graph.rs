use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::AtomSpec;
use crate::bond::Bond;

/// Atoms and bonds of a compiled pattern.
///
/// Append-only: indices are handed out in insertion order and stay valid for
/// the lifetime of the graph. A bond's endpoints are reported in the order
/// they were given to [`add_bond`](Self::add_bond), so
/// [`bond_endpoints`](Self::bond_endpoints) recovers `(atom[0], atom[1])`.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternGraph {
    graph: UnGraph<AtomSpec, Bond>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &UnGraph<AtomSpec, Bond> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &AtomSpec {
        &self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &Bond {
        &self.graph[idx]
    }

    pub(crate) fn add_atom(&mut self, atom: AtomSpec) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub(crate) fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: Bond) -> EdgeIndex {
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

    /// Bonds touching `idx`, i.e. the atom's adjacency list.
    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
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
}

impl PartialEq for PatternGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        self.atoms().all(|idx| self.atom(idx) == other.atom(idx))
            && self.bonds().all(|idx| {
                self.bond(idx) == other.bond(idx)
                    && self.bond_endpoints(idx) == other.bond_endpoints(idx)
            })
    }
}

impl Eq for PatternGraph {}

impl std::fmt::Debug for PatternGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bonds: Vec<_> = self
            .bonds()
            .filter_map(|idx| self.bond_endpoints(idx))
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        f.debug_struct("PatternGraph")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("bonds", &bonds)
            .finish()
    }
}
