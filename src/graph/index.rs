use super::definition::{NodeKind, StrategyGraph, StrategyNode};
use ahash::AHashMap;

/// Position-based adjacency view of a `StrategyGraph`.
///
/// Node positions follow the input order. Edges whose endpoints do not resolve are
/// left out of the adjacency lists; the validator reports them separately.
pub struct GraphIndex<'a> {
    graph: &'a StrategyGraph,
    positions: AHashMap<&'a str, usize>,
    // target -> sources, in edge order
    dependencies: Vec<Vec<usize>>,
    // source -> targets, in edge order
    dependents: Vec<Vec<usize>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(graph: &'a StrategyGraph) -> Self {
        let mut positions = AHashMap::with_capacity(graph.nodes.len());
        for (idx, node) in graph.nodes.iter().enumerate() {
            // Duplicate ids resolve to their first occurrence.
            positions.entry(node.id.as_str()).or_insert(idx);
        }

        let n = graph.nodes.len();
        let mut dependencies = vec![Vec::new(); n];
        let mut dependents = vec![Vec::new(); n];
        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                positions.get(edge.source.as_str()),
                positions.get(edge.target.as_str()),
            ) else {
                continue;
            };
            dependencies[to].push(from);
            dependents[from].push(to);
        }

        Self {
            graph,
            positions,
            dependencies,
            dependents,
        }
    }

    pub fn graph(&self) -> &'a StrategyGraph {
        self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.nodes.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn node(&self, idx: usize) -> &'a StrategyNode {
        &self.graph.nodes[idx]
    }

    /// Upstream nodes whose output `idx` consumes.
    pub fn dependencies(&self, idx: usize) -> &[usize] {
        &self.dependencies[idx]
    }

    /// Downstream nodes consuming the output of `idx`.
    pub fn dependents(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    pub fn is_connected(&self, idx: usize) -> bool {
        !self.dependencies[idx].is_empty() || !self.dependents[idx].is_empty()
    }

    pub fn nodes_of_kind(
        &self,
        kind: NodeKind,
    ) -> impl Iterator<Item = (usize, &'a StrategyNode)> + '_ {
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.kind == kind)
    }
}
