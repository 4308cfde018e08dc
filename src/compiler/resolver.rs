//! Dependency ordering for code emission.

use crate::graph::GraphIndex;

/// Returns node positions so that every node comes after the nodes it consumes.
///
/// Depth-first post-order over `target -> sources`: roots are visited in input
/// order and dependencies in edge order, so the result is deterministic. The
/// walk uses an explicit stack. On a cyclic graph it still terminates, by
/// skipping edges back into nodes already entered, but the order is unspecified.
pub fn resolve_order(index: &GraphIndex<'_>) -> Vec<usize> {
    let mut entered = vec![false; index.len()];
    let mut order = Vec::with_capacity(index.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..index.len() {
        if entered[root] {
            continue;
        }
        entered[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match index.dependencies(node).get(next) {
                Some(&dep) => {
                    frame.1 += 1;
                    if !entered[dep] {
                        entered[dep] = true;
                        stack.push((dep, 0));
                    }
                }
                None => {
                    order.push(node);
                    stack.pop();
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, StrategyGraph, StrategyNode};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> StrategyGraph {
        let mut graph = StrategyGraph::default();
        for id in ids {
            graph.add_node(StrategyNode::new(*id, NodeKind::Math, *id));
        }
        for (source, target) in edges {
            graph.connect(source, target);
        }
        graph
    }

    fn ids(graph: &StrategyGraph, order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| graph.nodes[i].id.clone()).collect()
    }

    #[test]
    fn test_dependencies_come_first() {
        // Consumers listed before their sources.
        let g = graph(&["cond", "rsi", "data"], &[("data", "rsi"), ("rsi", "cond")]);
        let order = resolve_order(&GraphIndex::new(&g));
        assert_eq!(ids(&g, &order), vec!["data", "rsi", "cond"]);
    }

    #[test]
    fn test_independent_nodes_keep_input_order() {
        let g = graph(&["a", "b", "c"], &[]);
        let order = resolve_order(&GraphIndex::new(&g));
        assert_eq!(ids(&g, &order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_follows_edge_order() {
        let g = graph(
            &["d", "b", "c", "a"],
            &[("a", "b"), ("a", "c"), ("c", "d"), ("b", "d")],
        );
        let order = resolve_order(&GraphIndex::new(&g));
        assert_eq!(ids(&g, &order), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_cycle_terminates_with_every_node() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let order = resolve_order(&GraphIndex::new(&g));
        assert_eq!(order.len(), 2);
    }
}
