//! Graph-wide requirements: a data source to trade on, unique node ids.

use crate::error::{ValidationError, ValidationWarning};
use crate::graph::{NodeKind, StrategyGraph};
use crate::validator::ValidationReport;
use ahash::AHashSet;

pub(crate) fn check_required_components(graph: &StrategyGraph, report: &mut ValidationReport) {
    if graph.count_kind(NodeKind::DataSource) == 0 {
        report.error(ValidationError::MissingDataSource);
    }
    if graph.count_kind(NodeKind::Action) == 0 {
        report.warn(ValidationWarning::NoActions);
    }

    let mut seen = AHashSet::with_capacity(graph.nodes.len());
    let mut reported = AHashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            report.error(ValidationError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }
}
