use crate::error::{EdgeEndpoint, ValidationError};
use crate::graph::GraphIndex;
use crate::validator::ValidationReport;

/// Every edge endpoint must name an existing node.
pub(crate) fn check_edges(index: &GraphIndex<'_>, report: &mut ValidationReport) {
    for edge in &index.graph().edges {
        for (endpoint, node_id) in [
            (EdgeEndpoint::Source, &edge.source),
            (EdgeEndpoint::Target, &edge.target),
        ] {
            if index.position(node_id).is_none() {
                report.error(ValidationError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    endpoint,
                    node_id: node_id.clone(),
                });
            }
        }
    }
}
