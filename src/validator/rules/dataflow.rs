use crate::error::ValidationWarning;
use crate::graph::{GraphIndex, NodeKind};
use crate::validator::ValidationReport;

/// Flags nodes that take part in nothing: isolated indicators and conditions
/// without a value to compare.
pub(crate) fn check_dataflow(index: &GraphIndex<'_>, report: &mut ValidationReport) {
    for (idx, node) in index.nodes_of_kind(NodeKind::Indicator) {
        if !index.is_connected(idx) {
            report.warn(ValidationWarning::UnconnectedIndicator {
                node_id: node.id.clone(),
                label: node.label.clone(),
            });
        }
    }

    for (idx, node) in index.nodes_of_kind(NodeKind::Condition) {
        let has_value = index
            .dependencies(idx)
            .iter()
            .any(|&dep| index.node(dep).kind.produces_value());
        if !has_value {
            report.warn(ValidationWarning::UnconnectedCondition {
                node_id: node.id.clone(),
            });
        }
    }
}
