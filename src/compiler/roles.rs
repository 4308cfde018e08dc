//! Splits conditions and actions into the entry and exit groups.

use crate::error::ValidationWarning;
use crate::graph::{ActionRole, GraphIndex, NodeKind};

/// Node positions per group, in resolved order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoleGroups {
    pub entry_conditions: Vec<usize>,
    pub exit_conditions: Vec<usize>,
    pub entry_actions: Vec<usize>,
    pub exit_actions: Vec<usize>,
}

/// Actions take their role from an explicit `role` key or their label.
/// Conditions use an explicit `role`, else the first connected action with a
/// role, else their own label. Actions without a role, or whose group has no
/// conditions, are dropped with a warning.
pub(crate) fn group_roles(
    index: &GraphIndex<'_>,
    order: &[usize],
) -> (RoleGroups, Vec<ValidationWarning>) {
    let mut groups = RoleGroups::default();
    let mut warnings = Vec::new();

    for &idx in order {
        let node = index.node(idx);
        match node.kind {
            NodeKind::Condition => {
                let role = ActionRole::from_config(node)
                    .or_else(|| {
                        index
                            .dependents(idx)
                            .iter()
                            .filter(|&&dep| index.node(dep).kind == NodeKind::Action)
                            .find_map(|&dep| ActionRole::of(index.node(dep)))
                    })
                    .or_else(|| ActionRole::from_label(&node.label));
                match role {
                    Some(ActionRole::Entry) => groups.entry_conditions.push(idx),
                    Some(ActionRole::Exit) => groups.exit_conditions.push(idx),
                    None => {}
                }
            }
            NodeKind::Action => match ActionRole::of(node) {
                Some(ActionRole::Entry) => groups.entry_actions.push(idx),
                Some(ActionRole::Exit) => groups.exit_actions.push(idx),
                None => warnings.push(ValidationWarning::UnassignedAction {
                    node_id: node.id.clone(),
                    label: node.label.clone(),
                }),
            },
            _ => {}
        }
    }

    for (conditions, actions, role) in [
        (&groups.entry_conditions, &mut groups.entry_actions, ActionRole::Entry),
        (&groups.exit_conditions, &mut groups.exit_actions, ActionRole::Exit),
    ] {
        if conditions.is_empty() {
            for &idx in actions.iter() {
                warnings.push(ValidationWarning::ActionWithoutConditions {
                    node_id: index.node(idx).id.clone(),
                    role: role.as_str().to_string(),
                });
            }
            actions.clear();
        }
    }

    (groups, warnings)
}
