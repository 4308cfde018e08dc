//! Structural and semantic checks run before any code is generated.
//!
//! The validator never fails: every problem it finds is collected into a
//! [`ValidationReport`], split into fatal errors and advisory warnings.

mod rules;

pub use rules::config::{ResolvedParameters, resolve_parameters};

use crate::error::{ValidationError, ValidationWarning};
use crate::graph::{GraphIndex, StrategyGraph};
use crate::registry::FunctionRegistry;
use rules::{components, config, cycles, dataflow, edges};
use serde::Serialize;
use tracing::debug;

/// Everything the validator found, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// True when no fatal error was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub(crate) fn warn(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// Runs every validation rule against a graph, using the registry as the source
/// of truth for indicator schemas.
pub struct GraphValidator<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> GraphValidator<'a> {
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, graph: &StrategyGraph) -> ValidationReport {
        self.validate_index(&GraphIndex::new(graph))
    }

    /// Checks run in a fixed order: required components, per-node config, edge
    /// integrity, cycles, then data-flow hygiene.
    pub(crate) fn validate_index(&self, index: &GraphIndex<'_>) -> ValidationReport {
        let mut report = ValidationReport::default();

        components::check_required_components(index.graph(), &mut report);
        for node in &index.graph().nodes {
            config::check_node(self.registry, node, &mut report);
        }
        edges::check_edges(index, &mut report);
        if let Some(idx) = cycles::find_cycle(index) {
            report.error(ValidationError::CircularDependency {
                node_id: index.node(idx).id.clone(),
            });
        }
        dataflow::check_dataflow(index, &mut report);

        debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated strategy graph"
        );
        report
    }
}
