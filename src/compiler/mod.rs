//! The generation driver: validate, resolve, bind, emit, check.

use crate::error::{GraphConversionError, ValidationError, ValidationWarning};
use crate::graph::{GraphIndex, IntoGraph, NodeKind, StrategyGraph};
use crate::registry::{FunctionRegistry, FunctionSignature};
use crate::validator::GraphValidator;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod binder;
mod emitter;
mod fallback;
mod options;
mod resolver;
mod result;
mod roles;
mod sanity;

pub use binder::{Binding, BindingTable, InputVariable, NodeBindings, VariableBinder, sanitize};
pub use fallback::fallback_script;
pub use options::{CompilerOptions, QuantityType};
pub use resolver::resolve_order;
pub use result::{GenerationMetadata, GenerationResult};
pub use sanity::check_structure;

use emitter::Emitter;

/// Compiles strategy graphs into script source.
///
/// A compiler holds no per-call state, so one instance can serve any number of
/// compilations, from any number of threads.
///
/// ```
/// use senryaku::compiler::Compiler;
/// use senryaku::graph::{NodeKind, StrategyGraph, StrategyNode};
///
/// let mut graph = StrategyGraph::default();
/// graph
///     .add_node(StrategyNode::new("price", NodeKind::DataSource, "Price").with_config("source", "close"))
///     .add_node(
///         StrategyNode::new("rsi", NodeKind::Indicator, "RSI")
///             .with_config("indicatorId", "rsi")
///             .with_config("period", 14),
///     )
///     .connect("price", "rsi");
///
/// let result = Compiler::new().compile(&graph);
/// assert!(result.success);
/// assert!(result.code.contains("rsi = ta.rsi(close, rsi_period)"));
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<FunctionRegistry>,
    options: CompilerOptions,
}

pub struct CompilerBuilder {
    registry: FunctionRegistry,
    options: CompilerOptions,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self {
            registry: FunctionRegistry::with_builtins(),
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_strategy_name(mut self, name: impl Into<String>) -> Self {
        self.options.strategy_name = name.into();
        self
    }

    /// Replaces the whole registry, builtins included.
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Adds an indicator, replacing any entry of the same name.
    pub fn with_custom_signature(mut self, signature: FunctionSignature) -> Self {
        self.registry.register(signature);
        self
    }

    /// Lets graphs refer to `canonical` as `alias`. Unknown canonical names are ignored.
    pub fn with_indicator_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.registry.alias(alias, canonical);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            registry: Arc::new(self.registry),
            options: self.options,
        }
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// A compiler with the builtin registry and default options.
    pub fn new() -> Self {
        CompilerBuilder::new().build()
    }

    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Converts `source` into a graph and compiles it.
    pub fn compile_from<G: IntoGraph>(
        &self,
        source: G,
    ) -> Result<GenerationResult, GraphConversionError> {
        let graph = source.into_graph()?;
        Ok(self.compile(&graph))
    }

    /// Compiles one graph. Never fails: problems are reported in the result,
    /// whose `code` is then the fallback script.
    pub fn compile(&self, graph: &StrategyGraph) -> GenerationResult {
        let index = GraphIndex::new(graph);

        let report = GraphValidator::new(&self.registry).validate_index(&index);
        let mut warnings = report.warnings;
        if !report.errors.is_empty() {
            return self.fail(graph, report.errors, warnings);
        }

        let order = resolve_order(&index);
        debug!(nodes = order.len(), "resolved dependency order");

        let bindings = VariableBinder::new(&self.registry).bind(&index, &order);
        debug!(inputs = bindings.input_count(), "bound variables");

        let emission = Emitter::new(&index, &self.registry, &self.options, &bindings, &order).emit();
        warnings.extend(emission.warnings);

        if let Err(message) = check_structure(&emission.code) {
            return self.fail(
                graph,
                vec![ValidationError::StructuralCheck { message }],
                warnings,
            );
        }

        let metadata = self.metadata(graph, bindings.input_count(), &emission.code);
        info!(
            strategy = %self.options.strategy_name,
            lines = metadata.line_count,
            warnings = warnings.len(),
            "generated strategy script"
        );
        GenerationResult {
            success: true,
            code: emission.code,
            errors: Vec::new(),
            warnings,
            metadata,
        }
    }

    fn fail(
        &self,
        graph: &StrategyGraph,
        errors: Vec<ValidationError>,
        warnings: Vec<ValidationWarning>,
    ) -> GenerationResult {
        warn!(
            strategy = %self.options.strategy_name,
            errors = errors.len(),
            "strategy graph rejected; returning fallback script"
        );
        let code = fallback_script(&self.options, &errors);
        let metadata = self.metadata(graph, 0, &code);
        GenerationResult {
            success: false,
            code,
            errors,
            warnings,
            metadata,
        }
    }

    fn metadata(&self, graph: &StrategyGraph, input_count: usize, code: &str) -> GenerationMetadata {
        GenerationMetadata {
            strategy_name: self.options.strategy_name.clone(),
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            indicator_count: graph.count_kind(NodeKind::Indicator),
            condition_count: graph.count_kind(NodeKind::Condition),
            action_count: graph.count_kind(NodeKind::Action),
            risk_count: graph.count_kind(NodeKind::Risk),
            input_count,
            line_count: code.lines().count(),
            generated_at: Utc::now(),
        }
    }
}
