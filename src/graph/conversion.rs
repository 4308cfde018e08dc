use super::definition::StrategyGraph;
use crate::error::GraphConversionError;

/// A trait for custom data models that can be converted into a `StrategyGraph`.
///
/// This is the extension point that keeps the compiler format-agnostic: implement it
/// on whatever structure your graph editor exports and hand the result to
/// `Compiler::compile`.
///
/// # Example
///
/// ```rust,no_run
/// use senryaku::prelude::*;
/// use senryaku::error::GraphConversionError;
///
/// struct MyBlock { id: String, indicator: String, length: u32 }
/// struct MyCanvas { blocks: Vec<MyBlock> }
///
/// impl IntoGraph for MyCanvas {
///     fn into_graph(self) -> std::result::Result<StrategyGraph, GraphConversionError> {
///         let mut graph = StrategyGraph::default();
///         graph.add_node(StrategyNode::new("src", NodeKind::DataSource, "Close"));
///         for block in self.blocks {
///             graph.add_node(
///                 StrategyNode::new(&block.id, NodeKind::Indicator, &block.indicator)
///                     .with_config("indicatorId", block.indicator.clone())
///                     .with_config("length", block.length),
///             );
///             graph.connect("src", &block.id);
///         }
///         Ok(graph)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a compiler-ready strategy graph.
    fn into_graph(self) -> Result<StrategyGraph, GraphConversionError>;
}

impl IntoGraph for StrategyGraph {
    fn into_graph(self) -> Result<StrategyGraph, GraphConversionError> {
        Ok(self)
    }
}
