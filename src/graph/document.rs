use super::conversion::IntoGraph;
use super::definition::{NodeConfig, NodeKind, StrategyEdge, StrategyGraph, StrategyNode};
use crate::error::GraphConversionError;
use serde::Deserialize;
use serde_json::Value;

/// Node payload as exported by the visual builder
#[derive(Debug, Deserialize, Clone)]
pub struct DocumentNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "parameters", alias = "params")]
    pub config: Option<Value>,
}

/// Builder node with its editor type name
#[derive(Debug, Deserialize, Clone)]
pub struct DocumentNode {
    pub id: String,
    #[serde(rename = "type", alias = "kind", alias = "nodeType")]
    pub node_type: String,
    pub data: DocumentNodeData,
}

/// Builder edge connecting two nodes
#[derive(Debug, Deserialize, Clone)]
pub struct DocumentEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

/// Complete graph export of the visual strategy builder
#[derive(Debug, Deserialize, Clone)]
pub struct GraphDocument {
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

impl GraphDocument {
    pub fn from_json(json: &str) -> Result<Self, GraphConversionError> {
        serde_json::from_str(json).map_err(|e| GraphConversionError::JsonParseError(e.to_string()))
    }
}

impl IntoGraph for GraphDocument {
    fn into_graph(self) -> Result<StrategyGraph, GraphConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| {
                let kind = NodeKind::parse(&raw.node_type).ok_or_else(|| {
                    GraphConversionError::UnknownNodeType {
                        node_id: raw.id.clone(),
                        type_name: raw.node_type.clone(),
                    }
                })?;
                let config = match raw.data.config {
                    None | Some(Value::Null) => NodeConfig::new(),
                    Some(Value::Object(map)) => map,
                    Some(_) => return Err(GraphConversionError::InvalidConfig(raw.id)),
                };
                Ok(StrategyNode {
                    id: raw.id,
                    kind,
                    label: raw.data.label,
                    config,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = self
            .edges
            .into_iter()
            .enumerate()
            .map(|(i, raw)| StrategyEdge {
                id: raw.id.unwrap_or_else(|| format!("e{}", i + 1)),
                source: raw.source,
                target: raw.target,
            })
            .collect();

        Ok(StrategyGraph::new(nodes, edges))
    }
}
