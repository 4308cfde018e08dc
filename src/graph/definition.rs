use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Parameter name → value mapping carried by every node.
pub type NodeConfig = serde_json::Map<String, Value>;

/// The closed set of strategy node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    DataSource,
    Indicator,
    Condition,
    Action,
    Risk,
    Timing,
    Math,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::DataSource => "data_source",
            NodeKind::Indicator => "indicator",
            NodeKind::Condition => "condition",
            NodeKind::Action => "action",
            NodeKind::Risk => "risk",
            NodeKind::Timing => "timing",
            NodeKind::Math => "math",
        }
    }

    /// Parses the type names used by graph editors (`dataSource`, `data_source`, `risk-management`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "datasource" | "data" | "source" => Some(NodeKind::DataSource),
            "indicator" => Some(NodeKind::Indicator),
            "condition" => Some(NodeKind::Condition),
            "action" | "order" => Some(NodeKind::Action),
            "risk" | "riskmanagement" => Some(NodeKind::Risk),
            "timing" | "time" | "session" => Some(NodeKind::Timing),
            "math" | "operation" => Some(NodeKind::Math),
            _ => None,
        }
    }

    /// Kinds whose output is a series that other nodes can consume.
    pub fn produces_value(&self) -> bool {
        matches!(
            self,
            NodeKind::DataSource | NodeKind::Indicator | NodeKind::Math
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single vertex of the strategy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    #[serde(default)]
    pub config: NodeConfig,
}

impl StrategyNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            config: NodeConfig::new(),
        }
    }

    /// Builder-style helper to set one config entry.
    pub fn with_config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    /// Reads a string entry; empty strings count as absent.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config_value(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Reads a numeric entry. Numeric strings (as produced by form inputs) are accepted.
    pub fn config_f64(&self, key: &str) -> Option<f64> {
        match self.config_value(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    /// The indicator id of an Indicator node, lowercased.
    pub fn indicator_id(&self) -> Option<String> {
        self.config_str("indicatorId")
            .or_else(|| self.config_str("indicator_id"))
            .map(str::to_ascii_lowercase)
    }
}

/// A directed dependency: `target` consumes `source`'s output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl StrategyEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The complete, canonical strategy graph handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyGraph {
    pub nodes: Vec<StrategyNode>,
    #[serde(default)]
    pub edges: Vec<StrategyEdge>,
}

impl StrategyGraph {
    pub fn new(nodes: Vec<StrategyNode>, edges: Vec<StrategyEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&StrategyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn add_node(&mut self, node: StrategyNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Adds an edge with a generated id of the form `e<n>`.
    pub fn connect(&mut self, source: &str, target: &str) -> &mut Self {
        let id = format!("e{}", self.edges.len() + 1);
        self.edges.push(StrategyEdge::new(id, source, target));
        self
    }
}
