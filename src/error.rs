use crate::registry::ParamType;
use serde::Serialize;
use thiserror::Error;

/// Fatal problems found while validating a strategy graph.
///
/// Any of these aborts real emission; the compiler falls back to the minimal
/// error script and reports them in `GenerationResult::errors`.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Strategy must have at least one data source")]
    MissingDataSource,

    #[error("Node id '{node_id}' is used by more than one node")]
    DuplicateNodeId { node_id: String },

    #[error("Indicator node '{node_id}' does not specify an indicatorId")]
    MissingIndicatorId { node_id: String },

    #[error("Indicator node '{node_id}' references unknown indicator '{indicator_id}'")]
    UnknownIndicator {
        node_id: String,
        indicator_id: String,
    },

    #[error("Indicator '{indicator_id}' on node '{node_id}' is missing required parameter '{parameter}'")]
    MissingParameter {
        node_id: String,
        indicator_id: String,
        parameter: String,
    },

    #[error("Parameter '{parameter}' on node '{node_id}' must be of type {expected}, but found '{found}'")]
    InvalidParameterType {
        node_id: String,
        parameter: String,
        expected: ParamType,
        found: String,
    },

    #[error("Parameter '{parameter}' on node '{node_id}' is {value}, which is outside the allowed range {bounds}")]
    ParameterOutOfRange {
        node_id: String,
        parameter: String,
        value: f64,
        bounds: String,
    },

    #[error("Parameter '{parameter}' on node '{node_id}' has value '{value}', expected one of [{options}]")]
    InvalidEnumValue {
        node_id: String,
        parameter: String,
        value: String,
        options: String,
    },

    #[error("Indicator '{indicator_id}' on node '{node_id}' is misconfigured: {message}")]
    ParameterRule {
        node_id: String,
        indicator_id: String,
        message: String,
    },

    #[error("Condition node '{node_id}' does not specify an operator")]
    MissingOperator { node_id: String },

    #[error("Condition node '{node_id}' has invalid operator '{operator}'")]
    InvalidOperator { node_id: String, operator: String },

    #[error("Action node '{node_id}' has invalid order type '{order_type}'")]
    InvalidOrderType { node_id: String, order_type: String },

    #[error("Math node '{node_id}' has invalid operation '{operation}'")]
    InvalidMathOperation { node_id: String, operation: String },

    #[error("Edge '{edge_id}' references non-existent {endpoint} node '{node_id}'")]
    DanglingEdge {
        edge_id: String,
        endpoint: EdgeEndpoint,
        node_id: String,
    },

    #[error("Circular dependency detected involving node '{node_id}'")]
    CircularDependency { node_id: String },

    #[error("Generated code failed the structural check: {message}")]
    StructuralCheck { message: String },
}

/// Which side of an edge a referential-integrity error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEndpoint {
    Source,
    Target,
}

impl std::fmt::Display for EdgeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeEndpoint::Source => write!(f, "source"),
            EdgeEndpoint::Target => write!(f, "target"),
        }
    }
}

/// Advisory findings. Compilation proceeds and these are surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    #[error("Strategy has no action nodes; no orders will be placed")]
    NoActions,

    #[error("Indicator node '{node_id}' ({label}) is not connected to any other node")]
    UnconnectedIndicator { node_id: String, label: String },

    #[error("Condition node '{node_id}' has no connected indicator; comparing against close")]
    UnconnectedCondition { node_id: String },

    #[error("Condition node '{node_id}' has no numeric threshold")]
    MissingThreshold { node_id: String },

    #[error("Action node '{node_id}' has no quantity; defaulting to {default}")]
    MissingQuantity { node_id: String, default: f64 },

    #[error("Action node '{node_id}' has no order type; defaulting to '{default}'")]
    MissingOrderType { node_id: String, default: String },

    #[error("Action node '{node_id}' ({label}) is neither an entry nor an exit and will be skipped")]
    UnassignedAction { node_id: String, label: String },

    #[error("Action node '{node_id}' has no {role} conditions and will be skipped")]
    ActionWithoutConditions { node_id: String, role: String },

    #[error("Risk node '{node_id}' has no valid stopLoss or takeProfit percentage")]
    RiskWithoutLevels { node_id: String },

    #[error("Timing node '{node_id}' has no session; defaulting to '{default}'")]
    MissingSession { node_id: String, default: String },

    #[error("Data source node '{node_id}' uses unknown series '{source_name}'; defaulting to close")]
    UnknownSeries { node_id: String, source_name: String },
}

/// Errors that can occur when converting a custom graph format into a `StrategyGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphConversionError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' has unknown node type '{type_name}'")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("Node '{0}' config must be a JSON object")]
    InvalidConfig(String),
}
