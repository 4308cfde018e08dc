//! Typed readings of the config keys each node kind understands.

use super::definition::StrategyNode;

pub const DEFAULT_QUANTITY: f64 = 1.0;
pub const DEFAULT_SESSION: &str = "0930-1600";

/// Comparison a condition node applies between its input and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    GreaterThan,
    LessThan,
    EqualTo,
    NotEqualTo,
    CrossesAbove,
    CrossesBelow,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 6] = [
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::EqualTo,
        ConditionOperator::NotEqualTo,
        ConditionOperator::CrossesAbove,
        ConditionOperator::CrossesBelow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::EqualTo => "equal_to",
            ConditionOperator::NotEqualTo => "not_equal_to",
            ConditionOperator::CrossesAbove => "crosses_above",
            ConditionOperator::CrossesBelow => "crosses_below",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    #[default]
    Market,
    Limit,
    Stop,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Stop => "stop",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "market" => Some(OrderType::Market),
            "limit" => Some(OrderType::Limit),
            "stop" => Some(OrderType::Stop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
    Abs,
}

impl MathOperation {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "add" => Some(MathOperation::Add),
            "subtract" => Some(MathOperation::Subtract),
            "multiply" => Some(MathOperation::Multiply),
            "divide" => Some(MathOperation::Divide),
            "min" => Some(MathOperation::Min),
            "max" => Some(MathOperation::Max),
            "abs" => Some(MathOperation::Abs),
            _ => None,
        }
    }
}

/// Whether an action (and the conditions feeding it) opens or closes positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionRole {
    Entry,
    Exit,
}

impl ActionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionRole::Entry => "entry",
            ActionRole::Exit => "exit",
        }
    }

    /// An explicit `role` config key wins over the label.
    pub fn of(node: &StrategyNode) -> Option<Self> {
        Self::from_config(node).or_else(|| Self::from_label(&node.label))
    }

    pub fn from_config(node: &StrategyNode) -> Option<Self> {
        match node.config_str("role")?.to_ascii_lowercase().as_str() {
            "entry" => Some(ActionRole::Entry),
            "exit" => Some(ActionRole::Exit),
            _ => None,
        }
    }

    /// Label heuristic: "buy"/"entry" mean entry, "sell"/"exit"/"close" mean exit.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("buy") || label.contains("entry") {
            Some(ActionRole::Entry)
        } else if label.contains("sell") || label.contains("exit") || label.contains("close") {
            Some(ActionRole::Exit)
        } else {
            None
        }
    }
}

/// Percent distances of a risk node's protective orders. Non-positive values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskLevels {
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl RiskLevels {
    pub fn of(node: &StrategyNode) -> Self {
        Self {
            stop_loss: node
                .config_f64("stopLoss")
                .filter(|pct| *pct > 0.0 && *pct < 100.0),
            take_profit: node.config_f64("takeProfit").filter(|pct| *pct > 0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stop_loss.is_none() && self.take_profit.is_none()
    }
}

/// Order size of an action node, if it states a usable one.
pub fn order_quantity(node: &StrategyNode) -> Option<f64> {
    node.config_f64("quantity").filter(|q| *q > 0.0)
}
