use serde::{Deserialize, Serialize};

/// How `default_qty_value` is interpreted by the generated strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityType {
    #[default]
    Fixed,
    Cash,
    PercentOfEquity,
}

impl QuantityType {
    pub fn as_script(&self) -> &'static str {
        match self {
            QuantityType::Fixed => "strategy.fixed",
            QuantityType::Cash => "strategy.cash",
            QuantityType::PercentOfEquity => "strategy.percent_of_equity",
        }
    }
}

/// Settings written into the `strategy(...)` declaration.
///
/// Every field has a default, so a partial JSON object is a valid options file:
///
/// ```
/// use senryaku::compiler::CompilerOptions;
///
/// let options = CompilerOptions::from_json(r#"{ "strategyName": "Mean Reversion" }"#).unwrap();
/// assert_eq!(options.strategy_name, "Mean Reversion");
/// assert_eq!(options.version, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub strategy_name: String,
    pub version: u8,
    pub overlay: bool,
    pub initial_capital: f64,
    pub default_qty_type: QuantityType,
    pub default_qty_value: f64,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strategy_name: "Generated Strategy".to_string(),
            version: 5,
            overlay: true,
            initial_capital: 10_000.0,
            default_qty_type: QuantityType::Fixed,
            default_qty_value: 1.0,
        }
    }
}

impl CompilerOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_strategy_name(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = name.into();
        self
    }
}
