//! Common test utilities for building strategy graphs and inspecting output.
use senryaku::prelude::*;

/// The `close` series data source every fixture starts from.
#[allow(dead_code)]
pub fn price_node() -> StrategyNode {
    StrategyNode::new("price", NodeKind::DataSource, "Price").with_config("source", "close")
}

#[allow(dead_code)]
pub fn indicator(id: &str, label: &str, indicator_id: &str) -> StrategyNode {
    StrategyNode::new(id, NodeKind::Indicator, label).with_config("indicatorId", indicator_id)
}

#[allow(dead_code)]
pub fn condition(id: &str, label: &str, operator: &str) -> StrategyNode {
    StrategyNode::new(id, NodeKind::Condition, label).with_config("operator", operator)
}

#[allow(dead_code)]
pub fn market_order(id: &str, label: &str) -> StrategyNode {
    StrategyNode::new(id, NodeKind::Action, label)
        .with_config("orderType", "market")
        .with_config("quantity", 1)
}

/// Classic RSI reversal.
///
/// Logic: `rsi < 30` -> Buy, `rsi > 70` -> Sell
#[allow(dead_code)]
pub fn rsi_graph() -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(indicator("rsi", "RSI", "rsi").with_config("period", 14))
        .add_node(condition("oversold", "Oversold", "less_than").with_config("threshold", 30))
        .add_node(condition("overbought", "Overbought", "greater_than").with_config("threshold", 70))
        .add_node(market_order("buy", "Buy"))
        .add_node(market_order("sell", "Sell"))
        .connect("price", "rsi")
        .connect("rsi", "oversold")
        .connect("rsi", "overbought")
        .connect("oversold", "buy")
        .connect("overbought", "sell");
    graph
}

/// MACD with configurable fast and slow lengths and no trading logic.
#[allow(dead_code)]
pub fn macd_graph(fast: i64, slow: i64) -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(
            indicator("macd", "MACD", "macd")
                .with_config("fastLength", fast)
                .with_config("slowLength", slow)
                .with_config("signalLength", 9),
        )
        .connect("price", "macd");
    graph
}

/// Bollinger Bands with a breakout entry on the upper band.
///
/// Logic: `bb_upper < close` -> Buy
#[allow(dead_code)]
pub fn bb_graph() -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(
            indicator("bb", "BB", "bb")
                .with_config("length", 20)
                .with_config("mult", 2.0),
        )
        .add_node(
            condition("breakout", "Breakout", "less_than")
                .with_config("output", "upper")
                .with_config("role", "entry"),
        )
        .add_node(market_order("buy", "Buy"))
        .connect("price", "bb")
        .connect("bb", "breakout")
        .connect("price", "breakout")
        .connect("breakout", "buy");
    graph
}

#[allow(dead_code)]
pub fn stoch_graph() -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(indicator("stoch", "Stoch", "stoch").with_config("kLength", 14))
        .connect("price", "stoch");
    graph
}

/// Two moving averages and a golden cross.
///
/// Logic: `ta.crossover(fast_ema, slow_ema)` -> Buy
#[allow(dead_code)]
pub fn crossover_graph() -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(indicator("fast", "Fast EMA", "ema").with_config("length", 12))
        .add_node(indicator("slow", "Slow EMA", "ema").with_config("length", 26))
        .add_node(condition("cross", "Golden Cross", "crosses_above"))
        .add_node(market_order("buy", "Buy"))
        .connect("price", "fast")
        .connect("price", "slow")
        .connect("fast", "cross")
        .connect("slow", "cross")
        .connect("cross", "buy");
    graph
}

/// Two entry and two exit conditions around an RSI and a trend filter.
///
/// Logic: `oversold and above_trend` -> Buy, `overbought or trend_break` -> Sell
#[allow(dead_code)]
pub fn multi_condition_graph() -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(indicator("rsi", "RSI", "rsi").with_config("period", 14))
        .add_node(indicator("sma", "Trend SMA", "sma").with_config("length", 200))
        .add_node(condition("oversold", "Oversold", "less_than").with_config("threshold", 30))
        .add_node(condition("above_trend", "Above Trend", "less_than"))
        .add_node(condition("overbought", "Overbought", "greater_than").with_config("threshold", 70))
        .add_node(condition("trend_break", "Trend Break", "greater_than"))
        .add_node(market_order("buy", "Buy"))
        .add_node(market_order("sell", "Sell"))
        .connect("price", "rsi")
        .connect("price", "sma")
        .connect("rsi", "oversold")
        .connect("sma", "above_trend")
        .connect("price", "above_trend")
        .connect("rsi", "overbought")
        .connect("sma", "trend_break")
        .connect("price", "trend_break")
        .connect("oversold", "buy")
        .connect("above_trend", "buy")
        .connect("overbought", "sell")
        .connect("trend_break", "sell");
    graph
}

/// Compiles with the builtin registry and default options.
#[allow(dead_code)]
pub fn compile(graph: &StrategyGraph) -> GenerationResult {
    Compiler::new().compile(graph)
}

/// Zero-based number of the first line containing `needle`.
#[allow(dead_code)]
pub fn line_of(code: &str, needle: &str) -> usize {
    code.lines()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, code))
}
