//! Tests for graph validation: structural errors, parameter checks and warnings.
mod common;
use common::*;
use senryaku::error::EdgeEndpoint;
use senryaku::prelude::*;
use senryaku::registry::ParamType;
use senryaku::validator::{GraphValidator, ValidationReport};

fn validate(graph: &StrategyGraph) -> ValidationReport {
    let registry = FunctionRegistry::with_builtins();
    GraphValidator::new(&registry).validate(graph)
}

fn graph_with(nodes: Vec<StrategyNode>) -> StrategyGraph {
    let mut graph = StrategyGraph::default();
    graph.add_node(price_node());
    for node in nodes {
        let id = node.id.clone();
        graph.add_node(node).connect("price", &id);
    }
    graph
}

#[test]
fn test_valid_graph_has_no_errors() {
    let report = validate(&rsi_graph());
    assert!(report.is_valid(), "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn test_empty_graph() {
    let report = validate(&StrategyGraph::default());
    assert_eq!(report.errors, vec![ValidationError::MissingDataSource]);
    assert_eq!(report.warnings, vec![ValidationWarning::NoActions]);
}

#[test]
fn test_duplicate_node_id_reported_once() {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(price_node())
        .add_node(price_node());
    let report = validate(&graph);
    assert_eq!(
        report.errors,
        vec![ValidationError::DuplicateNodeId {
            node_id: "price".to_string()
        }]
    );
}

#[test]
fn test_indicator_identity_errors() {
    let report = validate(&graph_with(vec![
        StrategyNode::new("a", NodeKind::Indicator, "A"),
        indicator("b", "B", "not_an_indicator"),
        indicator("c", "C", "crossover"),
    ]));
    assert!(report.errors.contains(&ValidationError::MissingIndicatorId {
        node_id: "a".to_string()
    }));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::UnknownIndicator { node_id, indicator_id } if node_id == "b" && indicator_id == "not_an_indicator"
    )));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::UnknownIndicator { node_id, .. } if node_id == "c"
    )));
}

#[test]
fn test_indicator_lookup_is_case_insensitive() {
    let report = validate(&graph_with(vec![indicator("r", "RSI", "RSI").with_config("period", 14)]));
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn test_missing_required_parameter() {
    let report = validate(&graph_with(vec![indicator("r", "RSI", "rsi")]));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::MissingParameter { parameter, .. } if parameter == "period"
    )));
}

#[test]
fn test_parameter_type_and_range() {
    let report = validate(&graph_with(vec![
        indicator("r", "RSI", "rsi").with_config("period", "fourteen"),
        indicator("s", "SMA", "sma").with_config("length", 0),
        indicator("e", "EMA", "ema").with_config("length", 10.5),
    ]));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::InvalidParameterType { node_id, expected: ParamType::Int, .. } if node_id == "r"
    )));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::ParameterOutOfRange { node_id, .. } if node_id == "s"
    )));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::InvalidParameterType { node_id, .. } if node_id == "e"
    )));
}

#[test]
fn test_numeric_strings_are_accepted() {
    let report = validate(&graph_with(vec![indicator("r", "RSI", "rsi").with_config("period", "14")]));
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn test_snake_case_parameter_spelling() {
    let report = validate(&graph_with(vec![
        indicator("m", "MACD", "macd")
            .with_config("fast_length", 12)
            .with_config("slow_length", 26)
            .with_config("signal_length", 9),
    ]));
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn test_condition_operator_errors() {
    let mut graph = graph_with(vec![indicator("r", "RSI", "rsi").with_config("period", 14)]);
    graph
        .add_node(StrategyNode::new("c1", NodeKind::Condition, "No Operator").with_config("threshold", 1))
        .add_node(condition("c2", "Bad Operator", "roughly_equal").with_config("threshold", 1))
        .connect("r", "c1")
        .connect("r", "c2");

    let report = validate(&graph);
    assert!(report.errors.contains(&ValidationError::MissingOperator {
        node_id: "c1".to_string()
    }));
    assert!(report.errors.contains(&ValidationError::InvalidOperator {
        node_id: "c2".to_string(),
        operator: "roughly_equal".to_string()
    }));
}

#[test]
fn test_action_checks() {
    let mut graph = rsi_graph();
    graph.nodes[4] = StrategyNode::new("buy", NodeKind::Action, "Buy");
    graph.nodes[5] = StrategyNode::new("sell", NodeKind::Action, "Sell").with_config("orderType", "iceberg");

    let report = validate(&graph);
    assert!(report.errors.contains(&ValidationError::InvalidOrderType {
        node_id: "sell".to_string(),
        order_type: "iceberg".to_string()
    }));
    assert!(report.warnings.contains(&ValidationWarning::MissingOrderType {
        node_id: "buy".to_string(),
        default: "market".to_string()
    }));
    assert!(report.warnings.contains(&ValidationWarning::MissingQuantity {
        node_id: "buy".to_string(),
        default: 1.0
    }));
}

#[test]
fn test_dangling_edges() {
    let mut graph = rsi_graph();
    graph.connect("ghost", "rsi").connect("rsi", "phantom");

    let report = validate(&graph);
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::DanglingEdge { endpoint: EdgeEndpoint::Source, node_id, .. } if node_id == "ghost"
    )));
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ValidationError::DanglingEdge { endpoint: EdgeEndpoint::Target, node_id, .. } if node_id == "phantom"
    )));
}

#[test]
fn test_self_loop_is_a_cycle() {
    let mut graph = rsi_graph();
    graph.connect("rsi", "rsi");
    let report = validate(&graph);
    assert_eq!(
        report.errors,
        vec![ValidationError::CircularDependency {
            node_id: "rsi".to_string()
        }]
    );
}

#[test]
fn test_dataflow_warnings() {
    let mut graph = StrategyGraph::default();
    graph
        .add_node(price_node())
        .add_node(indicator("lonely", "Lonely SMA", "sma").with_config("length", 10))
        .add_node(condition("blind", "Blind", "greater_than").with_config("threshold", 1));

    let report = validate(&graph);
    assert!(report.is_valid());
    assert!(report.warnings.contains(&ValidationWarning::UnconnectedIndicator {
        node_id: "lonely".to_string(),
        label: "Lonely SMA".to_string()
    }));
    assert!(report.warnings.contains(&ValidationWarning::UnconnectedCondition {
        node_id: "blind".to_string()
    }));
}

#[test]
fn test_risk_timing_and_math_checks() {
    let mut graph = rsi_graph();
    graph
        .add_node(StrategyNode::new("risk", NodeKind::Risk, "Risk").with_config("stopLoss", 150))
        .add_node(StrategyNode::new("time", NodeKind::Timing, "Hours"))
        .add_node(StrategyNode::new("m", NodeKind::Math, "Scaled").with_config("operation", "power"));

    let report = validate(&graph);
    assert!(report.errors.contains(&ValidationError::InvalidMathOperation {
        node_id: "m".to_string(),
        operation: "power".to_string()
    }));
    assert!(report.warnings.contains(&ValidationWarning::RiskWithoutLevels {
        node_id: "risk".to_string()
    }));
    assert!(report.warnings.contains(&ValidationWarning::MissingSession {
        node_id: "time".to_string(),
        default: "0930-1600".to_string()
    }));
}

#[test]
fn test_unknown_series_warns() {
    let mut graph = StrategyGraph::default();
    graph.add_node(StrategyNode::new("p", NodeKind::DataSource, "Price").with_config("source", "vwap"));
    let report = validate(&graph);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        ValidationWarning::UnknownSeries { source_name, .. } if source_name == "vwap"
    )));
}

#[test]
fn test_report_serializes_with_kind_tags() {
    let report = validate(&StrategyGraph::default());
    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["errors"][0]["kind"], "missing_data_source");
    assert_eq!(json["warnings"][0]["kind"], "no_actions");
}

#[test]
fn test_source_parameter_must_name_a_price_series() {
    for bogus in ["banana", "entry_condition"] {
        let report = validate(&graph_with(vec![
            indicator("ma", "MA", "sma")
                .with_config("length", 20)
                .with_config("source", bogus),
        ]));
        assert!(
            report.errors.iter().any(|e| matches!(
                e,
                ValidationError::InvalidEnumValue { node_id, parameter, value, .. }
                    if node_id == "ma" && parameter == "source" && value == bogus
            )),
            "{:?}",
            report.errors
        );
    }

    let report = validate(&graph_with(vec![
        indicator("ma", "MA", "sma")
            .with_config("length", 20)
            .with_config("source", "HLC3"),
    ]));
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[test]
fn test_unknown_source_fails_compilation() {
    let graph = graph_with(vec![
        indicator("ma", "MA", "sma")
            .with_config("length", 20)
            .with_config("source", "entry_condition"),
    ]);
    let result = compile(&graph);
    assert!(!result.success);
    assert!(!result.code.contains("ta.sma(entry_condition"));
}
