//! Unit tests for core Senryaku functionality.
mod common;
use senryaku::compiler::{
    CompilerOptions, QuantityType, VariableBinder, check_structure, resolve_order, sanitize,
};
use senryaku::graph::{ActionRole, GraphIndex, RiskLevels};
use senryaku::prelude::*;
use senryaku::registry::{
    FunctionCategory, ParamSet, ParamValue, ReturnArity, fill_template, format_float,
    format_number, quote,
};
use senryaku::script::{ArithOp, CompareOp, ScriptExpr, ScriptWriter};
use serde_json::json;

#[test]
fn test_param_value_display() {
    assert_eq!(ParamValue::Int(14).to_string(), "14");
    assert_eq!(ParamValue::Float(2.0).to_string(), "2.0");
    assert_eq!(ParamValue::Float(0.015).to_string(), "0.015");
    assert_eq!(ParamValue::Bool(true).to_string(), "true");
    assert_eq!(ParamValue::Str("EMA".to_string()).to_string(), "\"EMA\"");
    assert_eq!(ParamValue::Source("hlc3".to_string()).to_string(), "hlc3");
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_float(3.0), "3.0");
    assert_eq!(format_float(1.5), "1.5");
    assert_eq!(format_number(30.0), "30");
    assert_eq!(format_number(-0.5), "-0.5");
    assert_eq!(quote("say \"hi\"\n"), "\"say \\\"hi\\\" \"");
}

#[test]
fn test_builtin_registry_contents() {
    let registry = FunctionRegistry::with_builtins();
    for name in [
        "sma", "ema", "wma", "rsi", "macd", "bb", "stoch", "atr", "cci", "mfi", "vwap",
        "supertrend", "crossover", "crossunder",
    ] {
        assert!(registry.contains(name), "missing builtin '{}'", name);
    }

    let macd = registry.lookup("MACD").expect("macd is registered");
    assert_eq!(macd.returns, ReturnArity::Tuple(vec!["line".into(), "signal".into(), "histogram".into()]));
    assert_eq!(macd.parameter("fastLength").map(|p| p.title.as_str()), Some("Fast Length"));

    let crossover = registry.lookup("crossover").expect("crossover is registered");
    assert_eq!(crossover.category, FunctionCategory::Operator);
}

#[test]
fn test_registry_register_replaces_and_alias_requires_target() {
    let mut registry = FunctionRegistry::with_builtins();
    let before = registry.len();
    registry.register(FunctionSignature::call("rsi", FunctionCategory::Oscillator, "my.rsi"));
    assert_eq!(registry.len(), before);

    assert!(registry.alias("relative_strength", "rsi"));
    assert!(!registry.alias("nothing", "does_not_exist"));
    let sig = registry.lookup("Relative_Strength").expect("alias resolves");
    assert_eq!(sig.render_call(&["close".to_string()]).as_deref(), Some("my.rsi(close)"));
}

#[test]
fn test_param_spec_coercion() {
    let spec = ParamSpec::int("length", 20).required().range(1.0, 100.0);
    assert_eq!(spec.coerce(&json!(14)), Ok(ParamValue::Int(14)));
    assert_eq!(spec.coerce(&json!("15")), Ok(ParamValue::Int(15)));
    assert!(spec.coerce(&json!(101)).is_err());
    assert!(spec.coerce(&json!(1.5)).is_err());
    assert!(spec.coerce(&json!(true)).is_err());

    let source = ParamSpec::source("source", "close");
    assert_eq!(source.coerce(&json!("HL2")), Ok(ParamValue::Source("hl2".to_string())));

    let choice = ParamSpec::string("maType", "SMA").options(&["SMA", "EMA"]);
    assert!(choice.coerce(&json!("EMA")).is_ok());
    assert!(choice.coerce(&json!("HMA")).is_err());
}

#[test]
fn test_custom_rule_runs_on_param_set() {
    let registry = FunctionRegistry::with_builtins();
    let macd = registry.lookup("macd").expect("macd is registered");

    let mut params = ParamSet::new();
    params.insert("fastLength", ParamValue::Int(12));
    params.insert("slowLength", ParamValue::Int(26));
    assert!(macd.check(&params).is_ok());

    params.insert("fastLength", ParamValue::Int(30));
    assert!(macd.check(&params).is_err());
    assert_eq!(params.len(), 2);
}

#[test]
fn test_fill_template() {
    let filled = fill_template("ta.sma({out:k}, {smooth}) + {missing}", |key| match key {
        "out:k" => Some("stoch_k".to_string()),
        "smooth" => Some("3".to_string()),
        _ => None,
    });
    assert_eq!(filled, "ta.sma(stoch_k, 3) + {missing}");
}

#[test]
fn test_script_expr_precedence() {
    let a = || ScriptExpr::ident("a");
    let b = || ScriptExpr::ident("b");

    let sum_times = ScriptExpr::arith(
        ArithOp::Multiply,
        ScriptExpr::arith(ArithOp::Add, a(), b()),
        ScriptExpr::Number(2.0),
    );
    assert_eq!(sum_times.to_string(), "(a + b) * 2");

    let nested_subtract = ScriptExpr::arith(
        ArithOp::Subtract,
        a(),
        ScriptExpr::arith(ArithOp::Subtract, b(), ScriptExpr::Number(1.0)),
    );
    assert_eq!(nested_subtract.to_string(), "a - (b - 1)");

    let mixed = ScriptExpr::all(vec![
        ScriptExpr::compare(CompareOp::Greater, a(), ScriptExpr::Number(30.0)),
        ScriptExpr::any(vec![b(), ScriptExpr::ident("c")]),
    ]);
    assert_eq!(mixed.to_string(), "a > 30 and (b or c)");

    assert_eq!(ScriptExpr::all(Vec::new()).to_string(), "false");
    assert_eq!(ScriptExpr::any(vec![a()]).to_string(), "a");
}

#[test]
fn test_script_writer_layout() {
    let mut writer = ScriptWriter::new();
    writer.line("x = 1");
    writer.banner("Logic");
    writer.if_block("x > 0", |w| {
        w.line("strategy.entry(\"L\", strategy.long)");
    });
    writer.blank();

    let code = writer.finish();
    let lines: Vec<&str> = code.lines().collect();
    assert_eq!(lines[0], "x = 1");
    assert_eq!(lines[1], "");
    assert_eq!(lines[3], "// LOGIC");
    assert_eq!(lines[5], "if x > 0");
    assert_eq!(lines[6], "    strategy.entry(\"L\", strategy.long)");
    assert!(code.ends_with(")\n"));
}

#[test]
fn test_sanitize() {
    assert_eq!(sanitize("Fast EMA (12)"), "fast_ema_12");
    assert_eq!(sanitize("9-period"), "_v9_period");
    assert_eq!(sanitize("???"), "");
}

#[test]
fn test_check_structure_detects_imbalance() {
    let header = "//@version=5\nstrategy(\"x\")\n";
    assert!(check_structure(&format!("{}plot(close)\n", header)).is_ok());
    assert!(check_structure(&format!("{}plot(close\n", header)).is_err());
    assert!(check_structure(&format!("{}[a, b] = f(x))\n", header)).is_err());
    assert!(check_structure(&format!("{}// (unbalanced comment\n", header)).is_ok());
    assert!(check_structure(&format!("{}t = \"(\"\n", header)).is_ok());
    assert!(check_structure("plot(close)\n").is_err());
}

#[test]
fn test_resolve_order_puts_dependencies_first() {
    let graph = common::rsi_graph();
    let index = GraphIndex::new(&graph);
    let order = resolve_order(&index);
    let position = |id: &str| {
        let idx = index.position(id).expect("node exists");
        order.iter().position(|&i| i == idx).expect("node ordered")
    };
    for edge in &graph.edges {
        assert!(position(&edge.source) < position(&edge.target));
    }
    assert_eq!(order.len(), graph.nodes.len());
}

#[test]
fn test_node_kind_parse() {
    assert_eq!(NodeKind::parse("dataSource"), Some(NodeKind::DataSource));
    assert_eq!(NodeKind::parse("data_source"), Some(NodeKind::DataSource));
    assert_eq!(NodeKind::parse("Risk-Management"), Some(NodeKind::Risk));
    assert_eq!(NodeKind::parse("widget"), None);
}

#[test]
fn test_action_roles_and_risk_levels() {
    assert_eq!(ActionRole::from_label("Buy Breakout"), Some(ActionRole::Entry));
    assert_eq!(ActionRole::from_label("Close Position"), Some(ActionRole::Exit));
    assert_eq!(ActionRole::from_label("Go Long"), None);
    assert_eq!(ActionRole::from_label("Exit Long"), Some(ActionRole::Exit));
    assert_eq!(ActionRole::from_label("Rebalance"), None);

    let explicit = StrategyNode::new("a", NodeKind::Action, "Buy").with_config("role", "exit");
    assert_eq!(ActionRole::of(&explicit), Some(ActionRole::Exit));

    let risk = StrategyNode::new("r", NodeKind::Risk, "Risk")
        .with_config("stopLoss", 0)
        .with_config("takeProfit", "3.5");
    assert_eq!(
        RiskLevels::of(&risk),
        RiskLevels {
            stop_loss: None,
            take_profit: Some(3.5)
        }
    );
}

#[test]
fn test_document_conversion() {
    let json = r#"{
        "nodes": [
            { "id": "n1", "type": "dataSource", "data": { "label": "Price", "config": { "source": "close" } } },
            { "id": "n2", "kind": "risk-management", "data": { "label": "Stops", "params": { "stopLoss": 2 } } },
            { "id": "n3", "nodeType": "timing", "data": {} }
        ],
        "edges": [
            { "id": "edge-a", "source": "n1", "target": "n2" },
            { "source": "n2", "target": "n3" }
        ]
    }"#;
    let graph = GraphDocument::from_json(json)
        .and_then(IntoGraph::into_graph)
        .expect("document converts");

    assert_eq!(graph.nodes[1].kind, NodeKind::Risk);
    assert_eq!(graph.nodes[1].config_f64("stopLoss"), Some(2.0));
    assert_eq!(graph.nodes[2].label, "");
    assert!(graph.nodes[2].config.is_empty());
    assert_eq!(graph.edges[0].id, "edge-a");
    assert_eq!(graph.edges[1].id, "e2");
}

#[test]
fn test_document_conversion_errors() {
    let unknown = r#"{ "nodes": [ { "id": "x", "type": "widget", "data": {} } ] }"#;
    let err = GraphDocument::from_json(unknown)
        .and_then(IntoGraph::into_graph)
        .unwrap_err();
    assert_eq!(
        err,
        GraphConversionError::UnknownNodeType {
            node_id: "x".to_string(),
            type_name: "widget".to_string()
        }
    );

    let bad_config = r#"{ "nodes": [ { "id": "y", "type": "indicator", "data": { "config": [1, 2] } } ] }"#;
    let err = GraphDocument::from_json(bad_config)
        .and_then(IntoGraph::into_graph)
        .unwrap_err();
    assert_eq!(err, GraphConversionError::InvalidConfig("y".to_string()));

    assert!(matches!(
        GraphDocument::from_json("{ not json"),
        Err(GraphConversionError::JsonParseError(_))
    ));
}

#[test]
fn test_compiler_options_from_json() {
    let options = CompilerOptions::from_json(
        r#"{ "strategyName": "Swing", "overlay": false, "defaultQtyType": "percent_of_equity", "defaultQtyValue": 25 }"#,
    )
    .expect("options parse");
    assert_eq!(options.strategy_name, "Swing");
    assert!(!options.overlay);
    assert_eq!(options.default_qty_type, QuantityType::PercentOfEquity);
    assert_eq!(options.default_qty_value, 25.0);
    assert_eq!(options.initial_capital, 10_000.0);

    assert_eq!(CompilerOptions::from_json("{}").expect("empty object"), CompilerOptions::default());
}

#[test]
fn test_binding_table_lookups() {
    let graph = common::rsi_graph();
    let registry = FunctionRegistry::with_builtins();
    let table = VariableBinder::new(&registry).bind_graph(&graph);

    assert_eq!(table.get("rsi").map(|b| b.primary()), Some("rsi"));
    assert_eq!(table.get("oversold").map(|b| b.primary()), Some("oversold"));
    assert_eq!(table.get("price"), None);
    assert_eq!(table.get("buy"), None);

    let inputs = table.inputs_of("rsi");
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].parameter, "period");
    assert_eq!(inputs[0].name, "rsi_period");
    assert!(table.inputs_of("missing").is_empty());

    assert_eq!(table.entries().len(), graph.nodes.len());
    assert_eq!(table.input_count(), 1);
}
