use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use senryaku::graph::ConditionOperator;
use senryaku::registry::{
    FunctionCategory, FunctionRegistry, FunctionSignature, ParamSet, ParamSpec, ParamType,
    ParamValue,
};
use senryaku::script::PRICE_SERIES;
use serde_json::{Value, json};
use std::error::Error;
use std::fs;

#[derive(Parser, Debug)]
#[command(version, about = "Generates random strategy graphs for exercising the compiler")]
struct Args {
    /// Output file path
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// Number of indicator nodes
    #[arg(short, long, default_value_t = 3)]
    indicators: usize,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Attach a risk node to the entry action
    #[arg(long)]
    risk: bool,

    /// Gate entries with a session filter
    #[arg(long)]
    session: bool,

    /// Leave out the data source so the graph fails validation
    #[arg(long)]
    broken: bool,
}

/// Accumulates nodes and edges in the editor's JSON export shape.
#[derive(Default)]
struct DocumentBuilder {
    nodes: Vec<Value>,
    edges: Vec<Value>,
}

impl DocumentBuilder {
    fn node(&mut self, id: &str, node_type: &str, label: &str, config: Value) {
        self.nodes.push(json!({
            "id": id,
            "type": node_type,
            "data": { "label": label, "config": config }
        }));
    }

    fn edge(&mut self, source: &str, target: &str) {
        let id = format!("e{}", self.edges.len() + 1);
        self.edges
            .push(json!({ "id": id, "source": source, "target": target }));
    }

    fn finish(self) -> Value {
        json!({ "nodes": self.nodes, "edges": self.edges })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let registry = FunctionRegistry::with_builtins();
    let candidates: Vec<&FunctionSignature> = registry
        .signatures()
        .filter(|s| s.category != FunctionCategory::Operator)
        .collect();

    println!("Generating strategy graph with {} indicators...", args.indicators);

    let mut doc = DocumentBuilder::default();
    if !args.broken {
        doc.node("price", "dataSource", "Price", json!({ "source": "close" }));
    }

    let mut entry_conditions = Vec::new();
    let mut exit_conditions = Vec::new();

    for i in 0..args.indicators {
        let signature = candidates
            .choose(&mut rng)
            .ok_or("registry has no indicators")?;
        let indicator_id = format!("ind{}", i + 1);
        let mut config = random_config(signature, &mut rng);
        config.insert("indicatorId".to_string(), json!(signature.name));
        doc.node(
            &indicator_id,
            "indicator",
            &format!("{} {}", signature.name.to_uppercase(), i + 1),
            Value::Object(config),
        );
        doc.edge("price", &indicator_id);

        let is_entry = i % 2 == 0;
        let operator = ConditionOperator::ALL
            .choose(&mut rng)
            .ok_or("no condition operators")?;
        let threshold = threshold_for(signature, is_entry, &mut rng);
        let condition_id = format!("cond{}", i + 1);
        let role = if is_entry { "entry" } else { "exit" };
        doc.node(
            &condition_id,
            "condition",
            &format!("{} {} {}", signature.name.to_uppercase(), operator.as_str(), i + 1),
            json!({ "operator": operator.as_str(), "threshold": threshold, "role": role }),
        );
        doc.edge(&indicator_id, &condition_id);

        if is_entry {
            entry_conditions.push(condition_id);
        } else {
            exit_conditions.push(condition_id);
        }
    }

    let quantity = rng.random_range(1..=10);
    doc.node(
        "buy",
        "action",
        "Buy",
        json!({ "orderType": "market", "quantity": quantity, "role": "entry" }),
    );
    doc.node(
        "sell",
        "action",
        "Sell",
        json!({ "orderType": "market", "quantity": quantity, "role": "exit" }),
    );
    for condition in &entry_conditions {
        doc.edge(condition, "buy");
    }
    for condition in &exit_conditions {
        doc.edge(condition, "sell");
    }

    if args.session {
        doc.node(
            "session",
            "timing",
            "Regular Hours",
            json!({ "session": "0930-1600" }),
        );
        doc.edge("session", "buy");
    }

    if args.risk {
        let stop_loss = (rng.random_range(0.5..5.0_f64) * 10.0).round() / 10.0;
        let take_profit = (stop_loss * rng.random_range(1.5..3.0_f64) * 10.0).round() / 10.0;
        doc.node(
            "risk",
            "risk",
            "Protective Exit",
            json!({ "stopLoss": stop_loss, "takeProfit": take_profit }),
        );
        doc.edge("buy", "risk");
    }

    let document = doc.finish();
    let json = serde_json::to_string_pretty(&document)?;
    fs::write(&args.output, json)?;

    println!("Successfully generated and saved graph to '{}'", args.output);
    Ok(())
}

/// Random parameter values within each parameter's range.
///
/// Falls back to the defaults when the random draw breaks a cross-parameter rule.
fn random_config(signature: &FunctionSignature, rng: &mut impl Rng) -> serde_json::Map<String, Value> {
    let mut params = ParamSet::new();
    for spec in &signature.parameters {
        params.insert(spec.name.clone(), random_value(spec, rng));
    }
    if signature.check(&params).is_err() {
        params = ParamSet::new();
        for spec in &signature.parameters {
            params.insert(spec.name.clone(), spec.default.clone());
        }
    }

    params
        .iter()
        .map(|(name, value)| {
            let raw = match value {
                ParamValue::Int(i) => json!(i),
                ParamValue::Float(f) => json!(f),
                ParamValue::Bool(b) => json!(b),
                ParamValue::Str(s) | ParamValue::Source(s) => json!(s),
            };
            (name.to_string(), raw)
        })
        .collect()
}

fn random_value(spec: &ParamSpec, rng: &mut impl Rng) -> ParamValue {
    match spec.param_type {
        ParamType::Int => {
            let min = spec.min.unwrap_or(1.0) as i64;
            let max = (spec.max.unwrap_or(200.0) as i64).min(200).max(min);
            ParamValue::Int(rng.random_range(min..=max))
        }
        ParamType::Float => {
            let default = spec.default.as_f64().unwrap_or(1.0);
            let mut value = default * rng.random_range(0.5..2.0);
            if let Some(min) = spec.min {
                value = value.max(min);
            }
            if let Some(max) = spec.max {
                value = value.min(max);
            }
            ParamValue::Float((value * 100.0).round() / 100.0)
        }
        ParamType::Bool => ParamValue::Bool(rng.random_bool(0.5)),
        ParamType::String => match spec.options.choose(rng) {
            Some(option) => ParamValue::Str(option.clone()),
            None => spec.default.clone(),
        },
        ParamType::Source => match PRICE_SERIES.choose(rng) {
            Some(series) => ParamValue::Source(series.to_string()),
            None => spec.default.clone(),
        },
    }
}

/// A threshold near the indicator's reference lines, or around zero when it has none.
fn threshold_for(signature: &FunctionSignature, is_entry: bool, rng: &mut impl Rng) -> f64 {
    let levels: Vec<f64> = signature
        .plot
        .reference_lines
        .iter()
        .map(|line| line.level)
        .collect();
    let base = match levels.as_slice() {
        [] => 0.0,
        [only] => *only,
        [upper, .., lower] => {
            if is_entry {
                *lower
            } else {
                *upper
            }
        }
    };
    base + rng.random_range(-5..=5) as f64
}
