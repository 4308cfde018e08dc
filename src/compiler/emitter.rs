//! Turns a validated, ordered and bound graph into script source.
//!
//! Output is split into five parts: the declaration header followed by the
//! inputs, calculations, strategy logic and plots sections, each introduced by
//! a banner comment.

use super::binder::{Binding, BindingTable};
use super::options::CompilerOptions;
use super::roles::{RoleGroups, group_roles};
use crate::error::ValidationWarning;
use crate::graph::{
    ConditionOperator, DEFAULT_QUANTITY, DEFAULT_SESSION, GraphIndex, MathOperation, NodeKind,
    OrderType, RiskLevels, StrategyNode, order_quantity,
};
use crate::registry::{
    CallSyntax, FunctionRegistry, FunctionSignature, ParamSet, ParamSpec, ParamType, ParamValue,
    fill_template, format_float, format_number, quote,
};
use crate::script::{ArithOp, CompareOp, PRICE_SERIES, ScriptExpr, ScriptWriter};
use crate::validator::resolve_parameters;
use itertools::Itertools;

pub(crate) const PRICE_PLOT: &str = "plot(close, title=\"Price\", color=color.blue)";

const PALETTE: [&str; 8] = [
    "color.blue",
    "color.orange",
    "color.purple",
    "color.teal",
    "color.fuchsia",
    "color.olive",
    "color.navy",
    "color.maroon",
];

const ENTRY_MARKER: &str = "plotshape(entry_condition, title=\"Entry Signal\", location=location.belowbar, color=color.green, style=shape.triangleup, size=size.small)";
const EXIT_MARKER: &str = "plotshape(exit_condition, title=\"Exit Signal\", location=location.abovebar, color=color.red, style=shape.triangledown, size=size.small)";

/// `//@version=N` and the `strategy(...)` declaration.
pub(crate) fn write_header(writer: &mut ScriptWriter, options: &CompilerOptions) {
    writer.line(format!("//@version={}", options.version));
    writer.line(format!(
        "strategy({}, overlay={}, initial_capital={}, default_qty_type={}, default_qty_value={})",
        quote(&options.strategy_name),
        options.overlay,
        format_number(options.initial_capital),
        options.default_qty_type.as_script(),
        format_number(options.default_qty_value),
    ));
}

pub(crate) struct Emission {
    pub code: String,
    pub warnings: Vec<ValidationWarning>,
}

struct IndicatorPlan<'a> {
    signature: &'a FunctionSignature,
    values: ParamSet,
}

pub(crate) struct Emitter<'a> {
    index: &'a GraphIndex<'a>,
    registry: &'a FunctionRegistry,
    options: &'a CompilerOptions,
    bindings: &'a BindingTable,
    order: &'a [usize],
    // by node position; `None` for everything but resolvable indicators
    indicators: Vec<Option<IndicatorPlan<'a>>>,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(
        index: &'a GraphIndex<'a>,
        registry: &'a FunctionRegistry,
        options: &'a CompilerOptions,
        bindings: &'a BindingTable,
        order: &'a [usize],
    ) -> Self {
        let indicators = index
            .graph()
            .nodes
            .iter()
            .map(|node| {
                if node.kind != NodeKind::Indicator {
                    return None;
                }
                let signature = registry.lookup(&node.indicator_id()?)?;
                Some(IndicatorPlan {
                    signature,
                    values: resolve_parameters(signature, node).values,
                })
            })
            .collect();

        Self {
            index,
            registry,
            options,
            bindings,
            order,
            indicators,
        }
    }

    pub(crate) fn emit(self) -> Emission {
        let (roles, warnings) = group_roles(self.index, self.order);

        let mut writer = ScriptWriter::new();
        write_header(&mut writer, self.options);
        self.write_inputs(&mut writer);
        self.write_calculations(&mut writer);
        let (has_entry, has_exit) = self.write_logic(&mut writer, &roles);
        self.write_plots(&mut writer, has_entry, has_exit);

        Emission {
            code: writer.finish(),
            warnings,
        }
    }

    // --- Section 2: inputs ---

    fn write_inputs(&self, writer: &mut ScriptWriter) {
        writer.banner("Inputs");
        let mut written = 0;
        for &idx in self.order {
            let Some(plan) = &self.indicators[idx] else {
                continue;
            };
            let label = display_label(self.index.node(idx), plan.signature);
            for spec in &plan.signature.parameters {
                let Some(name) = self.bindings.input_at(idx, &spec.name) else {
                    continue;
                };
                let value = plan.values.get(&spec.name).unwrap_or(&spec.default);
                if let Some(line) = input_declaration(name, &label, spec, value) {
                    writer.line(line);
                    written += 1;
                }
            }
        }
        if written == 0 {
            writer.comment("No indicator inputs");
        }
    }

    // --- Section 3: calculations ---

    fn write_calculations(&self, writer: &mut ScriptWriter) {
        writer.banner("Calculations");
        let mut written = 0;
        for &idx in self.order {
            let node = self.index.node(idx);
            let lines = match node.kind {
                NodeKind::DataSource => self.security_line(idx).into_iter().collect(),
                NodeKind::Indicator => self.indicator_lines(idx),
                NodeKind::Math => match (self.bindings.at(idx), self.math_expression(idx)) {
                    (Some(binding), Some(expr)) => {
                        vec![format!("{} = {}", binding.primary(), expr)]
                    }
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            written += lines.len();
            for line in lines {
                writer.line(line);
            }
        }
        if written == 0 {
            writer.comment("Price series are used directly");
        }
    }

    fn security_line(&self, idx: usize) -> Option<String> {
        let node = self.index.node(idx);
        let timeframe = node.config_str("timeframe")?;
        let binding = self.bindings.at(idx)?;
        Some(format!(
            "{} = request.security(syminfo.tickerid, {}, {})",
            binding.primary(),
            quote(timeframe),
            series_of(node)
        ))
    }

    fn indicator_lines(&self, idx: usize) -> Vec<String> {
        let (Some(plan), Some(binding)) = (&self.indicators[idx], self.bindings.at(idx)) else {
            return Vec::new();
        };
        let args = self.indicator_arguments(idx, plan);

        match &plan.signature.syntax {
            CallSyntax::Call(_) => {
                let values: Vec<String> = args.iter().map(|(_, v)| v.clone()).collect();
                let Some(call) = plan.signature.render_call(&values) else {
                    return Vec::new();
                };
                let target = match binding {
                    Binding::Single(name) => name.clone(),
                    Binding::Tuple(outputs) => {
                        format!("[{}]", outputs.iter().map(|(_, name)| name).join(", "))
                    }
                };
                vec![format!("{} = {}", target, call)]
            }
            CallSyntax::Composite(templates) => {
                let resolve = |key: &str| match key.strip_prefix("out:") {
                    Some(suffix) => binding.output(suffix).map(str::to_string),
                    None => args.iter().find(|(name, _)| name == key).map(|(_, v)| v.clone()),
                };
                templates
                    .iter()
                    .zip(binding.identifiers())
                    .map(|(template, target)| {
                        format!("{} = {}", target, fill_template(template, &resolve))
                    })
                    .collect()
            }
        }
    }

    /// Renders each parameter as a call argument, paired with its name.
    ///
    /// Numeric and boolean parameters use their input variable. Source parameters
    /// take the upstream value nodes in edge order and fall back to the configured
    /// series. Everything else is a literal.
    fn indicator_arguments(&self, idx: usize, plan: &IndicatorPlan<'_>) -> Vec<(String, String)> {
        let mut upstream = self.upstream_values(idx).into_iter();
        plan.signature
            .parameters
            .iter()
            .map(|spec| {
                let literal = || plan.values.get(&spec.name).unwrap_or(&spec.default).to_string();
                let rendered = match spec.param_type {
                    ParamType::Source => upstream
                        .next()
                        .and_then(|dep| self.value_expr(dep, None))
                        .map(|expr| expr.to_string())
                        .unwrap_or_else(literal),
                    t if t.passes_by_input() => self
                        .bindings
                        .input_at(idx, &spec.name)
                        .map(str::to_string)
                        .unwrap_or_else(literal),
                    _ => literal(),
                };
                (spec.name.clone(), rendered)
            })
            .collect()
    }

    fn math_expression(&self, idx: usize) -> Option<ScriptExpr> {
        let node = self.index.node(idx);
        let operation = MathOperation::parse(node.config_str("operation")?)?;
        let upstream = self.upstream_values(idx);

        let left = upstream
            .first()
            .and_then(|&dep| self.value_expr(dep, None))
            .unwrap_or_else(|| ScriptExpr::ident("close"));
        let identity = match operation {
            MathOperation::Multiply | MathOperation::Divide => 1.0,
            _ => 0.0,
        };
        let right = upstream
            .get(1)
            .and_then(|&dep| self.value_expr(dep, None))
            .or_else(|| node.config_f64("value").map(ScriptExpr::Number))
            .unwrap_or(ScriptExpr::Number(identity));

        Some(match operation {
            MathOperation::Add => ScriptExpr::arith(ArithOp::Add, left, right),
            MathOperation::Subtract => ScriptExpr::arith(ArithOp::Subtract, left, right),
            MathOperation::Multiply => ScriptExpr::arith(ArithOp::Multiply, left, right),
            MathOperation::Divide => ScriptExpr::arith(ArithOp::Divide, left, right),
            MathOperation::Min => ScriptExpr::call("math.min", vec![left, right]),
            MathOperation::Max => ScriptExpr::call("math.max", vec![left, right]),
            MathOperation::Abs => ScriptExpr::call("math.abs", vec![left]),
        })
    }

    // --- Section 4: strategy logic ---

    fn write_logic(&self, writer: &mut ScriptWriter, roles: &RoleGroups) -> (bool, bool) {
        writer.banner("Strategy Logic");
        let mut wrote_any = false;

        for &idx in self.order {
            let node = self.index.node(idx);
            let expr = match node.kind {
                NodeKind::Condition => self.condition_expression(idx),
                NodeKind::Timing => session_filter(node),
                _ => continue,
            };
            if let Some(binding) = self.bindings.at(idx) {
                writer.line(format!("{} = {}", binding.primary(), expr));
                wrote_any = true;
            }
        }

        let ident_of = |idx: usize| self.bindings.at(idx).map(|b| ScriptExpr::ident(b.primary()));

        let has_entry = !roles.entry_conditions.is_empty();
        if has_entry {
            let mut terms: Vec<ScriptExpr> = roles
                .entry_conditions
                .iter()
                .filter_map(|&idx| ident_of(idx))
                .collect();
            terms.extend(
                self.order
                    .iter()
                    .filter(|&&idx| self.index.node(idx).kind == NodeKind::Timing)
                    .filter_map(|&idx| ident_of(idx)),
            );
            writer.blank();
            writer.line(format!("entry_condition = {}", ScriptExpr::all(terms)));
        }

        let has_exit = !roles.exit_conditions.is_empty();
        if has_exit {
            let terms = roles
                .exit_conditions
                .iter()
                .filter_map(|&idx| ident_of(idx))
                .collect();
            if !has_entry {
                writer.blank();
            }
            writer.line(format!("exit_condition = {}", ScriptExpr::any(terms)));
        }

        if has_entry && !roles.entry_actions.is_empty() {
            writer.blank();
            writer.if_block("entry_condition", |w| {
                for &idx in &roles.entry_actions {
                    w.line(entry_statement(self.index.node(idx)));
                }
            });
        }
        if has_exit && !roles.exit_actions.is_empty() {
            writer.blank();
            writer.if_block("exit_condition", |w| {
                for &idx in &roles.exit_actions {
                    w.line(exit_statement(self.index.node(idx)));
                }
            });
        }

        let risk_lines: Vec<String> = self
            .order
            .iter()
            .map(|&idx| self.index.node(idx))
            .filter(|node| node.kind == NodeKind::Risk)
            .filter_map(risk_statement)
            .collect();
        if !risk_lines.is_empty() {
            writer.blank();
            writer.comment("Risk management");
            for line in risk_lines {
                writer.line(line);
            }
            wrote_any = true;
        }

        if !wrote_any {
            writer.comment("No trading logic");
        }
        (has_entry, has_exit)
    }

    /// The operand is the first upstream indicator or math node, else the first
    /// data source, else `close`. It is compared against the threshold, else a
    /// second upstream value, else zero.
    fn condition_expression(&self, idx: usize) -> ScriptExpr {
        let node = self.index.node(idx);
        let upstream = self.upstream_values(idx);
        let kind_of = |dep: usize| self.index.node(dep).kind;

        let primary = upstream
            .iter()
            .copied()
            .find(|&dep| matches!(kind_of(dep), NodeKind::Indicator | NodeKind::Math))
            .or_else(|| {
                upstream
                    .iter()
                    .copied()
                    .find(|&dep| kind_of(dep) == NodeKind::DataSource)
            });

        let left = primary
            .and_then(|dep| self.value_expr(dep, node.config_str("output")))
            .unwrap_or_else(|| ScriptExpr::ident("close"));
        let right = match node.config_f64("threshold") {
            Some(threshold) => ScriptExpr::Number(threshold),
            None => upstream
                .iter()
                .copied()
                .find(|&dep| Some(dep) != primary)
                .and_then(|dep| self.value_expr(dep, None))
                .unwrap_or(ScriptExpr::Number(0.0)),
        };

        let operator = node
            .config_str("operator")
            .and_then(ConditionOperator::parse)
            .unwrap_or(ConditionOperator::GreaterThan);
        match operator {
            ConditionOperator::GreaterThan => ScriptExpr::compare(CompareOp::Greater, left, right),
            ConditionOperator::LessThan => ScriptExpr::compare(CompareOp::Less, left, right),
            ConditionOperator::EqualTo => ScriptExpr::compare(CompareOp::Equal, left, right),
            ConditionOperator::NotEqualTo => ScriptExpr::compare(CompareOp::NotEqual, left, right),
            ConditionOperator::CrossesAbove => {
                ScriptExpr::call(self.operator_function("crossover"), vec![left, right])
            }
            ConditionOperator::CrossesBelow => {
                ScriptExpr::call(self.operator_function("crossunder"), vec![left, right])
            }
        }
    }

    fn operator_function(&self, name: &str) -> String {
        match self.registry.lookup(name).map(|sig| &sig.syntax) {
            Some(CallSyntax::Call(function)) => function.clone(),
            _ => format!("ta.{}", name),
        }
    }

    // --- Section 5: plots ---

    /// Indicator plots, then signal markers. Markers are drawn from the combined
    /// `entry_condition`/`exit_condition` variables, so a condition feeding no
    /// entry or exit action gets no marker.
    fn write_plots(&self, writer: &mut ScriptWriter, has_entry: bool, has_exit: bool) {
        writer.banner("Plots");
        let mut plotted = 0;

        for &idx in self.order {
            let Some(plan) = &self.indicators[idx] else {
                continue;
            };
            let profile = &plan.signature.plot;
            let Some(binding) = self.bindings.at(idx).filter(|_| !profile.hidden) else {
                continue;
            };

            let label = display_label(self.index.node(idx), plan.signature);
            let series: Vec<(String, &str, bool)> = match binding {
                Binding::Single(name) => vec![(label.clone(), name.as_str(), false)],
                Binding::Tuple(outputs) => outputs
                    .iter()
                    .map(|(suffix, name)| {
                        (
                            format!("{} {}", label, suffix),
                            name.as_str(),
                            profile.histogram_outputs.contains(suffix),
                        )
                    })
                    .collect(),
            };
            for (title, name, histogram) in series {
                let color = PALETTE[plotted % PALETTE.len()];
                let style = if histogram { ", style=plot.style_columns" } else { "" };
                writer.line(format!(
                    "plot({}, title={}, color={}{})",
                    name,
                    quote(&title),
                    color,
                    style
                ));
                plotted += 1;
            }
            for reference in &profile.reference_lines {
                writer.line(format!(
                    "hline({}, title={}, color={}, linestyle=hline.style_dashed)",
                    format_number(reference.level),
                    quote(&reference.title),
                    reference.color
                ));
            }
        }

        if plotted == 0 {
            writer.line(PRICE_PLOT);
        }
        if has_entry {
            writer.line(ENTRY_MARKER);
        }
        if has_exit {
            writer.line(EXIT_MARKER);
        }
    }

    // --- Value lookup ---

    /// Upstream nodes producing a series, in edge order.
    fn upstream_values(&self, idx: usize) -> Vec<usize> {
        self.index
            .dependencies(idx)
            .iter()
            .copied()
            .filter(|&dep| self.index.node(dep).kind.produces_value())
            .collect()
    }

    /// The expression a consumer uses to read a value node. `output` picks a
    /// tuple output by suffix; unknown suffixes fall back to the primary one.
    fn value_expr(&self, idx: usize, output: Option<&str>) -> Option<ScriptExpr> {
        let node = self.index.node(idx);
        match node.kind {
            NodeKind::DataSource => Some(match self.bindings.at(idx) {
                Some(binding) => ScriptExpr::ident(binding.primary()),
                None => ScriptExpr::ident(series_of(node)),
            }),
            NodeKind::Indicator | NodeKind::Math => self.bindings.at(idx).map(|binding| {
                let name = output
                    .and_then(|suffix| binding.output(suffix))
                    .unwrap_or_else(|| binding.primary());
                ScriptExpr::ident(name)
            }),
            _ => None,
        }
    }
}

fn display_label(node: &StrategyNode, signature: &FunctionSignature) -> String {
    match node.label.trim() {
        "" => signature.name.to_uppercase(),
        label => label.to_string(),
    }
}

fn input_declaration(name: &str, label: &str, spec: &ParamSpec, value: &ParamValue) -> Option<String> {
    let function = spec.param_type.input_function()?;
    let mut args = vec![
        value.to_string(),
        format!("title={}", quote(&format!("{} {}", label, spec.title))),
    ];

    let render_bound = |v: f64| match spec.param_type {
        ParamType::Float => format_float(v),
        _ => format_number(v),
    };
    if matches!(spec.param_type, ParamType::Int | ParamType::Float) {
        if let Some(min) = spec.min {
            args.push(format!("minval={}", render_bound(min)));
        }
        if let Some(max) = spec.max {
            args.push(format!("maxval={}", render_bound(max)));
        }
        if let Some(step) = spec.step {
            args.push(format!("step={}", render_bound(step)));
        }
    }
    if !spec.options.is_empty() {
        args.push(format!(
            "options=[{}]",
            spec.options.iter().map(|o| quote(o)).join(", ")
        ));
    }

    Some(format!("{} = {}({})", name, function, args.join(", ")))
}

/// The price series a data source selects; unknown names read `close`.
fn series_of(node: &StrategyNode) -> String {
    node.config_str("source")
        .map(str::to_ascii_lowercase)
        .filter(|s| PRICE_SERIES.contains(&s.as_str()))
        .unwrap_or_else(|| "close".to_string())
}

fn session_filter(node: &StrategyNode) -> ScriptExpr {
    let session = node.config_str("session").unwrap_or(DEFAULT_SESSION);
    let in_session = ScriptExpr::call(
        "time",
        vec![
            ScriptExpr::ident("timeframe.period"),
            ScriptExpr::Str(session.to_string()),
        ],
    );
    ScriptExpr::Not(Box::new(ScriptExpr::call("na", vec![in_session])))
}

fn node_label(node: &StrategyNode, fallback: &str) -> String {
    match node.label.trim() {
        "" => fallback.to_string(),
        label => label.to_string(),
    }
}

fn entry_statement(node: &StrategyNode) -> String {
    let quantity = order_quantity(node).unwrap_or(DEFAULT_QUANTITY);
    let mut args = vec![
        quote(&node_label(node, "Entry")),
        "strategy.long".to_string(),
        format!("qty={}", format_number(quantity)),
    ];

    let price = || {
        node.config_f64("price")
            .map(format_number)
            .unwrap_or_else(|| "close".to_string())
    };
    let order_type = node
        .config_str("orderType")
        .and_then(OrderType::parse)
        .unwrap_or_default();
    match order_type {
        OrderType::Market => {}
        OrderType::Limit => args.push(format!("limit={}", price())),
        OrderType::Stop => args.push(format!("stop={}", price())),
    }

    format!("strategy.entry({})", args.join(", "))
}

fn exit_statement(node: &StrategyNode) -> String {
    format!(
        "strategy.close_all(comment={})",
        quote(&node_label(node, "Exit"))
    )
}

/// `strategy.exit` with stop and limit levels relative to the average entry price.
fn risk_statement(node: &StrategyNode) -> Option<String> {
    let levels = RiskLevels::of(node);
    if levels.is_empty() {
        return None;
    }

    let relative = |signed_pct: f64| {
        ScriptExpr::arith(
            ArithOp::Multiply,
            ScriptExpr::ident("strategy.position_avg_price"),
            ScriptExpr::Number(percent_factor(signed_pct)),
        )
    };
    let mut args = vec![quote(&node_label(node, "Risk Management"))];
    if let Some(pct) = levels.stop_loss {
        args.push(format!("stop={}", relative(-pct)));
    }
    if let Some(pct) = levels.take_profit {
        args.push(format!("limit={}", relative(pct)));
    }
    Some(format!("strategy.exit({})", args.join(", ")))
}

/// `1 + pct / 100`, rounded so that e.g. 7% prints as `0.93` rather than a
/// binary-fraction artifact.
fn percent_factor(signed_pct: f64) -> f64 {
    ((1.0 + signed_pct / 100.0) * 1e10).round() / 1e10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_factor() {
        assert_eq!(percent_factor(-2.0), 0.98);
        assert_eq!(percent_factor(-7.0), 0.93);
        assert_eq!(percent_factor(4.0), 1.04);
    }

    #[test]
    fn test_entry_statement_order_types() {
        let market = StrategyNode::new("a", NodeKind::Action, "Buy").with_config("quantity", 5);
        assert_eq!(
            entry_statement(&market),
            "strategy.entry(\"Buy\", strategy.long, qty=5)"
        );

        let limit = StrategyNode::new("b", NodeKind::Action, "Buy Dip")
            .with_config("orderType", "limit")
            .with_config("price", 101.5);
        assert_eq!(
            entry_statement(&limit),
            "strategy.entry(\"Buy Dip\", strategy.long, qty=1, limit=101.5)"
        );

        let stop = StrategyNode::new("c", NodeKind::Action, "").with_config("orderType", "stop");
        assert_eq!(
            entry_statement(&stop),
            "strategy.entry(\"Entry\", strategy.long, qty=1, stop=close)"
        );
    }

    #[test]
    fn test_session_filter() {
        let node = StrategyNode::new("t", NodeKind::Timing, "Session");
        assert_eq!(
            session_filter(&node).to_string(),
            "not na(time(timeframe.period, \"0930-1600\"))"
        );
    }

    #[test]
    fn test_risk_statement() {
        let node = StrategyNode::new("r", NodeKind::Risk, "Protect")
            .with_config("stopLoss", 2)
            .with_config("takeProfit", "4");
        assert_eq!(
            risk_statement(&node).as_deref(),
            Some("strategy.exit(\"Protect\", stop=strategy.position_avg_price * 0.98, limit=strategy.position_avg_price * 1.04)")
        );
        let empty = StrategyNode::new("r2", NodeKind::Risk, "Nothing");
        assert_eq!(risk_statement(&empty), None);
    }
}
