use super::value::{ParamSet, ParamValue};
use crate::script::PRICE_SERIES;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The declared type of an indicator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Int,
    Float,
    Bool,
    String,
    /// A reference to a price series or another node's output.
    Source,
}

impl ParamType {
    /// The `input.*` function declaring a parameter of this type, if it gets one.
    pub fn input_function(&self) -> Option<&'static str> {
        match self {
            ParamType::Int => Some("input.int"),
            ParamType::Float => Some("input.float"),
            ParamType::Bool => Some("input.bool"),
            ParamType::String => Some("input.string"),
            ParamType::Source => None,
        }
    }

    /// Numeric and boolean parameters are passed to calls through their input variable.
    pub fn passes_by_input(&self) -> bool {
        matches!(self, ParamType::Int | ParamType::Float | ParamType::Bool)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::String => "string",
            ParamType::Source => "source",
        };
        f.write_str(name)
    }
}

/// Why a raw config value could not be accepted for a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamViolation {
    WrongType { found: String },
    OutOfRange { value: f64, bounds: String },
    NotAnOption { value: String, options: String },
}

/// Schema of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub title: String,
    pub param_type: ParamType,
    pub required: bool,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub options: Vec<String>,
}

impl ParamSpec {
    fn new(name: &str, param_type: ParamType, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            title: title_case(name),
            param_type,
            required: false,
            default,
            min: None,
            max: None,
            step: None,
            options: Vec::new(),
        }
    }

    pub fn int(name: &str, default: i64) -> Self {
        Self::new(name, ParamType::Int, ParamValue::Int(default))
    }

    pub fn float(name: &str, default: f64) -> Self {
        Self::new(name, ParamType::Float, ParamValue::Float(default))
    }

    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(name, ParamType::Bool, ParamValue::Bool(default))
    }

    pub fn string(name: &str, default: &str) -> Self {
        Self::new(name, ParamType::String, ParamValue::Str(default.to_string()))
    }

    pub fn source(name: &str, default: &str) -> Self {
        Self::new(name, ParamType::Source, ParamValue::Source(default.to_string()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Suffix used for the parameter's input variable: `fastLength` -> `fast_length`.
    pub fn input_suffix(&self) -> String {
        snake_case(&self.name)
    }

    /// Reads this parameter from a node config, also accepting its snake_case spelling.
    pub fn lookup<'c>(&self, config: &'c serde_json::Map<String, Value>) -> Option<&'c Value> {
        config
            .get(&self.name)
            .or_else(|| config.get(&self.input_suffix()))
            .filter(|v| !v.is_null())
    }

    /// Coerces a raw config value into this parameter's type and checks its bounds.
    pub fn coerce(&self, raw: &Value) -> Result<ParamValue, ParamViolation> {
        let wrong_type = || ParamViolation::WrongType {
            found: describe(raw),
        };
        let value = match self.param_type {
            ParamType::Int => {
                let n = as_number(raw).ok_or_else(wrong_type)?;
                if n.fract() != 0.0 {
                    return Err(wrong_type());
                }
                ParamValue::Int(n as i64)
            }
            ParamType::Float => ParamValue::Float(as_number(raw).ok_or_else(wrong_type)?),
            ParamType::Bool => match raw {
                Value::Bool(b) => ParamValue::Bool(*b),
                Value::String(s) if s.eq_ignore_ascii_case("true") => ParamValue::Bool(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") => ParamValue::Bool(false),
                _ => return Err(wrong_type()),
            },
            ParamType::String => match raw {
                Value::String(s) => ParamValue::Str(s.clone()),
                _ => return Err(wrong_type()),
            },
            ParamType::Source => match raw {
                Value::String(s) => {
                    let series = s.trim().to_ascii_lowercase();
                    if !PRICE_SERIES.contains(&series.as_str()) {
                        return Err(ParamViolation::NotAnOption {
                            value: s.clone(),
                            options: PRICE_SERIES.join(", "),
                        });
                    }
                    ParamValue::Source(series)
                }
                _ => return Err(wrong_type()),
            },
        };
        self.check_bounds(&value)?;
        Ok(value)
    }

    fn check_bounds(&self, value: &ParamValue) -> Result<(), ParamViolation> {
        if let Some(n) = value.as_f64() {
            let below = self.min.is_some_and(|min| n < min);
            let above = self.max.is_some_and(|max| n > max);
            if below || above {
                return Err(ParamViolation::OutOfRange {
                    value: n,
                    bounds: self.describe_bounds(),
                });
            }
        }
        if !self.options.is_empty() {
            if let ParamValue::Str(s) = value {
                if !self.options.iter().any(|o| o == s) {
                    return Err(ParamViolation::NotAnOption {
                        value: s.clone(),
                        options: self.options.join(", "),
                    });
                }
            }
        }
        Ok(())
    }

    fn describe_bounds(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("[{}, {}]", min, max),
            (Some(min), None) => format!("[{}, ∞)", min),
            (None, Some(max)) => format!("(-∞, {}]", max),
            (None, None) => "(-∞, ∞)".to_string(),
        }
    }
}

/// How many values a function produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnArity {
    Single,
    /// Named outputs, in the order the call returns them.
    Tuple(Vec<String>),
}

impl ReturnArity {
    pub fn outputs(&self) -> &[String] {
        match self {
            ReturnArity::Single => &[],
            ReturnArity::Tuple(names) => names,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReturnArity::Single => 1,
            ReturnArity::Tuple(names) => names.len(),
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, ReturnArity::Tuple(_))
    }
}

/// The canonical script syntax of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSyntax {
    /// `function(arg, ...)` with arguments in parameter order.
    Call(String),
    /// One template per output. `{param}` is replaced by the parameter's argument and
    /// `{out:suffix}` by the variable of an earlier output.
    Composite(Vec<String>),
}

/// A fixed horizontal reference line drawn next to an oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub level: f64,
    pub title: String,
    pub color: String,
}

/// How an indicator's outputs are visualized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotProfile {
    pub hidden: bool,
    pub reference_lines: Vec<ReferenceLine>,
    /// Outputs drawn as columns instead of lines.
    pub histogram_outputs: Vec<String>,
}

impl PlotProfile {
    pub fn overlay() -> Self {
        Self::default()
    }

    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    /// An oscillator bounded by overbought/oversold levels.
    pub fn oscillator(upper: f64, lower: f64) -> Self {
        Self::default()
            .with_reference(upper, "Overbought", "color.red")
            .with_reference(lower, "Oversold", "color.green")
    }

    pub fn with_reference(mut self, level: f64, title: &str, color: &str) -> Self {
        self.reference_lines.push(ReferenceLine {
            level,
            title: title.to_string(),
            color: color.to_string(),
        });
        self
    }

    pub fn with_histogram(mut self, output: &str) -> Self {
        self.histogram_outputs.push(output.to_string());
        self
    }
}

/// Broad grouping of registry entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCategory {
    MovingAverage,
    Oscillator,
    Volatility,
    Trend,
    Volume,
    Operator,
}

/// Cross-parameter rule run after every parameter passed its own checks.
pub type ParamValidator = fn(&ParamSet) -> Result<(), String>;

/// The signature of an indicator or operator known to the compiler.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub description: String,
    pub category: FunctionCategory,
    pub parameters: Vec<ParamSpec>,
    pub returns: ReturnArity,
    pub syntax: CallSyntax,
    pub plot: PlotProfile,
    validator: Option<ParamValidator>,
}

impl FunctionSignature {
    pub fn new(name: &str, category: FunctionCategory, syntax: CallSyntax) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            description: String::new(),
            category,
            parameters: Vec::new(),
            returns: ReturnArity::Single,
            syntax,
            plot: PlotProfile::overlay(),
            validator: None,
        }
    }

    /// Shorthand for a signature rendered as a single function call.
    pub fn call(name: &str, category: FunctionCategory, function: &str) -> Self {
        Self::new(name, category, CallSyntax::Call(function.to_string()))
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn returns(mut self, outputs: &[&str]) -> Self {
        self.returns = ReturnArity::Tuple(outputs.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn plot(mut self, profile: PlotProfile) -> Self {
        self.plot = profile;
        self
    }

    pub fn validate_with(mut self, validator: ParamValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Ordered output suffixes; empty for single-output functions.
    pub fn outputs(&self) -> &[String] {
        self.returns.outputs()
    }

    pub fn is_tuple(&self) -> bool {
        self.returns.is_tuple()
    }

    /// Runs the custom cross-parameter rule, if the signature has one.
    pub fn check(&self, params: &ParamSet) -> Result<(), String> {
        match self.validator {
            Some(validator) => validator(params),
            None => Ok(()),
        }
    }

    /// Renders a call with already-rendered arguments, in parameter order.
    ///
    /// Returns `None` for composite signatures.
    pub fn render_call(&self, args: &[String]) -> Option<String> {
        match &self.syntax {
            CallSyntax::Call(function) => Some(format!("{}({})", function, args.join(", "))),
            CallSyntax::Composite(_) => None,
        }
    }
}

/// Substitutes `{key}` placeholders using `resolve`; unknown placeholders are kept verbatim.
pub fn fill_template(template: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match resolve(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn title_case(name: &str) -> String {
    snake_case(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
