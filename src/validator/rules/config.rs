//! Per-node configuration checks, dispatched on the node kind.

use crate::error::{ValidationError, ValidationWarning};
use crate::graph::{
    ConditionOperator, DEFAULT_QUANTITY, DEFAULT_SESSION, MathOperation, NodeKind, OrderType,
    RiskLevels, StrategyNode, order_quantity,
};
use crate::registry::{
    FunctionCategory, FunctionRegistry, FunctionSignature, ParamSet, ParamSpec, ParamViolation,
};
use crate::script::PRICE_SERIES;
use crate::validator::ValidationReport;
use serde_json::Value;

/// An indicator's parameter values after defaults and coercion, together with
/// every violation found on the way.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParameters {
    pub values: ParamSet,
    pub errors: Vec<ValidationError>,
}

/// Reads every parameter the signature declares from the node config.
///
/// Missing optional parameters take their default. The signature's custom rule
/// only runs once every parameter passed its own checks.
pub fn resolve_parameters(signature: &FunctionSignature, node: &StrategyNode) -> ResolvedParameters {
    let mut resolved = ResolvedParameters::default();

    for spec in &signature.parameters {
        match spec.lookup(&node.config) {
            Some(raw) => match spec.coerce(raw) {
                Ok(value) => resolved.values.insert(spec.name.clone(), value),
                Err(violation) => resolved.errors.push(violation_error(node, spec, violation)),
            },
            None if spec.required => resolved.errors.push(ValidationError::MissingParameter {
                node_id: node.id.clone(),
                indicator_id: signature.name.clone(),
                parameter: spec.name.clone(),
            }),
            None => resolved.values.insert(spec.name.clone(), spec.default.clone()),
        }
    }

    if resolved.errors.is_empty() {
        if let Err(message) = signature.check(&resolved.values) {
            resolved.errors.push(ValidationError::ParameterRule {
                node_id: node.id.clone(),
                indicator_id: signature.name.clone(),
                message,
            });
        }
    }

    resolved
}

fn violation_error(node: &StrategyNode, spec: &ParamSpec, violation: ParamViolation) -> ValidationError {
    match violation {
        ParamViolation::WrongType { found } => ValidationError::InvalidParameterType {
            node_id: node.id.clone(),
            parameter: spec.name.clone(),
            expected: spec.param_type,
            found,
        },
        ParamViolation::OutOfRange { value, bounds } => ValidationError::ParameterOutOfRange {
            node_id: node.id.clone(),
            parameter: spec.name.clone(),
            value,
            bounds,
        },
        ParamViolation::NotAnOption { value, options } => ValidationError::InvalidEnumValue {
            node_id: node.id.clone(),
            parameter: spec.name.clone(),
            value,
            options,
        },
    }
}

pub(crate) fn check_node(
    registry: &FunctionRegistry,
    node: &StrategyNode,
    report: &mut ValidationReport,
) {
    match node.kind {
        NodeKind::DataSource => check_data_source(node, report),
        NodeKind::Indicator => check_indicator(registry, node, report),
        NodeKind::Condition => check_condition(node, report),
        NodeKind::Action => check_action(node, report),
        NodeKind::Risk => {
            if RiskLevels::of(node).is_empty() {
                report.warn(ValidationWarning::RiskWithoutLevels {
                    node_id: node.id.clone(),
                });
            }
        }
        NodeKind::Timing => {
            if node.config_str("session").is_none() {
                report.warn(ValidationWarning::MissingSession {
                    node_id: node.id.clone(),
                    default: DEFAULT_SESSION.to_string(),
                });
            }
        }
        NodeKind::Math => {
            let operation = node.config_str("operation").unwrap_or_default();
            if MathOperation::parse(operation).is_none() {
                report.error(ValidationError::InvalidMathOperation {
                    node_id: node.id.clone(),
                    operation: operation.to_string(),
                });
            }
        }
    }
}

fn check_data_source(node: &StrategyNode, report: &mut ValidationReport) {
    if let Some(series) = node.config_str("source") {
        if !PRICE_SERIES.contains(&series.to_ascii_lowercase().as_str()) {
            report.warn(ValidationWarning::UnknownSeries {
                node_id: node.id.clone(),
                source_name: series.to_string(),
            });
        }
    }
}

fn check_indicator(registry: &FunctionRegistry, node: &StrategyNode, report: &mut ValidationReport) {
    let Some(indicator_id) = node.indicator_id() else {
        report.error(ValidationError::MissingIndicatorId {
            node_id: node.id.clone(),
        });
        return;
    };

    // Operators compare two series and are only reachable through condition nodes.
    let signature = registry
        .lookup(&indicator_id)
        .filter(|sig| sig.category != FunctionCategory::Operator);
    let Some(signature) = signature else {
        report.error(ValidationError::UnknownIndicator {
            node_id: node.id.clone(),
            indicator_id,
        });
        return;
    };

    report
        .errors
        .extend(resolve_parameters(signature, node).errors);
}

fn check_condition(node: &StrategyNode, report: &mut ValidationReport) {
    match node.config_str("operator") {
        None => report.error(ValidationError::MissingOperator {
            node_id: node.id.clone(),
        }),
        Some(operator) if ConditionOperator::parse(operator).is_none() => {
            report.error(ValidationError::InvalidOperator {
                node_id: node.id.clone(),
                operator: operator.to_string(),
            })
        }
        Some(_) => {}
    }

    if node.config_f64("threshold").is_none() {
        report.warn(ValidationWarning::MissingThreshold {
            node_id: node.id.clone(),
        });
    }
}

fn check_action(node: &StrategyNode, report: &mut ValidationReport) {
    match node.config_value("orderType") {
        None => report.warn(ValidationWarning::MissingOrderType {
            node_id: node.id.clone(),
            default: OrderType::default().as_str().to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => {
            report.warn(ValidationWarning::MissingOrderType {
                node_id: node.id.clone(),
                default: OrderType::default().as_str().to_string(),
            })
        }
        Some(Value::String(s)) if OrderType::parse(s).is_some() => {}
        Some(other) => report.error(ValidationError::InvalidOrderType {
            node_id: node.id.clone(),
            order_type: match other {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            },
        }),
    }

    if order_quantity(node).is_none() {
        report.warn(ValidationWarning::MissingQuantity {
            node_id: node.id.clone(),
            default: DEFAULT_QUANTITY,
        });
    }
}
