//! Assigns every emitted value a unique, valid script identifier.

use super::resolver::resolve_order;
use crate::graph::{GraphIndex, NodeKind, StrategyGraph, StrategyNode};
use crate::registry::{FunctionRegistry, FunctionSignature};
use crate::script::RESERVED_WORDS;
use ahash::AHashSet;
use serde::Serialize;

/// Names the emitter itself assigns in the logic section.
const COMBINED_CONDITIONS: [&str; 2] = ["entry_condition", "exit_condition"];

/// Turns free text into an identifier body.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into one
/// underscore and trims underscores from both ends. A result starting with a
/// digit is prefixed with `_v`. The result is empty when `text` has no ASCII
/// letters or digits.
///
/// ```
/// use senryaku::compiler::sanitize;
///
/// assert_eq!(sanitize("RSI (14) Oversold!"), "rsi_14_oversold");
/// assert_eq!(sanitize("200 SMA"), "_v200_sma");
/// assert_eq!(sanitize("--"), "");
/// ```
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for c in text.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "_v");
    }
    out
}

/// The last underscore-separated piece of a sanitized node id: `node-17` -> `17`.
fn id_fragment(node_id: &str) -> String {
    sanitize(node_id)
        .rsplit('_')
        .find(|part| !part.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// The identifiers bound to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Binding {
    Single(String),
    /// `(output suffix, identifier)` pairs in the order the function returns them.
    Tuple(Vec<(String, String)>),
}

impl Binding {
    /// The identifier used when a consumer does not pick an output.
    pub fn primary(&self) -> &str {
        match self {
            Binding::Single(name) => name,
            Binding::Tuple(outputs) => outputs
                .first()
                .map(|(_, name)| name.as_str())
                .unwrap_or_default(),
        }
    }

    pub fn output(&self, suffix: &str) -> Option<&str> {
        match self {
            Binding::Single(_) => None,
            Binding::Tuple(outputs) => outputs
                .iter()
                .find(|(s, _)| s == suffix)
                .map(|(_, name)| name.as_str()),
        }
    }

    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            Binding::Single(name) => vec![name.as_str()],
            Binding::Tuple(outputs) => outputs.iter().map(|(_, name)| name.as_str()).collect(),
        }
    }
}

/// An `input.*` variable declared for one indicator parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputVariable {
    pub parameter: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBindings {
    pub node_id: String,
    pub binding: Option<Binding>,
    pub inputs: Vec<InputVariable>,
}

/// Bindings for every node of a graph, stored by node position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingTable {
    entries: Vec<NodeBindings>,
}

impl BindingTable {
    pub fn get(&self, node_id: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|e| e.node_id == node_id)
            .and_then(|e| e.binding.as_ref())
    }

    pub fn inputs_of(&self, node_id: &str) -> &[InputVariable] {
        self.entries
            .iter()
            .find(|e| e.node_id == node_id)
            .map(|e| e.inputs.as_slice())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[NodeBindings] {
        &self.entries
    }

    pub fn input_count(&self) -> usize {
        self.entries.iter().map(|e| e.inputs.len()).sum()
    }

    /// Every identifier handed out, inputs included.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().flat_map(|e| {
            e.inputs
                .iter()
                .map(|input| input.name.as_str())
                .chain(e.binding.iter().flat_map(|b| b.identifiers()))
        })
    }

    pub(crate) fn at(&self, idx: usize) -> Option<&Binding> {
        self.entries.get(idx).and_then(|e| e.binding.as_ref())
    }

    pub(crate) fn input_at(&self, idx: usize, parameter: &str) -> Option<&str> {
        self.entries
            .get(idx)?
            .inputs
            .iter()
            .find(|input| input.parameter == parameter)
            .map(|input| input.name.as_str())
    }
}

/// Allocates identifiers for one compilation.
///
/// Input variables are allocated first, then node identifiers, both in resolved
/// order. Reserved script words and the combined condition names start out taken.
pub struct VariableBinder<'r> {
    registry: &'r FunctionRegistry,
    taken: AHashSet<String>,
}

impl<'r> VariableBinder<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        let taken = RESERVED_WORDS
            .iter()
            .chain(COMBINED_CONDITIONS.iter())
            .map(|w| w.to_string())
            .collect();
        Self { registry, taken }
    }

    /// Resolves the graph's order and binds it in one step.
    pub fn bind_graph(self, graph: &StrategyGraph) -> BindingTable {
        let index = GraphIndex::new(graph);
        let order = resolve_order(&index);
        self.bind(&index, &order)
    }

    pub fn bind(mut self, index: &GraphIndex<'_>, order: &[usize]) -> BindingTable {
        let mut entries: Vec<NodeBindings> = index
            .graph()
            .nodes
            .iter()
            .map(|node| NodeBindings {
                node_id: node.id.clone(),
                binding: None,
                inputs: Vec::new(),
            })
            .collect();

        for &idx in order {
            let node = index.node(idx);
            let Some(signature) = self.signature_of(node) else {
                continue;
            };
            for spec in &signature.parameters {
                if spec.param_type.input_function().is_none() {
                    continue;
                }
                let base = sanitize(&format!("{}_{}", signature.name, spec.input_suffix()));
                let name = self.claim_numbered(&base);
                entries[idx].inputs.push(InputVariable {
                    parameter: spec.name.clone(),
                    name,
                });
            }
        }

        for &idx in order {
            let node = index.node(idx);
            let outputs: Vec<String> = match node.kind {
                NodeKind::DataSource if node.config_str("timeframe").is_some() => Vec::new(),
                NodeKind::DataSource | NodeKind::Action | NodeKind::Risk => continue,
                NodeKind::Indicator => self
                    .signature_of(node)
                    .map(|sig| sig.outputs().to_vec())
                    .unwrap_or_default(),
                NodeKind::Condition | NodeKind::Timing | NodeKind::Math => Vec::new(),
            };
            let base = base_name(node);
            entries[idx].binding = Some(self.claim_node(&base, &node.id, &outputs));
        }

        BindingTable { entries }
    }

    fn signature_of(&self, node: &StrategyNode) -> Option<&'r FunctionSignature> {
        if node.kind != NodeKind::Indicator {
            return None;
        }
        self.registry.lookup(&node.indicator_id()?)
    }

    fn is_free(&self, names: &[String]) -> bool {
        names.iter().all(|n| !self.taken.contains(n))
    }

    fn claim(&mut self, names: &[String]) {
        for name in names {
            self.taken.insert(name.clone());
        }
    }

    fn claim_numbered(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Tries `base`, then `base_<id fragment>`, then numbered variants of the latter.
    fn claim_node(&mut self, base: &str, node_id: &str, outputs: &[String]) -> Binding {
        let expand = |stem: &str| -> Vec<String> {
            if outputs.is_empty() {
                vec![stem.to_string()]
            } else {
                outputs
                    .iter()
                    .map(|suffix| format!("{}_{}", stem, sanitize(suffix)))
                    .collect()
            }
        };

        let mut stem = base.to_string();
        if !self.is_free(&expand(&stem)) {
            let fragment = id_fragment(node_id);
            if !fragment.is_empty() {
                stem = format!("{}_{}", base, fragment);
            }
            let with_fragment = stem.clone();
            let mut counter = 2;
            while !self.is_free(&expand(&stem)) {
                stem = format!("{}_{}", with_fragment, counter);
                counter += 1;
            }
        }

        let names = expand(&stem);
        self.claim(&names);
        if outputs.is_empty() {
            Binding::Single(stem)
        } else {
            Binding::Tuple(outputs.iter().cloned().zip(names).collect())
        }
    }
}

/// The label, else the indicator id, else the kind name.
fn base_name(node: &StrategyNode) -> String {
    let from_label = sanitize(&node.label);
    if !from_label.is_empty() {
        return from_label;
    }
    node.indicator_id()
        .map(|id| sanitize(&id))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| node.kind.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize("  Fast   EMA -- 12 "), "fast_ema_12");
        assert_eq!(sanitize("MACD_Signal"), "macd_signal");
    }

    #[test]
    fn test_sanitize_non_ascii_is_separator() {
        assert_eq!(sanitize("Prix über SMA"), "prix_ber_sma");
    }

    #[test]
    fn test_id_fragment() {
        assert_eq!(id_fragment("node-17"), "17");
        assert_eq!(id_fragment("rsi"), "rsi");
        assert_eq!(id_fragment("--"), "");
    }

    #[test]
    fn test_binding_accessors() {
        let binding = Binding::Tuple(vec![
            ("k".to_string(), "stoch_k".to_string()),
            ("d".to_string(), "stoch_d".to_string()),
        ]);
        assert_eq!(binding.primary(), "stoch_k");
        assert_eq!(binding.output("d"), Some("stoch_d"));
        assert_eq!(binding.output("x"), None);
        assert_eq!(binding.identifiers(), vec!["stoch_k", "stoch_d"]);
    }
}
