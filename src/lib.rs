//! # Senryaku - Strategy Graph Compiler
//!
//! **Senryaku** compiles node-based trading strategies into source code for a
//! Pine-style trading-script language. A strategy is a directed graph of typed
//! nodes (data sources, indicators, conditions, actions, risk rules, timing
//! filters and math transforms); the compiler validates it against a registry
//! of indicator signatures, orders it by dependency, binds every value to a
//! unique identifier and emits a complete `strategy(...)` script.
//!
//! ## Core Workflow
//!
//! The compiler is format-agnostic. It operates on a canonical
//! [`StrategyGraph`](graph::StrategyGraph), and the pipeline is:
//!
//! 1.  **Load Your Graph**: Parse whatever your editor exports into your own Rust structs,
//!     or use the bundled [`GraphDocument`](graph::GraphDocument) for the common JSON shape.
//! 2.  **Convert**: Implement [`IntoGraph`](graph::IntoGraph) to translate your format into a `StrategyGraph`.
//! 3.  **Compile**: Build a [`Compiler`](compiler::Compiler) once and call `compile` for each graph.
//!     Validation, ordering, binding and emission all happen inside that call.
//! 4.  **Inspect**: The returned [`GenerationResult`](compiler::GenerationResult) always carries
//!     code. On failure it is a well-formed fallback script and `errors` explains why.
//!
//! ## Quick Start
//!
//! ```rust
//! use senryaku::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = r#"{
//!         "nodes": [
//!             { "id": "price", "type": "dataSource", "data": { "label": "Price", "config": { "source": "close" } } },
//!             { "id": "rsi", "type": "indicator", "data": { "label": "RSI", "config": { "indicatorId": "rsi", "period": 14 } } },
//!             { "id": "oversold", "type": "condition", "data": { "label": "Oversold", "config": { "operator": "less_than", "threshold": 30 } } },
//!             { "id": "buy", "type": "action", "data": { "label": "Buy", "config": { "orderType": "market", "quantity": 1 } } }
//!         ],
//!         "edges": [
//!             { "source": "price", "target": "rsi" },
//!             { "source": "rsi", "target": "oversold" },
//!             { "source": "oversold", "target": "buy" }
//!         ]
//!     }"#;
//!
//!     let compiler = Compiler::builder().with_strategy_name("RSI Reversal").build();
//!     let result = compiler.compile_from(GraphDocument::from_json(json)?)?;
//!
//!     assert!(result.success);
//!     assert!(result.code.contains("oversold = rsi < 30"));
//!     assert!(result.code.contains("strategy.entry(\"Buy\", strategy.long, qty=1)"));
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod registry;
pub mod script;
pub mod validator;
