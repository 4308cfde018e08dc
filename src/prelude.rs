//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, convert and compile strategy graphs.
//!
//! # Example
//!
//! ```rust,no_run
//! use senryaku::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/strategy.json")?;
//! let document = GraphDocument::from_json(&json)?;
//!
//! let result = Compiler::new().compile_from(document)?;
//! for warning in &result.warnings {
//!     println!("warning: {}", warning);
//! }
//! println!("{}", result.code);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{Compiler, CompilerBuilder, CompilerOptions, GenerationResult};

// Graph model and conversion
pub use crate::graph::{GraphDocument, IntoGraph, NodeKind, StrategyEdge, StrategyGraph, StrategyNode};

// Registry
pub use crate::registry::{FunctionRegistry, FunctionSignature, ParamSpec};

// Error types
pub use crate::error::{GraphConversionError, ValidationError, ValidationWarning};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
