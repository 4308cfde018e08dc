//! The function registry: signatures of every indicator and operator the compiler knows.
//!
//! A registry is built once and then only read. The compiler shares it behind an
//! `Arc`, so one registry can serve any number of concurrent compilations.

use ahash::AHashMap;

mod builtins;
pub mod signature;
pub mod value;

pub use signature::*;
pub use value::*;

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    signatures: Vec<FunctionSignature>,
    by_name: AHashMap<String, usize>,
    aliases: AHashMap<String, String>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in indicator and comparator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_builtins(&mut registry);
        registry
    }

    /// Adds a signature, replacing any existing entry with the same name.
    pub fn register(&mut self, signature: FunctionSignature) {
        match self.by_name.get(&signature.name) {
            Some(&idx) => self.signatures[idx] = signature,
            None => {
                self.by_name
                    .insert(signature.name.clone(), self.signatures.len());
                self.signatures.push(signature);
            }
        }
    }

    /// Maps an alternative name onto a registered signature.
    ///
    /// Returns `false` if `canonical` is not registered.
    pub fn alias(&mut self, alias: &str, canonical: &str) -> bool {
        let canonical = canonical.to_ascii_lowercase();
        if !self.by_name.contains_key(&canonical) {
            return false;
        }
        self.aliases.insert(alias.to_ascii_lowercase(), canonical);
        true
    }

    /// Looks a function up by name or alias, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&FunctionSignature> {
        let key = name.trim().to_ascii_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.by_name.get(key).map(|&idx| &self.signatures[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered signatures, in registration order.
    pub fn signatures(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
