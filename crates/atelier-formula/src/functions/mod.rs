//! Built-in functions
//!
//! The DSL's function set is fixed and small: the three call forms the
//! schemas use (`IF`, `CEIL`, `NVL`) plus a handful of numeric helpers.

pub mod logical;
pub mod math;

use crate::error::FormulaResult;
use crate::evaluator::Value;
use ahash::AHashMap;

/// Function implementation signature
pub type FunctionImpl = fn(&[Value]) -> FormulaResult<Value>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_logical_functions();
        registry.register_math_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Whether a name is a registered function
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        // NVL
        self.register(FunctionDef {
            name: "NVL",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_nvl,
        });
    }

    fn register_math_functions(&mut self) {
        // CEIL
        self.register(FunctionDef {
            name: "CEIL",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_ceil,
        });

        // FLOOR
        self.register(FunctionDef {
            name: "FLOOR",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_floor,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.contains("IF"));
        assert!(registry.contains("ceil"));
        assert!(registry.contains("Nvl"));
        assert!(!registry.contains("SUM"));
    }
}
