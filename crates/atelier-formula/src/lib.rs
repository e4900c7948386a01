//! # atelier-formula
//!
//! Column-expression parser and evaluator for atelier.
//!
//! Formula columns carry small expressions over the other fields of their
//! row: `{field}` references, arithmetic, comparisons, and the `IF` /
//! `CEIL` / `NVL` call forms, persisted as plain strings in the schemas.
//! This crate provides:
//! - Expression parsing (text → AST)
//! - Expression evaluation (AST → value) against a field scope
//! - The fixed built-in function set
//! - Field-dependency extraction for calculation ordering
//!
//! ## Example
//!
//! ```rust
//! use atelier_formula::{evaluate_number, MapScope};
//!
//! let scope = MapScope::from([("largeur", 150.0), ("hauteur", 260.0)]);
//! assert_eq!(evaluate_number("{largeur} + {hauteur}", &scope), 410.0);
//! // Broken expressions never fail, they evaluate to zero:
//! assert_eq!(evaluate_number("{largeur} +", &scope), 0.0);
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use dependency::{referenced_fields, ColumnGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_number, number_or_zero, FieldScope, MapScope, Value};
pub use parser::parse_expression;
