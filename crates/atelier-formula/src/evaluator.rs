//! Expression evaluator
//!
//! Evaluates expression ASTs against a field scope to produce values.
//!
//! Two entry points exist: [`evaluate`] is the strict API returning a
//! `Result`, and [`evaluate_number`] / [`number_or_zero`] implement the
//! grid's lossy contract where any failure produces `0.0`.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::parse_expression;
use ahash::AHashMap;
use atelier_core::value::parse_number;
use atelier_core::{FieldValue, Row};
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
}

impl Value {
    /// Convert to number, if possible. Empty coerces to `0`; text parses
    /// with the same lenient rules as row fields.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(true) => Some(1.0),
            Value::Boolean(false) => Some(0.0),
            Value::Text(s) => parse_number(s),
            Value::Empty => Some(0.0),
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number()
            .ok_or_else(|| FormulaError::Evaluation(format!("Cannot convert {:?} to number", self)))
    }

    /// Truthiness for conditions: non-zero numbers, `true`, and non-empty
    /// text are truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Empty => false,
        }
    }

    /// Convert to display text
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
            Value::Empty => String::new(),
        }
    }

    /// Whether the value is empty (an unresolved field reference)
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Empty => Value::Empty,
            FieldValue::Number(n) => Value::Number(n),
            FieldValue::Text(s) => Value::Text(s),
            FieldValue::Boolean(b) => Value::Boolean(b),
            FieldValue::Photos(p) => Value::Text(p.join(", ")),
        }
    }
}

/// Source of field values for `{key}` references
pub trait FieldScope {
    /// Resolve a field by key; `None` evaluates as [`Value::Empty`]
    fn field(&self, key: &str) -> Option<FieldValue>;
}

impl FieldScope for Row {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

impl FieldScope for AHashMap<String, FieldValue> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.get(key).cloned()
    }
}

/// A plain-map scope, convenient for tests and one-off evaluations
#[derive(Debug, Clone, Default)]
pub struct MapScope {
    fields: AHashMap<String, FieldValue>,
}

impl MapScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn set<K: Into<String>, V: Into<FieldValue>>(&mut self, key: K, value: V) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style set
    pub fn with<K: Into<String>, V: Into<FieldValue>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for MapScope {
    fn from(entries: [(K, f64); N]) -> Self {
        let mut scope = Self::new();
        for (k, v) in entries {
            scope.set(k, v);
        }
        scope
    }
}

impl FieldScope for MapScope {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).cloned()
    }
}

/// Evaluate an expression against a field scope
pub fn evaluate(expr: &Expr, scope: &dyn FieldScope) -> FormulaResult<Value> {
    match expr {
        // === Literals ===
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),

        // === References ===
        Expr::FieldRef(key) => Ok(scope.field(key).map(Value::from).unwrap_or(Value::Empty)),

        // === Operators ===
        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, scope),

        Expr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, scope),

        // === Functions ===
        Expr::Function { name, args } => evaluate_function(name, args, scope),
    }
}

/// Evaluate a pre-parsed expression to a number, coercing any failure to `0.0`.
///
/// This is the contract the grid relies on: a formula cell always shows a
/// number, never an error. Swallowed failures are logged at debug level.
pub fn number_or_zero(expr: &Expr, scope: &dyn FieldScope) -> f64 {
    match evaluate(expr, scope) {
        Ok(value) => value.as_number().filter(|n| n.is_finite()).unwrap_or(0.0),
        Err(e) => {
            tracing::debug!(error = %e, "expression evaluation failed, using 0");
            0.0
        }
    }
}

/// Parse and evaluate an expression string to a number, coercing any
/// failure (including parse failures) to `0.0`
pub fn evaluate_number(expr: &str, scope: &dyn FieldScope) -> f64 {
    match parse_expression(expr) {
        Ok(ast) => number_or_zero(&ast, scope),
        Err(e) => {
            tracing::debug!(expr, error = %e, "expression parse failed, using 0");
            0.0
        }
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    scope: &dyn FieldScope,
) -> FormulaResult<Value> {
    // Logical operators short-circuit
    match op {
        BinaryOperator::And => {
            let left_val = evaluate(left, scope)?;
            if !left_val.is_truthy() {
                return Ok(Value::Boolean(false));
            }
            let right_val = evaluate(right, scope)?;
            return Ok(Value::Boolean(right_val.is_truthy()));
        }
        BinaryOperator::Or => {
            let left_val = evaluate(left, scope)?;
            if left_val.is_truthy() {
                return Ok(Value::Boolean(true));
            }
            let right_val = evaluate(right, scope)?;
            return Ok(Value::Boolean(right_val.is_truthy()));
        }
        _ => {}
    }

    let left_val = evaluate(left, scope)?;
    let right_val = evaluate(right, scope)?;

    match op {
        // Arithmetic operators
        BinaryOperator::Add => {
            Ok(Value::Number(left_val.to_number()? + right_val.to_number()?))
        }
        BinaryOperator::Subtract => {
            Ok(Value::Number(left_val.to_number()? - right_val.to_number()?))
        }
        BinaryOperator::Multiply => {
            Ok(Value::Number(left_val.to_number()? * right_val.to_number()?))
        }
        BinaryOperator::Divide => {
            let r = right_val.to_number()?;
            if r == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(Value::Number(left_val.to_number()? / r))
        }

        // Comparison operators
        BinaryOperator::Equal => Ok(Value::Boolean(compare_values(&left_val, &right_val) == 0)),
        BinaryOperator::NotEqual => Ok(Value::Boolean(compare_values(&left_val, &right_val) != 0)),
        BinaryOperator::LessThan => Ok(Value::Boolean(compare_values(&left_val, &right_val) < 0)),
        BinaryOperator::LessEqual => Ok(Value::Boolean(compare_values(&left_val, &right_val) <= 0)),
        BinaryOperator::GreaterThan => {
            Ok(Value::Boolean(compare_values(&left_val, &right_val) > 0))
        }
        BinaryOperator::GreaterEqual => {
            Ok(Value::Boolean(compare_values(&left_val, &right_val) >= 0))
        }

        // Handled above
        BinaryOperator::And | BinaryOperator::Or => unreachable!(),
    }
}

/// Compare two values for ordering. Numbers (and anything coercible to a
/// number) compare numerically; text compares case-insensitively.
fn compare_values(left: &Value, right: &Value) -> i32 {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return if l < r {
            -1
        } else if l > r {
            1
        } else {
            0
        };
    }

    match (left, right) {
        (Value::Text(l), Value::Text(r)) => {
            use std::cmp::Ordering;
            match l.to_lowercase().cmp(&r.to_lowercase()) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            }
        }
        // Mixed number/text: numbers sort first
        (Value::Text(_), _) => 1,
        (_, Value::Text(_)) => -1,
        _ => 0,
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &Expr,
    scope: &dyn FieldScope,
) -> FormulaResult<Value> {
    let val = evaluate(operand, scope)?;

    match op {
        UnaryOperator::Negate => Ok(Value::Number(-val.to_number()?)),
        UnaryOperator::Not => Ok(Value::Boolean(!val.is_truthy())),
    }
}

/// Evaluate a function call
fn evaluate_function(name: &str, args: &[Expr], scope: &dyn FieldScope) -> FormulaResult<Value> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    // Check argument count
    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    // Evaluate arguments
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, scope)?);
    }

    // Call the function
    (func.implementation)(&evaluated_args)
}
