//! Field-dependency tracking for calculation ordering

use crate::ast::Expr;
use ahash::{AHashMap, AHashSet};

/// Collect the field keys an expression reads, in first-occurrence order
pub fn referenced_fields(expr: &Expr) -> Vec<String> {
    let mut fields = Vec::new();
    let mut seen = AHashSet::new();
    collect_fields(expr, &mut fields, &mut seen);
    fields
}

fn collect_fields(expr: &Expr, fields: &mut Vec<String>, seen: &mut AHashSet<String>) {
    match expr {
        Expr::FieldRef(key) => {
            if seen.insert(key.clone()) {
                fields.push(key.clone());
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_fields(left, fields, seen);
            collect_fields(right, fields, seen);
        }
        Expr::UnaryOp { operand, .. } => collect_fields(operand, fields, seen),
        Expr::Function { args, .. } => {
            for arg in args {
                collect_fields(arg, fields, seen);
            }
        }
        Expr::Number(_) | Expr::Text(_) => {}
    }
}

/// Dependency graph between formula columns of one schema.
///
/// Only edges between formula columns matter for ordering: plain input
/// columns always hold their current value.
#[derive(Debug, Default)]
pub struct ColumnGraph {
    /// Column key → formula-column keys it reads
    precedents: AHashMap<String, Vec<String>>,
}

impl ColumnGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `column` reads `precedent` (both formula columns)
    pub fn add_dependency(&mut self, column: &str, precedent: &str) {
        let entry = self.precedents.entry(column.to_string()).or_default();
        if !entry.iter().any(|p| p == precedent) {
            entry.push(precedent.to_string());
        }
    }

    /// Columns the given column reads
    pub fn precedents(&self, column: &str) -> &[String] {
        self.precedents.get(column).map_or(&[], Vec::as_slice)
    }

    /// Produce an evaluation order for the given formula columns
    /// (precedents first) via depth-first search, seeded in the given
    /// order so unconstrained columns keep their schema position.
    ///
    /// Returns the order plus the columns where a cycle was detected; the
    /// cyclic columns still appear in the order, at the point the search
    /// first reached them.
    pub fn evaluation_order(&self, columns: &[String]) -> (Vec<String>, Vec<String>) {
        let member: AHashSet<&str> = columns.iter().map(String::as_str).collect();
        let mut order = Vec::with_capacity(columns.len());
        let mut visited = AHashSet::new();
        let mut in_stack = AHashSet::new();
        let mut cyclic = Vec::new();

        for column in columns {
            self.visit(column, &member, &mut order, &mut visited, &mut in_stack, &mut cyclic);
        }

        (order, cyclic)
    }

    fn visit(
        &self,
        column: &str,
        member: &AHashSet<&str>,
        order: &mut Vec<String>,
        visited: &mut AHashSet<String>,
        in_stack: &mut AHashSet<String>,
        cyclic: &mut Vec<String>,
    ) {
        if visited.contains(column) {
            return;
        }
        if in_stack.contains(column) {
            // Back edge: the chain is circular, break it here
            if !cyclic.iter().any(|c| c == column) {
                cyclic.push(column.to_string());
            }
            return;
        }

        in_stack.insert(column.to_string());

        for precedent in self.precedents(column) {
            if member.contains(precedent.as_str()) {
                self.visit(precedent, member, order, visited, in_stack, cyclic);
            }
        }

        in_stack.remove(column);
        visited.insert(column.to_string());
        order.push(column.to_string());
    }
}
