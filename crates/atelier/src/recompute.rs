//! Row recomputation engine
//!
//! Recomputes every formula column of a row from its current field
//! values. Expressions are parsed once per schema; evaluation is lossy by
//! contract (a broken or failing formula writes `0`, never an error), so
//! recomputation always produces a row.
//!
//! # Example
//!
//! ```rust
//! use atelier::prelude::*;
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("largeur", "Largeur", ColumnType::Number),
//!     ColumnDef::formula("double", "Double", "{largeur} * 2"),
//! ])
//! .unwrap();
//!
//! let engine = RecomputeEngine::new(&schema);
//! let (row, _) = engine.recompute_row(&Row::new("r1").with("largeur", 70.0));
//! assert_eq!(row.number("double"), 140.0);
//! ```

use atelier_core::{Row, Schema};
use atelier_formula::{number_or_zero, parse_expression, referenced_fields, ColumnGraph, Expr};

/// Evaluation-order strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecomputeOrder {
    /// Evaluate in schema order, twice. Tolerates one level of forward
    /// reference; deeper or circular chains read stale values. This is
    /// the behavior the existing schemas were authored against.
    #[default]
    SchemaTwoPass,
    /// Single pass in dependency order derived from the parsed field
    /// references. Circular groups are reported in the stats and keep
    /// their schema position.
    Topological,
}

/// Options for row recomputation
#[derive(Debug, Clone, Default)]
pub struct RecomputeOptions {
    /// Evaluation-order strategy
    pub order: RecomputeOrder,
}

/// Statistics from a recompute run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeStats {
    /// Formula columns in the schema
    pub formula_columns: usize,
    /// Formula cells written
    pub cells_recomputed: usize,
    /// Formula cells left alone because of a manual override
    pub manual_skipped: usize,
    /// Columns whose expression failed to parse (they write `0`)
    pub broken_formulas: usize,
    /// Columns involved in a dependency cycle (topological order only)
    pub cycles: Vec<String>,
}

/// A formula column with its parsed expression. `expr` is `None` when
/// the persisted text failed to parse; the column then evaluates to zero.
#[derive(Debug, Clone)]
struct CompiledColumn {
    key: String,
    expr: Option<Expr>,
}

/// Recompute engine for one schema.
///
/// Construction parses and orders the schema's formula columns; the
/// engine is then reused across rows and documents.
#[derive(Debug, Clone)]
pub struct RecomputeEngine {
    /// Formula columns in evaluation order
    columns: Vec<CompiledColumn>,
    passes: usize,
    broken_formulas: usize,
    cycles: Vec<String>,
}

impl RecomputeEngine {
    /// Build an engine with default options (schema-order, two passes)
    pub fn new(schema: &Schema) -> Self {
        Self::with_options(schema, &RecomputeOptions::default())
    }

    /// Build an engine with explicit options
    pub fn with_options(schema: &Schema, options: &RecomputeOptions) -> Self {
        let mut columns = Vec::new();
        let mut broken_formulas = 0;

        for col in schema.columns().iter().filter(|c| c.is_computed()) {
            let text = col.formula.as_deref().unwrap_or_default();
            let expr = match parse_expression(text) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    tracing::warn!(column = %col.key, %err, "formula does not parse, column will evaluate to 0");
                    broken_formulas += 1;
                    None
                }
            };
            columns.push(CompiledColumn {
                key: col.key.clone(),
                expr,
            });
        }

        let mut cycles = Vec::new();
        let passes = match options.order {
            RecomputeOrder::SchemaTwoPass => 2,
            RecomputeOrder::Topological => {
                let (order, cyclic) = Self::dependency_order(&columns);
                cycles = cyclic;
                columns = order;
                1
            }
        };

        Self {
            columns,
            passes,
            broken_formulas,
            cycles,
        }
    }

    /// Reorder compiled columns precedents-first, keeping schema order
    /// for unconstrained columns
    fn dependency_order(columns: &[CompiledColumn]) -> (Vec<CompiledColumn>, Vec<String>) {
        let mut graph = ColumnGraph::new();
        for col in columns {
            if let Some(expr) = &col.expr {
                for field in referenced_fields(expr) {
                    graph.add_dependency(&col.key, &field);
                }
            }
        }

        let keys: Vec<String> = columns.iter().map(|c| c.key.clone()).collect();
        let (order, cyclic) = graph.evaluation_order(&keys);
        if !cyclic.is_empty() {
            tracing::warn!(columns = ?cyclic, "circular formula dependencies, results may be stale");
        }

        let ordered = order
            .iter()
            .filter_map(|key| columns.iter().find(|c| &c.key == key).cloned())
            .collect();
        (ordered, cyclic)
    }

    /// Formula-column keys in evaluation order
    pub fn evaluation_order(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Recompute every formula column of a row.
    ///
    /// Returns a new row with identical keys and updated formula-column
    /// values; non-formula columns and manual cells pass through.
    pub fn recompute_row(&self, row: &Row) -> (Row, RecomputeStats) {
        let mut out = row.clone();
        let stats = self.recompute_in_place(&mut out);
        (out, stats)
    }

    /// Batch recompute, for schema or pricing-context changes
    pub fn recompute_rows(&self, rows: &[Row]) -> (Vec<Row>, RecomputeStats) {
        let mut stats = self.base_stats();
        let out = rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                let row_stats = self.recompute_in_place(&mut row);
                stats.cells_recomputed += row_stats.cells_recomputed;
                stats.manual_skipped += row_stats.manual_skipped;
                row
            })
            .collect();
        (out, stats)
    }

    fn recompute_in_place(&self, row: &mut Row) -> RecomputeStats {
        let mut stats = self.base_stats();

        for pass in 0..self.passes {
            let first = pass == 0;
            for col in &self.columns {
                if row.is_manual(&col.key) {
                    if first {
                        stats.manual_skipped += 1;
                    }
                    continue;
                }
                // Later columns of the same pass see this write
                let value = match &col.expr {
                    Some(expr) => number_or_zero(expr, &*row),
                    None => 0.0,
                };
                row.set(col.key.clone(), value);
                if first {
                    stats.cells_recomputed += 1;
                }
            }
        }

        stats
    }

    fn base_stats(&self) -> RecomputeStats {
        RecomputeStats {
            formula_columns: self.columns.len(),
            broken_formulas: self.broken_formulas,
            cycles: self.cycles.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{ColumnDef, ColumnType};
    use pretty_assertions::assert_eq;

    fn quote_schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("largeur", "Largeur", ColumnType::Number),
            ColumnDef::new("hauteur", "Hauteur", ColumnType::Number),
            ColumnDef::new("paire", "Paire", ColumnType::Checkbox),
            ColumnDef::formula(
                "finie",
                "Largeur finie",
                "ROUND(IF({paire}, {largeur} / 2 * 1.07, {largeur} * 1.07), 1)",
            ),
            ColumnDef::formula("surface", "Surface", "{largeur} * {hauteur} / 10000"),
        ])
        .unwrap()
    }

    #[test]
    fn test_recompute_row() {
        let engine = RecomputeEngine::new(&quote_schema());
        let row = Row::new("l1")
            .with("largeur", 150.0)
            .with("hauteur", 260.0)
            .with("paire", true);

        let (row, stats) = engine.recompute_row(&row);
        assert_eq!(row.number("finie"), 80.3);
        assert_eq!(row.number("surface"), 3.9);
        assert_eq!(stats.formula_columns, 2);
        assert_eq!(stats.cells_recomputed, 2);
        assert_eq!(stats.broken_formulas, 0);
    }

    #[test]
    fn test_manual_cell_is_never_overwritten() {
        let engine = RecomputeEngine::new(&quote_schema());
        let mut row = Row::new("l1").with("largeur", 100.0).with("hauteur", 200.0);
        row.set("surface", 99.0);
        row.mark_manual("surface");

        let (row, stats) = engine.recompute_row(&row);
        assert_eq!(row.number("surface"), 99.0);
        assert_eq!(stats.manual_skipped, 1);
        assert_eq!(stats.cells_recomputed, 1);
    }

    #[test]
    fn test_two_pass_tolerates_one_forward_reference() {
        // "total" reads "ml", declared after it
        let schema = Schema::new(vec![
            ColumnDef::new("prix", "Prix", ColumnType::Number),
            ColumnDef::formula("total", "Total", "{ml} * {prix}"),
            ColumnDef::formula("ml", "ML", "{metrage} / 100"),
            ColumnDef::new("metrage", "Métrage", ColumnType::Number),
        ])
        .unwrap();

        let engine = RecomputeEngine::new(&schema);
        let row = Row::new("l1").with("prix", 30.0).with("metrage", 640.0);
        let (row, _) = engine.recompute_row(&row);
        assert_eq!(row.number("ml"), 6.4);
        assert_eq!(row.number("total"), 192.0);
    }

    #[test]
    fn test_topological_order_resolves_forward_reference_in_one_pass() {
        let schema = Schema::new(vec![
            ColumnDef::new("prix", "Prix", ColumnType::Number),
            ColumnDef::formula("total", "Total", "{ml} * {prix}"),
            ColumnDef::formula("ml", "ML", "{metrage} / 100"),
            ColumnDef::new("metrage", "Métrage", ColumnType::Number),
        ])
        .unwrap();

        let options = RecomputeOptions {
            order: RecomputeOrder::Topological,
        };
        let engine = RecomputeEngine::with_options(&schema, &options);
        let keys: Vec<_> = engine.evaluation_order().collect();
        assert_eq!(keys, vec!["ml", "total"]);

        let row = Row::new("l1").with("prix", 30.0).with("metrage", 640.0);
        let (row, stats) = engine.recompute_row(&row);
        assert_eq!(row.number("total"), 192.0);
        assert!(stats.cycles.is_empty());
    }

    #[test]
    fn test_topological_order_reports_cycles() {
        let schema = Schema::new(vec![
            ColumnDef::formula("a", "A", "{b} + 1"),
            ColumnDef::formula("b", "B", "{a} + 1"),
        ])
        .unwrap();

        let options = RecomputeOptions {
            order: RecomputeOrder::Topological,
        };
        let engine = RecomputeEngine::with_options(&schema, &options);
        let (_, stats) = engine.recompute_row(&Row::new("l1"));
        assert_eq!(stats.cycles, vec!["a"]);
    }

    #[test]
    fn test_broken_formula_writes_zero() {
        let schema = Schema::new(vec![
            ColumnDef::new("largeur", "Largeur", ColumnType::Number),
            ColumnDef::formula("cassee", "Cassée", "{largeur} +"),
        ])
        .unwrap();

        let engine = RecomputeEngine::new(&schema);
        let (row, stats) = engine.recompute_row(&Row::new("l1").with("largeur", 10.0));
        assert_eq!(row.number("cassee"), 0.0);
        assert_eq!(stats.broken_formulas, 1);
    }

    #[test]
    fn test_read_only_formula_column_passes_through() {
        let schema = Schema::new(vec![
            ColumnDef::new("largeur", "Largeur", ColumnType::Number),
            ColumnDef::formula("archive", "Archive", "{largeur} * 2").with_read_only(true),
        ])
        .unwrap();

        let engine = RecomputeEngine::new(&schema);
        let row = Row::new("l1").with("largeur", 10.0).with("archive", 7.0);
        let (row, stats) = engine.recompute_row(&row);
        assert_eq!(row.number("archive"), 7.0);
        assert_eq!(stats.formula_columns, 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let engine = RecomputeEngine::new(&quote_schema());
        let row = Row::new("l1")
            .with("largeur", 150.0)
            .with("hauteur", 260.0)
            .with("paire", true);

        let (once, _) = engine.recompute_row(&row);
        let (twice, _) = engine.recompute_row(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_batch_recompute() {
        let engine = RecomputeEngine::new(&quote_schema());
        let rows = vec![
            Row::new("l1").with("largeur", 100.0).with("hauteur", 200.0),
            Row::new("l2").with("largeur", 150.0).with("hauteur", 260.0),
        ];

        let (rows, stats) = engine.recompute_rows(&rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.cells_recomputed, 4);
        assert_eq!(rows[0].number("surface"), 2.0);
    }
}
