//! # atelier
//!
//! Chiffrage (quoting) engine for a made-to-measure curtain workshop.
//!
//! The crate recomputes schema-driven rows (quote lines, production
//! lines, logistics) from persisted formula expressions, derives curtain
//! measurements with the workshop's fixed geometry rules, and aggregates
//! material purchases across documents.
//!
//! ## Example
//!
//! ```rust
//! use atelier::prelude::*;
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("largeur", "Largeur", ColumnType::Number),
//!     ColumnDef::new("hauteur", "Hauteur", ColumnType::Number),
//!     ColumnDef::formula("surface", "Surface", "{largeur} * {hauteur} / 10000"),
//! ])
//! .unwrap();
//!
//! let engine = RecomputeEngine::new(&schema);
//! let row = Row::new("l1").with("largeur", 150.0).with("hauteur", 260.0);
//! let (row, stats) = engine.recompute_row(&row);
//!
//! assert_eq!(row.number("surface"), 3.9);
//! assert_eq!(stats.cells_recomputed, 1);
//! ```

pub mod geometry;
pub mod prelude;
pub mod purchasing;
pub mod recompute;
pub mod store;

// Re-export engine types
pub use recompute::{RecomputeEngine, RecomputeOptions, RecomputeOrder, RecomputeStats};

// Re-export geometry types
pub use geometry::{CurtainMetrics, CurtainSpec, PanelConfig};

// Re-export purchasing types
pub use purchasing::{MaterialKey, PurchaseLine, PurchaseSummary, SourceRow};

// Re-export store types
pub use store::{CatalogStore, JsonFileStore, Settings, StoreError};

// Re-export core types
pub use atelier_core::{
    keys, ColumnDef, ColumnType, Error, FieldValue, Minute, MinuteStatus, Project, ProjectStatus,
    Result, Row, Schema, MAX_KEY_LEN,
};

// Re-export formula types
pub use atelier_formula::{
    evaluate, evaluate_number, parse_expression, referenced_fields, Expr, FieldScope,
    FormulaError, FormulaResult, MapScope, Value,
};
