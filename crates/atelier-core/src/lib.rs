//! # atelier-core
//!
//! Core data model for the atelier chiffrage library.
//!
//! This crate provides the fundamental types used throughout atelier:
//! - [`FieldValue`] - Values held by a row field (numbers, text, booleans, photo lists)
//! - [`ColumnDef`] and [`Schema`] - Ordered column definitions describing a row shape
//! - [`Row`] - A keyed field map with manual-override tracking
//! - [`Minute`], [`Project`] - The quote and production documents
//!
//! ## Example
//!
//! ```rust
//! use atelier_core::{ColumnDef, ColumnType, Row, Schema};
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("largeur", "Largeur", ColumnType::Number),
//!     ColumnDef::formula("total", "Total", "{largeur} * 2"),
//! ]).unwrap();
//!
//! let mut row = Row::new("line-1");
//! row.set("largeur", 120.0);
//! assert_eq!(row.get("largeur").and_then(|v| v.as_number()), Some(120.0));
//! # let _ = schema;
//! ```

pub mod column;
pub mod error;
pub mod keys;
pub mod minute;
pub mod project;
pub mod row;
pub mod schema;
pub mod value;

// Re-exports for convenience
pub use column::{ColumnDef, ColumnType};
pub use error::{Error, Result};
pub use minute::{Minute, MinuteStatus};
pub use project::{Project, ProjectStatus};
pub use row::Row;
pub use schema::Schema;
pub use value::FieldValue;

/// Maximum length of a column key
pub const MAX_KEY_LEN: usize = 64;
