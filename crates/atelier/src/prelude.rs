//! Commonly used types, for glob import.
//!
//! ```rust
//! use atelier::prelude::*;
//! ```

pub use crate::geometry::{CurtainMetrics, CurtainSpec, PanelConfig};
pub use crate::purchasing::{MaterialKey, PurchaseLine, PurchaseSummary};
pub use crate::recompute::{RecomputeEngine, RecomputeOptions, RecomputeOrder, RecomputeStats};
pub use crate::store::{CatalogStore, JsonFileStore, Settings};
pub use atelier_core::{
    keys, ColumnDef, ColumnType, FieldValue, Minute, MinuteStatus, Project, ProjectStatus, Row,
    Schema,
};
pub use atelier_formula::{evaluate, evaluate_number, parse_expression, FieldScope, MapScope};
