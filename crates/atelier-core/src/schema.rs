//! Row schemas: ordered column definitions

use crate::column::{is_valid_key, ColumnDef};
use crate::error::{Error, Result};
use ahash::AHashMap;

/// An ordered sequence of column definitions describing one row shape
/// (quote lines, production lines, logistics lines, inventory lines).
///
/// Schema order is load-bearing: it is the declared evaluation order for
/// formula columns. A formula may reference any column declared before it;
/// forward references are tolerated one level deep by the two-pass
/// recompute and otherwise read stale values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<ColumnDef>", into = "Vec<ColumnDef>"))]
pub struct Schema {
    columns: Vec<ColumnDef>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: AHashMap<String, usize>,
}

impl Schema {
    /// Build a schema from ordered column definitions.
    ///
    /// Rejects duplicate or malformed keys, formula columns without an
    /// expression, and expressions on non-formula columns.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if !is_valid_key(&col.key) {
                return Err(Error::InvalidColumnKey(col.key.clone()));
            }
            if index.insert(col.key.clone(), i).is_some() {
                return Err(Error::DuplicateColumnKey(col.key.clone()));
            }
            if col.column_type.is_formula() {
                if col.formula.as_deref().map_or(true, |f| f.trim().is_empty()) {
                    return Err(Error::MissingFormula(col.key.clone()));
                }
            } else if col.formula.is_some() {
                return Err(Error::UnexpectedFormula(col.key.clone()));
            }
        }
        Ok(Self { columns, index })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Look up a column by key
    pub fn column(&self, key: &str) -> Option<&ColumnDef> {
        self.index.get(key).map(|&i| &self.columns[i])
    }

    /// Position of a column in declaration order
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Whether the schema declares the given key
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Formula columns in declaration order
    pub fn formula_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.column_type.is_formula())
    }
}

impl TryFrom<Vec<ColumnDef>> for Schema {
    type Error = Error;

    fn try_from(columns: Vec<ColumnDef>) -> Result<Self> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<ColumnDef> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}
