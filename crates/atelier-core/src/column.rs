//! Column definitions

/// The kind of value a column holds and how the grid edits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColumnType {
    /// Free text
    Text,
    /// Numeric input
    Number,
    /// One of a fixed list of options
    Select,
    /// Boolean checkbox
    Checkbox,
    /// Photo attachments
    Photo,
    /// Derived value computed from an expression
    Formula,
    /// Action button, carries no value
    Button,
}

impl ColumnType {
    /// Columns of this type hold a value recomputation may write
    pub fn is_formula(self) -> bool {
        matches!(self, ColumnType::Formula)
    }
}

/// Definition of one column of a row shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDef {
    /// Unique key, used as the field name in rows and in `{key}` references
    pub key: String,
    /// Human-readable header label
    pub label: String,
    /// Column type
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub column_type: ColumnType,
    /// Expression for formula columns
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub formula: Option<String>,
    /// Options for select columns
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub options: Vec<String>,
    /// Read-only columns are never touched by edits or recomputation
    #[cfg_attr(feature = "serde", serde(default))]
    pub read_only: bool,
    /// Display width in pixels (None = default)
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub width: Option<u16>,
}

impl ColumnDef {
    /// Create a new column definition
    pub fn new<K: Into<String>, L: Into<String>>(key: K, label: L, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            column_type,
            formula: None,
            options: Vec::new(),
            read_only: false,
            width: None,
        }
    }

    /// Create a formula column
    pub fn formula<K: Into<String>, L: Into<String>, F: Into<String>>(
        key: K,
        label: L,
        expression: F,
    ) -> Self {
        let mut def = Self::new(key, label, ColumnType::Formula);
        def.formula = Some(expression.into());
        def
    }

    /// Create a select column with its options
    pub fn select<K: Into<String>, L: Into<String>>(
        key: K,
        label: L,
        options: Vec<String>,
    ) -> Self {
        let mut def = Self::new(key, label, ColumnType::Select);
        def.options = options;
        def
    }

    /// Set the display width
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Mark the column read-only
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Whether recomputation should write this column
    pub fn is_computed(&self) -> bool {
        self.column_type.is_formula() && !self.read_only
    }
}

/// Check a column key: identifier characters only, so `{key}` references
/// tokenize unambiguously.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= crate::MAX_KEY_LEN
        && key
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
