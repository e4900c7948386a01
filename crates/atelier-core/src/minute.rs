//! Minutes: the quote documents

use crate::row::Row;
use std::collections::BTreeMap;

/// Workflow status of a minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MinuteStatus {
    #[default]
    Draft,
    InProgress,
    Pending,
    Revise,
    Validated,
}

/// A quote ("minute"): priced product lines plus logistics and
/// extra-expense rows, under a shared set of pricing parameters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Minute {
    /// Unique document id
    pub id: String,
    /// Client-facing label
    pub label: String,
    /// Workflow status
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: MinuteStatus,
    /// Product lines (rows under the quote schema)
    #[cfg_attr(feature = "serde", serde(default))]
    pub lines: Vec<Row>,
    /// Logistics rows (delivery, installation)
    #[cfg_attr(feature = "serde", serde(default))]
    pub logistics: Vec<Row>,
    /// Extra-expense rows
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_expenses: Vec<Row>,
    /// Named numeric parameters (margin, VAT rate, hourly rate, ...)
    /// shared by the document's formulas
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, f64>,
    /// Free-form notes
    #[cfg_attr(feature = "serde", serde(default))]
    pub notes: String,
}

impl Minute {
    /// Create an empty minute
    pub fn new<I: Into<String>, L: Into<String>>(id: I, label: L) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// Look up a pricing parameter, zero when unset
    pub fn param(&self, name: &str) -> f64 {
        self.params.get(name).copied().unwrap_or(0.0)
    }

    /// All row groups of the document, for batch recompute and aggregation
    pub fn row_groups(&self) -> [&[Row]; 3] {
        [&self.lines, &self.logistics, &self.extra_expenses]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_zero() {
        let mut minute = Minute::new("M-2024-001", "Villa des Lilas");
        assert_eq!(minute.param("marge"), 0.0);
        minute.params.insert("marge".into(), 1.8);
        assert_eq!(minute.param("marge"), 1.8);
    }

    #[test]
    fn test_row_groups() {
        let mut minute = Minute::new("M-1", "Test");
        minute.lines.push(Row::new("l1"));
        minute.logistics.push(Row::new("g1"));
        let [lines, logistics, extras] = minute.row_groups();
        assert_eq!(lines.len(), 1);
        assert_eq!(logistics.len(), 1);
        assert!(extras.is_empty());
    }
}
