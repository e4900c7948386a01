//! Projects: production-order tracking documents

use crate::row::Row;
use chrono::NaiveDate;

/// Production status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProduction,
    ReadyToShip,
    Delivered,
    OnHold,
}

/// A production order: rows under the production schema plus the budget
/// snapshot taken when the quote was validated.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Project {
    /// Unique document id
    pub id: String,
    /// Project name
    pub name: String,
    /// Production status
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: ProjectStatus,
    /// Responsible manager
    #[cfg_attr(feature = "serde", serde(default))]
    pub manager: String,
    /// Agreed delivery date
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub delivery_date: Option<NaiveDate>,
    /// Budget snapshot from the validated minute
    #[cfg_attr(feature = "serde", serde(default))]
    pub budget: f64,
    /// Production rows
    #[cfg_attr(feature = "serde", serde(default))]
    pub lines: Vec<Row>,
}

impl Project {
    /// Create an empty project
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Days until delivery from the given date (negative when overdue)
    pub fn days_until_delivery(&self, today: NaiveDate) -> Option<i64> {
        self.delivery_date
            .map(|d| d.signed_duration_since(today).num_days())
    }
}
