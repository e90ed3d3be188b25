//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the backend's wire schema but are defined independently
//! of the mock-server crate; integration tests catch schema drift.
//!
//! Decoding is deliberately lenient where real backends differ: the id may
//! arrive as `id` or `_id`, and `dueDate` may be a plain calendar date or a
//! full RFC 3339 timestamp. Either way the client keeps only a
//! `NaiveDate`, so the edit buffer always works on a plain calendar date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier. Opaque to the client; never fabricated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// The wire spelling, also used as the query parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority `{0}` (expected low, medium or high)")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

/// A single todo item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    #[serde(alias = "_id")]
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        rename = "dueDate",
        default,
        with = "due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
}

/// Request payload for creating a todo. `dueDate` is omitted when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Request payload for a full replace of a todo's editable fields.
///
/// Unlike `CreateTodo`, `dueDate` is always serialized: `null` means
/// "clear the due date", which the server must distinguish from omission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: String,
    pub priority: Priority,
    #[serde(rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
}

/// Query selector for list retrieval. `None` means "no constraint" and
/// never produces a query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl FilterState {
    /// Query parameters for the set filters, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(completed) = self.completed {
            pairs.push(("completed".to_string(), completed.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority".to_string(), priority.as_str().to_string()));
        }
        pairs
    }
}

/// The `{ success, data, message }` wrapper every endpoint responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Parse a due date as sent by a backend: either `YYYY-MM-DD` or an
/// RFC 3339 timestamp, which is reduced to its UTC calendar date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc).date_naive()),
    }
}

mod due_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.filter(|s| !s.trim().is_empty())
            .map(|s| super::parse_due_date(&s).map_err(de::Error::custom))
            .transpose()
    }
}
