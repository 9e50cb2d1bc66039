//! Core list query logic: search, equality filters and sorting over in-memory records.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

mod engine;
pub mod normalize;

pub use engine::{query, QueryEngine};

/// Configuration that tunes how criteria are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// Filter value meaning "do not constrain this field".
    pub any_sentinel: String,
    /// Trim surrounding whitespace from the search term before matching.
    pub trim_search_term: bool,
    /// Treat an empty filter value like the sentinel.
    pub empty_filter_is_any: bool,
    /// Keep records without a sort value at the end in both directions.
    pub empty_sorts_last: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            any_sentinel: "all".to_string(),
            trim_search_term: true,
            empty_filter_is_any: true,
            empty_sorts_last: true,
        }
    }
}

impl QueryConfig {
    /// Rejects configurations that would make every filter value ambiguous.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.any_sentinel.trim().is_empty() {
            return Err(QueryError::InvalidConfig(
                "any_sentinel must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn is_unconstrained(&self, expected: &str) -> bool {
        let expected = expected.trim();
        if expected.is_empty() {
            return self.empty_filter_is_any;
        }
        expected.eq_ignore_ascii_case(self.any_sentinel.trim())
    }
}

/// Value of a single record field, as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Date(NaiveDate),
    /// Time of day, ordered chronologically and shown as `HH:MM`.
    Time(NaiveTime),
    Flag(bool),
    /// Text ordered by its leading integer, e.g. `"15 years"`.
    Measured(Cow<'a, str>),
    /// Several independent texts, such as tags. Each one is matched on its own.
    List(Vec<Cow<'a, str>>),
    /// The field exists on the record but carries no value.
    Empty,
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }

    pub fn measured(value: &'a str) -> Self {
        FieldValue::Measured(Cow::Borrowed(value))
    }

    /// Maps `None` to [`FieldValue::Empty`].
    pub fn optional_text(value: Option<&'a str>) -> Self {
        value.map(FieldValue::text).unwrap_or(FieldValue::Empty)
    }

    pub fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map(FieldValue::Date).unwrap_or(FieldValue::Empty)
    }

    pub fn list(values: &'a [String]) -> Self {
        FieldValue::List(values.iter().map(|value| Cow::Borrowed(value.as_str())).collect())
    }

    /// Text used for display and string comparisons.
    pub fn display_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Text(text) | FieldValue::Measured(text) => Some(Cow::Borrowed(text)),
            FieldValue::Number(value) => Some(Cow::Owned(value.to_string())),
            FieldValue::Date(date) => Some(Cow::Owned(date.format("%Y-%m-%d").to_string())),
            FieldValue::Time(time) => Some(Cow::Owned(time.format("%H:%M").to_string())),
            FieldValue::Flag(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
            FieldValue::List(items) if items.is_empty() => None,
            FieldValue::List(items) => Some(Cow::Owned(items.join(", "))),
            FieldValue::Empty => None,
        }
    }

    /// Texts matched by search and counted by facets, one per list item.
    pub fn match_texts(&self) -> Vec<Cow<'_, str>> {
        match self {
            FieldValue::List(items) => items
                .iter()
                .filter(|item| !item.is_empty())
                .map(|item| Cow::Borrowed(item.as_ref()))
                .collect(),
            other => other
                .display_text()
                .filter(|text| !text.is_empty())
                .into_iter()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(text) | FieldValue::Measured(text) => text.is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.is_empty()),
            _ => false,
        }
    }
}

/// A displayable item that the engine can search, filter and sort.
///
/// Each domain entity implements this with its own field names; there is no
/// shared schema between record types.
pub trait Record {
    /// Fields searched when the criteria do not name any.
    const SEARCH_FIELDS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Returns `None` when the record type has no field called `name`.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    const SEARCH_FIELDS: &'static [&'static str] = R::SEARCH_FIELDS;

    fn id(&self) -> &str {
        (**self).id()
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}

/// Direction applied to the sort key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(QueryError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

/// Declarative description of a derived list view. Every part is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Criteria {
    pub search_term: String,
    /// Fields the term is matched against; empty means [`Record::SEARCH_FIELDS`].
    pub search_fields: Vec<String>,
    /// Field name to expected value, all of which must hold.
    pub filters: BTreeMap<String, String>,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, expected: impl Into<String>) -> Self {
        self.filters.insert(field.into(), expected.into());
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.sort_direction = SortDirection::Descending;
        self
    }

    /// Splits a `field=value` pair as typed on a command line.
    pub fn parse_filter(raw: &str) -> Result<(String, String), QueryError> {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| QueryError::MalformedFilter(raw.to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(QueryError::MalformedFilter(raw.to_string()));
        }
        Ok((field.to_string(), value.trim().to_string()))
    }
}

/// Errors raised while building criteria or configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("filter must look like field=value, got `{0}`")]
    MalformedFilter(String),
    #[error("unknown sort direction `{0}`")]
    UnknownDirection(String),
    #[error("invalid query config: {0}")]
    InvalidConfig(String),
}
