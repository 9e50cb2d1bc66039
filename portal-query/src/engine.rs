use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use log::debug;

use crate::normalize::{collate, fold, leading_integer, parse_time_of_day};
use crate::{Criteria, FieldValue, QueryConfig, Record, SortDirection};

/// Derives filtered and sorted views of record collections.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: QueryConfig,
}

/// Runs `criteria` with the default configuration.
pub fn query<'r, R: Record>(records: &'r [R], criteria: &Criteria) -> Vec<&'r R> {
    QueryEngine::default().query(records, criteria)
}

impl QueryEngine {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Returns the records matching `criteria`, sorted when a sort key is set.
    ///
    /// The input is never modified. Without a sort key the result keeps input
    /// order; with one, records with equal keys keep their relative order.
    pub fn query<'r, R: Record>(&self, records: &'r [R], criteria: &Criteria) -> Vec<&'r R> {
        let term = self.prepared_term(criteria);
        let mut matched: Vec<&R> = records
            .iter()
            .filter(|record| self.matches_prepared(*record, criteria, &term))
            .collect();

        if let Some(key) = criteria.sort_key.as_deref() {
            self.sort(&mut matched, key, criteria.sort_direction);
        }

        debug!(
            "event=list_query total={} matched={} filters={} sort_key={:?} direction={}",
            records.len(),
            matched.len(),
            criteria.filters.len(),
            criteria.sort_key,
            criteria.sort_direction
        );

        matched
    }

    /// True when `record` satisfies the search term and every equality filter.
    pub fn matches<R: Record>(&self, record: &R, criteria: &Criteria) -> bool {
        let term = self.prepared_term(criteria);
        self.matches_prepared(record, criteria, &term)
    }

    /// Counts records per distinct value of `field`, grouping case-insensitively.
    ///
    /// The first spelling seen names the group and every list item counts on its
    /// own. Unknown fields yield an empty map.
    pub fn facets<R: Record>(&self, records: &[R], field: &str) -> BTreeMap<String, usize> {
        let mut groups: BTreeMap<String, (String, usize)> = BTreeMap::new();
        for record in records {
            let Some(value) = record.field(field) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            for text in value.match_texts() {
                groups
                    .entry(fold(&text))
                    .or_insert_with(|| (text.to_string(), 0))
                    .1 += 1;
            }
        }

        groups.into_values().collect()
    }

    fn prepared_term(&self, criteria: &Criteria) -> String {
        let term = if self.config.trim_search_term {
            criteria.search_term.trim()
        } else {
            criteria.search_term.as_str()
        };
        fold(term)
    }

    fn matches_prepared<R: Record>(&self, record: &R, criteria: &Criteria, term: &str) -> bool {
        self.matches_term(record, criteria, term) && self.matches_filters(record, criteria)
    }

    fn matches_term<R: Record>(&self, record: &R, criteria: &Criteria, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }

        let mut known_fields = 0usize;
        let mut check = |name: &str| -> bool {
            let Some(value) = record.field(name) else {
                return false;
            };
            known_fields += 1;
            let texts = value.match_texts();
            texts.iter().any(|text| fold(text).contains(term))
        };

        let found = if criteria.search_fields.is_empty() {
            R::SEARCH_FIELDS.iter().any(|name| check(name))
        } else {
            criteria.search_fields.iter().any(|name| check(name))
        };

        // A term aimed only at fields this record type lacks constrains nothing.
        found || known_fields == 0
    }

    fn matches_filters<R: Record>(&self, record: &R, criteria: &Criteria) -> bool {
        criteria.filters.iter().all(|(field, expected)| {
            if self.config.is_unconstrained(expected) {
                return true;
            }
            match record.field(field) {
                Some(value) => value_equals(&value, expected),
                None => true,
            }
        })
    }

    fn sort<R: Record>(&self, matched: &mut Vec<&R>, key: &str, direction: SortDirection) {
        let mut keyed: Vec<(SortValue, &R)> = matched
            .iter()
            .map(|record| (SortValue::from_field(record.field(key)), *record))
            .collect();

        let empty_last = self.config.empty_sorts_last;
        // `sort_by` is stable, so ties keep their input order in both directions.
        keyed.sort_by(|(a, _), (b, _)| compare_sort_values(a, b, direction, empty_last));

        *matched = keyed.into_iter().map(|(_, record)| record).collect();
    }
}

fn value_equals(value: &FieldValue<'_>, expected: &str) -> bool {
    let expected = expected.trim();
    match value {
        FieldValue::Empty => expected.is_empty(),
        FieldValue::Text(text) | FieldValue::Measured(text) => fold(text.trim()) == fold(expected),
        FieldValue::Number(number) => match expected.parse::<f64>() {
            Ok(parsed) => *number == parsed,
            Err(_) => fold(&number.to_string()) == fold(expected),
        },
        FieldValue::Flag(flag) => parse_flag(expected) == Some(*flag),
        FieldValue::Date(date) => match NaiveDate::parse_from_str(expected, "%Y-%m-%d") {
            Ok(parsed) => *date == parsed,
            Err(_) => value
                .display_text()
                .map(|text| fold(&text) == fold(expected))
                .unwrap_or(false),
        },
        FieldValue::Time(time) => parse_time_of_day(expected) == Some(*time),
        FieldValue::List(items) => {
            let expected = fold(expected);
            items.iter().any(|item| fold(item.trim()) == expected)
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Precomputed sort key for one record.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Flag(bool),
    Number(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Text(String),
    Empty,
}

impl SortValue {
    fn from_field(value: Option<FieldValue<'_>>) -> Self {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            return SortValue::Empty;
        };
        match value {
            FieldValue::Empty => SortValue::Empty,
            FieldValue::Flag(flag) => SortValue::Flag(flag),
            FieldValue::Number(number) => SortValue::Number(number),
            FieldValue::Date(date) => SortValue::Date(date),
            FieldValue::Time(time) => SortValue::Time(time),
            FieldValue::Measured(text) => leading_integer(&text)
                .map(|number| SortValue::Number(number as f64))
                .unwrap_or(SortValue::Empty),
            FieldValue::Text(text) => SortValue::Text(text.into_owned()),
            FieldValue::List(items) => SortValue::Text(items.join(", ")),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Empty => 0,
            SortValue::Flag(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Date(_) => 3,
            SortValue::Time(_) => 4,
            SortValue::Text(_) => 5,
        }
    }
}

fn compare_sort_values(
    a: &SortValue,
    b: &SortValue,
    direction: SortDirection,
    empty_last: bool,
) -> Ordering {
    if empty_last {
        match (a, b) {
            (SortValue::Empty, SortValue::Empty) => return Ordering::Equal,
            (SortValue::Empty, _) => return Ordering::Greater,
            (_, SortValue::Empty) => return Ordering::Less,
            _ => {}
        }
    }

    let ordering = match (a, b) {
        (SortValue::Flag(x), SortValue::Flag(y)) => x.cmp(y),
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Date(x), SortValue::Date(y)) => x.cmp(y),
        (SortValue::Time(x), SortValue::Time(y)) => x.cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => collate(x, y),
        _ => a.rank().cmp(&b.rank()),
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}
