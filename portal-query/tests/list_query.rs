use chrono::{NaiveDate, NaiveTime};
use portal_query::normalize::{collate, leading_integer, parse_time_of_day};
use portal_query::{
    query, Criteria, FieldValue, QueryConfig, QueryEngine, QueryError, Record, SortDirection,
};

#[derive(Debug, Clone, PartialEq)]
struct Member {
    id: String,
    name: String,
    status: String,
    age: f64,
    experience: String,
    joined: Option<NaiveDate>,
    on_call: bool,
    shift_start: Option<NaiveTime>,
    skills: Vec<String>,
}

impl Record for Member {
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::text(&self.id)),
            "name" => Some(FieldValue::text(&self.name)),
            "status" => Some(FieldValue::text(&self.status)),
            "age" => Some(FieldValue::Number(self.age)),
            "experience" => Some(FieldValue::measured(&self.experience)),
            "joined" => Some(FieldValue::optional_date(self.joined)),
            "onCall" => Some(FieldValue::Flag(self.on_call)),
            "shiftStart" => Some(
                self.shift_start
                    .map(FieldValue::Time)
                    .unwrap_or(FieldValue::Empty),
            ),
            "skills" => Some(FieldValue::list(&self.skills)),
            _ => None,
        }
    }
}

fn member(id: &str, name: &str, status: &str, age: f64) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        status: status.to_string(),
        age,
        experience: String::new(),
        joined: None,
        on_call: false,
        shift_start: None,
        skills: Vec::new(),
    }
}

fn ids(result: &[&Member]) -> Vec<String> {
    result.iter().map(|m| m.id().to_string()).collect()
}

fn roster() -> Vec<Member> {
    vec![
        member("1", "Jane", "Active", 41.0),
        member("2", "Jon", "Inactive", 29.0),
        member("3", "Jan", "Active", 41.0),
        member("4", "Bob", "Critical", 67.0),
    ]
}

#[test]
fn empty_criteria_returns_input_in_order() {
    let records = roster();
    let result = query(&records, &Criteria::default());
    assert_eq!(ids(&result), vec!["1", "2", "3", "4"]);
}

#[test]
fn result_is_subset_of_input() {
    let records = roster();
    let criteria = Criteria::new().search("o").sort_by("age").descending();
    for found in query(&records, &criteria) {
        assert!(records.iter().any(|r| std::ptr::eq(r, found)));
    }
}

#[test]
fn search_and_filter_combine_with_and() {
    let records = vec![
        member("1", "Jane", "Active", 30.0),
        member("2", "Jon", "Inactive", 30.0),
        member("3", "Jan", "Active", 30.0),
    ];
    let criteria = Criteria::new()
        .search("ja")
        .in_fields(["name"])
        .filter("status", "Active");

    let result = query(&records, &criteria);
    assert_eq!(ids(&result), vec!["1", "3"]);

    let engine = QueryEngine::default();
    let term_only = Criteria::new().search("ja").in_fields(["name"]);
    let filter_only = Criteria::new().filter("status", "Active");
    for found in &result {
        assert!(engine.matches(*found, &term_only));
        assert!(engine.matches(*found, &filter_only));
    }

    let owned: Vec<Member> = result.into_iter().cloned().collect();
    assert_eq!(ids(&query(&owned, &criteria)), vec!["1", "3"]);
}

#[test]
fn search_is_case_insensitive_over_any_designated_field() {
    let records = roster();
    let by_status = query(&records, &Criteria::new().search("CRIT"));
    assert_eq!(ids(&by_status), vec!["4"]);

    let name_only = query(&records, &Criteria::new().search("crit").in_fields(["name"]));
    assert!(name_only.is_empty());
}

#[test]
fn search_term_is_trimmed_by_default() {
    let records = roster();
    assert_eq!(ids(&query(&records, &Criteria::new().search("  bob "))), vec!["4"]);

    let strict = QueryEngine::new(QueryConfig {
        trim_search_term: false,
        ..QueryConfig::default()
    });
    assert!(strict.query(&records, &Criteria::new().search(" bob ")).is_empty());
}

#[test]
fn equality_filter_ignores_case_for_text() {
    let records = roster();
    let result = query(&records, &Criteria::new().filter("status", "active"));
    assert_eq!(ids(&result), vec!["1", "3"]);
}

#[test]
fn sentinel_all_bypasses_the_filter() {
    let records = roster();
    let with_sentinel = query(&records, &Criteria::new().filter("status", "all"));
    let without = query(&records, &Criteria::default());
    assert_eq!(with_sentinel, without);

    let capitalised = query(&records, &Criteria::new().filter("status", "All"));
    assert_eq!(capitalised.len(), records.len());
}

#[test]
fn empty_filter_value_is_unconstrained_unless_configured() {
    let records = roster();
    assert_eq!(query(&records, &Criteria::new().filter("status", "")).len(), 4);

    let engine = QueryEngine::new(QueryConfig {
        empty_filter_is_any: false,
        ..QueryConfig::default()
    });
    assert!(engine
        .query(&records, &Criteria::new().filter("status", ""))
        .is_empty());
}

#[test]
fn unknown_fields_are_ignored() {
    let records = roster();
    let criteria = Criteria::new()
        .filter("ward", "north")
        .sort_by("shoeSize")
        .search("jane")
        .in_fields(["nickname"]);
    assert_eq!(ids(&query(&records, &criteria)), vec!["1", "2", "3", "4"]);
}

#[test]
fn no_match_yields_empty_result() {
    let records = roster();
    assert!(query(&records, &Criteria::new().filter("status", "Discharged")).is_empty());

    let nothing: Vec<Member> = Vec::new();
    assert!(query(&nothing, &Criteria::new().search("x").sort_by("name")).is_empty());
}

#[test]
fn numeric_sort_orders_by_value() {
    let records = vec![member("bob", "Bob", "Active", 45.0), member("alice", "Alice", "Active", 32.0)];
    let result = query(&records, &Criteria::new().sort_by("age"));
    assert_eq!(ids(&result), vec!["alice", "bob"]);
}

#[test]
fn sort_is_stable_in_both_directions() {
    let records = roster();
    let ascending = query(&records, &Criteria::new().sort_by("age"));
    assert_eq!(ids(&ascending), vec!["2", "1", "3", "4"]);

    let descending = query(&records, &Criteria::new().sort_by("age").descending());
    assert_eq!(ids(&descending), vec!["4", "1", "3", "2"]);
}

#[test]
fn text_sort_ignores_case_first() {
    let records = vec![
        member("1", "bob", "Active", 1.0),
        member("2", "Alice", "Active", 1.0),
        member("3", "carol", "Active", 1.0),
    ];
    let result = query(&records, &Criteria::new().sort_by("name"));
    assert_eq!(ids(&result), vec!["2", "1", "3"]);
}

#[test]
fn measured_text_sorts_by_leading_integer() {
    let mut records = roster();
    records[0].experience = "15 years".to_string();
    records[1].experience = "8 years".to_string();
    records[2].experience = "20 years".to_string();
    records[3].experience = "n/a".to_string();

    let result = query(&records, &Criteria::new().sort_by("experience"));
    assert_eq!(ids(&result), vec!["2", "1", "3", "4"]);

    let result = query(&records, &Criteria::new().sort_by("experience").descending());
    assert_eq!(ids(&result), vec!["3", "1", "2", "4"]);
}

#[test]
fn empty_values_sort_last_unless_configured() {
    let mut records = roster();
    records[1].joined = NaiveDate::from_ymd_opt(2023, 5, 1);
    records[3].joined = NaiveDate::from_ymd_opt(2021, 2, 10);

    let result = query(&records, &Criteria::new().sort_by("joined").descending());
    assert_eq!(ids(&result), vec!["2", "4", "1", "3"]);

    let engine = QueryEngine::new(QueryConfig {
        empty_sorts_last: false,
        ..QueryConfig::default()
    });
    let result = engine.query(&records, &Criteria::new().sort_by("joined"));
    assert_eq!(ids(&result), vec!["1", "3", "4", "2"]);
}

#[test]
fn typed_filters_parse_expected_values() {
    let mut records = roster();
    records[2].on_call = true;
    records[0].joined = NaiveDate::from_ymd_opt(2024, 1, 15);

    assert_eq!(ids(&query(&records, &Criteria::new().filter("onCall", "yes"))), vec!["3"]);
    assert_eq!(ids(&query(&records, &Criteria::new().filter("age", "41"))), vec!["1", "3"]);
    assert_eq!(
        ids(&query(&records, &Criteria::new().filter("joined", "2024-01-15"))),
        vec!["1"]
    );
}

#[test]
fn query_does_not_touch_input() {
    let records = roster();
    let before = records.clone();
    let _ = query(&records, &Criteria::new().search("j").sort_by("name").descending());
    assert_eq!(records, before);
}

#[test]
fn facets_group_case_insensitively() {
    let mut records = roster();
    records[2].status = "ACTIVE".to_string();

    let facets = QueryEngine::default().facets(&records, "status");
    assert_eq!(facets.get("Active"), Some(&2));
    assert_eq!(facets.get("Inactive"), Some(&1));
    assert_eq!(facets.get("Critical"), Some(&1));
    assert_eq!(facets.len(), 3);

    assert!(QueryEngine::default().facets(&records, "ward").is_empty());
}

#[test]
fn criteria_deserialize_from_page_state() {
    let criteria: Criteria = serde_json::from_str(
        r#"{"searchTerm":"ja","filters":{"status":"Active"},"sortKey":"name","sortDirection":"desc"}"#,
    )
    .expect("criteria should parse");

    assert_eq!(
        criteria,
        Criteria::new()
            .search("ja")
            .filter("status", "Active")
            .sort_by("name")
            .descending()
    );

    let empty: Criteria = serde_json::from_str("{}").expect("empty criteria should parse");
    assert_eq!(empty, Criteria::default());
}

#[test]
fn filter_and_direction_parsing() {
    assert_eq!(
        Criteria::parse_filter("status = Active"),
        Ok(("status".to_string(), "Active".to_string()))
    );
    assert_eq!(
        Criteria::parse_filter("status"),
        Err(QueryError::MalformedFilter("status".to_string()))
    );
    assert!(Criteria::parse_filter("=x").is_err());

    assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Descending));
    assert!("sideways".parse::<SortDirection>().is_err());
}

#[test]
fn blank_sentinel_is_rejected() {
    let config = QueryConfig {
        any_sentinel: "  ".to_string(),
        ..QueryConfig::default()
    };
    assert!(matches!(config.validate(), Err(QueryError::InvalidConfig(_))));
    assert!(QueryConfig::default().validate().is_ok());
}

#[test]
fn text_sort_places_accented_names_with_their_base_letter() {
    let records = vec![
        member("z", "Zoe", "Active", 1.0),
        member("e-acute", "Émile", "Active", 1.0),
        member("e", "Eve", "Active", 1.0),
    ];

    let result = query(&records, &Criteria::new().sort_by("name"));
    assert_eq!(ids(&result), vec!["e-acute", "e", "z"]);

    let result = query(&records, &Criteria::new().sort_by("name").descending());
    assert_eq!(ids(&result), vec!["z", "e", "e-acute"]);
}

#[test]
fn collate_is_total_across_accent_and_case_variants() {
    use std::cmp::Ordering;

    assert_eq!(collate("émile", "Emile").reverse(), collate("Emile", "émile"));
    assert_ne!(collate("émile", "Emile"), Ordering::Equal);
    assert_eq!(collate("Ana", "Ana"), Ordering::Equal);
    assert_eq!(collate("Ñandú", "Nora"), Ordering::Less);
}

#[test]
fn empty_values_come_last_when_descending_without_empty_last() {
    let mut records = roster();
    records[1].joined = NaiveDate::from_ymd_opt(2023, 5, 1);
    records[3].joined = NaiveDate::from_ymd_opt(2021, 2, 10);

    let engine = QueryEngine::new(QueryConfig {
        empty_sorts_last: false,
        ..QueryConfig::default()
    });
    let result = engine.query(&records, &Criteria::new().sort_by("joined").descending());
    assert_eq!(ids(&result), vec!["2", "4", "1", "3"]);
}

#[test]
fn time_values_sort_chronologically_across_clock_formats() {
    let mut records = roster();
    let starts = ["10:00", "9:00", "02:00 PM", "11:00 AM"];
    for (record, start) in records.iter_mut().zip(starts) {
        record.shift_start = parse_time_of_day(start);
    }

    let result = query(&records, &Criteria::new().sort_by("shiftStart"));
    assert_eq!(ids(&result), vec!["2", "1", "4", "3"]);

    let at_two = query(&records, &Criteria::new().filter("shiftStart", "14:00"));
    assert_eq!(ids(&at_two), vec!["3"]);
}

#[test]
fn list_items_are_matched_one_at_a_time() {
    let mut records = roster();
    records[0].skills = vec!["triage".to_string(), "outreach".to_string()];
    records[1].skills = vec!["Triage".to_string()];

    let across_items = query(
        &records,
        &Criteria::new().search("triage, out").in_fields(["skills"]),
    );
    assert!(across_items.is_empty());

    let partial = query(&records, &Criteria::new().search("reach").in_fields(["skills"]));
    assert_eq!(ids(&partial), vec!["1"]);

    let tagged = query(&records, &Criteria::new().filter("skills", "TRIAGE"));
    assert_eq!(ids(&tagged), vec!["1", "2"]);

    let facets = QueryEngine::default().facets(&records, "skills");
    assert_eq!(facets.get("triage"), Some(&2));
    assert_eq!(facets.get("outreach"), Some(&1));
}

#[test]
fn named_normalization_steps() {
    assert_eq!(leading_integer("15 years"), Some(15));
    assert_eq!(leading_integer("  -3 days"), Some(-3));
    assert_eq!(leading_integer("n/a"), None);

    assert_eq!(parse_time_of_day("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
    assert_eq!(parse_time_of_day("02:00 PM"), NaiveTime::from_hms_opt(14, 0, 0));
    assert_eq!(parse_time_of_day("noonish"), None);
}
