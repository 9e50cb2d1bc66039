//! Framework-neutral WASM <-> JavaScript bridge for list queries.

use portal_query::{Criteria, QueryConfig, QueryEngine};
use portal_records::{Collection, RecordError, RecordKind};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsQueryConfig {
    #[serde(default)]
    any_sentinel: Option<String>,
    #[serde(default)]
    trim_search_term: Option<bool>,
    #[serde(default)]
    empty_filter_is_any: Option<bool>,
    #[serde(default)]
    empty_sorts_last: Option<bool>,
}

impl From<JsQueryConfig> for QueryConfig {
    fn from(cfg: JsQueryConfig) -> Self {
        let mut base = QueryConfig::default();
        if let Some(sentinel) = cfg.any_sentinel {
            base.any_sentinel = sentinel;
        }
        if let Some(trim) = cfg.trim_search_term {
            base.trim_search_term = trim;
        }
        if let Some(empty_is_any) = cfg.empty_filter_is_any {
            base.empty_filter_is_any = empty_is_any;
        }
        if let Some(empty_last) = cfg.empty_sorts_last {
            base.empty_sorts_last = empty_last;
        }
        base
    }
}

/// Filters and sorts a page's collection; `kind` is `patients`, `doctors`,
/// `appointments` or `journal`.
#[wasm_bindgen]
pub fn query_records(
    kind: &str,
    records: JsValue,
    criteria: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let collection = read_collection(kind, records)?;

    let criteria = match criteria {
        Some(js_criteria) => from_value::<Criteria>(js_criteria)
            .map_err(|err| JsValue::from_str(&format!("Could not read criteria: {err}")))?,
        None => Criteria::default(),
    };

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsQueryConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            QueryConfig::from(cfg)
        }
        None => QueryConfig::default(),
    };
    cfg.validate()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let projection = collection
        .query_value(&QueryEngine::new(cfg), &criteria)
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;

    to_js(&projection)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize records: {err}")))
}

/// Counts records per distinct value of `field`, for filter dropdowns.
#[wasm_bindgen]
pub fn facet_counts(kind: &str, records: JsValue, field: &str) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let collection = read_collection(kind, records)?;
    let facets = collection.facets(&QueryEngine::default(), field);

    to_js(&facets).map_err(|err| JsValue::from_str(&format!("Could not serialize facets: {err}")))
}

fn read_collection(kind: &str, records: JsValue) -> Result<Collection, JsValue> {
    let kind: RecordKind = kind
        .parse()
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;

    let value = from_value::<serde_json::Value>(records)
        .map_err(|err| JsValue::from_str(&format!("Could not read records: {err}")))?;

    Collection::from_value(kind, value).map_err(|err| JsValue::from_str(&format_record_error(err)))
}

/// Plain JS objects rather than `Map`s, so pages can read fields directly.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::json_compatible())
}

fn format_record_error(err: RecordError) -> String {
    format!("Record error: {err}")
}
