// ABOUTME: Reshapes SPARQL result sets into compact payloads for model consumption
// ABOUTME: Small results become flat records; larger ones a header row plus value rows

use crate::sparql_client::{Binding, SparqlResults};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Above this many rows the tabular layout is used
pub const TABULAR_THRESHOLD: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum CompressedResult {
    Empty,
    /// Variable name to plain value; unbound variables are left out
    RecordList(Vec<Map<String, JsonValue>>),
    Tabular {
        headers: Vec<String>,
        rows: Vec<Vec<JsonValue>>,
    },
    /// ASK answer
    Boolean(bool),
}

impl CompressedResult {
    pub fn from_results(results: &SparqlResults) -> Self {
        match (&results.results, results.boolean) {
            (None, Some(answer)) => return CompressedResult::Boolean(answer),
            (None, None) => return CompressedResult::Empty,
            _ => {}
        }

        let bindings = results.bindings();
        if bindings.is_empty() {
            return CompressedResult::Empty;
        }

        if bindings.len() > TABULAR_THRESHOLD {
            let headers = match &results.head.vars {
                Some(vars) => vars.clone(),
                None => bindings[0].keys().cloned().collect(),
            };
            let rows = bindings
                .iter()
                .map(|binding| {
                    headers
                        .iter()
                        .map(|h| term_value(binding, h).unwrap_or(JsonValue::Null))
                        .collect()
                })
                .collect();
            return CompressedResult::Tabular { headers, rows };
        }

        let records = bindings
            .iter()
            .map(|binding| {
                binding
                    .keys()
                    .filter_map(|k| term_value(binding, k).map(|v| (k.clone(), v)))
                    .collect()
            })
            .collect();
        CompressedResult::RecordList(records)
    }

    pub fn row_count(&self) -> usize {
        match self {
            CompressedResult::Empty | CompressedResult::Boolean(_) => 0,
            CompressedResult::RecordList(records) => records.len(),
            CompressedResult::Tabular { rows, .. } => rows.len(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

fn term_value(binding: &Binding, var: &str) -> Option<JsonValue> {
    binding.get(var).and_then(|term| term.get("value")).cloned()
}

impl Serialize for CompressedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CompressedResult::Empty => serializer.collect_seq(std::iter::empty::<JsonValue>()),
            CompressedResult::RecordList(records) => records.serialize(serializer),
            CompressedResult::Tabular { headers, rows } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("headers", headers)?;
                map.serialize_entry("rows", rows)?;
                map.end()
            }
            CompressedResult::Boolean(answer) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("boolean", answer)?;
                map.end()
            }
        }
    }
}
