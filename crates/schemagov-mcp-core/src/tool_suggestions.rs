// ABOUTME: Mines raw SPARQL queries in the usage log for repeated `a <Type>` patterns
// ABOUTME: Frequent types become recommendations for new specialized list_* tools

use crate::usage_log::{UsageLogEntry, UsageLogSnapshot};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Tool whose logged arguments carry ad-hoc queries
pub const RAW_QUERY_TOOL: &str = "query_sparql";

/// Minimum occurrences before a type is worth a dedicated tool
pub const SUGGESTION_THRESHOLD: usize = 2;

lazy_static! {
    // Textual match only: `rdf:type` or unusual spacing around `a` is not recognised
    static ref TYPE_ASSERTION: Regex = Regex::new(r"\ba\s+<([^>]+)>").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub type_uri: String,
    pub occurrences: usize,
    pub reason: String,
    pub suggestion: String,
}

impl ToolSuggestion {
    fn for_type(type_uri: &str, occurrences: usize) -> Self {
        Self {
            kind: "New Tool Recommendation".to_string(),
            type_uri: type_uri.to_string(),
            occurrences,
            reason: format!(
                "You frequently query for instances of <{}> ({} times).",
                type_uri, occurrences
            ),
            suggestion: format!(
                "Consider adding a specialized tool: {}",
                suggested_tool_name(type_uri)
            ),
        }
    }
}

/// `list_` plus the lower-cased text after the last `/`
pub fn suggested_tool_name(type_uri: &str) -> String {
    let segment = type_uri.rsplit('/').next().unwrap_or(type_uri);
    format!("list_{}", segment.to_lowercase())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    /// Nothing has been logged yet
    NoLog,
    /// No raw queries, or no type reached the threshold
    NoPatterns,
    Suggestions(Vec<ToolSuggestion>),
}

pub struct SuggestionEngine;

impl SuggestionEngine {
    pub fn suggest(snapshot: &UsageLogSnapshot) -> SuggestionOutcome {
        if snapshot.is_empty() {
            return SuggestionOutcome::NoLog;
        }

        let suggestions = Self::suggestions_for(&snapshot.entries);
        if suggestions.is_empty() {
            SuggestionOutcome::NoPatterns
        } else {
            SuggestionOutcome::Suggestions(suggestions)
        }
    }

    /// Raw query strings recorded by the unrestricted query tool
    pub fn raw_queries(entries: &[UsageLogEntry]) -> Vec<&str> {
        entries
            .iter()
            .filter(|e| e.tool == RAW_QUERY_TOOL)
            .filter_map(|e| e.args.get("query").and_then(|q| q.as_str()))
            .filter(|q| !q.is_empty())
            .collect()
    }

    /// Per-type occurrence counts in order of first sighting
    pub fn type_counts(queries: &[&str]) -> Vec<(String, usize)> {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for query in queries {
            for caps in TYPE_ASSERTION.captures_iter(query) {
                let uri = &caps[1];
                match index.get(uri) {
                    Some(&pos) => order[pos].1 += 1,
                    None => {
                        index.insert(uri.to_string(), order.len());
                        order.push((uri.to_string(), 1));
                    }
                }
            }
        }

        order
    }

    pub fn suggestions_for(entries: &[UsageLogEntry]) -> Vec<ToolSuggestion> {
        let queries = Self::raw_queries(entries);
        Self::type_counts(&queries)
            .into_iter()
            .filter(|(_, count)| *count >= SUGGESTION_THRESHOLD)
            .map(|(uri, count)| ToolSuggestion::for_type(&uri, count))
            .collect()
    }
}
