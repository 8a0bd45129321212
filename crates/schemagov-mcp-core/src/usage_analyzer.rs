// ABOUTME: Aggregate statistics over the usage log (call counts, distinct errors, last activity)
// ABOUTME: Pure over parsed entries; file order is treated as chronological order

use crate::usage_log::{UsageLogEntry, UsageLogSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distinct error summaries kept in a report
pub const MAX_RECENT_ERRORS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_calls: usize,
    /// Operation name to call count, in order of first appearance
    pub tool_breakdown: serde_json::Map<String, serde_json::Value>,
    pub recent_errors: Vec<String>,
    pub last_activity: Option<String>,
}

impl UsageStats {
    pub fn calls_for(&self, tool: &str) -> usize {
        self.tool_breakdown
            .get(tool)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UsageReport {
    /// Nothing has been logged yet
    NoLog,
    Stats(UsageStats),
}

pub struct UsageAnalyzer;

impl UsageAnalyzer {
    pub fn analyze(snapshot: &UsageLogSnapshot) -> UsageReport {
        if snapshot.is_empty() {
            return UsageReport::NoLog;
        }
        UsageReport::Stats(Self::stats(&snapshot.entries))
    }

    pub fn stats(entries: &[UsageLogEntry]) -> UsageStats {
        let mut stats = UsageStats::default();
        let mut seen_errors = HashSet::new();

        for entry in entries {
            stats.total_calls += 1;

            if !entry.tool.is_empty() {
                let count = stats
                    .tool_breakdown
                    .entry(entry.tool.clone())
                    .or_insert(serde_json::Value::from(0u64));
                *count = serde_json::Value::from(count.as_u64().unwrap_or(0) + 1);
            }

            if entry.is_error() {
                let qualified = format!("[{}] {}", entry.tool, entry.summary);
                if stats.recent_errors.len() < MAX_RECENT_ERRORS
                    && seen_errors.insert(qualified.clone())
                {
                    stats.recent_errors.push(qualified);
                }
            }

            // Last in file order, not the maximum timestamp
            stats.last_activity = Some(entry.timestamp.clone()).filter(|ts| !ts.is_empty());
        }

        stats
    }
}
