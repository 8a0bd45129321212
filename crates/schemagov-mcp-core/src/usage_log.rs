// ABOUTME: Append-only JSON-lines usage log recording one entry per tool invocation
// ABOUTME: Persistence is injected through LogSink/LogSource so analytics can run in memory

use crate::error::{Result, SchemaGovError};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const USAGE_LOG_TARGET: &str = "schemagov::usage_log";

/// One recorded tool invocation. Never modified after it is appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLogEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool: String,
    #[serde(default)]
    pub args: JsonValue,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
}

/// Null or non-string values read as empty
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => s,
        _ => String::new(),
    })
}

impl UsageLogEntry {
    pub fn new(tool: &str, args: JsonValue, summary: String) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tool: tool.to_string(),
            args,
            summary,
        }
    }

    pub fn success(tool: &str, args: JsonValue, rows: usize) -> Self {
        Self::new(tool, args, format!("Success: {} rows", rows))
    }

    pub fn error(tool: &str, args: JsonValue, message: &str) -> Self {
        Self::new(tool, args, format!("Error: {}", message))
    }

    pub fn is_error(&self) -> bool {
        self.summary.starts_with("Error")
    }

    /// Any JSON document is an entry; fields of the wrong shape read as empty
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// Destination for encoded log lines
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append a single line. Implementations add the line terminator.
    async fn append_line(&self, line: &str) -> Result<()>;
}

/// Reader over everything durably written so far
#[async_trait]
pub trait LogSource: Send + Sync {
    /// All lines in file order. A log that was never written reads as empty.
    async fn read_lines(&self) -> Result<Vec<String>>;
}

/// File-backed log, one JSON object per line
#[derive(Debug, Clone)]
pub struct FileUsageLog {
    path: PathBuf,
}

impl FileUsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileUsageLog {
    async fn append_line(&self, line: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SchemaGovError::LogWrite(format!("{}: {}", self.path.display(), e)))?;

        // Single write per entry so concurrent appends never interleave mid-line
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| SchemaGovError::LogWrite(format!("{}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SchemaGovError::LogWrite(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl LogSource for FileUsageLog {
    async fn read_lines(&self) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(data.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SchemaGovError::Io(e)),
        }
    }
}

/// In-memory log used by tests and embedders without a writable working directory
#[derive(Debug, Default)]
pub struct MemoryUsageLog {
    lines: Mutex<Vec<String>>,
    reject_writes: bool,
}

impl MemoryUsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with raw lines (which may be malformed)
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            reject_writes: false,
        }
    }

    /// A sink whose every append fails, for exercising the swallow path
    pub fn failing() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            reject_writes: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl LogSink for MemoryUsageLog {
    async fn append_line(&self, line: &str) -> Result<()> {
        if self.reject_writes {
            return Err(SchemaGovError::LogWrite("sink rejects writes".to_string()));
        }
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

#[async_trait]
impl LogSource for MemoryUsageLog {
    async fn read_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.lock().clone())
    }
}

/// Records invocations. Failures are reported on the diagnostic channel and swallowed.
#[derive(Clone)]
pub struct UsageLog {
    sink: Option<Arc<dyn LogSink>>,
}

impl UsageLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub async fn record(&self, entry: &UsageLogEntry) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                warn!(target: USAGE_LOG_TARGET, tool = %entry.tool, "Failed to encode usage entry: {}", e);
                return;
            }
        };

        if let Err(e) = sink.append_line(&line).await {
            warn!(target: USAGE_LOG_TARGET, tool = %entry.tool, "Failed to log usage: {}", e);
        }
    }
}

/// Parsed view of the log at read time
#[derive(Debug, Clone, Default)]
pub struct UsageLogSnapshot {
    pub entries: Vec<UsageLogEntry>,
    /// Non-blank lines seen, parsable or not
    pub line_count: usize,
    pub skipped_lines: usize,
}

impl UsageLogSnapshot {
    /// Tolerant parse: blank lines are ignored, lines that are not JSON are skipped.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut snapshot = Self::default();

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            snapshot.line_count += 1;

            match serde_json::from_str::<JsonValue>(line) {
                Ok(value) => snapshot.entries.push(UsageLogEntry::from_json(value)),
                Err(e) => {
                    let err = SchemaGovError::LogParse {
                        line: idx + 1,
                        reason: e.to_string(),
                    };
                    debug!(target: USAGE_LOG_TARGET, "{}", err);
                    snapshot.skipped_lines += 1;
                }
            }
        }

        snapshot
    }

    pub async fn read(source: &dyn LogSource) -> Result<Self> {
        let lines = source.read_lines().await?;
        Ok(Self::parse(&lines))
    }

    /// True when nothing was ever logged
    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}
