// ABOUTME: Executes schema.gov.it operations: render SPARQL, run it, compress results, log usage
// ABOUTME: Every failure is converted into an error-flagged text payload at this boundary

use crate::distribution_preview::DistributionPreviewer;
use crate::operations::*;
use crate::result_compression::CompressedResult;
use crate::sparql_client::SparqlClient;
use crate::sparql_templates::{RenderedQuery, SparqlQueries};
use crate::tool_schemas::{SchemaGovToolSchemas, ToolSchema};
use schemagov_mcp_core::{
    FileUsageLog, LogSource, Result, SchemaGovConfig, SchemaGovError, SuggestionEngine,
    SuggestionOutcome, UsageAnalyzer, UsageLog, UsageLogEntry, UsageLogSnapshot, UsageReport,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOOL_PROGRESS_LOG_TARGET: &str = "schemagov::mcp::tools";

pub const NO_USAGE_LOGS: &str = "No usage logs found yet.";
pub const NO_QUERY_PATTERNS: &str =
    "No clear patterns found in RAW queries yet to suggest new tools.";

/// Text payload handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Executor for the schema.gov.it operation catalogue
pub struct SchemaGovToolExecutor {
    client: SparqlClient,
    previewer: DistributionPreviewer,
    usage_log: UsageLog,
    /// Read back by the meta operations
    log_source: Arc<dyn LogSource>,
}

impl SchemaGovToolExecutor {
    pub fn new(
        client: SparqlClient,
        previewer: DistributionPreviewer,
        usage_log: UsageLog,
        log_source: Arc<dyn LogSource>,
    ) -> Self {
        Self {
            client,
            previewer,
            usage_log,
            log_source,
        }
    }

    /// Wire the endpoint client, preview fetcher and file-backed usage log from configuration
    pub fn from_config(config: &SchemaGovConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.endpoint.user_agent.clone())
            .build()
            .map_err(|e| SchemaGovError::Transport(e.to_string()))?;

        let client = SparqlClient::with_http_client(http.clone(), config.endpoint.url.clone());
        let previewer = DistributionPreviewer::from_config(http, &config.preview);

        let log_file = Arc::new(FileUsageLog::new(config.usage_log.resolved_path()));
        let usage_log = if config.usage_log.enabled {
            UsageLog::new(log_file.clone())
        } else {
            UsageLog::disabled()
        };

        info!(
            endpoint = %config.endpoint.url,
            usage_log = %log_file.path().display(),
            usage_log_enabled = config.usage_log.enabled,
            "SchemaGovToolExecutor initialized"
        );

        Ok(Self::new(client, previewer, usage_log, log_file))
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn get_tool_schemas() -> Vec<ToolSchema> {
        SchemaGovToolSchemas::all()
    }

    pub fn get_tool_names() -> Vec<String> {
        SchemaGovToolSchemas::tool_names()
    }

    /// Dispatch by operation name with JSON arguments
    pub async fn execute_by_name(&self, tool_name: &str, arguments: JsonValue) -> ToolOutcome {
        if SchemaGovToolSchemas::get_by_name(tool_name).is_none() {
            let err = SchemaGovError::UnknownTool(tool_name.to_string());
            warn!(target: TOOL_PROGRESS_LOG_TARGET, tool = tool_name, "{}", err);
            return ToolOutcome::error(format!("Error: {}", err));
        }

        let arguments = match arguments {
            JsonValue::Null => JsonValue::Object(Map::new()),
            other => other,
        };

        macro_rules! dispatch {
            ($method:ident) => {
                match parse_arguments(tool_name, arguments) {
                    Ok(request) => self.$method(request).await,
                    Err(err) => ToolOutcome::error(format!("Error: {}", err)),
                }
            };
        }

        match tool_name {
            "query_sparql" => dispatch!(query_sparql),
            "explore_classes" => dispatch!(explore_classes),
            "explore_catalog" => self.explore_catalog().await,
            "check_coverage" => dispatch!(check_coverage),
            "check_quality" => dispatch!(check_quality),
            "check_overlaps" => dispatch!(check_overlaps),
            "list_ontologies" => dispatch!(list_ontologies),
            "explore_ontology" => dispatch!(explore_ontology),
            "list_vocabularies" => dispatch!(list_vocabularies),
            "search_in_vocabulary" => dispatch!(search_in_vocabulary),
            "list_datasets" => dispatch!(list_datasets),
            "explore_dataset" => dispatch!(explore_dataset),
            "search_concepts" => dispatch!(search_concepts),
            "inspect_concept" => dispatch!(inspect_concept),
            "find_relations" => dispatch!(find_relations),
            "suggest_improvements" => dispatch!(suggest_improvements),
            "preview_distribution" => dispatch!(preview_distribution),
            "suggest_new_tools" => self.suggest_new_tools().await,
            "analyze_usage" => self.analyze_usage().await,
            _ => ToolOutcome::error(format!(
                "Error: {}",
                SchemaGovError::UnknownTool(tool_name.to_string())
            )),
        }
    }

    // === SPARQL-backed operations ===

    pub async fn query_sparql(&self, request: QuerySparqlRequest) -> ToolOutcome {
        let args = logged_args(&request);
        log_tool_call_start("query_sparql", &args);
        let result = self.run_single(Ok(request.query)).await;
        self.finish("query_sparql", args, result, "Error executing query")
            .await
    }

    pub async fn explore_classes(&self, request: ExploreClassesRequest) -> ToolOutcome {
        let sparql = SparqlQueries::explore_classes(request.limit, request.filter.as_deref());
        self.compressed("explore_classes", &request, sparql).await
    }

    pub async fn explore_catalog(&self) -> ToolOutcome {
        self.keyed("explore_catalog", &EmptyRequest::default(), SparqlQueries::explore_catalog())
            .await
    }

    pub async fn check_coverage(&self, request: CheckCoverageRequest) -> ToolOutcome {
        let sparql = SparqlQueries::check_coverage(request.target_uri.as_deref());
        self.compressed("check_coverage", &request, sparql).await
    }

    pub async fn check_quality(&self, request: CheckQualityRequest) -> ToolOutcome {
        let sparql = SparqlQueries::check_quality(request.limit);
        self.compressed("check_quality", &request, sparql).await
    }

    pub async fn check_overlaps(&self, request: CheckOverlapsRequest) -> ToolOutcome {
        let sparql = SparqlQueries::check_overlaps(request.limit);
        self.compressed("check_overlaps", &request, sparql).await
    }

    pub async fn list_ontologies(&self, request: ListOntologiesRequest) -> ToolOutcome {
        let sparql = SparqlQueries::list_ontologies(request.limit);
        self.compressed("list_ontologies", &request, sparql).await
    }

    pub async fn explore_ontology(&self, request: ExploreOntologyRequest) -> ToolOutcome {
        let sparql = SparqlQueries::explore_ontology(&request.ontology_uri);
        self.compressed("explore_ontology", &request, sparql).await
    }

    pub async fn list_vocabularies(&self, request: ListVocabulariesRequest) -> ToolOutcome {
        let sparql = SparqlQueries::list_vocabularies(request.limit);
        self.compressed("list_vocabularies", &request, sparql).await
    }

    pub async fn search_in_vocabulary(&self, request: SearchInVocabularyRequest) -> ToolOutcome {
        let sparql =
            SparqlQueries::search_in_vocabulary(&request.scheme_uri, &request.keyword, request.limit);
        self.compressed("search_in_vocabulary", &request, sparql).await
    }

    pub async fn list_datasets(&self, request: ListDatasetsRequest) -> ToolOutcome {
        let sparql = SparqlQueries::list_datasets(request.limit, request.offset);
        self.compressed("list_datasets", &request, sparql).await
    }

    pub async fn explore_dataset(&self, request: ExploreDatasetRequest) -> ToolOutcome {
        let queries = SparqlQueries::explore_dataset(&request.dataset_uri);
        self.keyed("explore_dataset", &request, queries).await
    }

    pub async fn search_concepts(&self, request: SearchConceptsRequest) -> ToolOutcome {
        let sparql = SparqlQueries::search_concepts(&request.keyword, request.limit);
        self.compressed("search_concepts", &request, sparql).await
    }

    pub async fn inspect_concept(&self, request: InspectConceptRequest) -> ToolOutcome {
        let queries = SparqlQueries::inspect_concept(&request.uri);
        self.keyed("inspect_concept", &request, queries).await
    }

    pub async fn find_relations(&self, request: FindRelationsRequest) -> ToolOutcome {
        let sparql = SparqlQueries::find_relations(&request.source_uri, &request.target_uri);
        self.compressed("find_relations", &request, sparql).await
    }

    pub async fn suggest_improvements(&self, request: SuggestImprovementsRequest) -> ToolOutcome {
        let queries = SparqlQueries::suggest_improvements(request.limit);
        self.keyed("suggest_improvements", &request, queries).await
    }

    // === Distribution preview ===

    pub async fn preview_distribution(&self, request: PreviewDistributionRequest) -> ToolOutcome {
        let args = logged_args(&request);
        log_tool_call_start("preview_distribution", &args);

        let result = self.previewer.preview(&request.url).await.map(|preview| {
            (
                format!("Preview of {}:\n\n{}", request.url, preview.text),
                preview.items,
            )
        });
        self.finish("preview_distribution", args, result, "Error")
            .await
    }

    // === Meta operations over the usage log ===

    pub async fn suggest_new_tools(&self) -> ToolOutcome {
        log_tool_call_start("suggest_new_tools", &JsonValue::Object(Map::new()));

        let snapshot = match UsageLogSnapshot::read(self.log_source.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log_tool_call_error("suggest_new_tools", &err);
                return ToolOutcome::error(format!("Error analyzing usage: {}", err));
            }
        };

        let suggestions = match SuggestionEngine::suggest(&snapshot) {
            SuggestionOutcome::NoLog => return ToolOutcome::success(NO_USAGE_LOGS),
            SuggestionOutcome::NoPatterns => return ToolOutcome::success(NO_QUERY_PATTERNS),
            SuggestionOutcome::Suggestions(suggestions) => suggestions,
        };

        match serde_json::to_string_pretty(&suggestions) {
            Ok(text) => {
                self.usage_log
                    .record(&UsageLogEntry::success(
                        "suggest_new_tools",
                        JsonValue::Object(Map::new()),
                        suggestions.len(),
                    ))
                    .await;
                log_tool_call_finish("suggest_new_tools", &text);
                ToolOutcome::success(text)
            }
            Err(err) => {
                let err = SchemaGovError::from(err);
                log_tool_call_error("suggest_new_tools", &err);
                ToolOutcome::error(format!("Error analyzing usage: {}", err))
            }
        }
    }

    /// Not recorded in the usage log itself
    pub async fn analyze_usage(&self) -> ToolOutcome {
        log_tool_call_start("analyze_usage", &JsonValue::Object(Map::new()));

        let report = UsageLogSnapshot::read(self.log_source.as_ref())
            .await
            .map(|snapshot| UsageAnalyzer::analyze(&snapshot));

        let stats = match report {
            Ok(UsageReport::NoLog) => return ToolOutcome::success(NO_USAGE_LOGS),
            Ok(UsageReport::Stats(stats)) => stats,
            Err(err) => {
                log_tool_call_error("analyze_usage", &err);
                return ToolOutcome::error(format!("Error analyzing logs: {}", err));
            }
        };

        match serde_json::to_string_pretty(&stats) {
            Ok(text) => {
                log_tool_call_finish("analyze_usage", &text);
                ToolOutcome::success(text)
            }
            Err(err) => ToolOutcome::error(format!("Error analyzing logs: {}", err)),
        }
    }

    // === Shared execution path ===

    async fn compressed<R: Serialize>(
        &self,
        tool: &'static str,
        request: &R,
        sparql: Result<String>,
    ) -> ToolOutcome {
        let args = logged_args(request);
        log_tool_call_start(tool, &args);
        let result = self.run_single(sparql).await;
        self.finish(tool, args, result, "Error").await
    }

    async fn keyed<R: Serialize>(
        &self,
        tool: &'static str,
        request: &R,
        queries: Result<Vec<RenderedQuery>>,
    ) -> ToolOutcome {
        let args = logged_args(request);
        log_tool_call_start(tool, &args);
        let result = self.run_queries(queries).await;
        self.finish(tool, args, result, "Error").await
    }

    async fn run_single(&self, sparql: Result<String>) -> Result<(String, usize)> {
        let results = self.client.execute(&sparql?).await?;
        let compressed = CompressedResult::from_results(&results);
        Ok((serde_json::to_string(&compressed)?, results.row_count()))
    }

    /// Queries run one after another; the first failure aborts the operation
    async fn run_queries(&self, queries: Result<Vec<RenderedQuery>>) -> Result<(String, usize)> {
        let mut merged = Map::new();
        let mut rows = 0;

        for query in queries? {
            let results = self.client.execute(&query.sparql).await?;
            rows += results.row_count();
            merged.insert(
                query.key.to_string(),
                CompressedResult::from_results(&results).to_json(),
            );
        }

        Ok((serde_json::to_string(&merged)?, rows))
    }

    async fn finish(
        &self,
        tool: &'static str,
        args: JsonValue,
        result: Result<(String, usize)>,
        error_prefix: &str,
    ) -> ToolOutcome {
        match result {
            Ok((text, rows)) => {
                self.usage_log
                    .record(&UsageLogEntry::success(tool, args, rows))
                    .await;
                log_tool_call_finish(tool, &text);
                ToolOutcome::success(text)
            }
            Err(err) => {
                let message = err.to_string();
                self.usage_log
                    .record(&UsageLogEntry::error(tool, args, &message))
                    .await;
                log_tool_call_error(tool, &err);
                ToolOutcome::error(format!("{}: {}", error_prefix, message))
            }
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: JsonValue) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| SchemaGovError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn logged_args<R: Serialize>(request: &R) -> JsonValue {
    serde_json::to_value(request).unwrap_or_else(|_| JsonValue::Object(Map::new()))
}

fn log_tool_call_start(tool_name: &str, parameters: &JsonValue) {
    info!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool call started"
    );
    debug!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool input payload: {}",
        parameters
    );
}

fn log_tool_call_finish(tool_name: &str, payload: &str) {
    info!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        bytes = payload.len(),
        "Tool call completed"
    );
    debug!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool output payload: {}",
        payload
    );
}

fn log_tool_call_error(tool_name: &str, error: &SchemaGovError) {
    warn!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        remote = error.is_remote(),
        "Tool call failed: {}",
        error
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution_preview::PreviewLimits;
    use schemagov_mcp_core::MemoryUsageLog;
    use serde_json::json;
    use std::time::Duration;

    fn executor_with_log(log: Arc<MemoryUsageLog>) -> SchemaGovToolExecutor {
        // Port 9 (discard) is never served; SPARQL-backed calls fail fast
        let client = SparqlClient::new("http://127.0.0.1:9/sparql").unwrap();
        let previewer = DistributionPreviewer::new(
            reqwest::Client::new(),
            Duration::from_secs(1),
            PreviewLimits::default(),
        );
        SchemaGovToolExecutor::new(client, previewer, UsageLog::new(log.clone()), log)
    }

    fn log_line(tool: &str, args: JsonValue, summary: &str) -> String {
        serde_json::to_string(&UsageLogEntry {
            timestamp: "2025-03-01T10:00:00.000Z".to_string(),
            tool: tool.to_string(),
            args,
            summary: summary.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_tool_schemas_available() {
        assert_eq!(SchemaGovToolExecutor::get_tool_schemas().len(), 19);
        let names = SchemaGovToolExecutor::get_tool_names();
        assert!(names.contains(&"inspect_concept".to_string()));
        assert!(names.contains(&"preview_distribution".to_string()));
    }

    #[tokio::test]
    async fn test_analyze_usage_without_log() {
        let executor = executor_with_log(Arc::new(MemoryUsageLog::new()));
        let outcome = executor.analyze_usage().await;
        assert_eq!(outcome, ToolOutcome::success(NO_USAGE_LOGS));
    }

    #[tokio::test]
    async fn test_analyze_usage_reports_stats_and_is_not_logged() {
        let log = Arc::new(MemoryUsageLog::with_lines([
            log_line("search_concepts", json!({ "keyword": "x" }), "Success: 3 rows"),
            "not json".to_string(),
            log_line("query_sparql", json!({ "query": "ASK {}" }), "Error: timeout"),
        ]));
        let executor = executor_with_log(log.clone());

        let outcome = executor.analyze_usage().await;
        assert!(!outcome.is_error);
        let stats: JsonValue = serde_json::from_str(&outcome.text).unwrap();
        assert_eq!(stats["total_calls"], 2);
        assert_eq!(stats["tool_breakdown"]["search_concepts"], 1);
        assert_eq!(stats["recent_errors"], json!(["[query_sparql] Error: timeout"]));
        assert_eq!(stats["last_activity"], "2025-03-01T10:00:00.000Z");
        assert_eq!(log.lines().len(), 3);
    }

    #[tokio::test]
    async fn test_suggest_new_tools_messages() {
        let executor = executor_with_log(Arc::new(MemoryUsageLog::new()));
        assert_eq!(executor.suggest_new_tools().await.text, NO_USAGE_LOGS);

        let log = Arc::new(MemoryUsageLog::with_lines([log_line(
            "query_sparql",
            json!({ "query": "SELECT * WHERE { ?s a <http://example.org/Thing> }" }),
            "Success: 1 rows",
        )]));
        let executor = executor_with_log(log.clone());
        assert_eq!(executor.suggest_new_tools().await.text, NO_QUERY_PATTERNS);
        assert_eq!(log.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_suggest_new_tools_logs_when_suggesting() {
        let query = json!({ "query": "SELECT * WHERE { ?s a <http://example.org/Thing> }" });
        let log = Arc::new(MemoryUsageLog::with_lines([
            log_line("query_sparql", query.clone(), "Success: 1 rows"),
            log_line("query_sparql", query, "Success: 4 rows"),
        ]));
        let executor = executor_with_log(log.clone());

        let outcome = executor.suggest_new_tools().await;
        assert!(!outcome.is_error);
        let suggestions: JsonValue = serde_json::from_str(&outcome.text).unwrap();
        assert_eq!(suggestions.as_array().unwrap().len(), 1);
        assert_eq!(
            suggestions[0]["suggestion"],
            "Consider adding a specialized tool: list_thing"
        );

        let lines = log.lines();
        assert_eq!(lines.len(), 3);
        let recorded: UsageLogEntry = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(recorded.tool, "suggest_new_tools");
        assert_eq!(recorded.summary, "Success: 1 rows");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_logged_error() {
        let log = Arc::new(MemoryUsageLog::new());
        let executor = executor_with_log(log.clone());

        let outcome = executor
            .query_sparql(QuerySparqlRequest {
                query: "SELECT * WHERE { ?s ?p ?o }".to_string(),
            })
            .await;
        assert!(outcome.is_error);
        assert!(outcome.text.starts_with("Error executing query: Transport error"));

        let recorded: UsageLogEntry = serde_json::from_str(&log.lines()[0]).unwrap();
        assert_eq!(recorded.tool, "query_sparql");
        assert!(recorded.is_error());
        assert_eq!(recorded.args, json!({ "query": "SELECT * WHERE { ?s ?p ?o }" }));
    }

    #[tokio::test]
    async fn test_execute_by_name_rejects_unknown_and_bad_arguments() {
        let log = Arc::new(MemoryUsageLog::new());
        let executor = executor_with_log(log.clone());

        let unknown = executor.execute_by_name("drop_graph", json!({})).await;
        assert_eq!(unknown, ToolOutcome::error("Error: Unknown tool: drop_graph"));

        let bad = executor
            .execute_by_name("search_concepts", json!({ "limit": 3 }))
            .await;
        assert!(bad.is_error);
        assert!(bad.text.starts_with("Error: Invalid arguments for search_concepts"));
        assert!(log.lines().is_empty());
    }

    #[tokio::test]
    async fn test_execute_by_name_accepts_null_for_empty_operations() {
        let executor = executor_with_log(Arc::new(MemoryUsageLog::new()));
        let outcome = executor.execute_by_name("analyze_usage", JsonValue::Null).await;
        assert_eq!(outcome.text, NO_USAGE_LOGS);
    }

    #[test]
    fn test_log_tool_call_start_captures_info_and_debug() {
        let logs = capture_logs(|| {
            log_tool_call_start("search_concepts", &json!({ "keyword": "comune" }));
        });

        assert!(logs.contains("Tool call started"));
        assert!(logs.contains("Tool input payload"));
        assert!(logs.contains("comune"));
    }

    #[test]
    fn test_log_tool_call_finish_captures_info_and_debug() {
        let logs = capture_logs(|| {
            log_tool_call_finish("list_ontologies", "[]");
        });

        assert!(logs.contains("Tool call completed"));
        assert!(logs.contains("Tool output payload"));
    }

    #[test]
    fn test_log_tool_call_error_marks_remote_failures() {
        let logs = capture_logs(|| {
            let err = SchemaGovError::RemoteQuery {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                body: None,
            };
            log_tool_call_error("check_quality", &err);
        });

        assert!(logs.contains("Tool call failed"));
        assert!(logs.contains("remote=true"));
    }

    fn capture_logs<F>(f: F) -> String
    where
        F: FnOnce(),
    {
        use std::io::Write;
        use std::sync::Mutex;
        use tracing::subscriber::with_default;
        use tracing_subscriber::EnvFilter;

        #[derive(Clone)]
        struct BufferWriter {
            inner: Arc<Mutex<Vec<u8>>>,
        }

        impl BufferWriter {
            fn new() -> Self {
                Self {
                    inner: Arc::new(Mutex::new(Vec::new())),
                }
            }

            fn into_string(&self) -> String {
                let bytes = self.inner.lock().unwrap().clone();
                String::from_utf8(bytes).unwrap()
            }
        }

        impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for BufferWriter {
            type Writer = BufferGuard;

            fn make_writer(&'a self) -> Self::Writer {
                BufferGuard {
                    inner: self.inner.clone(),
                }
            }
        }

        struct BufferGuard {
            inner: Arc<Mutex<Vec<u8>>>,
        }

        impl Write for BufferGuard {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.inner.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let writer = BufferWriter::new();

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_ansi(false)
            .without_time()
            .with_writer(writer.clone())
            .finish();

        with_default(subscriber, f);

        writer.into_string()
    }
}
