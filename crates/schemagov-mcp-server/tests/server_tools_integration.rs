// ABOUTME: Drives the MCP server's tool handlers against a mocked SPARQL endpoint
// ABOUTME: Checks result wrapping, error flags and usage logging through the server surface

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use schemagov_mcp_core::{MemoryUsageLog, UsageLog, UsageLogEntry};
use schemagov_mcp_server::SchemaGovMcpServer;
use schemagov_mcp_tools::{
    DistributionPreviewer, EmptyRequest, PreviewLimits, SchemaGovToolExecutor,
    SearchConceptsRequest, SparqlClient,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_for(mock: &MockServer, log: Arc<MemoryUsageLog>) -> SchemaGovMcpServer {
    let client = SparqlClient::new(format!("{}/sparql", mock.uri())).expect("client");
    let previewer = DistributionPreviewer::new(
        reqwest::Client::new(),
        Duration::from_secs(5),
        PreviewLimits::default(),
    );
    let executor =
        SchemaGovToolExecutor::new(client, previewer, UsageLog::new(log.clone()), log);
    SchemaGovMcpServer::new(Arc::new(executor))
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("")
}

fn recorded(log: &MemoryUsageLog) -> Vec<UsageLogEntry> {
    log.lines()
        .iter()
        .map(|line| serde_json::from_str(line).expect("log entry"))
        .collect()
}

fn one_concept() -> Value {
    json!({
        "head": { "vars": ["concept", "label"] },
        "results": { "bindings": [{
            "concept": { "type": "uri", "value": "https://w3id.org/italia/onto/CPV/Person" },
            "label": { "type": "literal", "value": "Persona", "xml:lang": "it" }
        }]}
    })
}

#[tokio::test]
async fn search_concepts_returns_success_content() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(body_string_contains("persona"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_concept()))
        .expect(1)
        .mount(&mock)
        .await;

    let log = Arc::new(MemoryUsageLog::new());
    let server = server_for(&mock, log.clone());

    let result = server
        .search_concepts(Parameters(SearchConceptsRequest {
            keyword: "persona".to_string(),
            limit: 10,
        }))
        .await
        .expect("tool result");

    assert_eq!(result.is_error, Some(false));
    let payload: Value = serde_json::from_str(&text_of(&result)).expect("json payload");
    assert_eq!(
        payload[0]["concept"],
        "https://w3id.org/italia/onto/CPV/Person"
    );
    assert_eq!(recorded(&log)[0].summary, "Success: 1 rows");
}

#[tokio::test]
async fn endpoint_failure_is_flagged_as_error_content() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock)
        .await;

    let log = Arc::new(MemoryUsageLog::new());
    let server = server_for(&mock, log.clone());

    let result = server
        .explore_catalog(Parameters(EmptyRequest::default()))
        .await
        .expect("tool result");

    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("Error: SPARQL request failed: 503"));
    assert!(recorded(&log)[0].is_error());
}

#[tokio::test]
async fn usage_analysis_sees_calls_made_through_the_server() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_concept()))
        .mount(&mock)
        .await;

    let log = Arc::new(MemoryUsageLog::new());
    let server = server_for(&mock, log.clone());

    for keyword in ["persona", "luogo"] {
        server
            .search_concepts(Parameters(SearchConceptsRequest {
                keyword: keyword.to_string(),
                limit: 10,
            }))
            .await
            .expect("tool result");
    }

    let result = server
        .analyze_usage(Parameters(EmptyRequest::default()))
        .await
        .expect("tool result");
    assert_eq!(result.is_error, Some(false));

    let stats: Value = serde_json::from_str(&text_of(&result)).expect("stats");
    assert_eq!(stats["total_calls"], 2);
    assert_eq!(stats["tool_breakdown"]["search_concepts"], 2);
    assert_eq!(recorded(&log).len(), 2);
}
