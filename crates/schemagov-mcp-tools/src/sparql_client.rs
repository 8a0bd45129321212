// ABOUTME: HTTP client for the remote SPARQL endpoint (form-encoded POST, JSON results)
// ABOUTME: Maps status, transport and decoding failures onto SchemaGovError variants

use crate::query_template::with_prefixes;
use schemagov_mcp_core::{EndpointConfig, Result, SchemaGovError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Variable name to RDF term object, in the endpoint's key order
pub type Binding = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// SPARQL 1.1 Query Results JSON document (SELECT or ASK)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: SparqlHead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<SparqlResultSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl SparqlResults {
    pub fn bindings(&self) -> &[Binding] {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.bindings().len()
    }
}

#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SchemaGovError::Transport(e.to_string()))?;
        Ok(Self::with_http_client(http, endpoint))
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SchemaGovError::Transport(e.to_string()))?;
        Ok(Self::with_http_client(http, config.url.clone()))
    }

    /// Share a connection pool with other components
    pub fn with_http_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one query. The prefix block is prepended here, exactly once.
    /// No timeout and no retry.
    pub async fn execute(&self, query: &str) -> Result<SparqlResults> {
        let full_query = with_prefixes(query);
        debug!(endpoint = %self.endpoint, bytes = full_query.len(), "Sending SPARQL query");

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", full_query.as_str())])
            .send()
            .await
            .map_err(|e| SchemaGovError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.trim().is_empty());
            return Err(SchemaGovError::RemoteQuery {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| SchemaGovError::Transport(e.to_string()))?;

        let results: SparqlResults = serde_json::from_str(&text)
            .map_err(|e| SchemaGovError::ResponseParse(e.to_string()))?;

        debug!(
            endpoint = %self.endpoint,
            rows = results.row_count(),
            "SPARQL query completed"
        );
        Ok(results)
    }
}
