// ABOUTME: MCP server implementation for the schema.gov.it SPARQL exploration tools
// ABOUTME: Each tool forwards its typed parameters to SchemaGovToolExecutor and wraps the text payload

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, Implementation,
        ListPromptsResult, PaginatedRequestParam, Prompt, PromptMessage, PromptMessageContent,
        PromptMessageRole, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use schemagov_mcp_core::SchemaGovConfig;
use schemagov_mcp_tools::*;
use std::future::Future;
use std::sync::Arc;

use crate::prompts::{INITIAL_INSTRUCTIONS, INITIAL_INSTRUCTIONS_PROMPT_NAME};

pub const DEFAULT_SERVER_NAME: &str = "schema-gov-it";

fn into_call_result(outcome: ToolOutcome) -> CallToolResult {
    let content = vec![Content::text(outcome.text)];
    if outcome.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[derive(Clone)]
pub struct SchemaGovMcpServer {
    executor: Arc<SchemaGovToolExecutor>,
    server_name: String,
    /// Official MCP tool router (required by macros)
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SchemaGovMcpServer {
    pub fn new(executor: Arc<SchemaGovToolExecutor>) -> Self {
        Self {
            executor,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_config(config: &SchemaGovConfig) -> schemagov_mcp_core::Result<Self> {
        let executor = SchemaGovToolExecutor::from_config(config)?;
        Ok(Self::new(Arc::new(executor)).with_name(config.server.name.clone()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn executor(&self) -> Arc<SchemaGovToolExecutor> {
        self.executor.clone()
    }

    #[tool(
        description = "Execute a RAW SPARQL query against schema.gov.it. Use this for ad-hoc exploration."
    )]
    pub async fn query_sparql(
        &self,
        params: Parameters<QuerySparqlRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.query_sparql(params.0).await))
    }

    #[tool(description = "List available classes in the ontology to understand content.")]
    pub async fn explore_classes(
        &self,
        params: Parameters<ExploreClassesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.explore_classes(params.0).await))
    }

    #[tool(description = "List named graphs or ontologies available in the endpoint.")]
    pub async fn explore_catalog(
        &self,
        _params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.explore_catalog().await))
    }

    #[tool(
        description = "Analyze the usage coverage of a specific class or property, or global stats."
    )]
    pub async fn check_coverage(
        &self,
        params: Parameters<CheckCoverageRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.check_coverage(params.0).await))
    }

    #[tool(description = "Verify quality issues like missing labels or descriptions.")]
    pub async fn check_quality(
        &self,
        params: Parameters<CheckQualityRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.check_quality(params.0).await))
    }

    #[tool(description = "Identify potential overlaps (same labels) or explicit mappings.")]
    pub async fn check_overlaps(
        &self,
        params: Parameters<CheckOverlapsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.check_overlaps(params.0).await))
    }

    #[tool(description = "List available Ontologies (Data Models) and their titles.")]
    pub async fn list_ontologies(
        &self,
        params: Parameters<ListOntologiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.list_ontologies(params.0).await))
    }

    #[tool(description = "List Classes and Properties defined in a specific Ontology.")]
    pub async fn explore_ontology(
        &self,
        params: Parameters<ExploreOntologyRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.explore_ontology(params.0).await))
    }

    #[tool(
        description = "List available Controlled Vocabularies (ConceptSchemes) and their instance counts."
    )]
    pub async fn list_vocabularies(
        &self,
        params: Parameters<ListVocabulariesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.list_vocabularies(params.0).await))
    }

    #[tool(
        description = "Search for concepts within a specific Controlled Vocabulary (ConceptScheme)."
    )]
    pub async fn search_in_vocabulary(
        &self,
        params: Parameters<SearchInVocabularyRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.search_in_vocabulary(params.0).await))
    }

    #[tool(description = "List available Datasets (dcatapit:Dataset) in the catalog.")]
    pub async fn list_datasets(
        &self,
        params: Parameters<ListDatasetsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.list_datasets(params.0).await))
    }

    #[tool(
        description = "Get details of a specific Dataset (Description, Distributions, Themes)."
    )]
    pub async fn explore_dataset(
        &self,
        params: Parameters<ExploreDatasetRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.explore_dataset(params.0).await))
    }

    #[tool(
        description = "Fuzzy search for concepts/classes/properties by keyword. Use this when you don't know the exact URI."
    )]
    pub async fn search_concepts(
        &self,
        params: Parameters<SearchConceptsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.search_concepts(params.0).await))
    }

    #[tool(
        description = "Get a comprehensive profile of a concept: definition, hierarchy, usage, and neighbors."
    )]
    pub async fn inspect_concept(
        &self,
        params: Parameters<InspectConceptRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.inspect_concept(params.0).await))
    }

    #[tool(
        description = "Find how two concepts are connected (direct link or via 1 intermediate)."
    )]
    pub async fn find_relations(
        &self,
        params: Parameters<FindRelationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.find_relations(params.0).await))
    }

    #[tool(
        description = "Analyze the ontology for structural issues (lonely classes, cycles, etc)."
    )]
    pub async fn suggest_improvements(
        &self,
        params: Parameters<SuggestImprovementsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.suggest_improvements(params.0).await))
    }

    #[tool(
        description = "Download and preview the first 10 rows of a distribution (CSV/JSON only). Use this to see actual data."
    )]
    pub async fn preview_distribution(
        &self,
        params: Parameters<PreviewDistributionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.preview_distribution(params.0).await))
    }

    #[tool(
        description = "Analyze usage logs to suggest new potential tools based on frequent RAW queries."
    )]
    pub async fn suggest_new_tools(
        &self,
        _params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.suggest_new_tools().await))
    }

    #[tool(
        description = "Analyze the server's own usage logs to identify patterns, errors, or frequent queries."
    )]
    pub async fn analyze_usage(
        &self,
        _params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.executor.analyze_usage().await))
    }
}

#[tool_handler]
impl ServerHandler for SchemaGovMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INITIAL_INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_logging()
                .build(),
            server_info: Implementation {
                name: self.server_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        async move {
            Ok(ListPromptsResult {
                prompts: vec![Prompt {
                    name: INITIAL_INSTRUCTIONS_PROMPT_NAME.to_string(),
                    title: Some("schema.gov.it tool guide".to_string()),
                    description: Some(
                        "How to navigate ontologies, vocabularies and datasets with the schema.gov.it tools, and how to read compressed results.".to_string(),
                    ),
                    arguments: None,
                    icons: None,
                    meta: None,
                }],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        let name = request.name.clone();
        async move {
            match name.as_str() {
                INITIAL_INSTRUCTIONS_PROMPT_NAME => Ok(GetPromptResult {
                    description: Some("schema.gov.it tool guide".to_string()),
                    messages: vec![
                        PromptMessage {
                            role: PromptMessageRole::User,
                            content: PromptMessageContent::text(
                                "Please read the schema.gov.it tool guide below before exploring the catalogue.",
                            ),
                        },
                        PromptMessage {
                            role: PromptMessageRole::Assistant,
                            content: PromptMessageContent::text(INITIAL_INSTRUCTIONS),
                        },
                    ],
                }),
                _ => Err(McpError::invalid_params(
                    format!("Unknown prompt: {}", name),
                    None,
                )),
            }
        }
    }
}
