// ABOUTME: Typed parameters for every schema.gov.it operation, shared by the executor and MCP server
// ABOUTME: Field names are camelCase on the wire; optional fields carry the documented defaults

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_limit_50() -> u32 {
    50
}

fn default_limit_20() -> u32 {
    20
}

fn default_limit_10() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct QuerySparqlRequest {
    /// The SPARQL query to execute
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ExploreClassesRequest {
    /// Maximum number of classes (default: 50)
    #[serde(default = "default_limit_50")]
    pub limit: u32,
    /// Optional text filter for class URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckCoverageRequest {
    /// URI of class or property to check coverage for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CheckQualityRequest {
    /// Maximum number of issues (default: 50)
    #[serde(default = "default_limit_50")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CheckOverlapsRequest {
    /// Maximum number of overlaps (default: 50)
    #[serde(default = "default_limit_50")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ListOntologiesRequest {
    /// Maximum number of ontologies (default: 50)
    #[serde(default = "default_limit_50")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExploreOntologyRequest {
    /// The URI of the Ontology (from list_ontologies)
    pub ontology_uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ListVocabulariesRequest {
    /// Maximum number of vocabularies (default: 20)
    #[serde(default = "default_limit_20")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchInVocabularyRequest {
    /// The URI of the ConceptScheme (from list_vocabularies)
    pub scheme_uri: String,
    /// The search keyword
    pub keyword: String,
    /// Maximum number of concepts (default: 20)
    #[serde(default = "default_limit_20")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ListDatasetsRequest {
    /// Page size (default: 20)
    #[serde(default = "default_limit_20")]
    pub limit: u32,
    /// Rows to skip (default: 0)
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExploreDatasetRequest {
    /// The URI of the Dataset
    pub dataset_uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchConceptsRequest {
    /// The search term (e.g. 'amministrazione')
    pub keyword: String,
    /// Maximum number of matches (default: 10)
    #[serde(default = "default_limit_10")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct InspectConceptRequest {
    /// The URI of the concept to inspect
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindRelationsRequest {
    pub source_uri: String,
    pub target_uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SuggestImprovementsRequest {
    /// Maximum findings per heuristic (default: 20)
    #[serde(default = "default_limit_20")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PreviewDistributionRequest {
    /// The download URL of the distribution
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct EmptyRequest {
    /// No parameters required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _unused: Option<String>,
}
