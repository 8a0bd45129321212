// ABOUTME: Catalogue of schema.gov.it operations with descriptions and JSON parameter schemas
// ABOUTME: Used for name validation and CLI listings; schemas are derived from the request structs

use crate::operations::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Tool schema for listing and dynamic dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

fn schema<T: JsonSchema>(name: &str, description: &str) -> ToolSchema {
    ToolSchema {
        name: name.to_string(),
        description: description.to_string(),
        parameters: serde_json::to_value(schemars::schema_for!(T)).unwrap_or(JsonValue::Null),
    }
}

/// Collection of all operation schemas
pub struct SchemaGovToolSchemas;

impl SchemaGovToolSchemas {
    pub fn all() -> Vec<ToolSchema> {
        vec![
            schema::<QuerySparqlRequest>(
                "query_sparql",
                "Execute a RAW SPARQL query against schema.gov.it. Use this for ad-hoc exploration.",
            ),
            schema::<ExploreClassesRequest>(
                "explore_classes",
                "List available classes in the ontology to understand content.",
            ),
            schema::<EmptyRequest>(
                "explore_catalog",
                "List named graphs or ontologies available in the endpoint.",
            ),
            schema::<CheckCoverageRequest>(
                "check_coverage",
                "Analyze the usage coverage of a specific class or property, or global stats.",
            ),
            schema::<CheckQualityRequest>(
                "check_quality",
                "Verify quality issues like missing labels or descriptions.",
            ),
            schema::<CheckOverlapsRequest>(
                "check_overlaps",
                "Identify potential overlaps (same labels) or explicit mappings.",
            ),
            schema::<ListOntologiesRequest>(
                "list_ontologies",
                "List available Ontologies (Data Models) and their titles.",
            ),
            schema::<ExploreOntologyRequest>(
                "explore_ontology",
                "List Classes and Properties defined in a specific Ontology.",
            ),
            schema::<ListVocabulariesRequest>(
                "list_vocabularies",
                "List available Controlled Vocabularies (ConceptSchemes) and their instance counts.",
            ),
            schema::<SearchInVocabularyRequest>(
                "search_in_vocabulary",
                "Search for concepts within a specific Controlled Vocabulary (ConceptScheme).",
            ),
            schema::<ListDatasetsRequest>(
                "list_datasets",
                "List available Datasets (dcatapit:Dataset) in the catalog.",
            ),
            schema::<ExploreDatasetRequest>(
                "explore_dataset",
                "Get details of a specific Dataset (Description, Distributions, Themes).",
            ),
            schema::<SearchConceptsRequest>(
                "search_concepts",
                "Fuzzy search for concepts/classes/properties by keyword. Use this when you don't know the exact URI.",
            ),
            schema::<InspectConceptRequest>(
                "inspect_concept",
                "Get a comprehensive profile of a concept: definition, hierarchy, usage, and neighbors.",
            ),
            schema::<FindRelationsRequest>(
                "find_relations",
                "Find how two concepts are connected (direct link or via 1 intermediate).",
            ),
            schema::<SuggestImprovementsRequest>(
                "suggest_improvements",
                "Analyze the ontology for structural issues (lonely classes, cycles, etc).",
            ),
            schema::<PreviewDistributionRequest>(
                "preview_distribution",
                "Download and preview the first 10 rows of a distribution (CSV/JSON only). Use this to see actual data.",
            ),
            schema::<EmptyRequest>(
                "suggest_new_tools",
                "Analyze usage logs to suggest new potential tools based on frequent RAW queries.",
            ),
            schema::<EmptyRequest>(
                "analyze_usage",
                "Analyze the server's own usage logs to identify patterns, errors, or frequent queries.",
            ),
        ]
    }

    pub fn tool_names() -> Vec<String> {
        Self::all().into_iter().map(|s| s.name).collect()
    }

    pub fn get_by_name(name: &str) -> Option<ToolSchema> {
        Self::all().into_iter().find(|s| s.name == name)
    }
}
