// ABOUTME: SPARQL bodies for every schema.gov.it operation and the builders that render them
// ABOUTME: Multi-query operations return an ordered list of keyed queries

use crate::query_template::{QueryTemplate, TemplateParams};
use schemagov_mcp_core::Result;

pub const EXPLORE_CLASSES: QueryTemplate = QueryTemplate {
    name: "explore_classes",
    body: r#"
SELECT DISTINCT ?class (COUNT(?s) AS ?count)
WHERE {
  ?s a ?class .
  ${filter_clause}
}
GROUP BY ?class
ORDER BY DESC(?count)
LIMIT ${limit}
"#,
    params: &["filter_clause", "limit"],
};

pub const CATALOG_GRAPHS: QueryTemplate = QueryTemplate {
    name: "explore_catalog.graphs",
    body: r#"
SELECT DISTINCT ?g ?type
WHERE {
  GRAPH ?g { ?s ?p ?o }
}
LIMIT 100
"#,
    params: &[],
};

pub const CATALOG_ONTOLOGIES: QueryTemplate = QueryTemplate {
    name: "explore_catalog.ontologies",
    body: r#"
SELECT DISTINCT ?s ?type
WHERE {
  VALUES ?type { owl:Ontology skos:ConceptScheme }
  ?s a ?type .
}
LIMIT 100
"#,
    params: &[],
};

pub const COVERAGE_TARGET: QueryTemplate = QueryTemplate {
    name: "check_coverage.target",
    body: r#"
SELECT (COUNT(DISTINCT ?s) AS ?instances) (COUNT(DISTINCT ?p) AS ?propertiesUsed)
WHERE {
  { ?s a <${target_uri}> }
  UNION
  { ?s <${target_uri}> ?o }
  UNION
  { ?sub <${target_uri}> ?obj }
}
"#,
    params: &["target_uri"],
};

pub const COVERAGE_GLOBAL: QueryTemplate = QueryTemplate {
    name: "check_coverage.global",
    body: r#"
SELECT ?type (COUNT(?s) AS ?count)
WHERE {
  ?s a ?type .
}
GROUP BY ?type
ORDER BY DESC(?count)
LIMIT 50
"#,
    params: &[],
};

pub const CHECK_QUALITY: QueryTemplate = QueryTemplate {
    name: "check_quality",
    body: r#"
SELECT ?s ?type ?issue
WHERE {
  VALUES ?type { owl:Class owl:ObjectProperty owl:DatatypeProperty skos:Concept }
  ?s a ?type .
  FILTER NOT EXISTS { ?s rdfs:label ?label }
  FILTER NOT EXISTS { ?s skos:prefLabel ?label }
  BIND("Missing Label" AS ?issue)
}
LIMIT ${limit}
"#,
    params: &["limit"],
};

pub const CHECK_OVERLAPS: QueryTemplate = QueryTemplate {
    name: "check_overlaps",
    body: r#"
SELECT ?s1 ?s2 ?label ?relation
WHERE {
  {
    ?s1 owl:sameAs ?s2 .
    BIND("owl:sameAs" AS ?relation)
  }
  UNION
  {
    ?s1 skos:exactMatch ?s2 .
    BIND("skos:exactMatch" AS ?relation)
  }
  UNION
  {
    ?s1 rdfs:label ?label .
    ?s2 rdfs:label ?label .
    FILTER (?s1 != ?s2)
    BIND("Same Label" AS ?relation)
  }
}
LIMIT ${limit}
"#,
    params: &["limit"],
};

pub const LIST_ONTOLOGIES: QueryTemplate = QueryTemplate {
    name: "list_ontologies",
    body: r#"
SELECT DISTINCT ?ont ?label
WHERE {
  ?ont a owl:Ontology .
  OPTIONAL { ?ont rdfs:label|dct:title ?label }
}
ORDER BY ?label
LIMIT ${limit}
"#,
    params: &["limit"],
};

// Membership is a namespace-prefix heuristic on the item URI
pub const EXPLORE_ONTOLOGY: QueryTemplate = QueryTemplate {
    name: "explore_ontology",
    body: r#"
SELECT DISTINCT ?type ?item ?label
WHERE {
  VALUES ?type { owl:Class owl:ObjectProperty owl:DatatypeProperty }
  ?item a ?type .
  OPTIONAL { ?item rdfs:label ?label }
  FILTER(STRSTARTS(STR(?item), "${ontology_uri}"))
}
ORDER BY ?type ?item
LIMIT 200
"#,
    params: &["ontology_uri"],
};

pub const LIST_VOCABULARIES: QueryTemplate = QueryTemplate {
    name: "list_vocabularies",
    body: r#"
SELECT DISTINCT ?scheme ?label (COUNT(?c) AS ?count)
WHERE {
  ?scheme a skos:ConceptScheme .
  OPTIONAL { ?scheme rdfs:label|dct:title ?label }
  OPTIONAL { ?c skos:inScheme ?scheme }
}
GROUP BY ?scheme ?label
ORDER BY DESC(?count)
LIMIT ${limit}
"#,
    params: &["limit"],
};

pub const SEARCH_IN_VOCABULARY: QueryTemplate = QueryTemplate {
    name: "search_in_vocabulary",
    body: r#"
SELECT DISTINCT ?concept ?label ?code
WHERE {
  ?concept skos:inScheme <${scheme_uri}> .
  ?concept rdfs:label|skos:prefLabel ?label .
  OPTIONAL { ?concept skos:notation|dct:identifier ?code }
  FILTER(REGEX(STR(?label), "${keyword}", "i"))
}
ORDER BY ?label
LIMIT ${limit}
"#,
    params: &["scheme_uri", "keyword", "limit"],
};

pub const LIST_DATASETS: QueryTemplate = QueryTemplate {
    name: "list_datasets",
    body: r#"
SELECT DISTINCT ?dataset ?label
WHERE {
  ?dataset a <http://dati.gov.it/onto/dcatapit#Dataset> .
  OPTIONAL { ?dataset dct:title ?label }
}
ORDER BY ?label
LIMIT ${limit}
OFFSET ${offset}
"#,
    params: &["limit", "offset"],
};

pub const DATASET_METADATA: QueryTemplate = QueryTemplate {
    name: "explore_dataset.metadata",
    body: r#"
SELECT ?p ?o
WHERE {
  <${dataset_uri}> ?p ?o .
  FILTER (ISLITERAL(?o) || (ISURI(?o) && EXISTS { ?o a <http://dati.gov.it/onto/dcatapit#Distribution> }))
}
LIMIT 100
"#,
    params: &["dataset_uri"],
};

pub const DATASET_DISTRIBUTIONS: QueryTemplate = QueryTemplate {
    name: "explore_dataset.distributions",
    body: r#"
SELECT ?dist ?format ?url
WHERE {
  ?dist a <http://dati.gov.it/onto/dcatapit#Distribution> .
  { <${dataset_uri}> dcat:distribution ?dist } UNION { ?dist dct:isPartOf <${dataset_uri}> } .
  OPTIONAL { ?dist dct:format ?format }
  OPTIONAL { ?dist dcat:downloadURL ?url }
}
LIMIT 20
"#,
    params: &["dataset_uri"],
};

pub const SEARCH_CONCEPTS: QueryTemplate = QueryTemplate {
    name: "search_concepts",
    body: r#"
SELECT DISTINCT ?subject ?type ?label
WHERE {
  VALUES ?type { owl:Class owl:ObjectProperty owl:DatatypeProperty skos:Concept }
  ?subject a ?type .
  ?subject rdfs:label|skos:prefLabel|dct:title ?label .
  FILTER(REGEX(STR(?label), "${keyword}", "i"))
}
LIMIT ${limit}
"#,
    params: &["keyword", "limit"],
};

pub const CONCEPT_DEFINITION: QueryTemplate = QueryTemplate {
    name: "inspect_concept.definition",
    body: r#"
SELECT ?p ?o WHERE { <${uri}> ?p ?o . FILTER(ISLITERAL(?o)) }
"#,
    params: &["uri"],
};

pub const CONCEPT_HIERARCHY: QueryTemplate = QueryTemplate {
    name: "inspect_concept.hierarchy",
    body: r#"
SELECT ?type ?parent ?child WHERE {
  { <${uri}> a ?type }
  UNION
  { <${uri}> rdfs:subClassOf|skos:broader ?parent }
  UNION
  { ?child rdfs:subClassOf|skos:broader <${uri}> }
} LIMIT 50
"#,
    params: &["uri"],
};

pub const CONCEPT_USAGE: QueryTemplate = QueryTemplate {
    name: "inspect_concept.usage",
    body: r#"
SELECT (COUNT(?s) AS ?instanceCount) WHERE { ?s a <${uri}> }
"#,
    params: &["uri"],
};

pub const CONCEPT_INCOMING: QueryTemplate = QueryTemplate {
    name: "inspect_concept.incoming",
    body: r#"
SELECT DISTINCT ?p ?sType WHERE {
  ?s ?p ?o .
  ?o a <${uri}> .
  OPTIONAL { ?s a ?sType }
} LIMIT 20
"#,
    params: &["uri"],
};

pub const CONCEPT_OUTGOING: QueryTemplate = QueryTemplate {
    name: "inspect_concept.outgoing",
    body: r#"
SELECT DISTINCT ?p ?oType WHERE {
  ?s a <${uri}> .
  ?s ?p ?o .
  OPTIONAL { ?o a ?oType }
} LIMIT 20
"#,
    params: &["uri"],
};

pub const FIND_RELATIONS: QueryTemplate = QueryTemplate {
    name: "find_relations",
    body: r#"
SELECT ?p1 ?mid ?p2
WHERE {
  {
    <${source_uri}> ?p1 <${target_uri}> .
    BIND("DIRECT" AS ?mid)
    BIND("NONE" AS ?p2)
  }
  UNION
  {
    <${source_uri}> ?p1 ?mid .
    ?mid ?p2 <${target_uri}> .
  }
}
LIMIT 10
"#,
    params: &["source_uri", "target_uri"],
};

// Classes with neither instances nor subclasses
pub const LONELY_CLASSES: QueryTemplate = QueryTemplate {
    name: "suggest_improvements.unused_classes",
    body: r#"
SELECT ?class (COUNT(?s) AS ?instances)
WHERE {
  ?class a owl:Class .
  FILTER NOT EXISTS { ?s a ?class }
  FILTER NOT EXISTS { ?sub rdfs:subClassOf ?class }
}
GROUP BY ?class
LIMIT ${limit}
"#,
    params: &["limit"],
};

// Two-step subclass cycles only
pub const SUBCLASS_CYCLES: QueryTemplate = QueryTemplate {
    name: "suggest_improvements.possible_cycles",
    body: r#"
SELECT ?a ?b
WHERE {
  ?a rdfs:subClassOf ?b .
  ?b rdfs:subClassOf ?a .
  FILTER (?a != ?b)
}
LIMIT ${limit}
"#,
    params: &["limit"],
};

/// Every template in the catalogue
pub const ALL_TEMPLATES: &[QueryTemplate] = &[
    EXPLORE_CLASSES,
    CATALOG_GRAPHS,
    CATALOG_ONTOLOGIES,
    COVERAGE_TARGET,
    COVERAGE_GLOBAL,
    CHECK_QUALITY,
    CHECK_OVERLAPS,
    LIST_ONTOLOGIES,
    EXPLORE_ONTOLOGY,
    LIST_VOCABULARIES,
    SEARCH_IN_VOCABULARY,
    LIST_DATASETS,
    DATASET_METADATA,
    DATASET_DISTRIBUTIONS,
    SEARCH_CONCEPTS,
    CONCEPT_DEFINITION,
    CONCEPT_HIERARCHY,
    CONCEPT_USAGE,
    CONCEPT_INCOMING,
    CONCEPT_OUTGOING,
    FIND_RELATIONS,
    LONELY_CLASSES,
    SUBCLASS_CYCLES,
];

/// One rendered query of an operation; `key` names it in merged payloads
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub key: &'static str,
    pub sparql: String,
}

impl RenderedQuery {
    fn new(key: &'static str, sparql: String) -> Self {
        Self { key, sparql }
    }
}

/// Present and non-empty
fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub struct SparqlQueries;

impl SparqlQueries {
    pub fn explore_classes(limit: u32, filter: Option<&str>) -> Result<String> {
        let filter_clause = match given(filter) {
            Some(f) => format!("FILTER(REGEX(STR(?class), \"{}\", \"i\"))", f),
            None => String::new(),
        };
        EXPLORE_CLASSES.render(
            &TemplateParams::new()
                .text("filter_clause", filter_clause)
                .integer("limit", limit),
        )
    }

    pub fn explore_catalog() -> Result<Vec<RenderedQuery>> {
        let none = TemplateParams::new();
        Ok(vec![
            RenderedQuery::new("graphs", CATALOG_GRAPHS.render(&none)?),
            RenderedQuery::new("ontologies", CATALOG_ONTOLOGIES.render(&none)?),
        ])
    }

    pub fn check_coverage(target_uri: Option<&str>) -> Result<String> {
        match given(target_uri) {
            Some(uri) => COVERAGE_TARGET.render(&TemplateParams::new().text("target_uri", uri)),
            None => COVERAGE_GLOBAL.render(&TemplateParams::new()),
        }
    }

    pub fn check_quality(limit: u32) -> Result<String> {
        CHECK_QUALITY.render(&TemplateParams::new().integer("limit", limit))
    }

    pub fn check_overlaps(limit: u32) -> Result<String> {
        CHECK_OVERLAPS.render(&TemplateParams::new().integer("limit", limit))
    }

    pub fn list_ontologies(limit: u32) -> Result<String> {
        LIST_ONTOLOGIES.render(&TemplateParams::new().integer("limit", limit))
    }

    pub fn explore_ontology(ontology_uri: &str) -> Result<String> {
        EXPLORE_ONTOLOGY.render(&TemplateParams::new().text("ontology_uri", ontology_uri))
    }

    pub fn list_vocabularies(limit: u32) -> Result<String> {
        LIST_VOCABULARIES.render(&TemplateParams::new().integer("limit", limit))
    }

    pub fn search_in_vocabulary(scheme_uri: &str, keyword: &str, limit: u32) -> Result<String> {
        SEARCH_IN_VOCABULARY.render(
            &TemplateParams::new()
                .text("scheme_uri", scheme_uri)
                .text("keyword", keyword)
                .integer("limit", limit),
        )
    }

    pub fn list_datasets(limit: u32, offset: u32) -> Result<String> {
        LIST_DATASETS.render(
            &TemplateParams::new()
                .integer("limit", limit)
                .integer("offset", offset),
        )
    }

    pub fn explore_dataset(dataset_uri: &str) -> Result<Vec<RenderedQuery>> {
        let params = TemplateParams::new().text("dataset_uri", dataset_uri);
        Ok(vec![
            RenderedQuery::new("metadata", DATASET_METADATA.render(&params)?),
            RenderedQuery::new("distributions", DATASET_DISTRIBUTIONS.render(&params)?),
        ])
    }

    pub fn search_concepts(keyword: &str, limit: u32) -> Result<String> {
        SEARCH_CONCEPTS.render(
            &TemplateParams::new()
                .text("keyword", keyword)
                .integer("limit", limit),
        )
    }

    pub fn inspect_concept(uri: &str) -> Result<Vec<RenderedQuery>> {
        let params = TemplateParams::new().text("uri", uri);
        Ok(vec![
            RenderedQuery::new("definition", CONCEPT_DEFINITION.render(&params)?),
            RenderedQuery::new("hierarchy", CONCEPT_HIERARCHY.render(&params)?),
            RenderedQuery::new("usage", CONCEPT_USAGE.render(&params)?),
            RenderedQuery::new("incoming", CONCEPT_INCOMING.render(&params)?),
            RenderedQuery::new("outgoing", CONCEPT_OUTGOING.render(&params)?),
        ])
    }

    pub fn find_relations(source_uri: &str, target_uri: &str) -> Result<String> {
        FIND_RELATIONS.render(
            &TemplateParams::new()
                .text("source_uri", source_uri)
                .text("target_uri", target_uri),
        )
    }

    pub fn suggest_improvements(limit: u32) -> Result<Vec<RenderedQuery>> {
        let params = TemplateParams::new().integer("limit", limit);
        Ok(vec![
            RenderedQuery::new("possible_cycles", SUBCLASS_CYCLES.render(&params)?),
            RenderedQuery::new("unused_classes", LONELY_CLASSES.render(&params)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_params_match_placeholders() {
        for template in ALL_TEMPLATES {
            let mut declared: Vec<&str> = template.params.to_vec();
            let mut found = template.placeholders();
            declared.sort_unstable();
            found.sort_unstable();
            assert_eq!(declared, found, "template {}", template.name);
        }
    }

    #[test]
    fn explore_classes_without_filter_is_complete() {
        let sparql = SparqlQueries::explore_classes(10, None).unwrap();
        assert!(sparql.contains("LIMIT 10"));
        assert!(!sparql.contains("FILTER"));
        assert!(!sparql.contains("${"));
        assert!(sparql.contains("GROUP BY ?class"));
    }

    #[test]
    fn explore_classes_empty_filter_counts_as_absent() {
        let sparql = SparqlQueries::explore_classes(50, Some("")).unwrap();
        assert!(!sparql.contains("FILTER"));
    }

    #[test]
    fn explore_classes_filter_is_case_insensitive_regex() {
        let sparql = SparqlQueries::explore_classes(5, Some("Person")).unwrap();
        assert!(sparql.contains(r#"FILTER(REGEX(STR(?class), "Person", "i"))"#));
        assert!(sparql.contains("LIMIT 5"));
    }

    #[test]
    fn search_concepts_uses_keyword_and_limit() {
        let sparql = SparqlQueries::search_concepts("amministrazione", 10).unwrap();
        assert!(sparql.contains(r#"FILTER(REGEX(STR(?label), "amministrazione", "i"))"#));
        assert!(sparql.contains("LIMIT 10"));
    }

    #[test]
    fn coverage_switches_on_target() {
        let targeted = SparqlQueries::check_coverage(Some("http://e.org/C")).unwrap();
        assert!(targeted.contains("{ ?s a <http://e.org/C> }"));
        let global = SparqlQueries::check_coverage(None).unwrap();
        assert!(global.contains("GROUP BY ?type"));
        assert!(global.contains("LIMIT 50"));
    }

    #[test]
    fn list_datasets_renders_offset() {
        let sparql = SparqlQueries::list_datasets(20, 40).unwrap();
        assert!(sparql.contains("LIMIT 20"));
        assert!(sparql.contains("OFFSET 40"));
        assert!(sparql.contains("a <http://dati.gov.it/onto/dcatapit#Dataset>"));
    }

    #[test]
    fn multi_query_operations_keep_key_order() {
        let keys: Vec<_> = SparqlQueries::inspect_concept("http://e.org/X")
            .unwrap()
            .into_iter()
            .map(|q| q.key)
            .collect();
        assert_eq!(keys, ["definition", "hierarchy", "usage", "incoming", "outgoing"]);

        let keys: Vec<_> = SparqlQueries::explore_dataset("http://e.org/D")
            .unwrap()
            .into_iter()
            .map(|q| q.key)
            .collect();
        assert_eq!(keys, ["metadata", "distributions"]);

        let keys: Vec<_> = SparqlQueries::suggest_improvements(20)
            .unwrap()
            .into_iter()
            .map(|q| q.key)
            .collect();
        assert_eq!(keys, ["possible_cycles", "unused_classes"]);
    }

    #[test]
    fn dataset_distributions_use_prefixed_part_of() {
        let queries = SparqlQueries::explore_dataset("http://e.org/D").unwrap();
        let distributions = &queries[1].sparql;
        assert!(distributions.contains("{ ?dist dct:isPartOf <http://e.org/D> }"));
        assert!(!distributions.contains("isDistributionOf"));
    }

    #[test]
    fn uris_are_inserted_verbatim() {
        let sparql = SparqlQueries::find_relations("http://a.org/1", "http://b.org/2").unwrap();
        assert!(sparql.contains("<http://a.org/1> ?p1 <http://b.org/2> ."));
        assert!(sparql.contains("?mid ?p2 <http://b.org/2> ."));
    }
}
