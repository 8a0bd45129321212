// ABOUTME: Renders SPARQL bodies with ${name} substitution points and the shared prefix block
// ABOUTME: Caller strings are inserted verbatim; the endpoint rejects malformed fragments

use schemagov_mcp_core::{Result, SchemaGovError};
use std::collections::HashMap;
use std::fmt;

/// Namespace declarations prepended to every query sent to the endpoint
pub const PREFIXES: &str = "
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
PREFIX dcat: <http://www.w3.org/ns/dcat#>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
";

/// Full query text as sent over the wire
pub fn with_prefixes(body: &str) -> String {
    format!("{}\n{}", PREFIXES, body)
}

/// A static SPARQL body owned by one operation
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub body: &'static str,
    /// Every `${...}` point in `body`
    pub params: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Integer(u64),
    /// Inserted as-is, without quoting or escaping
    Text(String),
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Integer(n) => write!(f, "{}", n),
            TemplateValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateParams {
    values: HashMap<&'static str, TemplateValue>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integer(mut self, name: &'static str, value: impl Into<u64>) -> Self {
        self.values.insert(name, TemplateValue::Integer(value.into()));
        self
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, TemplateValue::Text(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }
}

impl QueryTemplate {
    /// Substitute every point in the body. Does not add prefixes.
    pub fn render(&self, params: &TemplateParams) -> Result<String> {
        let mut out = String::with_capacity(self.body.len() + 64);
        let mut rest = self.body;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                SchemaGovError::Template(format!(
                    "unterminated substitution point in template '{}'",
                    self.name
                ))
            })?;
            let name = &after[..end];
            let value = params.get(name).ok_or_else(|| {
                SchemaGovError::Template(format!(
                    "template '{}' has no value for ${{{}}}",
                    self.name, name
                ))
            })?;
            out.push_str(&value.to_string());
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Names of the substitution points actually present in the body
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.body;
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    if !names.contains(&name) {
                        names.push(name);
                    }
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: QueryTemplate = QueryTemplate {
        name: "demo",
        body: "SELECT ?s WHERE { ?s ?p \"${keyword}\" . ${clause} } LIMIT ${limit}",
        params: &["keyword", "clause", "limit"],
    };

    #[test]
    fn integers_render_bare_and_text_verbatim() {
        let params = TemplateParams::new()
            .text("keyword", "a\"b")
            .text("clause", "")
            .integer("limit", 10u32);
        let rendered = DEMO.render(&params).unwrap();
        assert_eq!(rendered, "SELECT ?s WHERE { ?s ?p \"a\"b\" .  } LIMIT 10");
    }

    #[test]
    fn missing_value_is_a_template_error() {
        let params = TemplateParams::new().text("keyword", "x").integer("limit", 1u32);
        let err = DEMO.render(&params).unwrap_err();
        assert!(matches!(err, SchemaGovError::Template(ref m) if m.contains("${clause}")));
    }

    #[test]
    fn unterminated_point_is_rejected() {
        let broken = QueryTemplate {
            name: "broken",
            body: "LIMIT ${limit",
            params: &["limit"],
        };
        let params = TemplateParams::new().integer("limit", 1u32);
        assert!(broken.render(&params).is_err());
    }

    #[test]
    fn placeholders_are_listed_once_in_order() {
        let repeated = QueryTemplate {
            name: "repeated",
            body: "<${uri}> ?p ?o . ?s ?p <${uri}> LIMIT ${limit}",
            params: &["uri", "limit"],
        };
        assert_eq!(repeated.placeholders(), vec!["uri", "limit"]);
    }

    #[test]
    fn prefixes_precede_body() {
        let full = with_prefixes("SELECT * WHERE { ?s ?p ?o }");
        assert!(full.starts_with("\nPREFIX rdf:"));
        assert!(full.contains("PREFIX dcat: <http://www.w3.org/ns/dcat#>"));
        assert!(full.ends_with("\nSELECT * WHERE { ?s ?p ?o }"));
    }
}
