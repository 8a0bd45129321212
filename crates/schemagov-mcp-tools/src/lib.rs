// ABOUTME: MCP tool layer for schema.gov.it (SPARQL templates, endpoint client, compression)
// ABOUTME: Provides SchemaGovToolExecutor and the operation catalogue for the MCP server

pub mod distribution_preview;
pub mod operations;
pub mod query_template;
pub mod result_compression;
pub mod sparql_client;
pub mod sparql_templates;
pub mod sparql_tool_executor;
pub mod tool_schemas;

pub use distribution_preview::*;
pub use operations::*;
pub use query_template::*;
pub use result_compression::*;
pub use sparql_client::*;
pub use sparql_templates::*;
pub use sparql_tool_executor::*;
pub use tool_schemas::*;
