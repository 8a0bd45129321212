// ABOUTME: Core types shared by the SPARQL tools and the MCP server runtime
// ABOUTME: Errors, configuration, the usage log and the analytics that read it

pub mod config_manager;
pub mod error;
pub mod tool_suggestions;
pub mod usage_analyzer;
pub mod usage_log;

pub use config_manager::*;
pub use error::{Result, SchemaGovError};
pub use tool_suggestions::*;
pub use usage_analyzer::*;
pub use usage_log::*;
