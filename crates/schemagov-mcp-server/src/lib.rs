// ABOUTME: MCP server entry (stdio/http) for the schema.gov.it tool catalogue
// ABOUTME: Thin runtime layer wiring transports, prompts and the tool router

pub mod official_server;
#[cfg(feature = "server-http")]
pub mod http_config;
#[cfg(feature = "server-http")]
pub mod http_server;
pub mod prompts;

pub use official_server::*;
#[cfg(feature = "server-http")]
pub use http_config::*;
#[cfg(feature = "server-http")]
pub use http_server::*;
