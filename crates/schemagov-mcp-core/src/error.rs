use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaGovError {
    #[error("SPARQL request failed: {status} {status_text}")]
    RemoteQuery {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    #[error("Invalid SPARQL response: {0}")]
    ResponseParse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Failed to fetch distribution: {status} {status_text}")]
    DistributionFetch { status: u16, status_text: String },

    #[error("Failed to write usage log: {0}")]
    LogWrite(String),

    #[error("Malformed usage log line {line}: {reason}")]
    LogParse { line: usize, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaGovError {
    /// True for failures raised before or while talking to a remote host.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SchemaGovError::RemoteQuery { .. }
                | SchemaGovError::ResponseParse(_)
                | SchemaGovError::Transport(_)
                | SchemaGovError::Timeout(_)
                | SchemaGovError::DistributionFetch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SchemaGovError>;
