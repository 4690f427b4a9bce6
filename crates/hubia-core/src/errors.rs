use thiserror::Error;

/// Startup configuration failure. Always fatal.
#[derive(Debug, Clone)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Failures surfaced by the question pipeline.
///
/// Every variant carries enough detail (attempted SQL, offending tokens,
/// underlying message) for the caller to decide whether to rephrase.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("empty question")]
    EmptyQuestion,

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid history role: {0:?} (expected 'user' or 'assistant')")]
    InvalidRole(String),

    #[error("model output is not a SELECT/WITH statement:\n{output}")]
    MalformedQuery { output: String },

    #[error("could not auto-correct identifiers [{}]; original query:\n{sql}", .invalid.join(", "))]
    UncorrectableQuery { invalid: Vec<String>, sql: String },

    #[error("query execution failed: {message}\nSQL:\n{sql}")]
    QueryExecution { sql: String, message: String },

    #[error("no previous query in history to interpret")]
    NoPriorContext,

    #[error("model provider '{provider}' unavailable: {message}")]
    ModelUnavailable { provider: String, message: String },

    #[error("model call timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl QueryError {
    /// True when a reworded question has a reasonable chance of succeeding.
    pub fn is_rephrasable(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyQuestion
                | QueryError::MalformedQuery { .. }
                | QueryError::UncorrectableQuery { .. }
                | QueryError::NoPriorContext
        )
    }

    /// Stable machine-readable code, used by the CLI json output.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::EmptyQuestion => "E_EMPTY_QUESTION",
            QueryError::InvalidIdentifier(_) => "E_INVALID_IDENTIFIER",
            QueryError::InvalidRole(_) => "E_INVALID_ROLE",
            QueryError::MalformedQuery { .. } => "E_MALFORMED_QUERY",
            QueryError::UncorrectableQuery { .. } => "E_UNCORRECTABLE_QUERY",
            QueryError::QueryExecution { .. } => "E_QUERY_EXECUTION",
            QueryError::NoPriorContext => "E_NO_PRIOR_CONTEXT",
            QueryError::ModelUnavailable { .. } => "E_MODEL_UNAVAILABLE",
            QueryError::Timeout { .. } => "E_TIMEOUT",
            QueryError::Storage(_) => "E_STORAGE",
        }
    }
}
