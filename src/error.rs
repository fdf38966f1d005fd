use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Query processing failed: {0}")]
    Processing(String),

    #[error("Query explanation failed: {0}")]
    Explanation(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// HTTP status code surfaced to clients for this error kind.
    pub fn status(&self) -> u16 {
        match self {
            QueryError::Unauthorized => 401,
            QueryError::Processing(_) | QueryError::Explanation(_) => 400,
            QueryError::InvalidRequest(_) | QueryError::Json(_) => 422,
            QueryError::Config(_) | QueryError::Io(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
