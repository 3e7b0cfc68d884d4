use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid training input: {0}")]
    InvalidInput(String),

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("artifact encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
