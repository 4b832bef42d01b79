use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranspileError {
    #[error("Schema validation failed at {field}: {reason}")]
    SchemaValidation { field: String, reason: String },
    #[error("Contract not found: {0}")]
    ContractNotFound(String),
    #[error("Unsupported Solidity type: {0}. Consider adding it to customTypes")]
    UnsupportedType(String),
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),
    #[error("Unknown Move target: {0}")]
    UnknownTarget(String),
    #[error("Invalid mapping type: {0}")]
    InvalidMappingSyntax(String),
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to load config {path}: {reason}")]
    Config { path: String, reason: String },
}

impl TranspileError {
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TranspileError::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TranspileError>;
