use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("JWT signing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Timestamp parse error: {0}")]
    TimestampError(#[from] chrono::ParseError),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid selector: {selector}")]
    SelectorError { selector: String },

    #[error("Google Sheets error: {message}")]
    SheetsError { message: String },

    #[error("Data transformation error: {message}")]
    TransformError { message: String },
}

impl EtlError {
    pub fn config(message: impl Into<String>) -> Self {
        EtlError::ConfigError {
            message: message.into(),
        }
    }

    pub fn sheets(message: impl Into<String>) -> Self {
        EtlError::SheetsError {
            message: message.into(),
        }
    }

    pub fn transform(message: impl Into<String>) -> Self {
        EtlError::TransformError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
