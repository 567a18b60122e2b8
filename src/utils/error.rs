use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid input data: {message}")]
    InvalidInputData { message: String },

    #[error("invalid song id format: {value}")]
    InvalidSongIdFormat { value: String },

    #[error("error get song data")]
    ErrorGetSongData,

    #[error("error get song lyrics")]
    ErrorGetSongLyrics,

    #[error("author already exists")]
    AuthorAlreadyExists,

    #[error("song with this name already exists by this author")]
    AuthorSongDuplicate,

    #[error("author not found")]
    AuthorNotFound,

    #[error("songs not found")]
    SongsNotFound,

    #[error("enrichment cancelled")]
    Cancelled,

    #[error("enrichment deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// 錯誤分類，CLI 以此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Provider,
    Conflict,
    NotFound,
    Cancelled,
    Infrastructure,
    Configuration,
}

impl CatalogError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CatalogError::InvalidInputData {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::InvalidInputData { .. } | CatalogError::InvalidSongIdFormat { .. } => {
                ErrorCategory::Input
            }
            CatalogError::ErrorGetSongData | CatalogError::ErrorGetSongLyrics => {
                ErrorCategory::Provider
            }
            CatalogError::AuthorAlreadyExists | CatalogError::AuthorSongDuplicate => {
                ErrorCategory::Conflict
            }
            CatalogError::AuthorNotFound | CatalogError::SongsNotFound => ErrorCategory::NotFound,
            CatalogError::Cancelled | CatalogError::DeadlineExceeded(_) => {
                ErrorCategory::Cancelled
            }
            CatalogError::Database(_)
            | CatalogError::IoError(_)
            | CatalogError::SerializationError(_) => ErrorCategory::Infrastructure,
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 給使用者看的訊息，不含底層細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Infrastructure => "The song catalog storage is unavailable".to_string(),
            ErrorCategory::Provider => format!("Could not enrich the song: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the command arguments and try again",
            ErrorCategory::Provider => {
                "Check the group and song spelling, the provider API keys and network access"
            }
            ErrorCategory::Conflict => "The song is already in the catalog",
            ErrorCategory::NotFound => "Check the song id or relax the filters",
            ErrorCategory::Cancelled => {
                "Retry, or raise enrichment.timeout_seconds if providers are slow"
            }
            ErrorCategory::Infrastructure => "Check the database url and file permissions",
            ErrorCategory::Configuration => {
                "Fix the configuration file and the environment variables it references"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Infrastructure => 1,
            ErrorCategory::Input | ErrorCategory::Configuration => 2,
            ErrorCategory::Provider => 3,
            ErrorCategory::NotFound => 4,
            ErrorCategory::Conflict => 5,
            ErrorCategory::Cancelled => 130,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
