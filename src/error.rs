//! Error handling for job-scout

use crate::bot::types::Platform;
use std::fmt;
use thiserror::Error;

/// Stage of a search at which a failure was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Session,
    Collect,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStage::Session => write!(f, "session"),
            SearchStage::Collect => write!(f, "collection"),
        }
    }
}

#[derive(Error, Debug)]
pub enum JobScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("No extractable text found in document")]
    EmptyDocument,

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{platform} login needs a manual step: {detail}")]
    AuthenticationRequiresManualStep { platform: Platform, detail: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Navigation timed out: {url}")]
    NavigationTimeout { url: String },

    #[error("{platform} page layout not recognised: {detail}")]
    PlatformLayoutChanged { platform: Platform, detail: String },

    #[error("Bot is busy with another search")]
    BotBusy,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{platform} search for '{query}' failed during {stage}: {source}")]
    Search {
        platform: Platform,
        query: String,
        stage: SearchStage,
        #[source]
        source: Box<JobScoutError>,
    },
}

impl JobScoutError {
    /// Errors worth another attempt under a retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            JobScoutError::NavigationTimeout { .. } | JobScoutError::Network(_)
        )
    }
}

impl From<reqwest::Error> for JobScoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            JobScoutError::NavigationTimeout { url }
        } else {
            JobScoutError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, JobScoutError>;
