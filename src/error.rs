//! Failure modes of the remote extraction path.
//!
//! None of these reach callers of `FilterEngine::extract_filters`; each one
//! routes the turn to the keyword extractor and is logged as the fallback reason.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("remote extraction is not configured (no API key)")]
    NotConfigured,

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response carried no text")]
    EmptyCompletion,

    #[error("no JSON object found in completion text")]
    NoJson,

    #[error("completion JSON did not parse: {0}")]
    Json(#[from] serde_json::Error),

    #[error("completion filters violate the filter schema: {0}")]
    Schema(String),

    #[error("completion timed out after {0} ms")]
    Timeout(u64),
}

impl ExtractError {
    /// Short stable label used as the `reason` field in fallback logs
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::NotConfigured => "not_configured",
            ExtractError::Transport(_) => "transport",
            ExtractError::Status { .. } => "status",
            ExtractError::EmptyCompletion => "empty_completion",
            ExtractError::NoJson => "no_json",
            ExtractError::Json(_) => "json",
            ExtractError::Schema(_) => "schema",
            ExtractError::Timeout(_) => "timeout",
        }
    }
}
