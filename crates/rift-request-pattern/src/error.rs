//! Error types for pattern construction and matching.

/// Errors raised while building a pattern or evaluating it against a request.
///
/// A request that simply does not satisfy a pattern is *not* an error;
/// `matches` returns `Ok(false)` for that. Decode failures are different: a
/// structured body pattern evaluated against a body the selected decoder
/// rejects surfaces here instead of being reported as a mismatch.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to decode JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode XML body: {0}")]
    Xml(String),

    #[error("Invalid pattern configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PatternError>;
