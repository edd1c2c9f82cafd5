use thiserror::Error;

/// Errors raised by an injected [`Lemmatizer`](crate::Lemmatizer).
///
/// The built-in lemmatizer never fails, but remote or model-backed
/// implementations can be unavailable or reject input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LemmaError {
    #[error("lemmatizer unavailable: {0}")]
    Unavailable(String),
    #[error("lemmatization failed: {0}")]
    Failed(String),
}

/// Fatal errors for a single rewrite or analyze call.
///
/// Recoverable conditions (skipped catalog entries, empty term maps,
/// exhausted budgets) are not errors; they surface as
/// [`RewriteWarning`](crate::RewriteWarning) values on a successful result.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The injected linguistic capability failed. Matching cannot proceed
    /// without it, so the whole call fails.
    #[error("linguistic capability failure: {0}")]
    Lemmatizer(#[from] LemmaError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
