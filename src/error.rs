use thiserror::Error;

/// Boxed cause attached to a provider failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the rating core (normalizer, window selector, frame builder).
///
/// Each kind is returned at the point of detection and passed through to the
/// caller unchanged; nothing in the core retries or substitutes a default.
#[derive(Debug, Error)]
pub enum ContenderError {
    /// Caller handed the core something it cannot compute on
    /// (empty value batch, inverted interval, unparseable date).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The live statistics provider was unreachable, errored or timed out.
    #[error("stats provider '{provider}' unavailable: {source}")]
    DataSourceUnavailable {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// A team identifier did not match the canonical registry.
    #[error("unknown or duplicate team '{team}' in provider response")]
    DataIntegrity { team: String },
}

impl ContenderError {
    pub fn unavailable(provider: &str, source: impl Into<BoxError>) -> Self {
        ContenderError::DataSourceUnavailable {
            provider: provider.to_string(),
            source: source.into(),
        }
    }
}
