//! Error types for sievestream

/// Result type alias using sievestream's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sievestream operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cooperative termination signal raised when a `Halt` decision is
    /// applied. Not a failure; lets consumers distinguish a halted stream
    /// from normal exhaustion.
    #[error("stream halted")]
    Halted,

    /// A user callback failed; the run is abandoned at that point
    #[error("callback error: {0}")]
    Callback(String),

    /// Setup misuse (empty keyword, invalid pipeline options)
    #[error("configuration error: {0}")]
    Config(String),

    /// Rule file parse errors
    #[error("rule file error: {0}")]
    Rule(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new callback error
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is the cooperative halt signal
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted)
    }
}
