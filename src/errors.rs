use thiserror::Error;

/// Errors surfaced at the process boundary: malformed external map data or
/// configuration. Internal algorithmic invariants (acyclicity, non-empty
/// populations, correctly-sized network inputs) are asserted, not returned,
/// since violating them is a programmer error rather than a recoverable
/// runtime condition.
#[derive(Error, Debug)]
pub enum EvoError {
    #[error("invalid map data: {0}")]
    InvalidMap(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EvoResult<T> = Result<T, EvoError>;
