use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the query core.
///
/// `NotFound` is a distinct outcome: the requested entity exists neither
/// locally nor on-chain. `Upstream` and `Store` wrap collaborator failures
/// and carry no internal detail beyond the rendered cause.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("chain client request failed: {0}")]
    Upstream(String),

    #[error("store operation failed: {0}")]
    Store(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Error::Upstream(err.to_string())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Error::Store(err.to_string())
    }

    /// Whether this error is the distinct not-found outcome rather than a
    /// collaborator failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        assert!(Error::not_found("block 5").is_not_found());
        assert!(!Error::upstream("connection refused").is_not_found());
        assert!(!Error::store("write failed").is_not_found());
    }

    #[test]
    fn test_display_carries_cause() {
        let err = Error::upstream("connection refused");
        assert_eq!(err.to_string(), "chain client request failed: connection refused");
    }
}
