/// Broad category of an [`Error`], used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local configuration, marshaling or plumbing fault
    Internal,
    /// The remote service explicitly rejected the request
    External,
    /// Anything surfaced unwrapped from a lower layer
    Other,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}: internal error")]
    Internal(String),

    #[error("{0}: external error")]
    External(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Internal(_) => ErrorKind::Internal,
            Error::External(_) => ErrorKind::External,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    pub fn is_external(&self) -> bool {
        self.kind() == ErrorKind::External
    }

    pub(crate) fn storage(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Storage {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert!(Error::Internal("failed".to_string()).is_internal());
        assert!(Error::External("failed".to_string()).is_external());
        assert_eq!(
            Error::Credentials("token".to_string()).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::Internal("failed to apply option: failed to set kraken.api_key".to_string())
                .to_string(),
            "failed to apply option: failed to set kraken.api_key: internal error"
        );
        assert_eq!(
            Error::storage("failed to delete file a.jpg on bucket b", "404 Not Found").to_string(),
            "failed to delete file a.jpg on bucket b: 404 Not Found"
        );
    }
}
