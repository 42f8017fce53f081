// ⚠️ Error taxonomy for the sweep
// Nothing here is fatal to a run: scanners and the resolver turn these into
// report entries or misses, the binary only logs them.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for alt-checker operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Root path or file absent (skipped silently by scanners)
    #[error("Source unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),

    /// Parse failure or schema mismatch inside one source file
    #[error("Malformed source {}: {reason}", path.display())]
    MalformedSource { path: PathBuf, reason: String },

    /// Every identity service missed or failed for one username
    #[error("Remote lookup failed for {username}: {source}")]
    RemoteLookup {
        username: String,
        #[source]
        source: LookupError,
    },

    /// Report delivery failed (never affects collected data)
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::MalformedSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure of a single remote call. The resolver treats every variant as a miss.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_names_path() {
        let err = Error::malformed("/tmp/accounts.json", "expected value at line 1");
        let text = err.to_string();
        assert!(text.contains("/tmp/accounts.json"));
        assert!(text.contains("expected value"));
    }

    #[test]
    fn test_remote_lookup_wraps_source() {
        let err = Error::RemoteLookup {
            username: "Steve".to_string(),
            source: LookupError::Status(429),
        };
        assert_eq!(err.to_string(), "Remote lookup failed for Steve: unexpected status 429");
    }
}
