//! Common error types for the VRRP configuration crates.

use std::fmt;
use std::path::PathBuf;

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type.
///
/// Malformed configuration content is never an `Error`: the builder recovers
/// from it and records a diagnostic instead. This type covers the failures
/// that stop a caller outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an error for a configuration file that could not be read.
    pub fn config_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ConfigFile {
            path: path.into(),
            source,
        }
    }

    /// Create a new logging setup error.
    pub fn logging(msg: impl fmt::Display) -> Self {
        Error::Logging(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_error_names_path() {
        let err = Error::config_file(
            "/etc/keepalived/keepalived.conf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/etc/keepalived/keepalived.conf"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_logging_error() {
        assert!(matches!(Error::logging("x"), Error::Logging(m) if m == "x"));
        assert_eq!(Error::logging("boom").to_string(), "Logging error: boom");
    }
}
