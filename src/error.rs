// src/error.rs
// =============================================================================
// Error types for the crawler core.
//
// Most "bad input" in a crawl is not an error at all: an unparseable link or a
// broken HTML page is logged and skipped. Only three things reach the caller:
// - ContractViolation: the integration layer handed us something it promised
//   would be valid (a bug, not bad crawl data)
// - Io: the report could not be written
// - Config: the configuration file is unusable
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // The caller broke the contract of a core function
    #[error("caller contract violated in {operation}: {detail}")]
    ContractViolation {
        operation: &'static str,
        detail: String,
    },

    // Writing a report artifact failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration could not be loaded or failed validation
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    pub fn contract(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::ContractViolation {
            operation,
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message() {
        let err = CoreError::contract("process", "url 'not a url' does not parse");
        assert_eq!(
            err.to_string(),
            "caller contract violated in process: url 'not a url' does not parse"
        );
    }

    #[test]
    fn test_io_error_names_path() {
        let err = CoreError::io(
            "output/report_summary.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("output/report_summary.txt"));
    }
}
