//! Structured error types for molsim.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for all molsim operations.
///
/// Only precondition failures live here. Rows of a dataset that fail to
/// parse are not errors; the ranking engine reports them separately.
#[derive(Debug, Error)]
pub enum MolsimError {
    /// I/O error (permission denied, broken pipe, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A structure descriptor could not be parsed into a molecule.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// The query descriptor of a ranking request could not be used.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A similarity metric name outside the supported set.
    #[error("unsupported similarity metric '{0}' (expected Tanimoto, Dice or Cosine)")]
    UnsupportedMetric(String),

    /// The dataset file does not exist or cannot be read.
    #[error("dataset not found: {}: {source}", path.display())]
    DatasetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset lacks a required column.
    #[error("schema error: {0}")]
    Schema(String),

    /// Parse error (malformed tabular data, bad config file)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout molsim.
pub type Result<T> = std::result::Result<T, MolsimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_not_found_names_the_path() {
        let err = MolsimError::DatasetNotFound {
            path: PathBuf::from("data/missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/missing.csv"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(MolsimError::Io(_))));
    }
}
