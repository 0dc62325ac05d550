//! Search configuration.

use std::path::Path;

use molsim_chem::{MorganParams, SimilarityMetric, DEFAULT_NBITS, DEFAULT_RADIUS};
use molsim_core::{MolsimError, Result};
use molsim_io::{ColumnSpec, DEFAULT_DESCRIPTOR_COLUMN, DEFAULT_ID_COLUMN};
use serde::{Deserialize, Serialize};

/// Default number of entries kept by each cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Configuration for ranking and descriptor lookups.
///
/// Every field has a default, so a config file only needs to name what it
/// changes:
///
/// ```json
/// { "metric": "Dice", "nbits": 1024 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Morgan neighborhood radius.
    pub radius: usize,
    /// Fingerprint length in bits.
    pub nbits: usize,
    /// Metric used when a request does not name one.
    pub metric: SimilarityMetric,
    /// Identifier column name, matched exactly.
    pub id_column: String,
    /// Descriptor column name; falls back to a case-insensitive substring match.
    pub descriptor_column: String,
    /// Entries per cache. Zero disables caching.
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            radius: DEFAULT_RADIUS,
            nbits: DEFAULT_NBITS,
            metric: SimilarityMetric::default(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            descriptor_column: DEFAULT_DESCRIPTOR_COLUMN.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)
            .map_err(|e| MolsimError::Parse(format!("search config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MolsimError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "search config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nbits == 0 {
            return Err(MolsimError::InvalidInput(
                "fingerprint size (nbits) must be positive".into(),
            ));
        }
        if self.id_column.trim().is_empty() {
            return Err(MolsimError::InvalidInput("id_column must not be empty".into()));
        }
        if self.descriptor_column.trim().is_empty() {
            return Err(MolsimError::InvalidInput(
                "descriptor_column must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn morgan_params(&self) -> MorganParams {
        MorganParams {
            radius: self.radius,
            nbits: self.nbits,
        }
    }

    pub fn column_spec(&self) -> ColumnSpec {
        ColumnSpec::new(self.id_column.clone(), self.descriptor_column.clone())
    }
}
