//! Descriptor lookup by compound identifier.

use std::fs;
use std::path::Path;

use molsim_core::{hash, MolsimError, Result};
use molsim_io::{ColumnSpec, Dataset};

use crate::cache::DescriptorCache;
use crate::config::SearchConfig;

/// Prefix tried when an identifier is not found as given.
pub const ID_PREFIX: &str = "cmpd_";

/// Resolves compound identifiers to their SMILES descriptors.
///
/// Answers, including misses, are memoised per file content, so editing
/// the file invalidates them.
#[derive(Debug)]
pub struct DescriptorLookup {
    columns: ColumnSpec,
    cache: DescriptorCache,
}

impl Default for DescriptorLookup {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl DescriptorLookup {
    pub fn new(columns: ColumnSpec, cache_capacity: usize) -> Self {
        DescriptorLookup {
            columns,
            cache: DescriptorCache::new(cache_capacity),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.column_spec(), config.cache_capacity)
    }

    /// Find the descriptor of compound `id` in the dataset file at `path`.
    ///
    /// Tries `id` exactly, then `cmpd_{id}` unless `id` already carries that
    /// prefix. The first matching row wins. `Ok(None)` means no row matched.
    pub fn lookup(&self, path: impl AsRef<Path>, id: &str) -> Result<Option<String>> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MolsimError::DatasetNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = self.cache.observe(path, &hash::sha256(&bytes));

        let key = id.to_string();
        if let Some(hit) = self.cache.get(&digest, &key) {
            return Ok(hit);
        }

        let dataset = Dataset::from_bytes(&bytes, &self.columns)?;
        let found = find_descriptor(&dataset, id);
        match &found {
            Some(smiles) => tracing::debug!(id, %smiles, "descriptor found"),
            None => tracing::debug!(id, path = %path.display(), "no row for identifier"),
        }
        self.cache.insert(digest, key, found.clone());
        Ok(found)
    }
}

/// Look `id` up in a loaded dataset with the `cmpd_` fallback.
pub fn find_descriptor(dataset: &Dataset, id: &str) -> Option<String> {
    let exact = |wanted: &str| {
        dataset
            .iter()
            .find(|record| record.id() == wanted)
            .map(|record| record.descriptor().to_string())
    };
    exact(id).or_else(|| {
        if id.starts_with(ID_PREFIX) {
            None
        } else {
            exact(&format!("{ID_PREFIX}{id}"))
        }
    })
}
