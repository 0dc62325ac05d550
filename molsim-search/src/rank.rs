//! Fault-tolerant similarity ranking of a dataset against a query.
//!
//! A query that does not parse is fatal. A dataset row that does not parse
//! is not: it is left out of the ranking and reported as a
//! [`SkippedRecord`].

use std::path::Path;
use std::sync::Arc;

use molsim_chem::{fingerprint_with, parse_smiles, similarity, Fingerprint, SimilarityMetric};
use molsim_core::{Annotated, MolsimError, Result, Scored};
use molsim_io::{Dataset, MoleculeRecord};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::cache::{FingerprintCache, FingerprintKey, FingerprintOutcome};
use crate::config::SearchConfig;

/// Name of the score field placed before the dataset columns.
pub const SIMILARITY_FIELD: &str = "similarity";

/// A dataset row together with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    score: f64,
    record: MoleculeRecord,
}

impl SimilarityResult {
    pub fn record(&self) -> &MoleculeRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn into_record(self) -> MoleculeRecord {
        self.record
    }
}

impl Scored for SimilarityResult {
    fn score(&self) -> f64 {
        self.score
    }
}

impl Annotated for SimilarityResult {
    fn name(&self) -> &str {
        self.record.id()
    }
}

/// Serialized as a flat map: `similarity` first, then every dataset column
/// in file order. A dataset column literally named `similarity` is
/// shadowed by the score.
impl Serialize for SimilarityResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self
            .record
            .fields()
            .filter(|(column, _)| *column != SIMILARITY_FIELD);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(SIMILARITY_FIELD, &self.score)?;
        for (column, value) in fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A dataset row left out of the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub row: usize,
    pub id: String,
    pub reason: String,
}

/// Ranking output: results by descending score, ties in file order.
///
/// Serializes as the sequence of results only.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResultSet {
    metric: SimilarityMetric,
    results: Vec<SimilarityResult>,
    skipped: Vec<SkippedRecord>,
}

impl RankedResultSet {
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn results(&self) -> &[SimilarityResult] {
        &self.results
    }

    /// Rows whose descriptors did not parse, in file order.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimilarityResult> {
        self.results.iter()
    }

    /// The best match, if any row survived.
    pub fn best(&self) -> Option<&SimilarityResult> {
        self.results.first()
    }

    /// Keep only the `n` best results.
    pub fn truncate(&mut self, n: usize) {
        self.results.truncate(n);
    }

    pub fn into_results(self) -> Vec<SimilarityResult> {
        self.results
    }
}

impl Serialize for RankedResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.results)
    }
}

impl<'a> IntoIterator for &'a RankedResultSet {
    type Item = &'a SimilarityResult;
    type IntoIter = std::slice::Iter<'a, SimilarityResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Ranks dataset rows by fingerprint similarity to a query structure.
///
/// Holds a bounded fingerprint cache shared across calls, so ranking the
/// same unchanged file repeatedly reuses row fingerprints. `Ranker` is
/// `Send + Sync`.
#[derive(Debug)]
pub struct Ranker {
    config: SearchConfig,
    fingerprints: FingerprintCache,
}

impl Default for Ranker {
    fn default() -> Self {
        Ranker {
            fingerprints: FingerprintCache::new(SearchConfig::default().cache_capacity),
            config: SearchConfig::default(),
        }
    }
}

impl Ranker {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Ranker {
            fingerprints: FingerprintCache::new(config.cache_capacity),
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank the rows of the dataset file at `path` against `query`.
    ///
    /// The query is parsed before the file is touched, so a bad query is
    /// reported as [`MolsimError::InvalidQuery`] even when the path is
    /// also bad.
    pub fn rank(
        &self,
        query: &str,
        path: impl AsRef<Path>,
        metric: SimilarityMetric,
    ) -> Result<RankedResultSet> {
        let path = path.as_ref();
        let query_fp = self.query_fingerprint(query)?;
        let dataset = Dataset::load(path, &self.config.column_spec())?;
        let digest = self.fingerprints.observe(path, dataset.digest());
        Ok(self.score_rows(&query_fp, &dataset, &digest, metric))
    }

    /// As [`rank`](Self::rank), with the metric given by name.
    ///
    /// The name is checked before anything else.
    pub fn rank_named(
        &self,
        query: &str,
        path: impl AsRef<Path>,
        metric: &str,
    ) -> Result<RankedResultSet> {
        let metric: SimilarityMetric = metric.parse()?;
        self.rank(query, path, metric)
    }

    /// Rank an already loaded dataset.
    pub fn rank_dataset(
        &self,
        query: &str,
        dataset: &Dataset,
        metric: SimilarityMetric,
    ) -> Result<RankedResultSet> {
        let query_fp = self.query_fingerprint(query)?;
        let digest: Arc<str> = Arc::from(dataset.digest());
        Ok(self.score_rows(&query_fp, dataset, &digest, metric))
    }

    fn query_fingerprint(&self, query: &str) -> Result<Fingerprint> {
        let mol = parse_smiles(query).map_err(|e| match e {
            MolsimError::InvalidStructure(reason) => {
                MolsimError::InvalidQuery(format!("'{}': {reason}", query.trim()))
            }
            other => other,
        })?;
        Ok(fingerprint_with(&mol, self.config.morgan_params()))
    }

    fn row_fingerprint(&self, digest: &Arc<str>, record: &MoleculeRecord) -> FingerprintOutcome {
        let params = self.config.morgan_params();
        let key = FingerprintKey {
            row: record.row(),
            id: record.id().to_string(),
            radius: params.radius,
            nbits: params.nbits,
        };
        self.fingerprints.get_or_insert_with(digest, key, || {
            parse_smiles(record.descriptor())
                .map(|mol| fingerprint_with(&mol, params))
                .map_err(|e| e.to_string())
        })
    }

    fn score_rows(
        &self,
        query_fp: &Fingerprint,
        dataset: &Dataset,
        digest: &Arc<str>,
        metric: SimilarityMetric,
    ) -> RankedResultSet {
        #[cfg(feature = "parallel")]
        let outcomes: Vec<FingerprintOutcome> = {
            use rayon::prelude::*;
            dataset
                .records()
                .par_iter()
                .map(|record| self.row_fingerprint(digest, record))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<FingerprintOutcome> = dataset
            .records()
            .iter()
            .map(|record| self.row_fingerprint(digest, record))
            .collect();

        let mut results = Vec::with_capacity(dataset.len());
        let mut skipped = Vec::new();
        for (record, outcome) in dataset.records().iter().zip(outcomes) {
            match outcome {
                Ok(fp) => results.push(SimilarityResult {
                    score: similarity(query_fp, &fp, metric),
                    record: record.clone(),
                }),
                Err(reason) => {
                    tracing::debug!(row = record.row(), id = record.id(), %reason, "skipping row");
                    skipped.push(SkippedRecord {
                        row: record.row(),
                        id: record.id().to_string(),
                        reason,
                    });
                }
            }
        }

        // Stable: equal scores keep file order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        if !skipped.is_empty() {
            tracing::info!(
                skipped = skipped.len(),
                total = dataset.len(),
                "rows with unparsable descriptors were excluded"
            );
        }
        tracing::debug!(%metric, ranked = results.len(), "ranking complete");

        RankedResultSet {
            metric,
            results,
            skipped,
        }
    }
}

/// Rank a dataset file with the default configuration.
pub fn rank(query: &str, path: impl AsRef<Path>, metric: SimilarityMetric) -> Result<RankedResultSet> {
    Ranker::default().rank(query, path, metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use molsim_io::ColumnSpec;

    const DATA: &[u8] = b"cmpd_id,SMILES,Name
A,CCO,ethanol
B,not_a_smiles,broken
C,CCCO,propanol
D,CCO,ethanol again
";

    fn dataset() -> Dataset {
        Dataset::from_bytes(DATA, &ColumnSpec::default()).unwrap()
    }

    #[test]
    fn ranks_and_skips() {
        let ranker = Ranker::default();
        let set = ranker
            .rank_dataset("CCO", &dataset(), SimilarityMetric::Tanimoto)
            .unwrap();
        let ids: Vec<&str> = set.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["A", "D", "C"]);
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].id, "B");
        assert_eq!(set.skipped()[0].row, 1);
        assert_eq!(set.best().unwrap().score(), 1.0);
    }

    #[test]
    fn ties_keep_file_order() {
        let ranker = Ranker::default();
        let set = ranker
            .rank_dataset("c1ccccc1", &dataset(), SimilarityMetric::Dice)
            .unwrap();
        // A and D are identical rows; A comes first in the file
        let a = set.iter().position(|r| r.id() == "A").unwrap();
        let d = set.iter().position(|r| r.id() == "D").unwrap();
        assert!(a < d);
    }

    #[test]
    fn invalid_query_is_rejected() {
        let err = Ranker::default()
            .rank_dataset("invalid_smiles", &dataset(), SimilarityMetric::Tanimoto)
            .unwrap_err();
        assert!(matches!(err, MolsimError::InvalidQuery(ref msg) if msg.contains("invalid_smiles")));
    }

    #[test]
    fn result_serializes_score_first() {
        let set = Ranker::default()
            .rank_dataset("CCO", &dataset(), SimilarityMetric::Tanimoto)
            .unwrap();
        let json = serde_json::to_string(&set.results()[0]).unwrap();
        assert_eq!(
            json,
            r#"{"similarity":1.0,"cmpd_id":"A","SMILES":"CCO","Name":"ethanol"}"#
        );
        let array: serde_json::Value = serde_json::to_value(&set).unwrap();
        assert_eq!(array.as_array().unwrap().len(), 3);
    }

    #[test]
    fn similarity_column_is_shadowed() {
        let ds = Dataset::from_bytes(
            b"similarity,cmpd_id,SMILES\nold,A,CCO\n",
            &ColumnSpec::default(),
        )
        .unwrap();
        let set = Ranker::default()
            .rank_dataset("CCO", &ds, SimilarityMetric::Cosine)
            .unwrap();
        let json = serde_json::to_string(&set.results()[0]).unwrap();
        assert_eq!(json, r#"{"similarity":1.0,"cmpd_id":"A","SMILES":"CCO"}"#);
    }

    #[test]
    fn repeated_ranking_hits_the_cache() {
        let ranker = Ranker::default();
        let ds = dataset();
        let first = ranker.rank_dataset("CCO", &ds, SimilarityMetric::Tanimoto).unwrap();
        assert_eq!(ranker.fingerprints.len(), 4);
        let second = ranker.rank_dataset("CCO", &ds, SimilarityMetric::Tanimoto).unwrap();
        assert_eq!(ranker.fingerprints.len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn fingerprint_parameters_are_part_of_the_key() {
        let ds = dataset();
        let ranker = Ranker::new(SearchConfig {
            nbits: 512,
            ..SearchConfig::default()
        })
        .unwrap();
        ranker.rank_dataset("CCO", &ds, SimilarityMetric::Tanimoto).unwrap();
        let key = FingerprintKey {
            row: 0,
            id: "A".into(),
            radius: 2,
            nbits: 512,
        };
        let digest: Arc<str> = Arc::from(ds.digest());
        let cached = ranker.fingerprints.get(&digest, &key).unwrap().unwrap();
        assert_eq!(cached.nbits(), 512);
        let other = FingerprintKey { nbits: 2048, ..key };
        assert!(ranker.fingerprints.get(&digest, &other).is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Ranker::new(SearchConfig {
            nbits: 0,
            ..SearchConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, MolsimError::InvalidInput(_)));
    }

    #[test]
    fn truncate_keeps_best() {
        let mut set = Ranker::default()
            .rank_dataset("CCO", &dataset(), SimilarityMetric::Tanimoto)
            .unwrap();
        set.truncate(1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.results()[0].id(), "A");
    }
}
