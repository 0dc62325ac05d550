//! Similarity ranking of molecule datasets.
//!
//! Given a query SMILES, a dataset file and a metric, [`rank`] returns every
//! row whose structure parses, scored against the query and ordered from
//! most to least similar. Rows that fail to parse are reported in
//! [`RankedResultSet::skipped`] rather than failing the search.
//!
//! ```no_run
//! use molsim_chem::SimilarityMetric;
//!
//! let hits = molsim_search::rank(
//!     "CC(=O)OC1=CC=CC=C1C(=O)O",
//!     "data/compounds.csv",
//!     SimilarityMetric::Tanimoto,
//! )?;
//! for hit in &hits {
//!     println!("{}", serde_json::to_string(hit)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A long-lived [`Ranker`] keeps row fingerprints in a bounded cache keyed
//! by file content, so repeated searches over an unchanged file skip
//! re-parsing it.

pub mod cache;
pub mod config;
pub mod lookup;
pub mod rank;

pub use cache::{DescriptorCache, FingerprintCache, FingerprintKey, SourceCache};
pub use config::{SearchConfig, DEFAULT_CACHE_CAPACITY};
pub use lookup::{find_descriptor, DescriptorLookup};
pub use rank::{rank, RankedResultSet, Ranker, SimilarityResult, SkippedRecord};
