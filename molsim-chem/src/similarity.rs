//! Fingerprint similarity coefficients.
//!
//! All coefficients treat a fingerprint as the set of its on-bits. Two empty
//! fingerprints are identical (1.0); an empty and a non-empty one share
//! nothing (0.0). Every score is clamped into `[0, 1]`.

use std::fmt;
use std::str::FromStr;

use molsim_core::{MolsimError, Result};

use crate::fingerprint::Fingerprint;

/// The supported similarity coefficients.
///
/// This set is closed: names are validated once when parsed and scoring
/// never dispatches on text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimilarityMetric {
    /// `|a ∩ b| / |a ∪ b|`
    #[default]
    Tanimoto,
    /// `2|a ∩ b| / (|a| + |b|)`
    Dice,
    /// `|a ∩ b| / sqrt(|a| |b|)`
    Cosine,
}

impl SimilarityMetric {
    pub const ALL: [SimilarityMetric; 3] = [
        SimilarityMetric::Tanimoto,
        SimilarityMetric::Dice,
        SimilarityMetric::Cosine,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SimilarityMetric::Tanimoto => "Tanimoto",
            SimilarityMetric::Dice => "Dice",
            SimilarityMetric::Cosine => "Cosine",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMetric {
    type Err = MolsimError;

    /// Parse a metric name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        SimilarityMetric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MolsimError::UnsupportedMetric(s.to_string()))
    }
}

/// Bit counts shared by all coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overlap {
    both: u32,
    either: u32,
    a: u32,
    b: u32,
}

/// Count overlaps word by word. Fingerprints of different lengths are
/// compared as index sets: words missing from the shorter one are zero.
fn overlap(fp1: &Fingerprint, fp2: &Fingerprint) -> Overlap {
    let (w1, w2) = (fp1.words(), fp2.words());
    let mut counts = Overlap { both: 0, either: 0, a: 0, b: 0 };
    for i in 0..w1.len().max(w2.len()) {
        let x = w1.get(i).copied().unwrap_or(0);
        let y = w2.get(i).copied().unwrap_or(0);
        counts.both += (x & y).count_ones();
        counts.either += (x | y).count_ones();
        counts.a += x.count_ones();
        counts.b += y.count_ones();
    }
    counts
}

/// Keep a coefficient inside `[0, 1]` regardless of rounding.
fn clamp_unit(score: f64) -> f64 {
    debug_assert!(!score.is_nan(), "similarity must not be NaN");
    score.clamp(0.0, 1.0)
}

/// Tanimoto similarity coefficient between two fingerprints.
pub fn tanimoto_similarity(fp1: &Fingerprint, fp2: &Fingerprint) -> f64 {
    let o = overlap(fp1, fp2);
    if o.either == 0 {
        return 1.0; // Both empty → identical
    }
    clamp_unit(o.both as f64 / o.either as f64)
}

/// Dice similarity coefficient between two fingerprints.
pub fn dice_similarity(fp1: &Fingerprint, fp2: &Fingerprint) -> f64 {
    let o = overlap(fp1, fp2);
    let total = o.a as u64 + o.b as u64;
    if total == 0 {
        return 1.0;
    }
    clamp_unit(2.0 * o.both as f64 / total as f64)
}

/// Cosine similarity between two fingerprints viewed as binary vectors.
pub fn cosine_similarity(fp1: &Fingerprint, fp2: &Fingerprint) -> f64 {
    let o = overlap(fp1, fp2);
    match (o.a, o.b) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        (a, b) => clamp_unit(o.both as f64 / ((a as f64) * (b as f64)).sqrt()),
    }
}

/// Score two fingerprints under `metric`.
pub fn similarity(fp1: &Fingerprint, fp2: &Fingerprint, metric: SimilarityMetric) -> f64 {
    match metric {
        SimilarityMetric::Tanimoto => tanimoto_similarity(fp1, fp2),
        SimilarityMetric::Dice => dice_similarity(fp1, fp2),
        SimilarityMetric::Cosine => cosine_similarity(fp1, fp2),
    }
}

/// Score two fingerprints under a metric given by name.
///
/// Fails with [`MolsimError::UnsupportedMetric`] for any name outside the
/// supported set, whatever the fingerprints.
pub fn score_named(fp1: &Fingerprint, fp2: &Fingerprint, metric: &str) -> Result<f64> {
    let metric: SimilarityMetric = metric.parse()?;
    Ok(similarity(fp1, fp2, metric))
}

/// Compute Tanimoto similarity of a query against multiple targets.
pub fn tanimoto_bulk(query: &Fingerprint, targets: &[Fingerprint]) -> Vec<f64> {
    similarity_bulk(query, targets, SimilarityMetric::Tanimoto)
}

/// Compute similarity of a query against multiple targets under `metric`.
pub fn similarity_bulk(
    query: &Fingerprint,
    targets: &[Fingerprint],
    metric: SimilarityMetric,
) -> Vec<f64> {
    targets.iter().map(|t| similarity(query, t, metric)).collect()
}
