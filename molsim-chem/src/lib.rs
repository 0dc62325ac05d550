//! Small-molecule structure handling for similarity search.
//!
//! Provides SMILES parsing into a validated molecular graph, Morgan
//! (circular) fingerprints, and the Tanimoto, Dice and Cosine similarity
//! coefficients over them.
//!
//! # Example
//!
//! ```
//! use molsim_chem::{fingerprint, parse_smiles, similarity, SimilarityMetric};
//!
//! let ethanol = parse_smiles("CCO").unwrap();
//! assert_eq!(ethanol.atom_count(), 3);
//!
//! let fp1 = fingerprint(&ethanol);
//! let fp2 = fingerprint(&parse_smiles("OCC").unwrap());
//! assert_eq!(similarity(&fp1, &fp2, SimilarityMetric::Tanimoto), 1.0);
//!
//! let metric: SimilarityMetric = "dice".parse().unwrap();
//! assert_eq!(metric, SimilarityMetric::Dice);
//! ```

pub mod aromaticity;
pub mod element;
pub mod fingerprint;
pub mod molecule;
pub mod ring;
pub mod similarity;
pub mod smiles;

pub use aromaticity::perceive_aromaticity;
pub use element::{element_by_number, element_by_symbol, Element};
pub use fingerprint::{
    fingerprint, fingerprint_with, morgan_fingerprint, Fingerprint, MorganParams,
    DEFAULT_NBITS, DEFAULT_RADIUS,
};
pub use molecule::{Bond, BondOrder, MolAtom, Molecule};
pub use similarity::{
    cosine_similarity, dice_similarity, score_named, similarity, similarity_bulk,
    tanimoto_bulk, tanimoto_similarity, SimilarityMetric,
};
pub use smiles::{parse_smiles, parse_smiles_named};
