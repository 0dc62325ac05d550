#![no_main]
use libfuzzer_sys::fuzz_target;
use molsim_chem::{fingerprint, parse_smiles, similarity, SimilarityMetric};

fuzz_target!(|data: &str| {
    if let Ok(mol) = parse_smiles(data) {
        let fp = fingerprint(&mol);
        for metric in SimilarityMetric::ALL {
            assert_eq!(similarity(&fp, &fp, metric), 1.0);
        }
    }
});
