//! SHA-256 content digests.
//!
//! Dataset caches are keyed on these digests, so a file replaced on disk can
//! never serve values derived from its previous contents.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            sha256(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(
            sha256(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn one_byte_changes_the_digest() {
        let a = sha256(b"cmpd_id,SMILES\nCOMP1,CCO\n");
        let b = sha256(b"cmpd_id,SMILES\nCOMP1,CCN\n");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
