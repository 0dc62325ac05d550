//! Circular (Morgan / ECFP-like) fingerprints.

use molsim_core::ContentAddressable;
use sha2::{Digest, Sha256};

use crate::molecule::Molecule;
use crate::ring;

/// Neighborhood radius used when none is given (ECFP4).
pub const DEFAULT_RADIUS: usize = 2;

/// Fingerprint length used when none is given.
pub const DEFAULT_NBITS: usize = 2048;

/// A fixed-size bit vector fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bits: Vec<u64>,
    nbits: usize,
}

impl Fingerprint {
    /// Create an empty fingerprint of the given size (storage rounded up to 64 bits).
    pub fn new(nbits: usize) -> Self {
        let nwords = nbits.div_ceil(64);
        Fingerprint {
            bits: vec![0u64; nwords],
            nbits,
        }
    }

    /// Build a fingerprint with the given bit positions set.
    ///
    /// Positions wrap modulo `nbits`.
    pub fn from_on_bits(nbits: usize, on_bits: impl IntoIterator<Item = usize>) -> Self {
        let mut fp = Fingerprint::new(nbits);
        for pos in on_bits {
            fp.set_bit(pos);
        }
        fp
    }

    /// Set a bit at the given position.
    pub fn set_bit(&mut self, pos: usize) {
        let pos = pos % self.nbits;
        self.bits[pos / 64] |= 1u64 << (pos % 64);
    }

    /// Get a bit at the given position.
    pub fn get_bit(&self, pos: usize) -> bool {
        let pos = pos % self.nbits;
        (self.bits[pos / 64] >> (pos % 64)) & 1 == 1
    }

    /// Count the number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of bits in the fingerprint.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Indices of the set bits, ascending.
    pub fn on_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(wi, &word)| {
            (0..64)
                .filter(move |&b| (word >> b) & 1 == 1)
                .map(move |b| wi * 64 + b)
        })
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.bits
    }
}

impl ContentAddressable for Fingerprint {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.nbits as u64).to_le_bytes());
        for word in &self.bits {
            hasher.update(word.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Parameters of the circular fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MorganParams {
    pub radius: usize,
    pub nbits: usize,
}

impl Default for MorganParams {
    fn default() -> Self {
        MorganParams {
            radius: DEFAULT_RADIUS,
            nbits: DEFAULT_NBITS,
        }
    }
}

/// Fingerprint with the default parameters (radius 2, 2048 bits).
pub fn fingerprint(mol: &Molecule) -> Fingerprint {
    fingerprint_with(mol, MorganParams::default())
}

/// Fingerprint with explicit parameters.
pub fn fingerprint_with(mol: &Molecule, params: MorganParams) -> Fingerprint {
    morgan_fingerprint(mol, params.radius, params.nbits)
}

/// Compute a Morgan (ECFP-like) fingerprint.
///
/// `radius` controls the neighborhood size (2 = ECFP4, 3 = ECFP6).
/// `nbits` is the fingerprint length (commonly 2048).
///
/// Every atom environment of radius `0..=radius` is hashed and folded into
/// the bit space. Neighbor identifiers are sorted before hashing, so the
/// result does not depend on the order in which atoms were written.
///
/// # Panics
///
/// Panics if `nbits` is zero.
pub fn morgan_fingerprint(mol: &Molecule, radius: usize, nbits: usize) -> Fingerprint {
    assert!(nbits > 0, "fingerprint size must be positive");
    let n = mol.atom_count();
    let mut fp = Fingerprint::new(nbits);

    if n == 0 {
        return fp;
    }

    let ring_atoms = ring::ring_atoms(mol);

    // Initial invariants: hash of atom properties
    let mut identifiers: Vec<u64> = mol
        .atoms
        .iter()
        .enumerate()
        .map(|(i, atom)| {
            let mut h = fnv1a_init();
            h = fnv1a_update(h, atom.atomic_number as u64);
            h = fnv1a_update(h, mol.degree(i) as u64);
            h = fnv1a_update(h, atom.implicit_hydrogens as u64);
            h = fnv1a_update(h, atom.formal_charge as i64 as u64);
            h = fnv1a_update(h, ring_atoms[i] as u64);
            h = fnv1a_update(h, atom.is_aromatic as u64);
            h
        })
        .collect();

    for &id in &identifiers {
        fp.set_bit(fold_hash(id, nbits));
    }

    for _ in 0..radius {
        let mut new_identifiers = Vec::with_capacity(n);
        for i in 0..n {
            let mut h = fnv1a_init();
            h = fnv1a_update(h, identifiers[i]);

            let mut neighbor_ids: Vec<(u64, u8)> = mol.adjacency[i]
                .iter()
                .map(|&(neighbor, bond_idx)| (identifiers[neighbor], mol.bonds[bond_idx].order as u8))
                .collect();
            neighbor_ids.sort_unstable();

            for (nid, border) in &neighbor_ids {
                h = fnv1a_update(h, *nid);
                h = fnv1a_update(h, *border as u64);
            }

            new_identifiers.push(h);
            fp.set_bit(fold_hash(h, nbits));
        }
        identifiers = new_identifiers;
    }

    fp
}

// FNV-1a hash functions for deterministic hashing
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_init() -> u64 {
    FNV_OFFSET
}

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value
        .to_le_bytes()
        .iter()
        .fold(hash, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

fn fold_hash(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}
