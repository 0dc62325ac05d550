//! Molecular graph: atoms as nodes, bonds as edges.
//!
//! Hydrogens are implicit counts on their heavy atom. Only hydrogens that
//! carry information of their own (isotopes, charges, H2) are atoms.

use molsim_core::{Annotated, Summarizable};

use crate::ring;

/// Tetrahedral parity as written. Parsed and kept, not used for hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// `@`
    CounterClockwise,
    /// `@@`
    Clockwise,
}

/// Directional single bond marker (`/` or `\`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    Up,
    Down,
}

/// Bond multiplicity. The discriminant is folded into fingerprint hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

impl BondOrder {
    /// Valence contribution; aromatic bonds count 1.5.
    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MolAtom {
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    /// Implicit hydrogens for organic-subset atoms, the written count for bracket atoms.
    pub implicit_hydrogens: u8,
    pub chirality: Chirality,
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
    pub is_aromatic: bool,
    pub stereo: BondStereo,
}

/// A parsed structure.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub name: String,
    pub atoms: Vec<MolAtom>,
    pub bonds: Vec<Bond>,
    /// Per atom: `(neighbor, bond index)` pairs, in bond order.
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Build a molecule and its adjacency lists.
    ///
    /// Bond endpoints must index into `atoms`.
    pub fn new(name: String, atoms: Vec<MolAtom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule { name, atoms, bonds, adjacency }
    }

    /// Number of graph nodes (hydrogens only count when written as atoms).
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number != 1).count()
    }

    pub fn neighbors(&self, atom_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom_idx].iter().map(|&(n, _)| n)
    }

    /// Explicit bonds on an atom; implicit hydrogens are not counted.
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    pub fn get_bond(&self, a1: usize, a2: usize) -> Option<&Bond> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// Number of independent rings (cyclomatic number of the graph).
    pub fn ring_count(&self) -> usize {
        ring::ring_count(self)
    }
}

impl Annotated for Molecule {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Summarizable for Molecule {
    fn summary(&self) -> String {
        format!(
            "{}: {} atoms ({} heavy), {} bonds, {} rings",
            if self.name.is_empty() { "unnamed" } else { &self.name },
            self.atom_count(),
            self.heavy_atom_count(),
            self.bond_count(),
            self.ring_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon(implicit_hydrogens: u8) -> MolAtom {
        MolAtom {
            atomic_number: 6,
            formal_charge: 0,
            isotope: None,
            is_aromatic: false,
            implicit_hydrogens,
            chirality: Chirality::None,
        }
    }

    fn single(atom1: usize, atom2: usize) -> Bond {
        Bond { atom1, atom2, order: BondOrder::Single, is_aromatic: false, stereo: BondStereo::None }
    }

    fn make_propane() -> Molecule {
        let atoms = vec![carbon(3), carbon(2), carbon(3)];
        Molecule::new("propane".into(), atoms, vec![single(0, 1), single(1, 2)])
    }

    #[test]
    fn construction_and_adjacency() {
        let mol = make_propane();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.adjacency[1].len(), 2);
        assert_eq!(mol.heavy_atom_count(), 3);
    }

    #[test]
    fn neighbors_degree_and_bond_lookup() {
        let mol = make_propane();
        assert_eq!(mol.neighbors(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(mol.degree(0), 1);
        assert!(mol.get_bond(0, 1).is_some());
        assert!(mol.get_bond(0, 2).is_none());
    }

    #[test]
    fn summary_counts_rings() {
        let atoms = vec![carbon(2), carbon(2), carbon(2)];
        let ring = Molecule::new(
            "cyclopropane".into(),
            atoms,
            vec![single(0, 1), single(1, 2), single(2, 0)],
        );
        assert_eq!(ring.summary(), "cyclopropane: 3 atoms (3 heavy), 3 bonds, 1 rings");
        assert!(make_propane().summary().ends_with("0 rings"));
    }
}
