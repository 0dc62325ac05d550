//! Aromaticity perception.
//!
//! A ring is aromatic when every member can take part in a pi system and the
//! members contribute 4n+2 pi electrons between them. Pairs of fused rings
//! are also tested as one system, which catches azulene-like cases where
//! neither ring passes alone.
//!
//! Perception runs on every parsed molecule, so a Kekulé spelling
//! (`C1=CC=CC=C1`) and an aromatic spelling (`c1ccccc1`) of the same
//! structure end up with identical atoms and bonds.

use crate::molecule::{BondOrder, Molecule};
use crate::ring;

/// Mark aromatic atoms and bonds in place.
///
/// Bonds of aromatic rings become [`BondOrder::Aromatic`]. An aromatic bond
/// that lies on no cycle (an implicit link between two aromatic rings) is
/// demoted to single. Atoms written aromatic whose ring fails the electron
/// count keep their flag.
pub fn perceive_aromaticity(mol: &mut Molecule) {
    let rings = ring::find_rings(mol);
    let ring_bonds = ring::ring_bonds(mol, &rings);
    let electrons: Vec<Option<u32>> = (0..mol.atom_count())
        .map(|i| pi_electrons(mol, i, &ring_bonds))
        .collect();

    let mut aromatic_atoms = vec![false; mol.atom_count()];
    let mut aromatic_bonds = vec![false; mol.bond_count()];
    let mut mark = |members: &[usize]| {
        for &atom in members {
            aromatic_atoms[atom] = true;
        }
    };

    let mut passed = vec![false; rings.len()];
    for (r, members) in rings.iter().enumerate() {
        if satisfies_huckel(members.iter().copied(), &electrons) {
            passed[r] = true;
            mark(members);
        }
    }

    for a in 0..rings.len() {
        for b in (a + 1)..rings.len() {
            if passed[a] && passed[b] {
                continue;
            }
            if !shares_bond(mol, &rings[a], &rings[b]) {
                continue;
            }
            let mut system: Vec<usize> = rings[a].iter().chain(&rings[b]).copied().collect();
            system.sort_unstable();
            system.dedup();
            if satisfies_huckel(system.iter().copied(), &electrons) {
                passed[a] = true;
                passed[b] = true;
                mark(&system);
            }
        }
    }

    for (r, members) in rings.iter().enumerate() {
        if passed[r] {
            for bond_idx in ring::ring_bond_indices(mol, members) {
                aromatic_bonds[bond_idx] = true;
            }
        }
    }

    for (atom, aromatic) in mol.atoms.iter_mut().zip(&aromatic_atoms) {
        atom.is_aromatic |= *aromatic;
    }
    for ((bond, aromatic), on_ring) in mol.bonds.iter_mut().zip(&aromatic_bonds).zip(&ring_bonds) {
        if *aromatic {
            bond.order = BondOrder::Aromatic;
            bond.is_aromatic = true;
        } else if bond.order == BondOrder::Aromatic && !on_ring {
            bond.order = BondOrder::Single;
            bond.is_aromatic = false;
        }
    }
}

fn satisfies_huckel(members: impl Iterator<Item = usize>, electrons: &[Option<u32>]) -> bool {
    let mut total = 0u32;
    for atom in members {
        match electrons[atom] {
            Some(e) => total += e,
            None => return false,
        }
    }
    total >= 2 && (total - 2) % 4 == 0
}

fn shares_bond(mol: &Molecule, a: &[usize], b: &[usize]) -> bool {
    let bonds_b = ring::ring_bond_indices(mol, b);
    ring::ring_bond_indices(mol, a)
        .iter()
        .any(|bond_idx| bonds_b.contains(bond_idx))
}

/// Pi electrons atom `i` can donate to a ring, or `None` when it cannot be
/// part of an aromatic system (sp3 centres, triple bonds).
fn pi_electrons(mol: &Molecule, i: usize, ring_bonds: &[bool]) -> Option<u32> {
    let atom = &mol.atoms[i];
    let mut ring_double = false;
    let mut exocyclic_double = None;
    for &(neighbor, bond_idx) in &mol.adjacency[i] {
        match mol.bonds[bond_idx].order {
            BondOrder::Triple => return None,
            BondOrder::Double if ring_bonds[bond_idx] => ring_double = true,
            BondOrder::Double => exocyclic_double = Some(neighbor),
            _ => {}
        }
    }

    if ring_double {
        return Some(1);
    }
    // A carbonyl-like exocyclic double bond leaves an empty p orbital
    if let Some(partner) = exocyclic_double {
        return match (atom.atomic_number, mol.atoms[partner].atomic_number) {
            (6, 7 | 8 | 16) => Some(0),
            _ => None,
        };
    }

    let connections = mol.degree(i) + atom.implicit_hydrogens as usize;
    match (atom.atomic_number, atom.formal_charge) {
        (6, 0) if atom.is_aromatic => Some(1),
        (6, -1) if connections == 3 => Some(2),
        (6, 1) if connections == 3 => Some(0),
        (5, 0) if connections == 3 => Some(0),
        // Pyridine-type in aromatic spelling: one electron, lone pair in plane
        (7 | 15 | 33, 0) if atom.is_aromatic && connections == 2 => Some(1),
        (7 | 15 | 33, 1) if atom.is_aromatic => Some(1),
        // Pyrrole-type: the lone pair joins the ring
        (7 | 15 | 33, 0) if connections == 3 => Some(2),
        (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
        (8 | 16 | 34 | 52, 1) if atom.is_aromatic => Some(1),
        _ => None,
    }
}
