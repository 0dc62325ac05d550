//! Ring membership, ring counting and cycle enumeration.

use std::collections::VecDeque;

use crate::molecule::Molecule;

/// Mark every atom that lies on at least one cycle.
///
/// Terminal (degree <= 1) atoms are peeled off repeatedly; whatever survives
/// is part of a ring.
pub fn ring_atoms(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut degree: Vec<usize> = mol.adjacency.iter().map(Vec::len).collect();

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| degree[i] <= 1).collect();
    let mut removed = vec![false; n];
    while let Some(atom) = queue.pop_front() {
        if removed[atom] {
            continue;
        }
        removed[atom] = true;
        for &(neighbor, _) in &mol.adjacency[atom] {
            if !removed[neighbor] {
                degree[neighbor] -= 1;
                if degree[neighbor] <= 1 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    removed.iter().map(|&r| !r).collect()
}

/// Check if a specific atom is in any ring.
pub fn is_in_ring(mol: &Molecule, atom_idx: usize) -> bool {
    ring_atoms(mol).get(atom_idx).copied().unwrap_or(false)
}

/// Number of independent rings: `bonds - atoms + connected_components`.
pub fn ring_count(mol: &Molecule) -> usize {
    let cyclomatic =
        mol.bond_count() as isize - mol.atom_count() as isize + count_components(mol) as isize;
    cyclomatic.max(0) as usize
}

/// The shortest cycle through every ring bond, deduplicated.
///
/// Each ring lists its atoms in walk order, rotated to start at the lowest
/// index. Rings come back smallest first. Fused systems therefore yield each
/// of their smallest rings. Unlike a strict SSSR the list is not cut down to
/// the cyclomatic number, so every ring bond is covered by at least one ring.
pub fn find_rings(mol: &Molecule) -> Vec<Vec<usize>> {
    let in_ring = ring_atoms(mol);
    let mut rings: Vec<Vec<usize>> = Vec::new();

    for (bond_idx, bond) in mol.bonds.iter().enumerate() {
        if !in_ring[bond.atom1] || !in_ring[bond.atom2] {
            continue;
        }
        let Some(mut ring) = shortest_path_avoiding(mol, bond.atom1, bond.atom2, bond_idx, &in_ring)
        else {
            continue;
        };
        canonical_rotation(&mut ring);
        if !rings.contains(&ring) {
            rings.push(ring);
        }
    }

    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings
}

/// Indices of the bonds closing `ring`, in walk order.
pub fn ring_bond_indices(mol: &Molecule, ring: &[usize]) -> Vec<usize> {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .filter_map(|(&a, &b)| {
            mol.adjacency[a]
                .iter()
                .find(|&&(neighbor, _)| neighbor == b)
                .map(|&(_, bond_idx)| bond_idx)
        })
        .collect()
}

/// Flags the bonds that lie on some cycle.
pub fn ring_bonds(mol: &Molecule, rings: &[Vec<usize>]) -> Vec<bool> {
    let mut flags = vec![false; mol.bond_count()];
    for ring in rings {
        for bond_idx in ring_bond_indices(mol, ring) {
            flags[bond_idx] = true;
        }
    }
    flags
}

/// BFS from `start` to `end` over ring atoms without crossing `excluded`.
fn shortest_path_avoiding(
    mol: &Molecule,
    start: usize,
    end: usize,
    excluded: usize,
    in_ring: &[bool],
) -> Option<Vec<usize>> {
    let mut parent = vec![usize::MAX; mol.atom_count()];
    let mut visited = vec![false; mol.atom_count()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(curr) = queue.pop_front() {
        if curr == end {
            let mut path = vec![end];
            let mut node = end;
            while node != start {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for &(neighbor, bond_idx) in &mol.adjacency[curr] {
            if bond_idx != excluded && in_ring[neighbor] && !visited[neighbor] {
                visited[neighbor] = true;
                parent[neighbor] = curr;
                queue.push_back(neighbor);
            }
        }
    }
    None
}

/// Rotate to the lowest atom index, then walk towards its smaller neighbour.
fn canonical_rotation(ring: &mut [usize]) {
    let Some(min_pos) = ring.iter().enumerate().min_by_key(|&(_, &v)| v).map(|(i, _)| i) else {
        return;
    };
    ring.rotate_left(min_pos);
    let n = ring.len();
    if n > 2 && ring[n - 1] < ring[1] {
        ring[1..].reverse();
    }
}

fn count_components(mol: &Molecule) -> usize {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = 0;

    for start in 0..n {
        if visited[start] {
            continue;
        }
        components += 1;
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(curr) = queue.pop_front() {
            for &(neighbor, _) in &mol.adjacency[curr] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn benzene_one_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(ring_count(&mol), 1);
        assert!(ring_atoms(&mol).iter().all(|&r| r));
    }

    #[test]
    fn naphthalene_two_rings() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(ring_count(&mol), 2);
    }

    #[test]
    fn substituent_atoms_are_not_ring_atoms() {
        // Toluene: methyl carbon hangs off the ring
        let mol = parse_smiles("Cc1ccccc1").unwrap();
        assert!(!is_in_ring(&mol, 0));
        assert!(is_in_ring(&mol, 1));
    }

    #[test]
    fn fused_rings_are_enumerated_smallest_first() {
        // Indane: a five-membered ring fused to benzene
        let mol = parse_smiles("C1CC2=CC=CC=C2C1").unwrap();
        let rings = find_rings(&mol);
        assert_eq!(rings.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 6]);
        assert!(rings.iter().all(|r| r[0] == *r.iter().min().unwrap()));

        let flags = ring_bonds(&mol, &rings);
        assert_eq!(flags.iter().filter(|&&f| f).count(), mol.bond_count());
    }

    #[test]
    fn linking_bond_is_not_a_ring_bond() {
        // Biphenyl: the bond joining the two rings sits on no cycle
        let mol = parse_smiles("C1=CC=C(C=C1)C1=CC=CC=C1").unwrap();
        let rings = find_rings(&mol);
        assert_eq!(rings.len(), 2);
        let flags = ring_bonds(&mol, &rings);
        let link = mol.bonds.iter().position(|b| (b.atom1, b.atom2) == (3, 6)).unwrap();
        assert!(!flags[link]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 12);
        assert_eq!(ring_bond_indices(&mol, &rings[0]).len(), 6);
    }

    #[test]
    fn acyclic_and_fragments() {
        let mol = parse_smiles("CCCC.CC").unwrap();
        assert_eq!(ring_count(&mol), 0);
        assert!(!is_in_ring(&mol, 0));
        assert!(!is_in_ring(&mol, 99));
        assert!(find_rings(&mol).is_empty());
    }
}
