//! SMILES string parser.
//!
//! Accepts the organic subset, bracket atoms (isotope, chirality, hydrogen
//! count, charge, atom class), explicit and directional bonds, branches,
//! ring closures (`0`-`9`, `%nn`) and `.`-separated fragments. Anything after
//! the first whitespace is treated as a title.
//!
//! Parsing is followed by a sanitization pass that rejects graphs no
//! cheminformatics toolkit would accept: over-valent uncharged atoms and
//! aromatic atoms outside of rings. The accepted graph is then normalized:
//! plain `[H]` atoms fold into their neighbour's hydrogen count and
//! aromaticity is perceived, so equivalent spellings give identical graphs.

use std::collections::BTreeMap;

use molsim_core::{MolsimError, Result};

use crate::aromaticity::perceive_aromaticity;
use crate::element::{element_by_number, element_by_symbol, organic_valences};
use crate::molecule::{Bond, BondOrder, BondStereo, Chirality, MolAtom, Molecule};
use crate::ring;

/// Parse a SMILES string into a `Molecule`.
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    parse_smiles_named(smiles, "")
}

/// Parse a SMILES string into a `Molecule` with a given name.
///
/// When `name` is empty the SMILES title (text after the first whitespace),
/// if any, becomes the molecule name.
pub fn parse_smiles_named(smiles: &str, name: &str) -> Result<Molecule> {
    let trimmed = smiles.trim();
    let (notation, title) = match trimmed.split_once(char::is_whitespace) {
        Some((notation, title)) => (notation, title.trim()),
        None => (trimmed, ""),
    };
    if notation.is_empty() {
        return Err(invalid("empty SMILES"));
    }

    let mut parser = SmilesParser::new(notation);
    parser.parse()?;
    parser.check_closed()?;
    parser.compute_implicit_hydrogens()?;
    parser.fold_explicit_hydrogens();

    let name = if name.is_empty() { title } else { name };
    let mut mol = Molecule::new(name.to_string(), parser.atoms, parser.bonds);
    check_aromatic_atoms_in_rings(&mol)?;
    perceive_aromaticity(&mut mol);
    Ok(mol)
}

fn invalid(msg: impl Into<String>) -> MolsimError {
    MolsimError::InvalidStructure(msg.into())
}

/// An open branch: the atom it hangs off and the atom count when it opened.
struct Branch {
    anchor: usize,
    atoms_at_open: usize,
}

/// A ring-closure digit waiting for its partner.
struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
    stereo: BondStereo,
}

struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<MolAtom>,
    /// bracket[atom_idx] is true when the atom was written in brackets
    bracket: Vec<bool>,
    bonds: Vec<Bond>,
    ring_closures: BTreeMap<u16, OpenRing>,
    branches: Vec<Branch>,
    /// Index of the previous atom (for bonding)
    prev_atom: Option<usize>,
    /// Explicit bond symbol waiting for the next atom or ring closure
    pending_bond: Option<BondOrder>,
    pending_stereo: BondStereo,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        SmilesParser {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bracket: Vec::new(),
            bonds: Vec::new(),
            ring_closures: BTreeMap::new(),
            branches: Vec::new(),
            prev_atom: None,
            pending_bond: None,
            pending_stereo: BondStereo::None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn parse(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let anchor = self.prev_atom.ok_or_else(|| {
                        invalid(format!("branch without preceding atom at position {}", self.pos))
                    })?;
                    if self.pending_bond.is_some() {
                        return Err(invalid(format!(
                            "bond symbol before '(' at position {}",
                            self.pos
                        )));
                    }
                    self.advance();
                    self.branches.push(Branch { anchor, atoms_at_open: self.atoms.len() });
                }
                b')' => {
                    let branch = self.branches.pop().ok_or_else(|| {
                        invalid(format!("unmatched ')' at position {}", self.pos))
                    })?;
                    if self.pending_bond.is_some() {
                        return Err(invalid(format!("dangling bond before ')' at position {}", self.pos)));
                    }
                    if branch.atoms_at_open == self.atoms.len() {
                        return Err(invalid(format!("empty branch at position {}", self.pos)));
                    }
                    self.advance();
                    self.prev_atom = Some(branch.anchor);
                }
                b'-' => self.set_pending_bond(BondOrder::Single, BondStereo::None)?,
                b'=' => self.set_pending_bond(BondOrder::Double, BondStereo::None)?,
                b'#' => self.set_pending_bond(BondOrder::Triple, BondStereo::None)?,
                b':' => self.set_pending_bond(BondOrder::Aromatic, BondStereo::None)?,
                b'/' => self.set_pending_bond(BondOrder::Single, BondStereo::Up)?,
                b'\\' => self.set_pending_bond(BondOrder::Single, BondStereo::Down)?,
                b'%' => {
                    self.advance();
                    let ring_num = self.parse_two_digit_ring()?;
                    self.handle_ring_closure(ring_num)?;
                }
                b'[' => self.parse_bracket_atom()?,
                b'0'..=b'9' => {
                    self.advance();
                    self.handle_ring_closure((ch - b'0') as u16)?;
                }
                b'.' => {
                    if self.prev_atom.is_none() || self.pending_bond.is_some() {
                        return Err(invalid(format!("misplaced '.' at position {}", self.pos)));
                    }
                    self.advance();
                    self.prev_atom = None;
                }
                _ if is_organic_atom_start(ch) => self.parse_organic_atom()?,
                _ => {
                    return Err(invalid(format!(
                        "unexpected character '{}' at position {}",
                        ch as char, self.pos
                    )));
                }
            }
        }

        if self.pending_bond.is_some() {
            return Err(invalid("SMILES ends with a bond symbol"));
        }
        Ok(())
    }

    fn set_pending_bond(&mut self, order: BondOrder, stereo: BondStereo) -> Result<()> {
        if self.prev_atom.is_none() {
            return Err(invalid(format!("bond without preceding atom at position {}", self.pos)));
        }
        if self.pending_bond.is_some() {
            return Err(invalid(format!("consecutive bond symbols at position {}", self.pos)));
        }
        self.advance();
        self.pending_bond = Some(order);
        self.pending_stereo = stereo;
        Ok(())
    }

    fn parse_organic_atom(&mut self) -> Result<()> {
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Err(invalid("unexpected end of SMILES"));
        };
        let is_aromatic = ch.is_ascii_lowercase();

        let symbol = match ch {
            b'B' if self.peek() == Some(b'r') => {
                self.advance();
                "Br"
            }
            b'C' if self.peek() == Some(b'l') => {
                self.advance();
                "Cl"
            }
            b'B' | b'b' => "B",
            b'C' | b'c' => "C",
            b'N' | b'n' => "N",
            b'O' | b'o' => "O",
            b'P' | b'p' => "P",
            b'S' | b's' => "S",
            b'F' => "F",
            b'I' => "I",
            _ => {
                return Err(invalid(format!(
                    "unknown organic atom '{}' at position {start}",
                    ch as char
                )));
            }
        };

        let elem = element_by_symbol(symbol)
            .ok_or_else(|| invalid(format!("unknown element '{symbol}'")))?;

        self.push_atom(
            MolAtom {
                atomic_number: elem.atomic_number,
                formal_charge: 0,
                isotope: None,
                is_aromatic,
                implicit_hydrogens: 0, // computed later
                chirality: Chirality::None,
            },
            false,
        )
    }

    fn parse_bracket_atom(&mut self) -> Result<()> {
        let start = self.pos;
        self.advance(); // consume '['

        let isotope = self.parse_optional_number();
        let isotope = match isotope {
            Some(n) if n > u16::MAX as u32 => {
                return Err(invalid(format!("isotope {n} out of range at position {start}")));
            }
            other => other.map(|n| n as u16),
        };

        let ch = self
            .advance()
            .ok_or_else(|| invalid("unexpected end of SMILES in bracket atom"))?;
        if !ch.is_ascii_alphabetic() {
            return Err(invalid(format!(
                "expected element symbol in bracket atom at position {start}"
            )));
        }
        let is_aromatic = ch.is_ascii_lowercase();
        let upper = ch.to_ascii_uppercase();

        // Two-letter symbols take precedence ("Cl", "Se", aromatic "se").
        // Nothing else in a bracket atom starts with a lowercase letter.
        let mut symbol = String::from(upper as char);
        if let Some(next) = self.peek().filter(u8::is_ascii_lowercase) {
            let two_letter = format!("{}{}", upper as char, next as char);
            if element_by_symbol(&two_letter).is_none() {
                return Err(invalid(format!(
                    "unknown element '{two_letter}' at position {start}"
                )));
            }
            self.advance();
            symbol = two_letter;
        }

        let elem = element_by_symbol(&symbol)
            .ok_or_else(|| invalid(format!("unknown element '{symbol}' at position {start}")))?;
        if is_aromatic && !matches!(symbol.as_str(), "B" | "C" | "N" | "O" | "P" | "S" | "Se" | "As" | "Te") {
            return Err(invalid(format!("element '{symbol}' cannot be aromatic")));
        }

        let mut chirality = Chirality::None;
        if self.peek() == Some(b'@') {
            self.advance();
            chirality = Chirality::CounterClockwise;
            if self.peek() == Some(b'@') {
                self.advance();
                chirality = Chirality::Clockwise;
            }
        }

        let mut explicit_h = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            explicit_h = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    d - b'0'
                }
                _ => 1,
            };
        }

        let charge = self.parse_charge()?;

        // Atom class, e.g. [CH3:1]; carries no chemistry
        if self.peek() == Some(b':') {
            self.advance();
            if self.parse_optional_number().is_none() {
                return Err(invalid(format!("expected atom class number at position {}", self.pos)));
            }
        }

        if self.advance() != Some(b']') {
            return Err(invalid(format!("expected ']' in bracket atom starting at position {start}")));
        }

        self.push_atom(
            MolAtom {
                atomic_number: elem.atomic_number,
                formal_charge: charge,
                isotope,
                is_aromatic,
                implicit_hydrogens: explicit_h,
                chirality,
            },
            true,
        )
    }

    fn parse_charge(&mut self) -> Result<i8> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.peek();
        self.advance();

        match self.peek() {
            Some(d) if d.is_ascii_digit() => {
                self.advance();
                Ok(sign * (d - b'0') as i8)
            }
            _ => {
                // "++" and "--" count repeated signs
                let mut magnitude = 1i8;
                while self.peek() == symbol {
                    self.advance();
                    magnitude = magnitude.saturating_add(1);
                }
                Ok(sign * magnitude)
            }
        }
    }

    fn parse_optional_number(&mut self) -> Option<u32> {
        let mut n: u32 = 0;
        let mut found = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
                n = n.saturating_mul(10).saturating_add((ch - b'0') as u32);
                found = true;
            } else {
                break;
            }
        }
        if found { Some(n) } else { None }
    }

    fn parse_two_digit_ring(&mut self) -> Result<u16> {
        let d1 = self.advance().ok_or_else(|| invalid("expected digit after '%'"))?;
        let d2 = self.advance().ok_or_else(|| invalid("expected second digit after '%'"))?;
        if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
            return Err(invalid("invalid ring closure number after '%'"));
        }
        Ok((d1 - b'0') as u16 * 10 + (d2 - b'0') as u16)
    }

    fn handle_ring_closure(&mut self, ring_num: u16) -> Result<()> {
        let current = self
            .prev_atom
            .ok_or_else(|| invalid(format!("ring closure {ring_num} without preceding atom")))?;
        let order = self.pending_bond.take();
        let stereo = std::mem::take(&mut self.pending_stereo);

        match self.ring_closures.remove(&ring_num) {
            Some(open) => {
                if open.atom == current {
                    return Err(invalid(format!("ring closure {ring_num} bonds an atom to itself")));
                }
                let order = match (open.order, order) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(invalid(format!(
                            "conflicting bond orders on ring closure {ring_num}"
                        )));
                    }
                    (a, b) => a.or(b),
                };
                let stereo = if stereo == BondStereo::None { open.stereo } else { stereo };
                self.push_bond(open.atom, current, order, stereo)?;
            }
            None => {
                self.ring_closures.insert(ring_num, OpenRing { atom: current, order, stereo });
            }
        }
        Ok(())
    }

    fn push_atom(&mut self, atom: MolAtom, bracket: bool) -> Result<()> {
        let atom_idx = self.atoms.len();
        self.atoms.push(atom);
        self.bracket.push(bracket);
        if let Some(prev) = self.prev_atom {
            let order = self.pending_bond.take();
            let stereo = std::mem::take(&mut self.pending_stereo);
            self.push_bond(prev, atom_idx, order, stereo)?;
        }
        self.prev_atom = Some(atom_idx);
        Ok(())
    }

    /// Add a bond; an unwritten order is aromatic between two aromatic atoms,
    /// single otherwise.
    fn push_bond(
        &mut self,
        atom1: usize,
        atom2: usize,
        explicit: Option<BondOrder>,
        stereo: BondStereo,
    ) -> Result<()> {
        if self
            .bonds
            .iter()
            .any(|b| (b.atom1 == atom1 && b.atom2 == atom2) || (b.atom1 == atom2 && b.atom2 == atom1))
        {
            return Err(invalid(format!("duplicate bond between atoms {atom1} and {atom2}")));
        }
        let both_aromatic = self.atoms[atom1].is_aromatic && self.atoms[atom2].is_aromatic;
        let order = explicit.unwrap_or(if both_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        });
        self.bonds.push(Bond {
            atom1,
            atom2,
            order,
            is_aromatic: order == BondOrder::Aromatic,
            stereo,
        });
        Ok(())
    }

    fn check_closed(&self) -> Result<()> {
        if !self.ring_closures.is_empty() {
            let open: Vec<_> = self.ring_closures.keys().collect();
            return Err(invalid(format!("unmatched ring closure(s): {open:?}")));
        }
        if !self.branches.is_empty() {
            return Err(invalid(format!("{} unmatched '(' in SMILES", self.branches.len())));
        }
        Ok(())
    }

    /// Fill in implicit hydrogens for organic-subset atoms and reject
    /// over-valent ones. Bracket atoms keep the count they were written with.
    fn compute_implicit_hydrogens(&mut self) -> Result<()> {
        for i in 0..self.atoms.len() {
            if self.bracket[i] {
                continue;
            }
            let atom = &self.atoms[i];
            let valences = organic_valences(atom.atomic_number);
            let Some(&lowest) = valences.first() else {
                continue;
            };

            let hydrogens = if atom.is_aromatic {
                // One electron goes to the pi system; the rest pair with
                // sigma bonds and hydrogens.
                (lowest as usize).saturating_sub(1).saturating_sub(self.bond_degree(i))
            } else {
                let used = self.bond_order_sum(i);
                match valences.iter().map(|&v| v as usize).find(|&v| v >= used) {
                    Some(v) => v - used,
                    None => {
                        let symbol = element_by_number(atom.atomic_number)
                            .map(|e| e.symbol)
                            .unwrap_or("?");
                        return Err(invalid(format!(
                            "explicit valence {used} for atom {i} ({symbol}) exceeds the maximum of {}",
                            valences[valences.len() - 1]
                        )));
                    }
                }
            };
            self.atoms[i].implicit_hydrogens = hydrogens as u8;
        }
        Ok(())
    }

    /// Fold plain `[H]` atoms into the hydrogen count of the heavy atom they
    /// hang off. Isotopes, charged or unbonded hydrogens and H2 stay atoms.
    fn fold_explicit_hydrogens(&mut self) {
        let parents: Vec<Option<usize>> =
            (0..self.atoms.len()).map(|i| self.hydrogen_parent(i)).collect();
        if parents.iter().all(Option::is_none) {
            return;
        }

        for &parent in parents.iter().flatten() {
            let atom = &mut self.atoms[parent];
            atom.implicit_hydrogens = atom.implicit_hydrogens.saturating_add(1);
        }

        let mut remap = vec![usize::MAX; self.atoms.len()];
        let mut next = 0;
        for (i, parent) in parents.iter().enumerate() {
            if parent.is_none() {
                remap[i] = next;
                next += 1;
            }
        }

        let atoms = std::mem::take(&mut self.atoms);
        self.atoms = atoms
            .into_iter()
            .zip(&parents)
            .filter(|(_, parent)| parent.is_none())
            .map(|(atom, _)| atom)
            .collect();
        let mut kept = parents.iter().map(Option::is_none);
        self.bracket.retain(|_| kept.next().unwrap_or(true));
        self.bonds
            .retain(|b| parents[b.atom1].is_none() && parents[b.atom2].is_none());
        for bond in &mut self.bonds {
            bond.atom1 = remap[bond.atom1];
            bond.atom2 = remap[bond.atom2];
        }
    }

    /// The heavy atom a foldable hydrogen is singly bonded to.
    fn hydrogen_parent(&self, i: usize) -> Option<usize> {
        let atom = &self.atoms[i];
        if atom.atomic_number != 1
            || atom.isotope.is_some()
            || atom.formal_charge != 0
            || atom.implicit_hydrogens != 0
        {
            return None;
        }
        let mut bonds = self.bonds.iter().filter(|b| b.atom1 == i || b.atom2 == i);
        let bond = bonds.next()?;
        if bonds.next().is_some() || bond.order != BondOrder::Single {
            return None;
        }
        let parent = if bond.atom1 == i { bond.atom2 } else { bond.atom1 };
        (self.atoms[parent].atomic_number != 1).then_some(parent)
    }

    /// Number of explicit bonds (graph degree) for an atom.
    fn bond_degree(&self, atom_idx: usize) -> usize {
        self.bonds
            .iter()
            .filter(|b| b.atom1 == atom_idx || b.atom2 == atom_idx)
            .count()
    }

    /// Sum of bond orders (rounded) for non-aromatic valence calculation.
    fn bond_order_sum(&self, atom_idx: usize) -> usize {
        let v: f64 = self
            .bonds
            .iter()
            .filter(|b| b.atom1 == atom_idx || b.atom2 == atom_idx)
            .map(|b| b.order.as_f64())
            .sum();
        v.round() as usize
    }
}

fn check_aromatic_atoms_in_rings(mol: &Molecule) -> Result<()> {
    let in_ring = ring::ring_atoms(mol);
    match mol
        .atoms
        .iter()
        .enumerate()
        .find(|(i, atom)| atom.is_aromatic && !in_ring[*i])
    {
        Some((i, _)) => Err(invalid(format!("non-ring atom {i} marked aromatic"))),
        None => Ok(()),
    }
}

fn is_organic_atom_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I'
            | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(smiles: &str) {
        match parse_smiles(smiles) {
            Err(MolsimError::InvalidStructure(_)) => {}
            other => panic!("expected InvalidStructure for {smiles:?}, got {other:?}"),
        }
    }

    #[test]
    fn parse_methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.atoms[0].atomic_number, 6);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn parse_ethanol() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 2);
        assert_eq!(mol.atoms[2].implicit_hydrogens, 1);
    }

    #[test]
    fn parse_benzene() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6); // 5 chain + 1 ring closure
        for atom in &mol.atoms {
            assert!(atom.is_aromatic);
            assert_eq!(atom.implicit_hydrogens, 1);
        }
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
    }

    #[test]
    fn parse_kekule_aspirin() {
        let mol = parse_smiles("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 13);
        assert_eq!(mol.bond_count(), 13);
        assert_eq!(mol.ring_count(), 1);
    }

    #[test]
    fn parse_branching() {
        // Isobutane: CC(C)C
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.degree(1), 3);
    }

    #[test]
    fn parse_double_bond() {
        let mol = parse_smiles("C=C").unwrap();
        assert_eq!(mol.bonds[0].order, BondOrder::Double);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 2);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 2);
    }

    #[test]
    fn parse_bracket_atoms() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atoms[0].atomic_number, 7);
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);

        // Bracket atoms keep their written hydrogen count, even when uncharged
        let carbene = parse_smiles("[CH2]").unwrap();
        assert_eq!(carbene.atoms[0].implicit_hydrogens, 2);

        let labelled = parse_smiles("[13CH3:1][C@@H](O)[O-]").unwrap();
        assert_eq!(labelled.atoms[0].isotope, Some(13));
        assert_eq!(labelled.atoms[1].chirality, Chirality::Clockwise);
        assert_eq!(labelled.atoms[3].formal_charge, -1);
    }

    #[test]
    fn parse_aromatic_heteroatoms() {
        let pyrrole = parse_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.atoms[3].implicit_hydrogens, 1);
        let pyridine = parse_smiles("c1ccncc1").unwrap();
        assert_eq!(pyridine.atoms[3].implicit_hydrogens, 0);
        let selenophene = parse_smiles("c1cc[se]c1").unwrap();
        assert_eq!(selenophene.atoms[3].atomic_number, 34);
    }

    #[test]
    fn parse_two_digit_ring_closure() {
        let mol = parse_smiles("C%10CCCCCCCCC%10").unwrap();
        assert_eq!(mol.atom_count(), 10);
        assert_eq!(mol.bond_count(), 10);
    }

    #[test]
    fn ring_closure_bond_order() {
        let mol = parse_smiles("C=1CCCCC1").unwrap();
        let closure = mol.get_bond(0, 5).unwrap();
        assert_eq!(closure.order, BondOrder::Double);
    }

    #[test]
    fn directional_bonds_record_stereo() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(mol.bonds[0].stereo, BondStereo::Up);
        assert_eq!(mol.bonds[1].order, BondOrder::Double);
        assert_eq!(mol.bonds[2].stereo, BondStereo::Up);
    }

    #[test]
    fn fragments_and_titles() {
        let salt = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(salt.atom_count(), 2);
        assert_eq!(salt.bond_count(), 0);

        let named = parse_smiles("  CCO ethanol  ").unwrap();
        assert_eq!(named.name, "ethanol");
        let explicit = parse_smiles_named("CCO ethanol", "EtOH").unwrap();
        assert_eq!(explicit.name, "EtOH");
    }

    #[test]
    fn metal_containing_structures() {
        let cisplatin = parse_smiles("N.N.Cl[Pt]Cl").unwrap();
        assert_eq!(cisplatin.atom_count(), 5);
        assert_eq!(cisplatin.atoms[3].atomic_number, 78);

        let gadolinium = parse_smiles("[Gd+3]").unwrap();
        assert_eq!(gadolinium.atoms[0].atomic_number, 64);
        assert_eq!(gadolinium.atoms[0].formal_charge, 3);

        assert_eq!(parse_smiles("[U]").unwrap().atoms[0].atomic_number, 92);
        let dimethylmercury = parse_smiles("C[Hg]C").unwrap();
        assert_eq!(dimethylmercury.atoms[1].atomic_number, 80);
        assert_eq!(dimethylmercury.atoms[0].implicit_hydrogens, 3);
    }

    #[test]
    fn unknown_two_letter_symbol_is_named() {
        for (smiles, symbol) in [("[Xx]", "'Xx'"), ("[Zq+2]", "'Zq'"), ("C[Qa]C", "'Qa'")] {
            match parse_smiles(smiles) {
                Err(MolsimError::InvalidStructure(msg)) => {
                    assert!(msg.contains(&format!("unknown element {symbol}")), "{msg}");
                }
                other => panic!("expected InvalidStructure for {smiles:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn explicit_hydrogens_fold_into_heavy_atoms() {
        let methanol = parse_smiles("[H]OC").unwrap();
        assert_eq!(methanol.atom_count(), 2);
        assert_eq!(methanol.bond_count(), 1);
        assert_eq!(methanol.atoms[0].atomic_number, 8);
        assert_eq!(methanol.atoms[0].implicit_hydrogens, 1);
        assert_eq!(methanol.atoms[1].implicit_hydrogens, 3);

        let methane = parse_smiles("[H]C([H])([H])[H]").unwrap();
        assert_eq!(methane.atom_count(), 1);
        assert_eq!(methane.atoms[0].implicit_hydrogens, 4);

        let bracketed = parse_smiles("[CH3][H]").unwrap();
        assert_eq!(bracketed.atoms[0].implicit_hydrogens, 4);

        // Hydrogens that carry information stay in the graph
        assert_eq!(parse_smiles("[2H]C").unwrap().atom_count(), 2);
        assert_eq!(parse_smiles("[H][H]").unwrap().atom_count(), 2);
        assert_eq!(parse_smiles("[H+]").unwrap().atom_count(), 1);
    }

    #[test]
    fn invalid_smiles_error() {
        for smiles in [
            "",
            "   ",
            "C(",
            "C1CC",
            "[",
            "[C",
            "invalid_smiles",
            "CX",
            "C)C",
            "(C)C",
            "C()C",
            "C=",
            "=C",
            "C==C",
            "C=.C",
            "C(=)C",
            "C11",
            "C12CC12",
            ".C",
            "[Zz]",
            "[cl]",
        ] {
            assert_invalid(smiles);
        }
    }

    #[test]
    fn sanitization_rejects_bad_chemistry() {
        assert_invalid("C(C)(C)(C)(C)C"); // pentavalent carbon
        assert_invalid("O=O=O");
        assert_invalid("FC(F)(F)(F)F");
        assert_invalid("cc"); // aromatic chain
        assert_invalid("Cc1ccccc1c"); // aromatic substituent outside the ring

        // Higher normal valences are fine
        assert!(parse_smiles("CS(=O)(=O)C").is_ok());
        assert!(parse_smiles("C[N+](C)(C)C").is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for valid simple SMILES: chains of aliphatic organic atoms
    fn simple_smiles() -> impl Strategy<Value = String> {
        let atoms = prop_oneof![Just("C"), Just("N"), Just("O"), Just("S"), Just("Cl")];
        proptest::collection::vec(atoms, 1..=20).prop_map(|parts| parts.join(""))
    }

    proptest! {
        #[test]
        fn parse_smiles_does_not_panic(s in "\\PC{0,100}") {
            let _ = parse_smiles(&s);
        }

        #[test]
        fn parse_is_deterministic(smi in simple_smiles()) {
            let a = parse_smiles(&smi);
            let b = parse_smiles(&smi);
            prop_assert_eq!(a.is_ok(), b.is_ok());
            if let (Ok(a), Ok(b)) = (a, b) {
                prop_assert_eq!(a.atoms, b.atoms);
                prop_assert_eq!(a.bonds, b.bonds);
            }
        }

        #[test]
        fn atom_count_positive_on_success(smi in simple_smiles()) {
            if let Ok(mol) = parse_smiles(&smi) {
                prop_assert!(mol.atom_count() > 0);
            }
        }
    }
}
