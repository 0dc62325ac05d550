//! Element symbols and SMILES valence rules.

/// A chemical element as far as structure parsing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
}

/// Symbols for elements 1–118 (H through Og), indexed by atomic number - 1.
static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Look up an element by its symbol (e.g. "C", "Fe"). Case-sensitive.
pub fn element_by_symbol(symbol: &str) -> Option<Element> {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|i| Element {
            atomic_number: (i + 1) as u8,
            symbol: SYMBOLS[i],
        })
}

/// Look up an element by its atomic number (1-based).
pub fn element_by_number(n: u8) -> Option<Element> {
    if (1..=SYMBOLS.len()).contains(&(n as usize)) {
        Some(Element {
            atomic_number: n,
            symbol: SYMBOLS[(n - 1) as usize],
        })
    } else {
        None
    }
}

/// Normal valences of the SMILES organic subset, lowest first.
///
/// Empty for elements outside the subset; those may only appear as
/// bracket atoms, which carry their hydrogen count explicitly.
pub fn organic_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5 => &[3],
        6 => &[4],
        7 => &[3, 5],
        8 => &[2],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}
