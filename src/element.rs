//! Periodic-table lookups keyed by atomic number.
//!
//! Only the data the perception code and the SMILES reader need lives here:
//! symbols, period/group placement and valence electron counts.

static SYMBOLS: [&str; 118] = [
    "H", "He", //
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", //
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr", //
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe", //
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", //
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// First atomic number of each period.
const PERIOD_STARTS: [u8; 7] = [1, 3, 11, 19, 37, 55, 87];

pub const MAX_ATOMIC_NUM: u8 = 118;

pub fn symbol(atomic_num: u8) -> Option<&'static str> {
    if atomic_num == 0 {
        return None;
    }
    SYMBOLS.get(atomic_num as usize - 1).copied()
}

pub fn atomic_num_from_symbol(s: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&sym| sym == s)
        .map(|pos| pos as u8 + 1)
}

pub fn period(atomic_num: u8) -> Option<u8> {
    if atomic_num == 0 || atomic_num > MAX_ATOMIC_NUM {
        return None;
    }
    let idx = PERIOD_STARTS
        .iter()
        .rposition(|&start| start <= atomic_num)?;
    Some(idx as u8 + 1)
}

/// IUPAC group (1–18). Lanthanides and actinides are reported as group 3.
pub fn iupac_group(atomic_num: u8) -> Option<u8> {
    let period = period(atomic_num)?;
    let offset = atomic_num - PERIOD_STARTS[period as usize - 1];

    let group = match period {
        1 => {
            if offset == 0 {
                1
            } else {
                18
            }
        }
        2 | 3 => {
            if offset < 2 {
                offset + 1
            } else {
                offset + 11
            }
        }
        4 | 5 => offset + 1,
        _ => match offset {
            0 | 1 => offset + 1,
            2..=15 => 3,
            _ => offset - 13,
        },
    };
    Some(group)
}

/// Electrons in the valence shell of the neutral atom.
///
/// For p-block elements this is `group - 10`; helium reports 2.
pub fn valence_electrons(atomic_num: u8) -> u8 {
    match (atomic_num, iupac_group(atomic_num)) {
        (2, _) => 2,
        (_, Some(g)) if g >= 13 => g - 10,
        (_, Some(g)) => g,
        (_, None) => 0,
    }
}

/// Normal valences used to derive implicit hydrogen counts.
///
/// Empty for elements outside the SMILES organic subset (hydrogen excepted).
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],
        5 => &[3],
        6 => &[4],
        7 | 15 => &[3, 5],
        8 => &[2],
        16 => &[2, 4, 6],
        9 | 17 | 35 => &[1],
        53 => &[1, 3, 5, 7],
        _ => &[],
    }
}

pub fn is_organic_subset(atomic_num: u8) -> bool {
    matches!(atomic_num, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
}
