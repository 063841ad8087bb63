//! A SMILES reader for building molecules from literal fixtures.
//!
//! Aromatic atoms and bonds are kept as written; the perceivers work on
//! aromatic input directly, so no kekulization happens here.

mod builder;
pub mod error;
mod tokenizer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
pub use error::SmilesError;

pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    builder::build_mol(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol<Atom, Bond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    // ---- Simple molecules ----

    #[test]
    fn methane() {
        let mol = from_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn ethene() {
        let mol = from_smiles("C=C").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 2);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Double);
    }

    #[test]
    fn ethyne() {
        let mol = from_smiles("C#C").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Triple);
    }

    #[test]
    fn halides() {
        for (s, z) in [("F", 9), ("Cl", 17), ("Br", 35), ("I", 53)] {
            let mol = from_smiles(s).unwrap();
            assert_eq!(atom(&mol, 0).atomic_num, z);
            assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        }
    }

    #[test]
    fn acetic_acid() {
        let mol = from_smiles("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(atom(&mol, 0).hydrogen_count, 3); // CH3
        assert_eq!(atom(&mol, 1).hydrogen_count, 0); // C(=O)O
        assert_eq!(atom(&mol, 2).hydrogen_count, 0); // =O
        assert_eq!(atom(&mol, 3).hydrogen_count, 1); // OH
    }

    // ---- Branches ----

    #[test]
    fn neopentane() {
        let mol = from_smiles("CC(C)(C)C").unwrap();
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(mol.bond_count(), 4);
        assert_eq!(atom(&mol, 1).hydrogen_count, 0);
        assert_eq!(mol.neighbors(n(1)).count(), 4);
    }

    #[test]
    fn nested_branches() {
        let mol = from_smiles("CC(C(C)C)C").unwrap();
        assert_eq!(mol.bond_count(), 5);
        assert!(mol.bond_between(n(1), n(5)).is_some());
        assert!(mol.bond_between(n(2), n(4)).is_some());
    }

    // ---- Ring closures ----

    #[test]
    fn cyclohexane() {
        let mol = from_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for i in 0..6 {
            assert_eq!(atom(&mol, i).hydrogen_count, 2);
        }
    }

    #[test]
    fn multi_digit_ring() {
        let mol = from_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn bicyclo() {
        let mol = from_smiles("C1CC2C1CC2").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 7);
    }

    // ---- Bracket atoms ----

    #[test]
    fn ammonium() {
        let mol = from_smiles("[NH4+]").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 7);
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn bracket_atom_without_hydrogens() {
        let mol = from_smiles("[C]").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
        let mol = from_smiles("[Fe]").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 26);
    }

    #[test]
    fn isotopes() {
        let mol = from_smiles("[13C][2H]").unwrap();
        assert_eq!(atom(&mol, 0).isotope, 13);
        assert_eq!(atom(&mol, 1).atomic_num, 1);
        assert_eq!(atom(&mol, 1).isotope, 2);
    }

    #[test]
    fn stereo_marks_are_read_and_dropped() {
        let mol = from_smiles(r"F/C=C\[C@@H](Cl)Br").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(atom(&mol, 3).hydrogen_count, 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Single);
    }

    // ---- Aromatic atoms ----

    #[test]
    fn benzene() {
        let mol = from_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.bond_count(), 6);
        for i in 0..6 {
            assert!(atom(&mol, i).is_aromatic);
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
        for edge in mol.bonds() {
            assert_eq!(mol.bond(edge).order, BondOrder::Aromatic);
        }
    }

    #[test]
    fn pyridine() {
        let mol = from_smiles("c1ccncc1").unwrap();
        assert_eq!(atom(&mol, 3).atomic_num, 7);
        assert_eq!(atom(&mol, 3).hydrogen_count, 0);
    }

    #[test]
    fn furan() {
        let mol = from_smiles("o1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 8);
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
        for i in 1..5 {
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
    }

    #[test]
    fn naphthalene() {
        let mol = from_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(mol.atom_count(), 10);
        assert_eq!(mol.bond_count(), 11);
    }

    // ---- Disconnected ----

    #[test]
    fn sodium_chloride() {
        let mol = from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 1).formal_charge, -1);
    }

    // ---- Error cases ----

    #[test]
    fn empty_string() {
        assert_eq!(from_smiles("").unwrap_err(), SmilesError::EmptyInput);
        assert_eq!(from_smiles("   ").unwrap_err(), SmilesError::EmptyInput);
    }

    #[test]
    fn mismatched_parens() {
        assert_eq!(
            from_smiles("C(C").unwrap_err(),
            SmilesError::UnmatchedParen { pos: 1 }
        );
        assert_eq!(
            from_smiles("C)C").unwrap_err(),
            SmilesError::UnmatchedParen { pos: 1 }
        );
    }

    #[test]
    fn unclosed_ring() {
        assert_eq!(
            from_smiles("C1CC").unwrap_err(),
            SmilesError::UnclosedRing { digit: 1 }
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            from_smiles("C1CC").unwrap_err().to_string(),
            "unclosed ring 1"
        );
        assert_eq!(
            from_smiles("[C").unwrap_err().to_string(),
            "unclosed bracket atom starting at position 0"
        );
    }
}
