use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::default_valences;
use crate::mol::Mol;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

struct OpenRing {
    atom: NodeIndex,
    is_aromatic: bool,
    bond: Option<BondToken>,
}

/// Builds the molecule in token order. Ring-closure bonds are added when the
/// closing digit is read, so bond indices follow the written bond order.
pub fn build_mol(tokens: &[Token]) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = Mol::new();
    let mut bracket_hcount: Vec<Option<u8>> = Vec::new();
    let mut prev: Option<(NodeIndex, bool)> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut branches: Vec<(Option<(NodeIndex, bool)>, usize)> = Vec::new();
    let mut open_rings: BTreeMap<u16, OpenRing> = BTreeMap::new();

    for token in tokens {
        match token {
            Token::Atom(tok) => {
                let idx = mol.add_atom(atom_from_token(tok));
                bracket_hcount.push(tok.hcount);
                if let Some((prev_idx, prev_aromatic)) = prev {
                    let bond = pending.take().map(|(b, _)| b);
                    let order = resolve_bond_order(bond, prev_aromatic, tok.is_aromatic);
                    mol.add_bond(prev_idx, idx, Bond::new(order));
                } else if let Some((_, pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos });
                }
                prev = Some((idx, tok.is_aromatic));
            }
            Token::Bond { bond, pos } => {
                if prev.is_none() || pending.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending = Some((*bond, *pos));
            }
            Token::RingClosure { bond, digit, pos } => {
                let Some((atom, is_aromatic)) = prev else {
                    return Err(SmilesError::InvalidRingBond {
                        digit: *digit,
                        pos: *pos,
                    });
                };
                match open_rings.remove(digit) {
                    None => {
                        open_rings.insert(
                            *digit,
                            OpenRing {
                                atom,
                                is_aromatic,
                                bond: *bond,
                            },
                        );
                    }
                    Some(open) => {
                        if open.atom == atom || mol.bond_between(open.atom, atom).is_some() {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let bond = match (open.bond, *bond) {
                            (Some(a), Some(b)) if bond_token_order(a) != bond_token_order(b) => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                            (a, b) => a.or(b),
                        };
                        let order = resolve_bond_order(bond, open.is_aromatic, is_aromatic);
                        mol.add_bond(open.atom, atom, Bond::new(order));
                    }
                }
            }
            Token::OpenParen(pos) => {
                if prev.is_none() {
                    return Err(SmilesError::UnmatchedParen { pos: *pos });
                }
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                branches.push((prev, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let Some((branch_root, _)) = branches.pop() else {
                    return Err(SmilesError::UnmatchedParen { pos: *pos });
                };
                prev = branch_root;
            }
            Token::Dot(pos) => {
                if pending.is_some() || prev.is_none() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                prev = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if let Some(&(_, pos)) = branches.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(&digit) = open_rings.keys().next() {
        return Err(SmilesError::UnclosedRing { digit });
    }

    resolve_hydrogen_counts(&mut mol, &bracket_hcount);
    Ok(mol)
}

fn atom_from_token(tok: &AtomToken) -> Atom {
    Atom {
        atomic_num: tok.atomic_num,
        formal_charge: tok.charge,
        isotope: tok.isotope,
        hydrogen_count: 0,
        is_aromatic: tok.is_aromatic,
    }
}

fn bond_token_order(bond: BondToken) -> BondOrder {
    match bond {
        BondToken::Single | BondToken::Up | BondToken::Down => BondOrder::Single,
        BondToken::Double => BondOrder::Double,
        BondToken::Triple => BondOrder::Triple,
        BondToken::Aromatic => BondOrder::Aromatic,
    }
}

fn resolve_bond_order(bond: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond {
        Some(b) => bond_token_order(b),
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}

fn resolve_hydrogen_counts(mol: &mut Mol<Atom, Bond>, bracket_hcount: &[Option<u8>]) {
    for (i, hcount) in bracket_hcount.iter().enumerate() {
        let node = NodeIndex::new(i);
        let h = match hcount {
            Some(h) => *h,
            None => implicit_hydrogens(mol, node),
        };
        mol.atom_mut(node).hydrogen_count = h;
    }
}

/// Smallest default valence that fits the explicit bonds. Aromatic atoms hand
/// one of the resulting hydrogens to the pi bond they were written without.
fn implicit_hydrogens(mol: &Mol<Atom, Bond>, node: NodeIndex) -> u8 {
    let atom = mol.atom(node);
    let explicit: u8 = mol
        .bonds_of(node)
        .map(|e| mol.bond(e).order.valence_contribution())
        .fold(0u8, u8::saturating_add);

    let Some(&target) = default_valences(atom.atomic_num)
        .iter()
        .find(|&&v| v >= explicit)
    else {
        return 0;
    };

    let h = target - explicit;
    if atom.is_aromatic && h > 0 {
        h - 1
    } else {
        h
    }
}
