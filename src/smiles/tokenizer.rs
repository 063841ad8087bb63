use crate::element::atomic_num_from_symbol;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond {
        bond: BondToken,
        pos: usize,
    },
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub atomic_num: u8,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// Set for bracket atoms only; organic-subset atoms get implicit hydrogens.
    pub hcount: Option<u8>,
    pub charge: i8,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let bond = match chars[i] {
            '-' => Some(BondToken::Single),
            '=' => Some(BondToken::Double),
            '#' => Some(BondToken::Triple),
            ':' => Some(BondToken::Aromatic),
            '/' => Some(BondToken::Up),
            '\\' => Some(BondToken::Down),
            _ => None,
        };
        if let Some(bond) = bond {
            tokens.push(Token::Bond { bond, pos: i });
            i += 1;
            continue;
        }

        match chars[i] {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let digit = parse_percent_ring(&chars, i)?;
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos: i });
                i += 3;
            }
            d @ '0'..='9' => {
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: d as u16 - '0' as u16,
                    pos: i,
                });
                i += 1;
            }
            _ => {
                let (tok, next) = parse_organic_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
        }
    }

    Ok(tokens)
}

fn organic_atom(atomic_num: u8, is_aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        atomic_num,
        is_aromatic,
        isotope: 0,
        hcount: None,
        charge: 0,
        pos,
    }
}

fn parse_organic_atom(chars: &[char], i: usize) -> Result<(AtomToken, usize), SmilesError> {
    let next = chars.get(i + 1).copied();
    let (atomic_num, is_aromatic, len) = match (chars[i], next) {
        ('B', Some('r')) => (35, false, 2),
        ('C', Some('l')) => (17, false, 2),
        ('B', _) => (5, false, 1),
        ('C', _) => (6, false, 1),
        ('N', _) => (7, false, 1),
        ('O', _) => (8, false, 1),
        ('P', _) => (15, false, 1),
        ('S', _) => (16, false, 1),
        ('F', _) => (9, false, 1),
        ('I', _) => (53, false, 1),
        ('b', _) => (5, true, 1),
        ('c', _) => (6, true, 1),
        ('n', _) => (7, true, 1),
        ('o', _) => (8, true, 1),
        ('p', _) => (15, true, 1),
        ('s', _) => (16, true, 1),
        ('*', _) => (0, false, 1),
        (ch, _) if ch.is_ascii_alphabetic() => {
            return Err(SmilesError::InvalidElement {
                pos: i,
                text: ch.to_string(),
            })
        }
        (ch, _) => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
    };
    Ok((organic_atom(atomic_num, is_aromatic, i), i + len))
}

/// Ring-closure digits bind the bond symbol written right before them.
fn take_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    if let Some(Token::Bond { bond, .. }) = tokens.last() {
        let bond = *bond;
        tokens.pop();
        return Some(bond);
    }
    None
}

fn parse_percent_ring(chars: &[char], start: usize) -> Result<u16, SmilesError> {
    let digits = (chars.get(start + 1), chars.get(start + 2));
    match digits {
        (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
            Ok((*d1 as u16 - '0' as u16) * 10 + (*d2 as u16 - '0' as u16))
        }
        _ => Err(SmilesError::UnexpectedChar {
            pos: start,
            ch: '%',
        }),
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1; // skip '['

    let isotope = parse_isotope(chars, &mut i, start)?;
    let (atomic_num, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    skip_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i);
    let charge = parse_charge(chars, &mut i, start)?;
    skip_atom_class(chars, &mut i);

    if i >= chars.len() || chars[i] != ']' {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1; // skip ']'

    Ok((
        AtomToken {
            atomic_num,
            is_aromatic,
            isotope,
            hcount: Some(hcount),
            charge,
            pos: start,
        },
        i,
    ))
}

fn parse_isotope(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u16, SmilesError> {
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(chars[*i] as u16 - '0' as u16))
            .ok_or(SmilesError::InvalidIsotope { pos: bracket_start })?;
        *i += 1;
    }
    Ok(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(u8, bool), SmilesError> {
    let Some(&first) = chars.get(*i) else {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    };
    let second = chars.get(*i + 1).copied();

    if first == '*' {
        *i += 1;
        return Ok((0, false));
    }

    if first.is_ascii_lowercase() {
        let aromatic: &[(&str, u8)] = &[
            ("se", 34),
            ("as", 33),
            ("te", 52),
            ("b", 5),
            ("c", 6),
            ("n", 7),
            ("o", 8),
            ("p", 15),
            ("s", 16),
        ];
        for &(pat, atomic_num) in aromatic {
            let len = pat.len();
            if *i + len <= chars.len() && chars[*i..*i + len].iter().copied().eq(pat.chars()) {
                *i += len;
                return Ok((atomic_num, true));
            }
        }
        return Err(SmilesError::InvalidElement {
            pos: *i,
            text: first.to_string(),
        });
    }

    // Two-letter symbols take precedence.
    if let Some(second) = second.filter(|c| c.is_ascii_lowercase()) {
        let sym: String = [first, second].iter().collect();
        if let Some(atomic_num) = atomic_num_from_symbol(&sym) {
            *i += 2;
            return Ok((atomic_num, false));
        }
    }

    if let Some(atomic_num) = atomic_num_from_symbol(&first.to_string()) {
        *i += 1;
        return Ok((atomic_num, false));
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: first.to_string(),
    })
}

/// Stereo marks carry no information the perceivers use.
fn skip_chirality(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i] == '@' {
        *i += 1;
    }
    if *i + 1 < chars.len() {
        let class: String = chars[*i..*i + 2].iter().collect();
        if matches!(class.as_str(), "TH" | "AL" | "SP" | "TB" | "OH") {
            *i += 2;
            while *i < chars.len() && chars[*i].is_ascii_digit() {
                *i += 1;
            }
        }
    }
}

fn parse_hcount(chars: &[char], i: &mut usize) -> u8 {
    if *i < chars.len() && chars[*i] == 'H' {
        *i += 1;
        let mut count: u8 = 1;
        if *i < chars.len() && chars[*i].is_ascii_digit() {
            count = chars[*i] as u8 - b'0';
            *i += 1;
        }
        count
    } else {
        0
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = chars[*i];
    *i += 1;

    if *i < chars.len() && chars[*i].is_ascii_digit() {
        let mut val: i8 = 0;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add(chars[*i] as i8 - b'0' as i8))
                .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
            *i += 1;
        }
        return Ok(sign * val);
    }

    // `++` / `--` repeat the sign.
    let mut count: i8 = 1;
    while *i < chars.len() && chars[*i] == symbol {
        count = count
            .checked_add(1)
            .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
        *i += 1;
    }
    Ok(sign * count)
}

fn skip_atom_class(chars: &[char], i: &mut usize) {
    if *i < chars.len() && chars[*i] == ':' {
        *i += 1;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
    }
}
