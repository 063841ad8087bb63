use thiserror::Error;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// The input string was empty or contained only whitespace.
    #[error("empty SMILES string")]
    EmptyInput,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("invalid charge in bracket atom at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("isotope overflow in bracket atom at position {pos}")]
    InvalidIsotope { pos: usize },
    /// A parenthesis was opened without a matching close, or vice versa.
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    /// A bond symbol with no atom to attach to on one side.
    #[error("bond at position {pos} is not between two atoms")]
    DanglingBond { pos: usize },
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    /// A ring closure that would bond an atom to itself or repeat a bond.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
}
