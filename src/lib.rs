pub mod atom;
pub mod bitset;
pub mod bond;
pub mod electron;
pub mod element;
pub mod graph;
pub mod mol;
pub mod pi_system;
pub mod rings;
pub mod smiles;
pub mod traits;

pub use atom::Atom;
pub use bitset::BitSet;
pub use bond::{Bond, BondOrder};
pub use electron::ElectronSystem;
pub use graph::{cyclomatic_number, Fragment, GraphError, MolecularGraph};
pub use mol::Mol;
pub use pi_system::{electron_domains, pi_electron_systems, ElectronDomains, PiElectronSystemList};
pub use rings::{extended_sssr, ExtendedSssr, RingFragment, RingSearchConfig};
pub use smiles::{from_smiles, SmilesError};
pub use traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
