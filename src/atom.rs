/// Default node payload of a [`Mol`](crate::Mol).
///
/// Only the properties read off a structural formula are stored here. The
/// perception code reaches them through the accessor traits in
/// [`traits`](crate::traits), so any payload implementing those traits works
/// just as well.
///
/// # Examples
///
/// ```
/// use ringcrab::Atom;
///
/// let oxide = Atom {
///     atomic_num: 8,
///     formal_charge: -1,
///     ..Atom::default()
/// };
/// assert_eq!(oxide.hydrogen_count, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number; `0` is a wildcard/dummy atom.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number, `0` for natural abundance.
    pub isotope: u16,
    /// Implicit (suppressed) hydrogens. They are not graph nodes but count
    /// as bonds when electron systems are initialized.
    pub hydrogen_count: u8,
    /// Written as an aromatic (lowercase) atom in the source SMILES.
    pub is_aromatic: bool,
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
