//! In-memory representation of a posed ligand.
//!
//! A [`Ligand`] is an ordered list of [`Atom`]s together with a dense,
//! symmetric matrix of [`BondType`]s. Atom order is the order in which atoms
//! were kept while loading; each atom remembers its index in the source file
//! so that results can be reported against the original numbering.

use crate::matrix::SquareMatrix;

/// Bond type between two atoms, following the Tripos MOL2 vocabulary.
///
/// `NotConnected` records the absence of a bond. `Unknown` records that the
/// source format did not say whether the atoms are bonded, in which case
/// connectivity is inferred from geometry (see [`crate::topology`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BondType {
    Single,
    Double,
    Triple,
    Amide,
    Aromatic,
    Dummy,
    NotConnected,
    Unknown,
}

impl BondType {
    /// Return `true` iff this is an explicit chemical bond.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, BondType::NotConnected | BondType::Unknown)
    }
}

/// A single atom of a [`Ligand`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    name: String,
    simple_type: String,
    coords: [f64; 3],
    original_index: usize,
}

impl Atom {
    /// Construct an atom. `name` and `simple_type` are stored upper-cased.
    pub fn new(name: &str, simple_type: &str, coords: [f64; 3], original_index: usize) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            simple_type: simple_type.trim().to_uppercase(),
            coords,
            original_index,
        }
    }

    /// Atom label as written in the input file (e.g. `C1`, `O2`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element-level type used for symmetry detection (e.g. `C`, `CL`).
    pub fn simple_type(&self) -> &str {
        &self.simple_type
    }

    pub fn coords(&self) -> [f64; 3] {
        self.coords
    }

    /// Index of this atom in the input file.
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    pub fn is_hydrogen(&self) -> bool {
        self.simple_type == "H"
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance2(&self, other: &Atom) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

/// Atoms plus a symmetric bond-type matrix.
#[derive(Debug, Clone)]
pub struct Ligand {
    atoms: Vec<Atom>,
    bonds: SquareMatrix<BondType>,
}

impl Ligand {
    /// Construct a [`Ligand`] whose atoms are pairwise `NotConnected`; add
    /// bonds with [`Ligand::add_bond`].
    pub fn new(atoms: Vec<Atom>) -> Self {
        let n = atoms.len();
        Self {
            atoms,
            bonds: SquareMatrix::filled(n, BondType::NotConnected),
        }
    }

    /// Construct a [`Ligand`] whose connectivity is unknown and must be
    /// inferred from interatomic distances.
    pub fn with_unknown_connectivity(atoms: Vec<Atom>) -> Self {
        let n = atoms.len();
        Self {
            atoms,
            bonds: SquareMatrix::from_fn(n, |i, j| {
                if i == j {
                    BondType::NotConnected
                } else {
                    BondType::Unknown
                }
            }),
        }
    }

    /// Record a bond of type `bond` between atoms `i` and `j`. Self-bonds are
    /// ignored.
    ///
    /// # Panics
    /// Panics if `i` or `j` is not an atom index of this ligand.
    pub fn add_bond(&mut self, i: usize, j: usize, bond: BondType) {
        if i != j {
            self.bonds.set_symmetric(i, j, bond);
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, i: usize) -> &Atom {
        &self.atoms[i]
    }

    pub fn bond(&self, i: usize, j: usize) -> BondType {
        self.bonds[(i, j)]
    }
}
