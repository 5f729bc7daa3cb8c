//! Graph-level atom record: chemical identity, charge state, and residue metadata.
//!
//! Coordinates live in [`Conformer`](super::conformer::Conformer)s owned by the molecule,
//! and the degree is derived from the molecule's adjacency, so an `Atom` only carries the
//! properties a valence sanitizer needs plus the annotation used to group it into a residue.

use super::residue::ResidueInfo;
use super::types::Element;

/// Atom node of a [`Molecule`](super::molecule::Molecule).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Chemical element.
    pub element: Element,
    /// Integer formal charge.
    pub formal_charge: i8,
    /// Number of hydrogens attached to this atom without being graph nodes.
    pub explicit_hydrogens: u8,
    /// When set, the sanitizer must not add implicit hydrogens to this atom.
    pub no_implicit: bool,
    /// Residue annotation supplied by the parser; required by the corrector.
    pub residue_info: Option<ResidueInfo>,
}

impl Atom {
    /// Creates a neutral atom without residue metadata.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            explicit_hydrogens: 0,
            no_implicit: false,
            residue_info: None,
        }
    }

    /// Creates a neutral atom annotated with residue metadata.
    pub fn with_residue_info(element: Element, residue_info: ResidueInfo) -> Self {
        Self {
            residue_info: Some(residue_info),
            ..Self::new(element)
        }
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number()
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }

    /// Atom name from the residue metadata, if present.
    pub fn name(&self) -> Option<&str> {
        self.residue_info.as_ref().map(|info| info.atom_name.as_str())
    }

    /// Residue name from the residue metadata, if present.
    pub fn residue_name(&self) -> Option<&str> {
        self.residue_info
            .as_ref()
            .map(|info| info.residue_name.as_str())
    }
}
