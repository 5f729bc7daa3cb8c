//! Per-atom residue metadata and the composite key that groups atoms into residues.
//!
//! Residues are not stored as containers in `bond-forge`; they are derived views over a
//! [`Molecule`](super::molecule::Molecule) computed from the metadata each atom carries.
//! Keeping identity on the atom lets graph surgery (edge removal, atom deletion) proceed
//! without maintaining a parallel residue hierarchy.

use smol_str::SmolStr;
use std::fmt;

/// Residue annotation attached to an atom by the coordinate-file parser.
///
/// Names are trimmed on construction because fixed-column formats pad them (`" CA "`);
/// every comparison in the crate works on the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueInfo {
    /// Atom label within the residue (e.g. `CA`, `SG`, `OXT`).
    pub atom_name: SmolStr,
    /// Residue name such as `ALA`, `HOH`, or `MSE`.
    pub residue_name: SmolStr,
    /// Author residue sequence number.
    pub residue_number: i32,
    /// Chain identifier.
    pub chain_id: SmolStr,
    /// Insertion code distinguishing residues sharing a number.
    pub insertion_code: Option<char>,
}

impl ResidueInfo {
    /// Builds residue metadata, trimming padded names and blank insertion codes.
    ///
    /// # Arguments
    ///
    /// * `atom_name` - Atom label as read from the file.
    /// * `residue_name` - Residue name as read from the file.
    /// * `residue_number` - Residue sequence number.
    /// * `chain_id` - Chain identifier.
    /// * `insertion_code` - Insertion code; `Some(' ')` is normalized to `None`.
    pub fn new(
        atom_name: &str,
        residue_name: &str,
        residue_number: i32,
        chain_id: &str,
        insertion_code: Option<char>,
    ) -> Self {
        Self {
            atom_name: SmolStr::new(atom_name.trim()),
            residue_name: SmolStr::new(residue_name.trim()),
            residue_number,
            chain_id: SmolStr::new(chain_id.trim()),
            insertion_code: insertion_code.filter(|c| !c.is_whitespace()),
        }
    }

    /// Returns the key identifying the residue this atom belongs to.
    pub fn residue_key(&self) -> ResidueKey {
        ResidueKey {
            chain_id: self.chain_id.clone(),
            residue_number: self.residue_number,
            insertion_code: self.insertion_code,
            residue_name: self.residue_name.clone(),
        }
    }

    /// Reports whether two atoms carry the same residue name, regardless of residue number.
    pub fn same_residue_name(&self, other: &ResidueInfo) -> bool {
        self.residue_name == other.residue_name
    }
}

/// Composite identity of a residue: chain, number, insertion code, and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueKey {
    pub chain_id: SmolStr,
    pub residue_number: i32,
    pub insertion_code: Option<char>,
    pub residue_name: SmolStr,
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.chain_id, self.residue_name, self.residue_number)?;
        if let Some(code) = self.insertion_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}
