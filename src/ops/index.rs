//! Residue grouping over a flat molecular graph.
//!
//! A [`ResidueIndex`] is a read-only snapshot computed from the per-atom metadata of a
//! [`Molecule`]. Residues are numbered by first appearance, which is also the order used to
//! decide which residue follows which within a chain.

use crate::model::molecule::Molecule;
use crate::model::residue::ResidueKey;
use crate::ops::error::Error;
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Atom membership of every residue in a molecule, keyed by [`ResidueKey`].
#[derive(Debug, Clone)]
pub struct ResidueIndex {
    residues: IndexMap<ResidueKey, Vec<usize>>,
    atom_residue: Vec<usize>,
    next_in_chain: Vec<Option<usize>>,
}

impl ResidueIndex {
    /// Groups the molecule's atoms into residues.
    ///
    /// # Arguments
    ///
    /// * `molecule` - Molecule whose atoms all carry [`ResidueInfo`](crate::ResidueInfo).
    ///
    /// # Returns
    ///
    /// The index, with residues and their atom lists both in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingResidueInfo`] naming the first atom without metadata.
    pub fn build(molecule: &Molecule) -> Result<Self, Error> {
        let mut residues: IndexMap<ResidueKey, Vec<usize>> = IndexMap::new();
        let mut atom_residue = Vec::with_capacity(molecule.atom_count());

        for (atom_idx, atom) in molecule.iter_atoms().enumerate() {
            let info = atom
                .residue_info
                .as_ref()
                .ok_or(Error::MissingResidueInfo { atom_idx })?;
            let entry = residues.entry(info.residue_key());
            let residue_pos = entry.index();
            entry.or_default().push(atom_idx);
            atom_residue.push(residue_pos);
        }

        let mut next_in_chain = vec![None; residues.len()];
        let mut last_by_chain: HashMap<&SmolStr, usize> = HashMap::new();
        for (pos, key) in residues.keys().enumerate() {
            if let Some(prev) = last_by_chain.insert(&key.chain_id, pos) {
                next_in_chain[prev] = Some(pos);
            }
        }

        Ok(Self {
            residues,
            atom_residue,
            next_in_chain,
        })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Position of the residue containing `atom_idx`.
    pub fn residue_of(&self, atom_idx: usize) -> Option<usize> {
        self.atom_residue.get(atom_idx).copied()
    }

    pub fn key(&self, residue: usize) -> Option<&ResidueKey> {
        self.residues.get_index(residue).map(|(key, _)| key)
    }

    pub fn atoms(&self, residue: usize) -> &[usize] {
        self.residues
            .get_index(residue)
            .map(|(_, atoms)| atoms.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ResidueKey, &[usize])> {
        self.residues
            .iter()
            .enumerate()
            .map(|(pos, (key, atoms))| (pos, key, atoms.as_slice()))
    }

    /// The residue that follows `residue` in the same chain, if any.
    pub fn next_in_chain(&self, residue: usize) -> Option<usize> {
        self.next_in_chain.get(residue).copied().flatten()
    }

    pub fn same_residue(&self, idx1: usize, idx2: usize) -> bool {
        match (self.residue_of(idx1), self.residue_of(idx2)) {
            (Some(r1), Some(r2)) => r1 == r2,
            _ => false,
        }
    }

    /// Maps each atom name of `residue` to its first atom index.
    pub fn atom_names(&self, molecule: &Molecule, residue: usize) -> HashMap<SmolStr, usize> {
        let mut names = HashMap::new();
        for &idx in self.atoms(residue) {
            if let Some(info) = molecule.atom(idx).and_then(|a| a.residue_info.as_ref()) {
                names.entry(info.atom_name.clone()).or_insert(idx);
            }
        }
        names
    }
}
