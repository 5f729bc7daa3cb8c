//! Induced-subgraph extraction that carries coordinates along.

use crate::model::conformer::Conformer;
use crate::model::molecule::Molecule;
use crate::ops::error::Error;
use crate::utils::parallel::*;
use tracing::debug;

/// Builds a new molecule from a subset of atoms.
///
/// The result contains exactly the listed atoms, in slice order, with their metadata copied
/// verbatim, plus every source bond whose endpoints are both selected. The source molecule
/// is never modified.
///
/// # Arguments
///
/// * `molecule` - Source molecule.
/// * `atom_indices` - Atoms to keep; position `k` in the slice becomes atom `k` of the result.
/// * `include_conformers` - When `true`, every source conformer is copied with the selected
///   coordinates (same 3D flag); when `false` the result has no conformers.
///
/// # Errors
///
/// Returns [`Error::AtomIndexOutOfRange`] or [`Error::DuplicateAtomIndex`] for an invalid
/// selection; nothing is allocated for the result in that case.
pub fn extract_submolecule(
    molecule: &Molecule,
    atom_indices: &[usize],
    include_conformers: bool,
) -> Result<Molecule, Error> {
    let atom_count = molecule.atom_count();
    let mut new_index: Vec<Option<usize>> = vec![None; atom_count];
    for (new_idx, &old_idx) in atom_indices.iter().enumerate() {
        let slot = new_index
            .get_mut(old_idx)
            .ok_or(Error::AtomIndexOutOfRange {
                index: old_idx,
                atom_count,
            })?;
        if slot.is_some() {
            return Err(Error::DuplicateAtomIndex { index: old_idx });
        }
        *slot = Some(new_idx);
    }

    let mut sub = Molecule::with_capacity(atom_indices.len());
    for &old_idx in atom_indices {
        if let Some(atom) = molecule.atom(old_idx) {
            sub.add_atom(atom.clone());
        }
    }

    for bond in molecule.bonds() {
        if let (Some(a), Some(b)) = (new_index[bond.a1_idx], new_index[bond.a2_idx]) {
            sub.add_bond(a, b, bond.order);
        }
    }

    if include_conformers {
        let conformers: Vec<Conformer> = molecule
            .conformers()
            .par_iter()
            .map(|conformer| conformer.select(atom_indices))
            .collect();
        for conformer in conformers {
            sub.add_conformer(conformer);
        }
    }

    debug!(
        atoms = sub.atom_count(),
        bonds = sub.bond_count(),
        conformers = sub.conformer_count(),
        "extracted submolecule"
    );
    Ok(sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::residue::ResidueInfo;
    use crate::model::types::{BondOrder, Element, Point};

    fn glycine_chain() -> Molecule {
        let mut molecule = Molecule::new();
        let layout = [
            (Element::N, "N", 1),
            (Element::C, "CA", 1),
            (Element::C, "C", 1),
            (Element::O, "O", 1),
            (Element::N, "N", 2),
            (Element::C, "CA", 2),
            (Element::C, "C", 2),
            (Element::O, "O", 2),
        ];
        for (element, name, num) in layout {
            molecule.add_atom(Atom::with_residue_info(
                element,
                ResidueInfo::new(name, "GLY", num, "A", None),
            ));
        }
        for (a, b, order) in [
            (0, 1, BondOrder::Single),
            (1, 2, BondOrder::Single),
            (2, 3, BondOrder::Double),
            (2, 4, BondOrder::Single),
            (4, 5, BondOrder::Single),
            (5, 6, BondOrder::Single),
            (6, 7, BondOrder::Double),
        ] {
            molecule.add_bond(a, b, order);
        }
        let positions: Vec<Point> = (0..8).map(|i| Point::new(i as f64 * 1.4, 0.0, 0.0)).collect();
        molecule.add_conformer(Conformer::new(positions, true));
        molecule
    }

    #[test]
    fn extracts_prefix_with_3d_conformer_and_metadata() {
        let source = glycine_chain();

        let sub = extract_submolecule(&source, &[0, 1, 2, 3, 4, 5], true).unwrap();

        assert_eq!(sub.atom_count(), 6);
        assert_eq!(sub.bond_count(), 5);
        assert_eq!(sub.conformer_count(), 1);
        assert!(sub.conformer(0).unwrap().is_3d());
        let (src, dst) = (
            source.atom(0).unwrap().residue_info.as_ref().unwrap(),
            sub.atom(0).unwrap().residue_info.as_ref().unwrap(),
        );
        assert_eq!(dst.residue_name, src.residue_name);
        assert_eq!(dst.residue_number, src.residue_number);
    }

    #[test]
    fn preserves_duplicate_conformers() {
        let mut source = glycine_chain();
        let copy = source.conformer(0).unwrap().clone();
        source.add_conformer(copy);

        let sub = extract_submolecule(&source, &[0, 1, 2, 3, 4, 5], true).unwrap();

        assert_eq!(source.conformer_count(), 2);
        assert_eq!(sub.conformer_count(), 2);
    }

    #[test]
    fn follows_selection_order() {
        let source = glycine_chain();

        let sub = extract_submolecule(&source, &[3, 2, 7], true).unwrap();

        assert_eq!(sub.atom(0).unwrap().name(), Some("O"));
        assert_eq!(sub.bond_between(0, 1).unwrap().order, BondOrder::Double);
        assert_eq!(sub.degree(2), 0);
        let positions = sub.conformer(0).unwrap().positions();
        assert_eq!(positions[0], source.conformer(0).unwrap().positions()[3]);
        assert_eq!(positions[2], source.conformer(0).unwrap().positions()[7]);
    }

    #[test]
    fn omits_conformers_when_not_requested() {
        let source = glycine_chain();

        let sub = extract_submolecule(&source, &[0, 1], false).unwrap();

        assert_eq!(sub.conformer_count(), 0);
        assert_eq!(sub.bond_count(), 1);
    }

    #[test]
    fn empty_selection_yields_empty_molecule() {
        let source = glycine_chain();

        let sub = extract_submolecule(&source, &[], true).unwrap();

        assert!(sub.is_empty());
        assert_eq!(sub.bond_count(), 0);
        assert!(sub.conformers().iter().all(|c| c.atom_count() == 0));
    }

    #[test]
    fn rejects_out_of_range_and_duplicate_indices() {
        let source = glycine_chain();

        assert!(matches!(
            extract_submolecule(&source, &[0, 8], false),
            Err(Error::AtomIndexOutOfRange {
                index: 8,
                atom_count: 8
            })
        ));
        assert!(matches!(
            extract_submolecule(&source, &[1, 2, 1], false),
            Err(Error::DuplicateAtomIndex { index: 1 })
        ));
    }

    #[test]
    fn source_molecule_is_unchanged() {
        let source = glycine_chain();
        let before = source.bond_count();

        let _ = extract_submolecule(&source, &[1, 2], true).unwrap();

        assert_eq!(source.bond_count(), before);
        assert_eq!(source.atom_count(), 8);
    }
}
