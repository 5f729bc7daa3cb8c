use crate::model::molecule::Molecule;
use tracing::trace;

/// Reduces every hydrogen bonded to more than one atom to a single bond.
///
/// Distance-based bond perception often attaches a hydrogen to every heavy atom within
/// reach. For each such hydrogen the first bond in its adjacency order whose partner is a
/// heavy atom with the same residue name is kept; all other bonds of that hydrogen are
/// removed. A hydrogen with no qualifying partner loses every bond.
///
/// # Arguments
///
/// * `molecule` - Molecule edited in place.
///
/// # Returns
///
/// The number of bonds removed.
pub fn fix_multivalent_hydrogens(molecule: &mut Molecule) -> usize {
    let mut removed = 0;

    for h_idx in 0..molecule.atom_count() {
        let Some(hydrogen) = molecule.atom(h_idx) else {
            continue;
        };
        if !hydrogen.is_hydrogen() || molecule.degree(h_idx) <= 1 {
            continue;
        }

        let anchor = molecule.neighbors_of(h_idx).find(|&n| {
            molecule.atom(n).is_some_and(|a| {
                a.element.is_heavy_atom()
                    && match (&hydrogen.residue_info, &a.residue_info) {
                        (Some(h), Some(other)) => h.same_residue_name(other),
                        (None, None) => true,
                        _ => false,
                    }
            })
        });
        let extra: Vec<usize> = molecule
            .neighbors_of(h_idx)
            .filter(|&n| Some(n) != anchor)
            .collect();

        trace!(
            hydrogen = h_idx,
            atom = ?hydrogen.name(),
            residue = ?hydrogen.residue_name(),
            ?anchor,
            dropped = extra.len(),
            "repairing multivalent hydrogen"
        );
        for neighbor in extra {
            if molecule.remove_bond(h_idx, neighbor).is_some() {
                removed += 1;
            }
        }
    }

    removed
}
