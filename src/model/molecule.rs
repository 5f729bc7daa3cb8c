//! Mutable molecular graph: an arena of atoms, per-atom adjacency, and conformers.
//!
//! Atoms are addressed by stable `usize` indices and bonds reference those indices, never
//! pointers, so edge surgery is a handful of vector operations on the two endpoint lists.
//! Each adjacency list keeps insertion order; that order is what "the atom's current bond
//! order" means for callers that need a deterministic tie-break.

use super::atom::Atom;
use super::conformer::Conformer;
use super::types::BondOrder;
use std::fmt;

/// Undirected bond connecting two atoms within a molecule.
///
/// Bonds store canonical atom indices (ascending order) so equality, hashing, and sorting
/// remain stable regardless of the order in which the connection was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    /// Index of the first atom (always the lesser index after canonicalization).
    pub a1_idx: usize,
    /// Index of the second atom (greater-or-equal to `a1_idx`).
    pub a2_idx: usize,
    /// Chemical multiplicity assigned to the bond.
    pub order: BondOrder,
}

impl Bond {
    /// Creates a new bond while canonicalizing the endpoint ordering.
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        if idx1 <= idx2 {
            Self {
                a1_idx: idx1,
                a2_idx: idx2,
                order,
            }
        } else {
            Self {
                a1_idx: idx2,
                a2_idx: idx1,
                order,
            }
        }
    }

    /// Returns the endpoint opposite to `atom_idx`.
    pub fn partner(&self, atom_idx: usize) -> usize {
        if self.a1_idx == atom_idx {
            self.a2_idx
        } else {
            self.a1_idx
        }
    }

}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    neighbor: usize,
    order: BondOrder,
}

/// Molecular graph with optional coordinate sets.
///
/// Every conformer holds exactly one position per atom; [`Molecule::add_conformer`] and
/// [`Molecule::add_atom`] keep that invariant.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    atoms: Vec<Atom>,
    adjacency: Vec<Vec<Edge>>,
    bond_count: usize,
    conformers: Vec<Conformer>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(atoms: usize) -> Self {
        Self {
            atoms: Vec::with_capacity(atoms),
            adjacency: Vec::with_capacity(atoms),
            bond_count: 0,
            conformers: Vec::new(),
        }
    }

    /// Appends an atom and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the molecule already owns conformers, since they could no longer
    /// provide a position for the new atom. Add every atom before the first conformer.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        assert!(
            self.conformers.is_empty(),
            "cannot add atoms to a molecule that already owns conformers"
        );
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bond_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atom(&self, idx: usize) -> Option<&Atom> {
        self.atoms.get(idx)
    }

    pub fn atom_mut(&mut self, idx: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(idx)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn iter_atoms(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Adds a bond between two distinct atoms.
    ///
    /// # Returns
    ///
    /// `true` when the bond was inserted; `false` for self-loops or when the atoms are
    /// already bonded (the existing order is left untouched).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn add_bond(&mut self, idx1: usize, idx2: usize, order: BondOrder) -> bool {
        assert!(
            idx1 < self.atoms.len() && idx2 < self.atoms.len(),
            "bond ({idx1}, {idx2}) references an atom outside the molecule"
        );
        if idx1 == idx2 || self.bond_between(idx1, idx2).is_some() {
            return false;
        }

        self.adjacency[idx1].push(Edge {
            neighbor: idx2,
            order,
        });
        self.adjacency[idx2].push(Edge {
            neighbor: idx1,
            order,
        });
        self.bond_count += 1;
        true
    }

    /// Inserts the bond or updates its order, returning the previous order if it existed.
    pub fn set_bond(&mut self, idx1: usize, idx2: usize, order: BondOrder) -> Option<BondOrder> {
        match self.bond_between(idx1, idx2) {
            Some(existing) => {
                for (from, to) in [(idx1, idx2), (idx2, idx1)] {
                    if let Some(edge) = self.adjacency[from].iter_mut().find(|e| e.neighbor == to)
                    {
                        edge.order = order;
                    }
                }
                Some(existing.order)
            }
            None => {
                self.add_bond(idx1, idx2, order);
                None
            }
        }
    }

    /// Removes the bond between two atoms, returning its order if it existed.
    pub fn remove_bond(&mut self, idx1: usize, idx2: usize) -> Option<BondOrder> {
        let pos = self
            .adjacency
            .get(idx1)?
            .iter()
            .position(|e| e.neighbor == idx2)?;
        let edge = self.adjacency[idx1].remove(pos);
        self.adjacency[idx2].retain(|e| e.neighbor != idx1);
        self.bond_count -= 1;
        Some(edge.order)
    }

    /// Removes every bond incident to `atom_idx` and returns how many were removed.
    pub fn clear_bonds_of(&mut self, atom_idx: usize) -> usize {
        let Some(edges) = self.adjacency.get_mut(atom_idx).map(std::mem::take) else {
            return 0;
        };
        for edge in &edges {
            self.adjacency[edge.neighbor].retain(|e| e.neighbor != atom_idx);
        }
        self.bond_count -= edges.len();
        edges.len()
    }

    pub fn bond_between(&self, idx1: usize, idx2: usize) -> Option<Bond> {
        self.adjacency
            .get(idx1)?
            .iter()
            .find(|e| e.neighbor == idx2)
            .map(|e| Bond::new(idx1, idx2, e.order))
    }

    /// Number of bonds incident to the atom (0 for out-of-range indices).
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency.get(atom_idx).map_or(0, Vec::len)
    }

    /// Iterates the bonds of one atom in their insertion order.
    pub fn bonds_of(&self, atom_idx: usize) -> impl Iterator<Item = Bond> + '_ {
        self.adjacency
            .get(atom_idx)
            .into_iter()
            .flatten()
            .map(move |e| Bond::new(atom_idx, e.neighbor, e.order))
    }

    /// Iterates the neighbor indices of one atom in bond insertion order.
    pub fn neighbors_of(&self, atom_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(atom_idx)
            .into_iter()
            .flatten()
            .map(|e| e.neighbor)
    }

    /// Iterates every bond once, ordered by lower atom index then insertion order.
    pub fn bonds(&self) -> impl Iterator<Item = Bond> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(idx, edges)| {
            edges
                .iter()
                .filter(move |e| e.neighbor > idx)
                .map(move |e| Bond::new(idx, e.neighbor, e.order))
        })
    }

    /// Reports whether any bond incident to the atom is aromatic.
    pub fn is_aromatic_atom(&self, atom_idx: usize) -> bool {
        self.bonds_of(atom_idx).any(|b| b.order.is_aromatic())
    }

    /// Attaches a conformer and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the conformer does not hold exactly one position per atom.
    pub fn add_conformer(&mut self, conformer: Conformer) -> usize {
        assert_eq!(
            conformer.atom_count(),
            self.atoms.len(),
            "conformer size does not match the molecule's atom count"
        );
        self.conformers.push(conformer);
        self.conformers.len() - 1
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    pub fn conformer(&self, idx: usize) -> Option<&Conformer> {
        self.conformers.get(idx)
    }

    #[inline]
    pub fn conformer_count(&self) -> usize {
        self.conformers.len()
    }

    /// First conformer flagged as 3D, used for geometric sanity checks.
    pub fn first_3d_conformer(&self) -> Option<&Conformer> {
        self.conformers.iter().find(|c| c.is_3d())
    }

    /// Deletes every atom for which `remove` returns `true`.
    ///
    /// Surviving atoms keep their relative order and are renumbered contiguously; bonds
    /// touching a removed atom disappear, and every conformer drops the matching
    /// positions.
    ///
    /// # Returns
    ///
    /// The number of atoms removed.
    pub fn remove_atoms<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(usize, &Atom) -> bool,
    {
        let keep: Vec<bool> = self
            .atoms
            .iter()
            .enumerate()
            .map(|(idx, atom)| !remove(idx, atom))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![None; self.atoms.len()];
        let mut next = 0;
        for (idx, kept) in keep.iter().enumerate() {
            if *kept {
                remap[idx] = Some(next);
                next += 1;
            }
        }

        let mut flags = keep.iter();
        self.atoms.retain(|_| flags.next().copied().unwrap_or(false));

        let old_adjacency = std::mem::take(&mut self.adjacency);
        self.adjacency = old_adjacency
            .into_iter()
            .zip(&keep)
            .filter(|(_, kept)| **kept)
            .map(|(edges, _)| {
                edges
                    .into_iter()
                    .filter_map(|e| {
                        remap[e.neighbor].map(|neighbor| Edge {
                            neighbor,
                            order: e.order,
                        })
                    })
                    .collect()
            })
            .collect();
        self.bond_count = self.adjacency.iter().map(Vec::len).sum::<usize>() / 2;

        for conformer in &mut self.conformers {
            conformer.retain_atoms(&keep);
        }

        removed
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Molecule {{ atoms: {}, bonds: {}, conformers: {} }}",
            self.atom_count(),
            self.bond_count(),
            self.conformer_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Element, Point};

    fn chain_of(n: usize) -> Molecule {
        let mut molecule = Molecule::new();
        for _ in 0..n {
            molecule.add_atom(Atom::new(Element::C));
        }
        for i in 1..n {
            molecule.add_bond(i - 1, i, BondOrder::Single);
        }
        molecule
    }

    #[test]
    fn bond_new_creates_bond_with_canonical_ordering() {
        let bond = Bond::new(5, 2, BondOrder::Single);

        assert_eq!(bond.a1_idx, 2);
        assert_eq!(bond.a2_idx, 5);
        assert_eq!(bond.partner(2), 5);
        assert_eq!(bond.partner(5), 2);
    }

    #[test]
    fn add_bond_rejects_duplicates_and_self_loops() {
        let mut molecule = chain_of(3);

        assert!(!molecule.add_bond(1, 0, BondOrder::Double));
        assert!(!molecule.add_bond(2, 2, BondOrder::Single));
        assert_eq!(molecule.bond_count(), 2);
        assert_eq!(molecule.bond_between(0, 1).unwrap().order, BondOrder::Single);
    }

    #[test]
    fn set_bond_updates_both_directions() {
        let mut molecule = chain_of(2);

        let previous = molecule.set_bond(1, 0, BondOrder::Double);

        assert_eq!(previous, Some(BondOrder::Single));
        assert_eq!(molecule.bond_between(0, 1).unwrap().order, BondOrder::Double);
        assert_eq!(molecule.bond_between(1, 0).unwrap().order, BondOrder::Double);
        assert_eq!(molecule.bond_count(), 1);
    }

    #[test]
    fn remove_bond_updates_degrees_and_count() {
        let mut molecule = chain_of(3);

        assert_eq!(molecule.remove_bond(2, 1), Some(BondOrder::Single));
        assert_eq!(molecule.remove_bond(2, 1), None);
        assert_eq!(molecule.degree(1), 1);
        assert_eq!(molecule.degree(2), 0);
        assert_eq!(molecule.bond_count(), 1);
    }

    #[test]
    fn clear_bonds_of_isolates_atom() {
        let mut molecule = chain_of(3);

        assert_eq!(molecule.clear_bonds_of(1), 2);
        assert_eq!(molecule.bond_count(), 0);
        assert_eq!(molecule.degree(0), 0);
        assert_eq!(molecule.clear_bonds_of(99), 0);
    }

    #[test]
    fn neighbors_follow_insertion_order() {
        let mut molecule = chain_of(4);
        molecule.add_bond(1, 3, BondOrder::Single);

        let neighbors: Vec<_> = molecule.neighbors_of(1).collect();
        assert_eq!(neighbors, vec![0, 2, 3]);
    }

    #[test]
    fn bonds_iterates_each_bond_once() {
        let mut molecule = chain_of(4);
        molecule.add_bond(3, 0, BondOrder::Aromatic);

        let bonds: Vec<_> = molecule.bonds().collect();
        assert_eq!(bonds.len(), molecule.bond_count());
        assert!(bonds.contains(&Bond::new(0, 3, BondOrder::Aromatic)));
        assert!(molecule.is_aromatic_atom(3));
        assert!(!molecule.is_aromatic_atom(1));
    }

    #[test]
    fn remove_atoms_remaps_bonds_and_conformers() {
        let mut molecule = chain_of(4);
        molecule.add_conformer(Conformer::new(
            (0..4).map(|i| Point::new(i as f64, 0.0, 0.0)).collect(),
            true,
        ));

        let removed = molecule.remove_atoms(|idx, _| idx == 1);

        assert_eq!(removed, 1);
        assert_eq!(molecule.atom_count(), 3);
        assert_eq!(molecule.bond_count(), 1);
        assert!(molecule.bond_between(1, 2).is_some());
        assert_eq!(molecule.degree(0), 0);
        let conformer = molecule.conformer(0).unwrap();
        assert_eq!(conformer.atom_count(), 3);
        assert_eq!(conformer.positions()[1], Point::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn remove_atoms_without_matches_is_a_no_op() {
        let mut molecule = chain_of(3);

        assert_eq!(molecule.remove_atoms(|_, atom| atom.is_hydrogen()), 0);
        assert_eq!(molecule.bond_count(), 2);
    }

    #[test]
    #[should_panic(expected = "conformer size")]
    fn add_conformer_rejects_wrong_size() {
        let mut molecule = chain_of(2);
        molecule.add_conformer(Conformer::new(vec![Point::origin()], true));
    }

    #[test]
    #[should_panic(expected = "already owns conformers")]
    fn add_atom_after_conformer_panics() {
        let mut molecule = chain_of(2);
        molecule.add_conformer(Conformer::new(vec![Point::origin(); 2], true));
        molecule.add_atom(Atom::new(Element::C));
    }

    #[test]
    fn display_reports_counts() {
        let molecule = chain_of(3);

        assert_eq!(
            molecule.to_string(),
            "Molecule { atoms: 3, bonds: 2, conformers: 0 }"
        );
    }
}
