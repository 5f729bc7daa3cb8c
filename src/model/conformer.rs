//! Coordinate sets attached to a molecule.

use super::types::Point;

/// One coordinate assignment for every atom of the owning molecule, in atom order.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformer {
    positions: Vec<Point>,
    is_3d: bool,
}

impl Conformer {
    /// Creates a conformer from per-atom positions.
    ///
    /// 2D conformers store their coordinates with `z = 0`.
    pub fn new(positions: Vec<Point>, is_3d: bool) -> Self {
        Self { positions, is_3d }
    }

    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn position(&self, atom_idx: usize) -> Option<&Point> {
        self.positions.get(atom_idx)
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    /// Euclidean distance between two atoms in this conformer.
    pub fn distance(&self, idx1: usize, idx2: usize) -> Option<f64> {
        Some(nalgebra::distance(self.position(idx1)?, self.position(idx2)?))
    }

    /// Builds a new conformer holding only the listed atoms, in list order.
    pub(crate) fn select(&self, atom_indices: &[usize]) -> Self {
        Self {
            positions: atom_indices.iter().map(|&i| self.positions[i]).collect(),
            is_3d: self.is_3d,
        }
    }

    /// Drops positions of atoms for which `keep` is `false`.
    pub(crate) fn retain_atoms(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.positions.retain(|_| flags.next().copied().unwrap_or(false));
    }
}
