//! Core data structures for molecular graphs and residue templates.
//!
//! A [`Molecule`](molecule::Molecule) owns its atoms, adjacency and conformers; residues are
//! not containers but groupings derived from the metadata each atom carries. Templates
//! describe the reference chemistry that the repair operations restore.

pub mod atom;
pub mod conformer;
pub mod molecule;
pub mod residue;
pub mod template;
pub mod types;
