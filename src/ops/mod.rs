//! Operations that repair a parsed molecular graph and cut pieces out of it.
//!
//! The corrector ([`prepare_molecule`]) rewrites bonds in place using residue templates and
//! chemistry rules; the extractor ([`extract_submolecule`]) builds a new molecule from a
//! subset of atoms. Both share the residue grouping in [`ResidueIndex`] and a common error
//! type.

mod error;
mod extract;
mod hydro;
mod index;
mod prepare;

pub use error::Error;

pub use index::ResidueIndex;

pub use hydro::fix_multivalent_hydrogens;

pub use prepare::{
    PrepareConfig, PrepareReport, ResidueLink, WATER_RESIDUE_NAMES, is_water, prepare_molecule,
};

pub use extract::extract_submolecule;
