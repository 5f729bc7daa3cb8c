//! # BondForge
//!
//! **BondForge** repairs the bonding graph of macromolecular structures read from coordinate files. Parsers that infer bonds from interatomic distances routinely connect atoms that merely sit close together, miss bond orders, and tie metal ions and waters into the covalent network. BondForge reconciles such a graph with curated residue templates and a small set of chemistry rules so that downstream valence sanitization succeeds and the result matches known residue chemistry.
//!
//! ## Features
//!
//! - **Embedded residue templates** – TOML templates for the standard amino acids, common modified residues, RNA and DNA nucleotides, and water define heavy-atom bonds, bond orders, charges, and cross-link atoms.
//! - **Graph-first molecule model** – `Molecule` stores atoms, per-atom adjacency, and conformers in flat arrays so bond surgery is cheap and atom indices stay meaningful to callers.
//! - **One-call correction** – `ops::prepare_molecule` realigns templated residues, prunes spurious inter-residue contacts, disconnects metals and waters, closes broken rings, and repairs multivalent hydrogens, reporting every edit in a `PrepareReport`.
//! - **Geometry-preserving extraction** – `ops::extract_submolecule` cuts an induced subgraph with all of its conformers, optionally in parallel behind the `parallel` feature.
//! - **Structured diagnostics** – Every pass emits `tracing` events; installing a subscriber is left to the application.
//!
//! ## Building a molecule
//!
//! Parsers add every atom first, then bonds, then conformers. Each conformer must hold one position per atom, so `Molecule::add_atom` panics once a conformer is attached and `Molecule::add_conformer` panics on a size mismatch. Read all coordinate sets before attaching any of them.

mod db;
mod model;
mod utils;

pub mod ops;
pub mod templates;

pub use model::atom::Atom;
pub use model::conformer::Conformer;
pub use model::molecule::{Bond, Molecule};
pub use model::residue::{ResidueInfo, ResidueKey};
pub use model::template::{Template, TemplateKind};
pub use model::types::{BondOrder, Element, Point};
