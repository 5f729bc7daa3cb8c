//! Deserializable representation of residue template documents.
//!
//! The schema matches the TOML documents in `templates/` and is shared by the embedded
//! store and by caller-supplied templates. All structs deny unknown fields so that a typo in
//! a template key fails loudly instead of silently dropping chemistry.

use crate::model::template::{Template, TemplateAtom, TemplateKind};
use crate::model::types::{BondOrder, Element};
use crate::ops::Error;
use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::HashSet;

/// Top-level template document: metadata, atoms, and bonds.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ResidueTemplateFile {
    pub info: TemplateInfo,
    #[serde(default)]
    pub atoms: Vec<TemplateAtomEntry>,
    #[serde(default)]
    pub bonds: Vec<TemplateBondEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateInfo {
    /// Residue name matched against atom metadata.
    pub name: String,
    pub kind: TemplateKind,
    /// Atoms allowed to form cross-links with other residues (cysteine `SG`).
    #[serde(default)]
    pub bridging: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateAtomEntry {
    pub name: String,
    pub element: Element,
    #[serde(default)]
    pub charge: i8,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateBondEntry {
    pub a1: String,
    pub a2: String,
    pub order: BondOrder,
}

impl ResidueTemplateFile {
    /// Validates the document and converts it into a [`Template`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplate`] for an empty name, duplicate atom names, bonds or
    /// bridging entries naming unknown atoms, self-bonds, and duplicated bonds.
    pub fn into_template(self) -> Result<Template, Error> {
        let name = self.info.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid_template("<unnamed>", "template name is empty"));
        }

        let mut atom_names = HashSet::new();
        for atom in &self.atoms {
            if !atom_names.insert(atom.name.as_str()) {
                return Err(Error::invalid_template(
                    &name,
                    format!("atom '{}' is declared twice", atom.name),
                ));
            }
        }

        let mut seen_bonds = HashSet::new();
        for bond in &self.bonds {
            for end in [&bond.a1, &bond.a2] {
                if !atom_names.contains(end.as_str()) {
                    return Err(Error::invalid_template(
                        &name,
                        format!("bond references unknown atom '{}'", end),
                    ));
                }
            }
            if bond.a1 == bond.a2 {
                return Err(Error::invalid_template(
                    &name,
                    format!("atom '{}' is bonded to itself", bond.a1),
                ));
            }
            let key = if bond.a1 < bond.a2 {
                (bond.a1.as_str(), bond.a2.as_str())
            } else {
                (bond.a2.as_str(), bond.a1.as_str())
            };
            if !seen_bonds.insert(key) {
                return Err(Error::invalid_template(
                    &name,
                    format!("bond {}-{} is declared twice", bond.a1, bond.a2),
                ));
            }
        }

        if let Some(unknown) = self
            .info
            .bridging
            .iter()
            .find(|b| !atom_names.contains(b.as_str()))
        {
            return Err(Error::invalid_template(
                &name,
                format!("bridging atom '{}' is not declared", unknown),
            ));
        }

        let atoms = self
            .atoms
            .iter()
            .map(|a| TemplateAtom {
                name: SmolStr::new(&a.name),
                element: a.element,
                formal_charge: a.charge,
                optional: a.optional,
            })
            .collect();
        let bonds = self
            .bonds
            .iter()
            .map(|b| (SmolStr::new(&b.a1), SmolStr::new(&b.a2), b.order))
            .collect();
        let bridging = self.info.bridging.iter().map(SmolStr::new).collect();

        Ok(Template::new(name, self.info.kind, atoms, bonds, bridging))
    }
}
