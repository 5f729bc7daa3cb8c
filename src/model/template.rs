use super::types::{BondOrder, Element};
use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::{HashMap, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Protein,
    Nucleic,
    Solvent,
    Ligand,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TemplateKind::Protein => "protein",
            TemplateKind::Nucleic => "nucleic",
            TemplateKind::Solvent => "solvent",
            TemplateKind::Ligand => "ligand",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAtom {
    pub name: SmolStr,
    pub element: Element,
    pub formal_charge: i8,
    /// Terminal or capping atoms that a complete residue may legitimately lack.
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBond {
    pub a1: SmolStr,
    pub a2: SmolStr,
    pub order: BondOrder,
    /// Set when the endpoints stay connected through the template's other bonds.
    pub in_ring: bool,
}

impl TemplateBond {
    pub fn connects(&self, name1: &str, name2: &str) -> bool {
        (self.a1 == name1 && self.a2 == name2) || (self.a1 == name2 && self.a2 == name1)
    }
}

/// Reference chemistry of one residue: its heavy atoms, bonds, and cross-link roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub kind: TemplateKind,
    atoms: Vec<TemplateAtom>,
    bonds: Vec<TemplateBond>,
    bridging: Vec<SmolStr>,
}

impl Template {
    /// Assembles a template and derives which bonds close rings.
    ///
    /// # Arguments
    ///
    /// * `name` - Residue name the template matches (exact, case-sensitive).
    /// * `kind` - Polymer class of the residue.
    /// * `atoms` - Atom list in declaration order.
    /// * `bonds` - Bonds as `(name1, name2, order)` triples.
    /// * `bridging` - Names of atoms that may form cross-links to other residues.
    pub fn new<S: Into<String>>(
        name: S,
        kind: TemplateKind,
        atoms: Vec<TemplateAtom>,
        bonds: Vec<(SmolStr, SmolStr, BondOrder)>,
        bridging: Vec<SmolStr>,
    ) -> Self {
        let name = name.into();
        debug_assert!(
            bonds.iter().all(|(a1, a2, _)| {
                atoms.iter().any(|a| &a.name == a1) && atoms.iter().any(|a| &a.name == a2)
            }),
            "Bond in template '{}' refers to an atom name that does not exist in the atom list.",
            name
        );

        let ring_flags = ring_bond_flags(&bonds);
        let bonds = bonds
            .into_iter()
            .zip(ring_flags)
            .map(|((a1, a2, order), in_ring)| TemplateBond {
                a1,
                a2,
                order,
                in_ring,
            })
            .collect();

        Self {
            name,
            kind,
            atoms,
            bonds,
            bridging,
        }
    }

    pub fn atoms(&self) -> &[TemplateAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[TemplateBond] {
        &self.bonds
    }

    pub fn atom(&self, name: &str) -> Option<&TemplateAtom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    pub fn bond(&self, name1: &str, name2: &str) -> Option<&TemplateBond> {
        self.bonds.iter().find(|b| b.connects(name1, name2))
    }

    pub fn has_bond(&self, name1: &str, name2: &str) -> bool {
        self.bond(name1, name2).is_some()
    }

    pub fn ring_bonds(&self) -> impl Iterator<Item = &TemplateBond> {
        self.bonds.iter().filter(|b| b.in_ring)
    }

    /// Atoms every complete instance of the residue must contain.
    pub fn required_atoms(&self) -> impl Iterator<Item = &TemplateAtom> {
        self.atoms.iter().filter(|a| !a.optional)
    }

    pub fn is_bridging(&self, name: &str) -> bool {
        self.bridging.iter().any(|b| b == name)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Template {{ name: \"{}\", kind: {}, atoms: {}, bonds: {} }}",
            self.name,
            self.kind,
            self.atom_count(),
            self.bond_count()
        )
    }
}

fn ring_bond_flags(bonds: &[(SmolStr, SmolStr, BondOrder)]) -> Vec<bool> {
    let mut adjacency: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();
    for (i, (a1, a2, _)) in bonds.iter().enumerate() {
        adjacency
            .entry(a1.as_str())
            .or_default()
            .push((a2.as_str(), i));
        adjacency
            .entry(a2.as_str())
            .or_default()
            .push((a1.as_str(), i));
    }

    bonds
        .iter()
        .enumerate()
        .map(|(skip, (start, goal, _))| {
            let mut seen = vec![start.as_str()];
            let mut queue = VecDeque::from([start.as_str()]);
            while let Some(current) = queue.pop_front() {
                for &(next, bond_idx) in adjacency.get(current).into_iter().flatten() {
                    if bond_idx == skip || seen.contains(&next) {
                        continue;
                    }
                    if next == goal.as_str() {
                        return true;
                    }
                    seen.push(next);
                    queue.push_back(next);
                }
            }
            false
        })
        .collect()
}
