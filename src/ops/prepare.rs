//! Template-driven repair of a molecular graph built by distance-based bond perception.
//!
//! [`prepare_molecule`] rewrites the bonds of a parsed structure so that templated residues
//! match their reference chemistry, only genuine covalent links cross residue boundaries,
//! metals and waters become isolated ions and molecules, and no hydrogen is bonded twice.
//! Atom deletions are deferred to a single final compaction so that every earlier pass can
//! work with the indices of the residue index built at the start.

use crate::db;
use crate::model::conformer::Conformer;
use crate::model::molecule::Molecule;
use crate::model::template::Template;
use crate::model::types::{BondOrder, Element};
use crate::ops::error::Error;
use crate::ops::hydro::fix_multivalent_hydrogens;
use crate::ops::index::ResidueIndex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::{debug, debug_span, trace, warn};

/// Residue names treated as water molecules.
pub const WATER_RESIDUE_NAMES: &[&str] = &["HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "SOL"];

const PEPTIDE_CARBON: &str = "C";
const PEPTIDE_NITROGEN: &str = "N";
const NUCLEIC_O3: &str = "O3'";
const NUCLEIC_PHOSPHORUS: &str = "P";
const BACKBONE_ANCHORS: [&str; 3] = ["N", "CA", "C"];

/// Reports whether a residue name denotes water.
pub fn is_water(residue_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(&residue_name)
}

/// Named atom pair allowed to stay bonded across a residue boundary.
///
/// Links are matched in either orientation, so `(CYS, SG) - (HEM, FE)` also accepts the
/// bond seen from the heme side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidueLink {
    pub residue1: String,
    pub atom1: String,
    pub residue2: String,
    pub atom2: String,
}

impl ResidueLink {
    pub fn new(
        residue1: impl Into<String>,
        atom1: impl Into<String>,
        residue2: impl Into<String>,
        atom2: impl Into<String>,
    ) -> Self {
        Self {
            residue1: residue1.into(),
            atom1: atom1.into(),
            residue2: residue2.into(),
            atom2: atom2.into(),
        }
    }

    pub fn matches(&self, residue1: &str, atom1: &str, residue2: &str, atom2: &str) -> bool {
        let forward = self.residue1 == residue1
            && self.atom1 == atom1
            && self.residue2 == residue2
            && self.atom2 == atom2;
        let reverse = self.residue1 == residue2
            && self.atom1 == atom2
            && self.residue2 == residue1
            && self.atom2 == atom1;
        forward || reverse
    }
}

/// Options controlling [`prepare_molecule`].
///
/// The defaults realign every residue that has a template, delete waters and hydrogens, and
/// use covalent cutoffs loose enough for moderately strained crystal structures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepareConfig {
    /// Residue names eligible for template realignment. `None` allows every built-in and
    /// custom template; an empty set disables realignment.
    pub residue_whitelist: Option<HashSet<String>>,
    /// Delete water residues after their bonds are stripped.
    pub remove_waters: bool,
    /// Delete every hydrogen atom at the end of the pipeline.
    pub remove_hydrogens: bool,
    /// Residue names whose atoms are deleted outright.
    pub residue_blacklist: HashSet<String>,
    /// Delete templated residues lacking any required template atom.
    pub remove_incomplete: bool,
    /// Extra inter-residue bonds to keep.
    pub allowed_links: Vec<ResidueLink>,
    /// Atom-name pairs never bonded inside a residue that has an `N`/`CA`/`C` backbone.
    pub forbidden_backbone_pairs: Vec<(String, String)>,
    /// Maximum `C`-`N` distance (Å) for a peptide bond when 3D coordinates are present.
    pub peptide_bond_cutoff: f64,
    /// Maximum `O3'`-`P` distance (Å) for a nucleic backbone bond.
    pub nucleic_bond_cutoff: f64,
    /// Maximum S-S distance (Å) for a disulfide bridge.
    pub disulfide_bond_cutoff: f64,
    /// Caller templates, overriding built-ins of the same name.
    #[serde(skip)]
    pub custom_templates: HashMap<String, Template>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            residue_whitelist: None,
            remove_waters: true,
            remove_hydrogens: true,
            residue_blacklist: HashSet::new(),
            remove_incomplete: false,
            allowed_links: Vec::new(),
            forbidden_backbone_pairs: [("N", "C"), ("N", "O"), ("CA", "O"), ("O", "OXT")]
                .into_iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            peptide_bond_cutoff: 1.8,
            nucleic_bond_cutoff: 1.9,
            disulfide_bond_cutoff: 2.5,
            custom_templates: HashMap::new(),
        }
    }
}

impl PrepareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from TOML; missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] for malformed TOML, unknown keys, or mistyped values.
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(|e| Error::config_parse(e.to_string()))
    }

    /// Restricts realignment to the given residue names.
    pub fn whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.residue_whitelist = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn remove_waters(mut self, remove: bool) -> Self {
        self.remove_waters = remove;
        self
    }

    pub fn remove_hydrogens(mut self, remove: bool) -> Self {
        self.remove_hydrogens = remove;
        self
    }

    pub fn remove_incomplete(mut self, remove: bool) -> Self {
        self.remove_incomplete = remove;
        self
    }

    pub fn blacklist<S: Into<String>>(mut self, residue_name: S) -> Self {
        self.residue_blacklist.insert(residue_name.into());
        self
    }

    pub fn allow_link(mut self, link: ResidueLink) -> Self {
        self.allowed_links.push(link);
        self
    }

    /// Registers a caller template; it also becomes eligible under an explicit whitelist
    /// only if its name is listed there.
    pub fn add_template(mut self, template: Template) -> Self {
        self.custom_templates.insert(template.name.clone(), template);
        self
    }

    pub fn peptide_cutoff(mut self, cutoff: f64) -> Self {
        self.peptide_bond_cutoff = cutoff;
        self
    }

    pub fn nucleic_cutoff(mut self, cutoff: f64) -> Self {
        self.nucleic_bond_cutoff = cutoff;
        self
    }

    pub fn disulfide_cutoff(mut self, cutoff: f64) -> Self {
        self.disulfide_bond_cutoff = cutoff;
        self
    }

    /// Resolves the template for a residue name, preferring caller templates.
    pub fn template_for(&self, residue_name: &str) -> Option<&Template> {
        self.custom_templates
            .get(residue_name)
            .or_else(|| db::get_template(residue_name))
    }

    fn is_whitelisted(&self, residue_name: &str) -> bool {
        self.residue_whitelist
            .as_ref()
            .is_none_or(|names| names.contains(residue_name))
    }
}

/// Counts of the edits made by [`prepare_molecule`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub residues_realigned: usize,
    pub bonds_added: usize,
    pub bonds_removed: usize,
    pub bond_orders_changed: usize,
    pub metals_disconnected: usize,
    pub hydrogen_bonds_removed: usize,
    pub atoms_removed: usize,
}

impl fmt::Display for PrepareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "realigned {} residues; bonds +{} -{} ~{}; {} metals disconnected; {} hydrogen bonds removed; {} atoms removed",
            self.residues_realigned,
            self.bonds_added,
            self.bonds_removed,
            self.bond_orders_changed,
            self.metals_disconnected,
            self.hydrogen_bonds_removed,
            self.atoms_removed
        )
    }
}

/// Repairs the bonding graph of a parsed macromolecule in place.
///
/// Passes run in this order:
///
/// 1. Whitelisted residues with a template get exactly the template bonds among the atoms
///    the template names, plus the template formal charges.
/// 2. Bonds between residues are removed unless they are peptide or nucleic backbone links
///    to the next residue of the chain, disulfide bridges between template bridging atoms,
///    or configured [`ResidueLink`]s.
/// 3. Residues not realigned lose bonds between forbidden backbone name pairs.
/// 4. Metals lose all bonds and take their common oxidation state as formal charge.
/// 5. Waters lose all bonds.
/// 6. Templated residues not realigned regain missing ring bonds whose ring is otherwise
///    intact.
/// 7. Multivalent hydrogens are reduced to one bond.
/// 8. Blacklisted, incomplete (if requested), water (if requested) and hydrogen (if
///    requested) atoms are deleted.
///
/// # Arguments
///
/// * `molecule` - Molecule whose atoms all carry residue metadata.
/// * `config` - Pipeline options.
///
/// # Returns
///
/// A [`PrepareReport`] describing the edits.
///
/// # Errors
///
/// Returns [`Error::MissingResidueInfo`] before touching the molecule when an atom has no
/// residue metadata.
pub fn prepare_molecule(
    molecule: &mut Molecule,
    config: &PrepareConfig,
) -> Result<PrepareReport, Error> {
    let span = debug_span!(
        "prepare_molecule",
        atoms = molecule.atom_count(),
        bonds = molecule.bond_count()
    );
    let _guard = span.enter();

    let index = ResidueIndex::build(molecule)?;
    let templates: Vec<Option<&Template>> = index
        .iter()
        .map(|(_, key, _)| config.template_for(&key.residue_name))
        .collect();

    let mut report = PrepareReport::default();

    let realigned = realign_residues(molecule, &index, &templates, config, &mut report);
    prune_inter_residue_bonds(molecule, &index, &templates, config, &mut report);
    remove_forbidden_backbone_bonds(molecule, &index, &realigned, config, &mut report);
    disconnect_metals(molecule, &mut report);
    disconnect_waters(molecule, &index, &mut report);
    close_template_rings(molecule, &index, &templates, &realigned, &mut report);
    report.hydrogen_bonds_removed = fix_multivalent_hydrogens(molecule);
    report.atoms_removed = delete_atoms(molecule, &index, &templates, config);

    debug!(
        residues = index.len(),
        atoms = molecule.atom_count(),
        bonds = molecule.bond_count(),
        "{}",
        report
    );
    Ok(report)
}

#[derive(Debug, Default)]
struct RealignPlan {
    remove: Vec<(usize, usize)>,
    add: Vec<(usize, usize, BondOrder)>,
    reorder: Vec<(usize, usize, BondOrder)>,
    charges: Vec<(usize, i8)>,
}

impl RealignPlan {
    fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.add.is_empty()
            && self.reorder.is_empty()
            && self.charges.is_empty()
    }
}

fn plan_realignment(
    molecule: &Molecule,
    index: &ResidueIndex,
    residue: usize,
    template: &Template,
) -> RealignPlan {
    let mut plan = RealignPlan::default();
    let names = index.atom_names(molecule, residue);
    let templated: HashMap<usize, &str> = names
        .iter()
        .filter(|(name, _)| template.has_atom(name))
        .map(|(name, &idx)| (idx, name.as_str()))
        .collect();

    for (&idx, &name) in &templated {
        for neighbor in molecule.neighbors_of(idx) {
            if neighbor <= idx {
                continue;
            }
            if let Some(&other) = templated.get(&neighbor) {
                if !template.has_bond(name, other) {
                    plan.remove.push((idx, neighbor));
                }
            }
        }
        if let Some(charge) = template.atom(name).map(|a| a.formal_charge) {
            if molecule.atom(idx).is_some_and(|a| a.formal_charge != charge) {
                plan.charges.push((idx, charge));
            }
        }
    }

    for bond in template.bonds() {
        let (Some(&a), Some(&b)) = (names.get(&bond.a1), names.get(&bond.a2)) else {
            continue;
        };
        match molecule.bond_between(a, b) {
            None => plan.add.push((a, b, bond.order)),
            Some(existing) if existing.order != bond.order => {
                plan.reorder.push((a, b, bond.order))
            }
            Some(_) => {}
        }
    }

    plan.remove.sort_unstable();
    plan
}

fn realign_residues(
    molecule: &mut Molecule,
    index: &ResidueIndex,
    templates: &[Option<&Template>],
    config: &PrepareConfig,
    report: &mut PrepareReport,
) -> Vec<bool> {
    let mut realigned = vec![false; index.len()];

    for (residue, key, _) in index.iter() {
        if !config.is_whitelisted(&key.residue_name) {
            continue;
        }
        let Some(template) = templates[residue] else {
            if config.residue_whitelist.is_some() {
                debug!(residue = %key, "whitelisted residue has no template");
            }
            continue;
        };

        let plan = plan_realignment(molecule, index, residue, template);
        if !plan.is_empty() {
            trace!(
                residue = %key,
                removed = plan.remove.len(),
                added = plan.add.len(),
                reordered = plan.reorder.len(),
                "realigning residue to template"
            );
        }

        report.bonds_removed += plan.remove.len();
        report.bonds_added += plan.add.len();
        report.bond_orders_changed += plan.reorder.len();
        for (a, b) in plan.remove {
            molecule.remove_bond(a, b);
        }
        for (a, b, order) in plan.add {
            molecule.add_bond(a, b, order);
        }
        for (a, b, order) in plan.reorder {
            molecule.set_bond(a, b, order);
        }
        for (idx, charge) in plan.charges {
            if let Some(atom) = molecule.atom_mut(idx) {
                atom.formal_charge = charge;
            }
        }

        realigned[residue] = true;
        report.residues_realigned += 1;
    }

    realigned
}

enum LinkKind {
    Peptide,
    Nucleic,
}

fn backbone_link(name1: &str, name2: &str) -> Option<LinkKind> {
    match (name1, name2) {
        (PEPTIDE_CARBON, PEPTIDE_NITROGEN) => Some(LinkKind::Peptide),
        (NUCLEIC_O3, NUCLEIC_PHOSPHORUS) => Some(LinkKind::Nucleic),
        _ => None,
    }
}

fn within(conformer: Option<&Conformer>, a: usize, b: usize, cutoff: f64) -> bool {
    match conformer {
        Some(conformer) => conformer.distance(a, b).is_some_and(|d| d <= cutoff),
        None => true,
    }
}

fn is_allowed_link(
    molecule: &Molecule,
    index: &ResidueIndex,
    templates: &[Option<&Template>],
    config: &PrepareConfig,
    conformer: Option<&Conformer>,
    a: usize,
    b: usize,
) -> bool {
    let (Some(atom_a), Some(atom_b)) = (molecule.atom(a), molecule.atom(b)) else {
        return false;
    };
    let (Some(info_a), Some(info_b)) = (&atom_a.residue_info, &atom_b.residue_info) else {
        return false;
    };
    let (Some(res_a), Some(res_b)) = (index.residue_of(a), index.residue_of(b)) else {
        return false;
    };

    let ordered = if index.next_in_chain(res_a) == Some(res_b) {
        Some((info_a.atom_name.as_str(), info_b.atom_name.as_str()))
    } else if index.next_in_chain(res_b) == Some(res_a) {
        Some((info_b.atom_name.as_str(), info_a.atom_name.as_str()))
    } else {
        None
    };
    if let Some((first, second)) = ordered {
        let cutoff = match backbone_link(first, second) {
            Some(LinkKind::Peptide) => Some(config.peptide_bond_cutoff),
            Some(LinkKind::Nucleic) => Some(config.nucleic_bond_cutoff),
            None => None,
        };
        if let Some(cutoff) = cutoff {
            return within(conformer, a, b, cutoff);
        }
    }

    let bridging = |res: usize, name: &str| templates[res].is_some_and(|t| t.is_bridging(name));
    if atom_a.element == Element::S
        && atom_b.element == Element::S
        && bridging(res_a, info_a.atom_name.as_str())
        && bridging(res_b, info_b.atom_name.as_str())
    {
        return within(conformer, a, b, config.disulfide_bond_cutoff);
    }

    config.allowed_links.iter().any(|link| {
        link.matches(
            &info_a.residue_name,
            &info_a.atom_name,
            &info_b.residue_name,
            &info_b.atom_name,
        )
    })
}

fn prune_inter_residue_bonds(
    molecule: &mut Molecule,
    index: &ResidueIndex,
    templates: &[Option<&Template>],
    config: &PrepareConfig,
    report: &mut PrepareReport,
) {
    let conformer = molecule.first_3d_conformer();
    if conformer.is_none() {
        debug!("no 3D conformer; backbone and disulfide links kept without distance checks");
    }
    let doomed: Vec<(usize, usize)> = molecule
        .bonds()
        .filter(|bond| !index.same_residue(bond.a1_idx, bond.a2_idx))
        .filter(|bond| {
            !is_allowed_link(
                molecule,
                index,
                templates,
                config,
                conformer,
                bond.a1_idx,
                bond.a2_idx,
            )
        })
        .map(|bond| (bond.a1_idx, bond.a2_idx))
        .collect();

    for (a, b) in doomed {
        trace!(
            atom1 = a,
            atom2 = b,
            residue1 = ?index.residue_of(a).and_then(|r| index.key(r)).map(ToString::to_string),
            residue2 = ?index.residue_of(b).and_then(|r| index.key(r)).map(ToString::to_string),
            "removing inter-residue bond"
        );
        if molecule.remove_bond(a, b).is_some() {
            report.bonds_removed += 1;
        }
    }
}

fn remove_forbidden_backbone_bonds(
    molecule: &mut Molecule,
    index: &ResidueIndex,
    realigned: &[bool],
    config: &PrepareConfig,
    report: &mut PrepareReport,
) {
    if config.forbidden_backbone_pairs.is_empty() {
        return;
    }

    for (residue, key, _) in index.iter() {
        if realigned[residue] {
            continue;
        }
        let names = index.atom_names(molecule, residue);
        if !BACKBONE_ANCHORS.iter().all(|name| names.contains_key(*name)) {
            continue;
        }

        for (name1, name2) in &config.forbidden_backbone_pairs {
            let (Some(&a), Some(&b)) = (names.get(name1.as_str()), names.get(name2.as_str()))
            else {
                continue;
            };
            if molecule.remove_bond(a, b).is_some() {
                trace!(
                    residue = %key,
                    atom1 = %name1,
                    atom2 = %name2,
                    "removing forbidden backbone bond"
                );
                report.bonds_removed += 1;
            }
        }
    }
}

fn disconnect_metals(molecule: &mut Molecule, report: &mut PrepareReport) {
    for idx in 0..molecule.atom_count() {
        let Some(charge) = molecule
            .atom(idx)
            .and_then(|a| a.element.common_oxidation_state())
        else {
            continue;
        };

        report.bonds_removed += molecule.clear_bonds_of(idx);
        if let Some(atom) = molecule.atom_mut(idx) {
            atom.formal_charge = charge;
            atom.explicit_hydrogens = 0;
            atom.no_implicit = true;
        }
        report.metals_disconnected += 1;
    }
}

fn disconnect_waters(molecule: &mut Molecule, index: &ResidueIndex, report: &mut PrepareReport) {
    for (_, key, atoms) in index.iter() {
        if !is_water(&key.residue_name) {
            continue;
        }
        for &idx in atoms {
            report.bonds_removed += molecule.clear_bonds_of(idx);
        }
    }
}

/// Whether `start` reaches `goal` through bonds that stay inside `members`.
fn connected_within(
    molecule: &Molecule,
    members: &HashSet<usize>,
    start: usize,
    goal: usize,
) -> bool {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in molecule.neighbors_of(current) {
            if next == goal {
                return true;
            }
            if members.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

fn close_template_rings(
    molecule: &mut Molecule,
    index: &ResidueIndex,
    templates: &[Option<&Template>],
    realigned: &[bool],
    report: &mut PrepareReport,
) {
    for (residue, key, atoms) in index.iter() {
        if realigned[residue] {
            continue;
        }
        let Some(template) = templates[residue] else {
            continue;
        };
        if template.ring_bonds().next().is_none() {
            continue;
        }

        let names = index.atom_names(molecule, residue);
        let members: HashSet<usize> = atoms.iter().copied().collect();
        let mut closed = false;
        for bond in template.ring_bonds() {
            let (Some(&a), Some(&b)) = (names.get(&bond.a1), names.get(&bond.a2)) else {
                continue;
            };
            if molecule.bond_between(a, b).is_some() || !connected_within(molecule, &members, a, b)
            {
                continue;
            }
            trace!(residue = %key, atom1 = %bond.a1, atom2 = %bond.a2, "closing template ring");
            molecule.add_bond(a, b, bond.order);
            report.bonds_added += 1;
            closed = true;
        }
        if !closed {
            continue;
        }

        // A closed ring takes the template orders on every edge, never a mix.
        for bond in template.ring_bonds() {
            let (Some(&a), Some(&b)) = (names.get(&bond.a1), names.get(&bond.a2)) else {
                continue;
            };
            if molecule
                .bond_between(a, b)
                .is_some_and(|existing| existing.order != bond.order)
            {
                molecule.set_bond(a, b, bond.order);
                report.bond_orders_changed += 1;
            }
        }
    }
}

fn delete_atoms(
    molecule: &mut Molecule,
    index: &ResidueIndex,
    templates: &[Option<&Template>],
    config: &PrepareConfig,
) -> usize {
    let doomed_residues: Vec<bool> = index
        .iter()
        .map(|(residue, key, _)| {
            let name = key.residue_name.as_str();
            if config.residue_blacklist.contains(name) {
                return true;
            }
            if config.remove_waters && is_water(name) {
                return true;
            }
            if config.remove_incomplete {
                if let Some(template) = templates[residue] {
                    let names = index.atom_names(molecule, residue);
                    if let Some(missing) = template
                        .required_atoms()
                        .find(|a| !names.contains_key(&a.name))
                    {
                        warn!(residue = %key, atom = %missing.name, "removing incomplete residue");
                        return true;
                    }
                }
            }
            false
        })
        .collect();

    let remove_hydrogens = config.remove_hydrogens;
    molecule.remove_atoms(|idx, atom| {
        (remove_hydrogens && atom.is_hydrogen())
            || index
                .residue_of(idx)
                .is_some_and(|residue| doomed_residues[residue])
    })
}
