//! Internal residue template database.
//!
//! Built-in templates are embedded at compile time, parsed once into an immutable store,
//! and handed out as `&'static` references. Caller-supplied documents go through the same
//! schema and validation.

mod loader;
mod schema;
mod store;

use crate::model::template::Template;
use crate::ops::Error;
use schema::ResidueTemplateFile;

/// Retrieves a built-in template by its exact residue name.
///
/// # Arguments
///
/// * `name` - Residue name such as `"ALA"`, `"DG"`, or `"HOH"`.
///
/// # Returns
///
/// `Some(&Template)` when the template exists, otherwise `None`.
pub fn get_template(name: &str) -> Option<&'static Template> {
    store::get_store().templates_by_name.get(name)
}

/// Iterates the names of every built-in template in load order.
pub fn template_names() -> impl Iterator<Item = &'static str> {
    store::get_store().names.iter().map(String::as_str)
}

/// Parses a template document from TOML text.
///
/// # Errors
///
/// Returns [`Error::TemplateParse`] for malformed TOML or unknown keys, and
/// [`Error::InvalidTemplate`] when the document is well-formed but inconsistent.
pub fn parse_template(source: &str) -> Result<Template, Error> {
    let schema: ResidueTemplateFile = toml::from_str(source)?;
    schema.into_template()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::TemplateKind;
    use crate::model::types::{BondOrder, Element};

    #[test]
    fn every_embedded_template_loads() {
        let names: Vec<_> = template_names().collect();

        assert_eq!(names.len(), 33);
        for name in names {
            let template = get_template(name).expect("listed template must exist");
            assert_eq!(template.name, name);
            assert!(template.atom_count() > 0);
        }
    }

    #[test]
    fn get_template_is_exact_match() {
        assert!(get_template("ALA").is_some());
        assert!(get_template("ala").is_none());
        assert!(get_template("UNK").is_none());
    }

    #[test]
    fn protein_templates_share_backbone() {
        for name in ["ALA", "GLY", "PRO", "TRP", "MSE", "SEP"] {
            let template = get_template(name).unwrap();
            assert_eq!(template.kind, TemplateKind::Protein);
            assert_eq!(template.bond("C", "O").unwrap().order, BondOrder::Double);
            assert!(template.has_bond("N", "CA"));
            assert!(template.has_bond("CA", "C"));
            assert!(template.atom("OXT").unwrap().optional);
            assert!(!template.has_bond("N", "C"));
        }
    }

    #[test]
    fn cysteine_declares_sulfur_bridge() {
        let cys = get_template("CYS").unwrap();

        assert!(cys.is_bridging("SG"));
        assert!(!get_template("MET").unwrap().is_bridging("SD"));
    }

    #[test]
    fn selenomethionine_uses_selenium() {
        let mse = get_template("MSE").unwrap();

        assert_eq!(mse.atom("SE").unwrap().element, Element::Se);
        assert!(mse.has_bond("CG", "SE"));
        assert!(mse.has_bond("SE", "CE"));
    }

    #[test]
    fn aromatic_rings_are_flagged_as_ring_bonds() {
        let phe = get_template("PHE").unwrap();

        assert_eq!(phe.ring_bonds().count(), 6);
        assert!(phe.ring_bonds().all(|b| b.order == BondOrder::Aromatic));

        let trp = get_template("TRP").unwrap();
        assert_eq!(trp.ring_bonds().count(), 10);

        let pro = get_template("PRO").unwrap();
        assert!(pro.bond("CD", "N").unwrap().in_ring);
        assert!(!pro.bond("C", "O").unwrap().in_ring);
    }

    #[test]
    fn nucleic_templates_cover_sugar_and_phosphate() {
        let rna = get_template("G").unwrap();
        let dna = get_template("DG").unwrap();

        assert_eq!(rna.kind, TemplateKind::Nucleic);
        assert!(rna.has_atom("O2'"));
        assert!(!dna.has_atom("O2'"));
        assert_eq!(rna.bond("P", "OP1").unwrap().order, BondOrder::Double);
        assert!(rna.bond("O4'", "C1'").unwrap().in_ring);
        assert!(rna.atom("P").unwrap().optional);
        assert!(!rna.atom("O3'").unwrap().optional);
        assert!(get_template("DT").unwrap().has_bond("C5", "C7"));
    }

    #[test]
    fn water_template_has_single_oxygen() {
        let hoh = get_template("HOH").unwrap();

        assert_eq!(hoh.kind, TemplateKind::Solvent);
        assert_eq!(hoh.atom_count(), 1);
        assert_eq!(hoh.bond_count(), 0);
    }

    #[test]
    fn parse_template_accepts_custom_ligand() {
        let source = r#"
            [info]
            name = "ACE"
            kind = "ligand"

            [[atoms]]
            name = "C"
            element = "C"

            [[atoms]]
            name = "O"
            element = "O"

            [[atoms]]
            name = "CH3"
            element = "C"

            [[bonds]]
            a1 = "C"
            a2 = "O"
            order = "Double"

            [[bonds]]
            a1 = "C"
            a2 = "CH3"
            order = "Single"
        "#;

        let template = parse_template(source).unwrap();

        assert_eq!(template.name, "ACE");
        assert_eq!(template.kind, TemplateKind::Ligand);
        assert_eq!(template.bond("O", "C").unwrap().order, BondOrder::Double);
    }

    #[test]
    fn parse_template_rejects_unknown_bond_atom() {
        let source = r#"
            [info]
            name = "BAD"
            kind = "ligand"

            [[atoms]]
            name = "C1"
            element = "C"

            [[bonds]]
            a1 = "C1"
            a2 = "C2"
            order = "Single"
        "#;

        let err = parse_template(source).unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate { ref name, .. } if name == "BAD"));
    }

    #[test]
    fn parse_template_rejects_unknown_keys() {
        let source = r#"
            [info]
            name = "BAD"
            kind = "ligand"
            charge = 1
        "#;

        assert!(matches!(
            parse_template(source),
            Err(Error::TemplateParse(_))
        ));
    }
}
