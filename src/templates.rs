//! Read-only access to residue templates.

use crate::db;
use crate::ops::Error;

pub use crate::model::template::{Template, TemplateAtom, TemplateBond, TemplateKind};

/// Looks up a built-in template by its residue name (for example `"ALA"` or `"HOH"`).
pub fn get(name: &str) -> Option<&'static Template> {
    db::get_template(name)
}

/// Names of every built-in template.
pub fn names() -> impl Iterator<Item = &'static str> {
    db::template_names()
}

/// Parses a caller-supplied template document written in the built-in TOML layout.
pub fn parse(source: &str) -> Result<Template, Error> {
    db::parse_template(source)
}
