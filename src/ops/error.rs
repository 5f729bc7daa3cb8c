use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("atom {atom_idx} carries no residue metadata")]
    MissingResidueInfo { atom_idx: usize },

    #[error("atom index {index} is out of range for a molecule with {atom_count} atoms")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },

    #[error("atom index {index} appears more than once in the selection")]
    DuplicateAtomIndex { index: usize },

    #[error("failed to parse template document: {0}")]
    TemplateParse(#[from] toml::de::Error),

    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("failed to parse preparation config: {details}")]
    ConfigParse { details: String },
}

impl Error {
    pub fn invalid_template(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn config_parse(details: impl Into<String>) -> Self {
        Self::ConfigParse {
            details: details.into(),
        }
    }
}
