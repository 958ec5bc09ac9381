//! Error types for force field assignment.
//!
//! Errors are grouped by source: parameter file parsing, residue template
//! matching, and missing bonded parameters.

use thiserror::Error;

/// Errors that can occur while running [`parameterize`](super::parameterize).
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse a force field parameter TOML file.
    #[error("failed to parse force field parameters: {0}")]
    ParameterParse(#[from] toml::de::Error),

    /// The input system contains no atoms.
    #[error("input system is empty: at least one atom is required")]
    EmptySystem,

    /// Template matching needs atom and residue names.
    #[error("force field assignment requires residue metadata (atom and residue names)")]
    MissingMetadata,

    /// No residue template carries this residue's name.
    #[error("no residue template for '{residue}' (residue {residue_id})")]
    UnknownResidue { residue: String, residue_id: i32 },

    /// A template exists but its atoms do not line up with the residue.
    #[error("residue '{residue}' {residue_id} does not match its template: {detail}")]
    TemplateMismatch {
        residue: String,
        residue_id: i32,
        detail: String,
    },

    /// No bond or angle entry covers this combination of atom types.
    #[error("missing {kind} parameters for types {types}")]
    MissingParameter { kind: &'static str, types: String },

    /// A template or parameter entry names an atom type that is not defined.
    #[error("unknown atom type '{0}'")]
    UnknownAtomType(String),

    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond { i: usize, j: usize, detail: String },
}

impl Error {
    pub fn template_mismatch(residue: &str, residue_id: i32, detail: impl Into<String>) -> Self {
        Self::TemplateMismatch {
            residue: residue.to_string(),
            residue_id,
            detail: detail.into(),
        }
    }

    /// Creates a [`MissingParameter`](Error::MissingParameter) error, joining
    /// the type names with dashes.
    pub fn missing_parameter(kind: &'static str, types: &[&str]) -> Self {
        Self::MissingParameter {
            kind,
            types: types.join("-"),
        }
    }

    pub fn invalid_bond(i: usize, j: usize, detail: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: detail.into(),
        }
    }
}
