use std::fmt;

use crate::model::Source;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Required columns could not be resolved in a source table.
    /// Recoverable: the caller supplies a column override and re-runs.
    MissingColumns {
        source: Source,
        missing: Vec<String>,
        available: Vec<String>,
    },
    /// A column override points at a header the table does not have.
    InvalidOverride {
        source: Source,
        field: String,
        header: String,
    },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad holiday date, non-positive cap, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns { source, missing, available } => {
                write!(
                    f,
                    "{source}: missing required column(s) {}; available headers: [{}]",
                    missing.join(", "),
                    available.join(", "),
                )
            }
            Self::InvalidOverride { source, field, header } => {
                write!(f, "{source}: cannot map '{field}' to unknown header '{header}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl ReconError {
    /// Missing field names, when this is a column-resolution failure.
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            Self::MissingColumns { missing, .. } => Some(missing),
            _ => None,
        }
    }
}
