//! Errors for entity documents that cannot be normalized.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The body after the header line is not YAML.
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML, but not an entity record.
    #[error("malformed entity document {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },
}

impl ParseError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Yaml { path, .. } | Self::Schema { path, .. } => path,
        }
    }
}
