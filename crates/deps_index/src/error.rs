use deps_index_core::ResourceId;
use thiserror::Error;

/// A failure scoped to a single worklist entry
///
/// These never escape [`crate::build_dependency_index`]; they are turned into
/// [`crate::EntrypointWarning`]s and the build moves on.
#[derive(Debug, Error)]
pub enum IndexError {
  #[error("Failed to resolve entrypoint {entrypoint}")]
  Resolution {
    entrypoint: ResourceId,
    #[source]
    source: anyhow::Error,
  },

  #[error("Failed to classify the dependencies of entrypoint {entrypoint}")]
  Classification {
    entrypoint: ResourceId,
    #[source]
    source: anyhow::Error,
  },
}

impl IndexError {
  pub fn entrypoint(&self) -> &ResourceId {
    match self {
      IndexError::Resolution { entrypoint, .. } => entrypoint,
      IndexError::Classification { entrypoint, .. } => entrypoint,
    }
  }
}
