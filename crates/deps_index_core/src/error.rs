use thiserror::Error;

use crate::resource_id::ResourceId;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("Could not find {0} in the analyzed graph")]
  NotFound(ResourceId),

  #[error("Unable to resolve {id}: {reason}")]
  Unresolvable { id: ResourceId, reason: String },

  #[error("Malformed document {id}: {reason}")]
  Malformed { id: ResourceId, reason: String },

  #[error("No inline document was recorded for synthetic id {0}")]
  SyntheticLookup(ResourceId),
}
