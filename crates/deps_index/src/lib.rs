//! Transitive dependency index for HTML and JavaScript entrypoints.
//!
//! For every entrypoint, including the lazy imports and module scripts found
//! along the way, the index records the resources that have to be bundled
//! together with it. Parsing and loading documents is left to a
//! [`DocumentGraphProvider`].
use deps_index_core::DocumentGraphProvider;
use deps_index_core::ResourceId;

use crate::assembler::DependencyIndexAssembler;

mod assembler;
mod classifier;
mod dependency_index;
mod error;
mod inline_cache;
mod worklist;

pub use dependency_index::*;
pub use error::IndexError;

/// Builds the dependency index of `entrypoints` and everything they discover
///
/// Never fails: entrypoints that cannot be resolved or classified are skipped
/// and reported through [`DependencyIndex::warnings`].
pub async fn build_dependency_index(
  provider: &dyn DocumentGraphProvider,
  entrypoints: impl IntoIterator<Item = ResourceId>,
) -> DependencyIndex {
  DependencyIndexAssembler::new(provider, entrypoints)
    .build()
    .await
}
