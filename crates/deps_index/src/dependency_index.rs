use deps_index_core::ResourceId;
use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;

/// Maps each entrypoint to the resources that must ship with it
///
/// Entries keep the order in which the worklist processed them. Serializes as a
/// plain JSON object keyed by the display form of each entrypoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyIndex {
  entries: IndexMap<ResourceId, IndexSet<ResourceId>>,
  warnings: Vec<EntrypointWarning>,
}

/// An entrypoint that was skipped because it could not be indexed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntrypointWarning {
  pub entrypoint: ResourceId,
  pub message: String,
}

impl DependencyIndex {
  pub fn get(&self, entrypoint: &ResourceId) -> Option<&IndexSet<ResourceId>> {
    self.entries.get(entrypoint)
  }

  pub fn contains(&self, entrypoint: &ResourceId) -> bool {
    self.entries.contains_key(entrypoint)
  }

  pub fn entrypoints(&self) -> impl Iterator<Item = &ResourceId> {
    self.entries.keys()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &IndexSet<ResourceId>)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entrypoints that failed, in the order they were attempted
  pub fn warnings(&self) -> &[EntrypointWarning] {
    &self.warnings
  }

  pub(crate) fn insert(&mut self, entrypoint: ResourceId, dependencies: IndexSet<ResourceId>) {
    self.entries.insert(entrypoint, dependencies);
  }

  pub(crate) fn push_warning(&mut self, warning: EntrypointWarning) {
    self.warnings.push(warning);
  }
}

/// Keys are the display form of each entrypoint. An addressable identifier that
/// spells out a synthetic one (`index.html>inline-module:1`) renders the same
/// key, so a JSON reader keeps only the last of the two entries. Use
/// [`DependencyIndex::iter`] when both may be present.
impl Serialize for DependencyIndex {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (entrypoint, dependencies) in &self.entries {
      map.serialize_entry(entrypoint, dependencies)?;
    }
    map.end()
  }
}
