use std::collections::HashMap;

use deps_index_core::DocumentRef;
use deps_index_core::ResourceId;

/// Documents discovered under a synthetic identifier during one index build
///
/// The provider cannot load these, so the assembler keeps the document objects
/// it already received until their own worklist turn comes up.
#[derive(Debug, Default)]
pub struct InlineDocumentCache {
  documents: HashMap<ResourceId, DocumentRef>,
}

impl InlineDocumentCache {
  pub fn insert(&mut self, id: ResourceId, document: DocumentRef) {
    self.documents.insert(id, document);
  }

  pub fn get(&self, id: &ResourceId) -> Option<DocumentRef> {
    self.documents.get(id).cloned()
  }

  pub fn len(&self) -> usize {
    self.documents.len()
  }
}
