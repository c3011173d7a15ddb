use deps_index_core::DocumentGraphProvider;
use deps_index_core::DocumentRef;
use deps_index_core::ProviderError;
use deps_index_core::ResourceId;
use indexmap::IndexSet;
use tracing::instrument;

use crate::classifier::classify;
use crate::classifier::Classification;
use crate::dependency_index::DependencyIndex;
use crate::dependency_index::EntrypointWarning;
use crate::error::IndexError;
use crate::inline_cache::InlineDocumentCache;
use crate::worklist::EntrypointWorklist;

/// Drives the worklist until no new entrypoints are discovered
///
/// Entries are resolved one after the other. Lazy imports and module scripts
/// found while classifying an entry are appended to the worklist and indexed
/// later in the same loop.
pub(crate) struct DependencyIndexAssembler<'a> {
  provider: &'a dyn DocumentGraphProvider,
  worklist: EntrypointWorklist,
  inline_documents: InlineDocumentCache,
  index: DependencyIndex,
}

impl<'a> DependencyIndexAssembler<'a> {
  pub(crate) fn new(
    provider: &'a dyn DocumentGraphProvider,
    entrypoints: impl IntoIterator<Item = ResourceId>,
  ) -> Self {
    Self {
      provider,
      worklist: EntrypointWorklist::new(entrypoints),
      inline_documents: InlineDocumentCache::default(),
      index: DependencyIndex::default(),
    }
  }

  #[instrument(level = "debug", skip_all, fields(entrypoints = self.worklist.pending()))]
  pub(crate) async fn build(mut self) -> DependencyIndex {
    while let Some(entrypoint) = self.worklist.pop() {
      if let Err(error) = self.process(&entrypoint).await {
        self.report(error);
      }
    }

    tracing::debug!(
      entries = self.index.len(),
      discovered = self.worklist.discovered(),
      inline_documents = self.inline_documents.len(),
      failed = self.index.warnings().len(),
      "Built dependency index"
    );

    self.index
  }

  async fn process(&mut self, entrypoint: &ResourceId) -> Result<(), IndexError> {
    let document = self
      .resolve(entrypoint)
      .await
      .map_err(|source| IndexError::Resolution {
        entrypoint: entrypoint.clone(),
        source,
      })?;

    let Classification {
      eager_deps,
      lazy_imports,
      module_script_imports,
      ..
    } = classify(&document).map_err(|source| IndexError::Classification {
      entrypoint: entrypoint.clone(),
      source,
    })?;

    tracing::debug!(
      %entrypoint,
      eager = eager_deps.len(),
      lazy = lazy_imports.len(),
      module_scripts = module_script_imports.len(),
      "Classified entrypoint"
    );

    let mut dependencies = IndexSet::with_capacity(eager_deps.len() + 1);
    if !document.is_inline() {
      dependencies.insert(document.id().clone());
    }
    dependencies.extend(eager_deps);
    self.index.insert(entrypoint.clone(), dependencies);

    for lazy_import in lazy_imports {
      self.worklist.push(lazy_import);
    }

    for (tag, module_script) in module_script_imports {
      let id = ResourceId::synthetic(entrypoint, tag);
      self.inline_documents.insert(id.clone(), module_script);
      self.worklist.push(id);
    }

    Ok(())
  }

  fn report(&mut self, error: IndexError) {
    let entrypoint = error.entrypoint().clone();
    let message = format!("{:#}", anyhow::Error::from(error));
    tracing::warn!(%entrypoint, "{message}");
    self
      .index
      .push_warning(EntrypointWarning { entrypoint, message });
  }

  /// Synthetic entries only ever come from the inline cache
  async fn resolve(&self, entrypoint: &ResourceId) -> anyhow::Result<DocumentRef> {
    if entrypoint.is_synthetic() {
      return self
        .inline_documents
        .get(entrypoint)
        .ok_or_else(|| ProviderError::SyntheticLookup(entrypoint.clone()).into());
    }

    let analysis = self
      .provider
      .resolve(std::slice::from_ref(entrypoint))
      .await?;

    analysis.lookup(entrypoint)
  }
}

#[cfg(test)]
mod tests {
  use deps_index_core::in_memory::InMemoryDocumentGraph;
  use deps_index_core::ModuleScriptTag;
  use deps_index_core::SourceType;
  use pretty_assertions::assert_eq;

  use super::*;

  fn entry(index: &DependencyIndex, id: &ResourceId) -> Vec<String> {
    index
      .get(id)
      .unwrap()
      .iter()
      .map(|id| id.to_string())
      .collect()
  }

  #[tokio::test]
  async fn inline_entries_do_not_depend_on_themselves() {
    let graph = InMemoryDocumentGraph::builder()
      .markup("index.html", |doc| {
        doc.inline_script(SourceType::Module, |s| s.import("dep.js"))
      })
      .script("dep.js", SourceType::Module, |doc| doc)
      .build()
      .unwrap();
    let page = ResourceId::from("index.html");

    let index = DependencyIndexAssembler::new(&graph, [page.clone()])
      .build()
      .await;

    let inline = ResourceId::synthetic(&page, ModuleScriptTag::inline(1));
    assert_eq!(entry(&index, &page), vec!["index.html"]);
    assert_eq!(entry(&index, &inline), vec!["dep.js"]);
    assert!(index.warnings().is_empty());
  }

  #[tokio::test]
  async fn unknown_synthetic_entrypoints_are_reported() {
    let graph = InMemoryDocumentGraph::builder().build().unwrap();
    let synthetic = ResourceId::synthetic(
      &ResourceId::from("index.html"),
      ModuleScriptTag::external(1),
    );

    let index = DependencyIndexAssembler::new(&graph, [synthetic.clone()])
      .build()
      .await;

    assert!(index.is_empty());
    assert_eq!(
      index.warnings(),
      &[EntrypointWarning {
        entrypoint: synthetic,
        message: String::from(
          "Failed to resolve entrypoint index.html>external-module:1: \
           No inline document was recorded for synthetic id index.html>external-module:1"
        ),
      }]
    );
  }
}
