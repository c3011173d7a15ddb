//! A document graph held entirely in memory.
//!
//! Useful to drive the dependency index without a real HTML/JS parser, either
//! from tests through [`InMemoryDocumentGraph::builder`] or from a JSON
//! [`GraphManifest`].
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Weak;

use anyhow::anyhow;
use async_trait::async_trait;
use indexmap::IndexMap;

use crate::document::Document;
use crate::document::DocumentKinds;
use crate::document::DocumentRef;
use crate::document::EdgeKind;
use crate::document::EdgeQueryOptions;
use crate::document::ImportEdge;
use crate::document::SourceType;
use crate::error::ProviderError;
use crate::provider::AnalysisRef;
use crate::provider::AnalysisResult;
use crate::provider::DocumentGraphProvider;
use crate::resource_id::ResourceId;

mod manifest;

pub use manifest::*;

#[derive(Clone, Debug)]
pub struct InMemoryDocumentGraph {
  inner: Arc<GraphInner>,
}

#[derive(Debug)]
struct GraphInner {
  documents: IndexMap<ResourceId, Arc<MemoryDocument>>,
}

impl InMemoryDocumentGraph {
  pub fn builder() -> InMemoryGraphBuilder {
    InMemoryGraphBuilder::default()
  }

  pub fn from_json(json: &str) -> anyhow::Result<Self> {
    Self::from_manifest(GraphManifest::from_json(json)?)
  }

  pub fn from_manifest(manifest: GraphManifest) -> anyhow::Result<Self> {
    {
      let mut ids = HashSet::new();
      for document in &manifest.documents {
        if !ids.insert(document.id.as_str()) {
          return Err(anyhow!(
            "Duplicate document {} in graph manifest",
            document.id
          ));
        }
      }
    }

    let inner = Arc::new_cyclic(|graph: &Weak<GraphInner>| GraphInner {
      documents: manifest
        .documents
        .into_iter()
        .map(|document| {
          let document = MemoryDocument::from_manifest(document, graph);
          (document.id.clone(), Arc::new(document))
        })
        .collect(),
    });

    Ok(Self { inner })
  }

  pub fn document(&self, id: &ResourceId) -> Option<DocumentRef> {
    self.inner.documents.get(id).map(document_ref)
  }

  pub fn len(&self) -> usize {
    self.inner.documents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.documents.is_empty()
  }

  /// Synchronous form of [`DocumentGraphProvider::resolve`]
  pub fn analyze(&self, ids: &[ResourceId]) -> anyhow::Result<AnalysisRef> {
    for id in ids {
      if id.is_synthetic() {
        return Err(
          ProviderError::Unresolvable {
            id: id.clone(),
            reason: String::from("synthetic identifiers have no address"),
          }
          .into(),
        );
      }

      if !self.inner.documents.contains_key(id) {
        return Err(
          ProviderError::Unresolvable {
            id: id.clone(),
            reason: String::from("no document is registered under this identifier"),
          }
          .into(),
        );
      }
    }

    Ok(Arc::new(InMemoryAnalysis {
      graph: Arc::clone(&self.inner),
    }))
  }
}

#[async_trait]
impl DocumentGraphProvider for InMemoryDocumentGraph {
  async fn resolve(&self, ids: &[ResourceId]) -> anyhow::Result<AnalysisRef> {
    self.analyze(ids)
  }
}

#[derive(Debug)]
struct InMemoryAnalysis {
  graph: Arc<GraphInner>,
}

impl AnalysisResult for InMemoryAnalysis {
  fn lookup(&self, id: &ResourceId) -> anyhow::Result<DocumentRef> {
    self
      .graph
      .documents
      .get(id)
      .map(document_ref)
      .ok_or_else(|| ProviderError::NotFound(id.clone()).into())
  }
}

fn document_ref(document: &Arc<MemoryDocument>) -> DocumentRef {
  document.clone()
}

#[derive(Debug)]
enum MemoryEdgeTarget {
  Document(ResourceId),
  Inline(Arc<MemoryDocument>),
}

#[derive(Debug)]
struct MemoryEdge {
  kind: EdgeKind,
  target: MemoryEdgeTarget,
  is_lazy: bool,
}

fn import_edges(kind: EdgeKind, imports: Vec<ImportManifest>) -> impl Iterator<Item = MemoryEdge> {
  imports.into_iter().map(move |import| MemoryEdge {
    kind,
    target: MemoryEdgeTarget::Document(ResourceId::from(import.target)),
    is_lazy: import.lazy,
  })
}

#[derive(Debug)]
pub struct MemoryDocument {
  id: ResourceId,
  kinds: DocumentKinds,
  source_type: SourceType,
  malformed: bool,
  edges: Vec<MemoryEdge>,
  graph: Weak<GraphInner>,
}

impl MemoryDocument {
  fn from_manifest(manifest: DocumentManifest, graph: &Weak<GraphInner>) -> Self {
    let id = ResourceId::from(manifest.id);
    let mut edges = Vec::new();

    let kinds = match manifest.kind {
      ManifestDocumentKind::Markup => {
        for script in manifest.scripts {
          let target = match script {
            ScriptManifest::External { src } => MemoryEdgeTarget::Document(ResourceId::from(src)),
            ScriptManifest::Inline { inline } => {
              MemoryEdgeTarget::Inline(Arc::new(MemoryDocument::inline(&id, inline, graph)))
            }
          };

          edges.push(MemoryEdge {
            kind: EdgeKind::MarkupScript,
            target,
            is_lazy: false,
          });
        }

        edges.extend(import_edges(EdgeKind::MarkupImport, manifest.imports));
        DocumentKinds::MARKUP
      }
      ManifestDocumentKind::Script => {
        edges.extend(import_edges(EdgeKind::ScriptImport, manifest.imports));
        DocumentKinds::SCRIPT
      }
    };

    MemoryDocument {
      id,
      kinds,
      source_type: manifest.source_type,
      malformed: manifest.malformed,
      edges,
      graph: graph.clone(),
    }
  }

  /// Inline bodies share the identifier of the document that contains them.
  fn inline(parent: &ResourceId, manifest: InlineScriptManifest, graph: &Weak<GraphInner>) -> Self {
    MemoryDocument {
      id: parent.clone(),
      kinds: DocumentKinds::SCRIPT | DocumentKinds::INLINE,
      source_type: manifest.source_type,
      malformed: false,
      edges: import_edges(EdgeKind::ScriptImport, manifest.imports).collect(),
      graph: graph.clone(),
    }
  }
}

impl Document for MemoryDocument {
  fn id(&self) -> &ResourceId {
    &self.id
  }

  fn kinds(&self) -> DocumentKinds {
    self.kinds
  }

  fn source_type(&self) -> SourceType {
    self.source_type
  }

  /// The in-memory graph has no package boundaries and never expands imported
  /// documents, so only `exclude_backreferences` has an effect: it drops edges
  /// that point straight back at this document.
  fn edges(&self, kind: EdgeKind, options: &EdgeQueryOptions) -> anyhow::Result<Vec<ImportEdge>> {
    if self.malformed {
      return Err(
        ProviderError::Malformed {
          id: self.id.clone(),
          reason: String::from("edge data could not be read"),
        }
        .into(),
      );
    }

    let graph = self
      .graph
      .upgrade()
      .ok_or_else(|| anyhow!("Document graph owning {} was dropped", self.id))?;

    let mut edges = Vec::new();
    for edge in self.edges.iter().filter(|edge| edge.kind == kind) {
      let target = match &edge.target {
        MemoryEdgeTarget::Inline(document) => document_ref(document),
        MemoryEdgeTarget::Document(id) => {
          if options.exclude_backreferences && *id == self.id {
            continue;
          }

          graph
            .documents
            .get(id)
            .map(document_ref)
            .ok_or_else(|| ProviderError::NotFound(id.clone()))?
        }
      };

      edges.push(ImportEdge {
        kind,
        target,
        is_lazy: edge.is_lazy,
      });
    }

    Ok(edges)
  }
}

#[derive(Debug, Default)]
pub struct InMemoryGraphBuilder {
  manifest: GraphManifest,
}

impl InMemoryGraphBuilder {
  pub fn markup(self, id: &str, build: impl FnOnce(DocumentBuilder) -> DocumentBuilder) -> Self {
    let builder = build(DocumentBuilder::new(id, ManifestDocumentKind::Markup));
    self.document(builder.manifest)
  }

  pub fn script(
    self,
    id: &str,
    source_type: SourceType,
    build: impl FnOnce(DocumentBuilder) -> DocumentBuilder,
  ) -> Self {
    let mut builder = build(DocumentBuilder::new(id, ManifestDocumentKind::Script));
    builder.manifest.source_type = source_type;
    self.document(builder.manifest)
  }

  pub fn document(mut self, document: DocumentManifest) -> Self {
    self.manifest.documents.push(document);
    self
  }

  pub fn build(self) -> anyhow::Result<InMemoryDocumentGraph> {
    InMemoryDocumentGraph::from_manifest(self.manifest)
  }
}

#[derive(Debug)]
pub struct DocumentBuilder {
  manifest: DocumentManifest,
}

impl DocumentBuilder {
  fn new(id: &str, kind: ManifestDocumentKind) -> Self {
    Self {
      manifest: DocumentManifest::new(id, kind),
    }
  }

  pub fn import(mut self, target: &str) -> Self {
    self.manifest.imports.push(ImportManifest {
      target: target.to_string(),
      lazy: false,
    });
    self
  }

  pub fn lazy_import(mut self, target: &str) -> Self {
    self.manifest.imports.push(ImportManifest {
      target: target.to_string(),
      lazy: true,
    });
    self
  }

  /// `<script src="...">`
  pub fn script(mut self, src: &str) -> Self {
    self.manifest.scripts.push(ScriptManifest::External {
      src: src.to_string(),
    });
    self
  }

  /// `<script>` with an inline body
  pub fn inline_script(
    mut self,
    source_type: SourceType,
    build: impl FnOnce(InlineScriptBuilder) -> InlineScriptBuilder,
  ) -> Self {
    let builder = build(InlineScriptBuilder {
      manifest: InlineScriptManifest {
        source_type,
        imports: Vec::new(),
      },
    });
    self.manifest.scripts.push(ScriptManifest::Inline {
      inline: builder.manifest,
    });
    self
  }

  pub fn malformed(mut self) -> Self {
    self.manifest.malformed = true;
    self
  }
}

#[derive(Debug)]
pub struct InlineScriptBuilder {
  manifest: InlineScriptManifest,
}

impl InlineScriptBuilder {
  pub fn import(mut self, target: &str) -> Self {
    self.manifest.imports.push(ImportManifest {
      target: target.to_string(),
      lazy: false,
    });
    self
  }

  pub fn lazy_import(mut self, target: &str) -> Self {
    self.manifest.imports.push(ImportManifest {
      target: target.to_string(),
      lazy: true,
    });
    self
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn ids(edges: &[ImportEdge]) -> Vec<(String, bool)> {
    edges
      .iter()
      .map(|edge| (edge.target_id().to_string(), edge.is_lazy))
      .collect()
  }

  fn page_graph() -> InMemoryDocumentGraph {
    InMemoryDocumentGraph::builder()
      .markup("index.html", |doc| {
        doc
          .import("a.html")
          .lazy_import("b.html")
          .script("app.js")
          .inline_script(SourceType::Module, |s| s.import("dep.js"))
      })
      .markup("a.html", |doc| doc.import("a.html"))
      .markup("b.html", |doc| doc)
      .script("app.js", SourceType::Module, |doc| doc.import("dep.js"))
      .script("dep.js", SourceType::Module, |doc| doc)
      .build()
      .unwrap()
  }

  #[test]
  fn edges_are_filtered_by_kind() {
    let graph = page_graph();
    let index = graph.document(&ResourceId::from("index.html")).unwrap();

    let imports = index
      .edges(EdgeKind::MarkupImport, &EdgeQueryOptions::CLASSIFIER)
      .unwrap();
    assert_eq!(
      ids(&imports),
      vec![
        (String::from("a.html"), false),
        (String::from("b.html"), true)
      ]
    );

    let scripts = index
      .edges(EdgeKind::MarkupScript, &EdgeQueryOptions::CLASSIFIER)
      .unwrap();
    assert_eq!(scripts.len(), 2);
    assert!(!scripts[0].target.is_inline());
    assert_eq!(scripts[0].target_id(), &ResourceId::from("app.js"));
    assert!(scripts[1].target.is_inline());
    assert_eq!(scripts[1].target.source_type(), SourceType::Module);

    assert!(index
      .edges(EdgeKind::ScriptImport, &EdgeQueryOptions::CLASSIFIER)
      .unwrap()
      .is_empty());
  }

  #[test]
  fn inline_scripts_share_the_parent_identifier() {
    let graph = page_graph();
    let index = graph.document(&ResourceId::from("index.html")).unwrap();

    let scripts = index
      .edges(EdgeKind::MarkupScript, &EdgeQueryOptions::CLASSIFIER)
      .unwrap();
    let inline = &scripts[1].target;

    assert_eq!(inline.id(), &ResourceId::from("index.html"));
    assert_eq!(
      inline.kinds(),
      DocumentKinds::SCRIPT | DocumentKinds::INLINE
    );
    assert_eq!(
      ids(
        &inline
          .edges(EdgeKind::ScriptImport, &EdgeQueryOptions::CLASSIFIER)
          .unwrap()
      ),
      vec![(String::from("dep.js"), false)]
    );
  }

  #[test]
  fn self_references_are_dropped_when_excluding_backreferences() {
    let graph = page_graph();
    let a = graph.document(&ResourceId::from("a.html")).unwrap();

    assert!(a
      .edges(EdgeKind::MarkupImport, &EdgeQueryOptions::CLASSIFIER)
      .unwrap()
      .is_empty());
    assert_eq!(
      a.edges(EdgeKind::MarkupImport, &EdgeQueryOptions::default())
        .unwrap()
        .len(),
      1
    );
  }

  #[test]
  fn malformed_documents_fail_edge_queries() {
    let graph = InMemoryDocumentGraph::builder()
      .markup("broken.html", |doc| doc.import("a.html").malformed())
      .build()
      .unwrap();
    let broken = graph.document(&ResourceId::from("broken.html")).unwrap();

    let error = broken
      .edges(EdgeKind::MarkupImport, &EdgeQueryOptions::CLASSIFIER)
      .unwrap_err();

    assert!(matches!(
      error.downcast_ref::<ProviderError>(),
      Some(ProviderError::Malformed { .. })
    ));
  }

  #[test]
  fn edges_to_unknown_documents_fail() {
    let graph = InMemoryDocumentGraph::builder()
      .markup("index.html", |doc| doc.import("missing.html"))
      .build()
      .unwrap();
    let index = graph.document(&ResourceId::from("index.html")).unwrap();

    let error = index
      .edges(EdgeKind::MarkupImport, &EdgeQueryOptions::CLASSIFIER)
      .unwrap_err();

    assert_eq!(
      error.to_string(),
      "Could not find missing.html in the analyzed graph"
    );
  }

  #[test]
  fn duplicate_documents_are_rejected() {
    let error = InMemoryDocumentGraph::builder()
      .markup("index.html", |doc| doc)
      .markup("index.html", |doc| doc)
      .build()
      .unwrap_err();

    assert_eq!(
      error.to_string(),
      "Duplicate document index.html in graph manifest"
    );
  }

  #[tokio::test]
  async fn resolves_known_documents() {
    let graph = page_graph();

    let analysis = graph
      .resolve(&[ResourceId::from("index.html")])
      .await
      .unwrap();

    assert_eq!(
      analysis.lookup(&ResourceId::from("app.js")).unwrap().kinds(),
      DocumentKinds::SCRIPT
    );
    assert!(analysis.lookup(&ResourceId::from("nope.js")).is_err());
  }

  #[tokio::test]
  async fn refuses_unknown_and_synthetic_identifiers() {
    let graph = page_graph();
    let synthetic = ResourceId::synthetic(
      &ResourceId::from("index.html"),
      crate::ModuleScriptTag::inline(1),
    );

    assert!(graph.resolve(&[ResourceId::from("nope.html")]).await.is_err());
    assert!(graph.resolve(&[synthetic]).await.is_err());
  }

  #[test]
  fn loads_from_json() {
    let graph = InMemoryDocumentGraph::from_json(
      r#"{
        "documents": [
          { "id": "index.html", "kind": "markup", "scripts": [{ "src": "app.js" }] },
          { "id": "app.js", "kind": "script", "sourceType": "script" }
        ]
      }"#,
    )
    .unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(
      graph
        .document(&ResourceId::from("app.js"))
        .unwrap()
        .source_type(),
      SourceType::Script
    );
  }
}
