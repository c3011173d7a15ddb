use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::document::DocumentRef;
use crate::resource_id::ResourceId;

pub type AnalysisRef = Arc<dyn AnalysisResult + Send + Sync>;

/// A resolved slice of the document graph
pub trait AnalysisResult: Debug {
  /// Fails with [`crate::ProviderError::NotFound`] when the identifier is absent
  fn lookup(&self, id: &ResourceId) -> anyhow::Result<DocumentRef>;
}

/// Loads and parses resources on behalf of the dependency index
///
/// Implementations may perform I/O. Only addressable identifiers are ever passed in.
#[mockall::automock]
#[async_trait]
pub trait DocumentGraphProvider: Send + Sync {
  async fn resolve(&self, ids: &[ResourceId]) -> anyhow::Result<AnalysisRef>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::in_memory::InMemoryDocumentGraph;

  #[test]
  fn can_be_shared_as_dyn_provider() {
    let graph = InMemoryDocumentGraph::builder()
      .markup("index.html", |doc| doc)
      .build()
      .unwrap();

    let providers: Vec<Arc<dyn DocumentGraphProvider>> =
      vec![Arc::new(graph), Arc::new(MockDocumentGraphProvider::new())];

    assert_eq!(providers.len(), 2);
  }

  #[tokio::test]
  async fn mock_provider_surfaces_errors() {
    let mut provider = MockDocumentGraphProvider::new();
    provider
      .expect_resolve()
      .times(1)
      .returning(|ids| Err(anyhow::anyhow!("cannot load {}", ids[0])));

    let error = provider
      .resolve(&[ResourceId::from("missing.html")])
      .await
      .unwrap_err();

    assert_eq!(error.to_string(), "cannot load missing.html");
  }
}
