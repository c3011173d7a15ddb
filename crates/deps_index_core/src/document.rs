use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::Deserialize;
use serde::Serialize;

use crate::resource_id::ResourceId;

pub type DocumentRef = Arc<dyn Document + Send + Sync>;

bitflags! {
  /// Kind tags a parsed document carries
  #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
  pub struct DocumentKinds: u8 {
    /// An HTML document
    const MARKUP = 1 << 0;
    /// A JavaScript document
    const SCRIPT = 1 << 1;
    /// Content embedded in another document, with no address of its own
    const INLINE = 1 << 2;
  }
}

/// How a script document was parsed
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SourceType {
  #[default]
  #[serde(rename = "module")]
  Module,
  #[serde(rename = "script")]
  Script,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdgeKind {
  /// `<link rel="import">` or `<link rel="lazy-import">`
  MarkupImport,
  /// A `<script>` element, either referencing a file or carrying an inline body
  MarkupScript,
  /// A static `import` or a dynamic `import()` inside a script
  ScriptImport,
}

/// Options forwarded to every [`Document::edges`] query
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EdgeQueryOptions {
  /// Whether edges of already imported documents should be expanded recursively
  pub imported: bool,

  /// Whether edges crossing the local package boundary are included
  pub external_packages: bool,

  /// Whether edges pointing back to an ancestor on the current path are dropped
  pub exclude_backreferences: bool,
}

impl EdgeQueryOptions {
  /// The classifier walks the graph itself, so it never asks for recursive expansion.
  pub const CLASSIFIER: Self = Self {
    imported: false,
    external_packages: true,
    exclude_backreferences: true,
  };
}

/// A dependency from one document onto another
#[derive(Clone)]
pub struct ImportEdge {
  pub kind: EdgeKind,

  pub target: DocumentRef,

  /// Set by the edge's own syntax, e.g. `<link rel="lazy-import">` or `import()`
  pub is_lazy: bool,
}

impl ImportEdge {
  pub fn target_id(&self) -> &ResourceId {
    self.target.id()
  }
}

impl fmt::Debug for ImportEdge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ImportEdge")
      .field("kind", &self.kind)
      .field("target", self.target.id())
      .field("is_lazy", &self.is_lazy)
      .finish()
  }
}

/// A parsed resource as exposed by a [`crate::DocumentGraphProvider`]
pub trait Document: fmt::Debug {
  fn id(&self) -> &ResourceId;

  fn kinds(&self) -> DocumentKinds;

  /// Inline documents have no standalone address
  fn is_inline(&self) -> bool {
    self.kinds().contains(DocumentKinds::INLINE)
  }

  fn source_type(&self) -> SourceType;

  /// Outgoing edges of the given kind, in source order
  fn edges(&self, kind: EdgeKind, options: &EdgeQueryOptions) -> anyhow::Result<Vec<ImportEdge>>;
}
