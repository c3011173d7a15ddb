use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::Serializer;

/// Separates a synthetic identifier from the identifier of its parent
pub const SYNTHETIC_SEPARATOR: char = '>';

/// The two disjoint families of module scripts a markup document can carry
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ModuleScriptGroup {
  /// `<script type="module" src="...">`
  External,
  /// `<script type="module">...</script>`
  Inline,
}

impl ModuleScriptGroup {
  pub fn tag(&self) -> &'static str {
    match self {
      ModuleScriptGroup::External => "external-module",
      ModuleScriptGroup::Inline => "inline-module",
    }
  }
}

/// Locally unique name of a module script within the traversal that found it
///
/// Counters start at 1 and are assigned per group in discovery order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModuleScriptTag {
  pub group: ModuleScriptGroup,
  pub counter: u32,
}

impl ModuleScriptTag {
  pub fn external(counter: u32) -> Self {
    Self {
      group: ModuleScriptGroup::External,
      counter,
    }
  }

  pub fn inline(counter: u32) -> Self {
    Self {
      group: ModuleScriptGroup::Inline,
      counter,
    }
  }
}

impl fmt::Display for ModuleScriptTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.group.tag(), self.counter)
  }
}

/// Canonical name of a resource in the document graph
///
/// Addressable identifiers can be handed to a [`crate::DocumentGraphProvider`].
/// Synthetic identifiers name content that only exists inside a parent resource
/// (for example an inline module script) and are never resolved through the
/// provider.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResourceId {
  Addressable(Arc<str>),
  Synthetic {
    parent: Arc<ResourceId>,
    tag: ModuleScriptTag,
  },
}

impl ResourceId {
  pub fn addressable(url: impl Into<Arc<str>>) -> Self {
    ResourceId::Addressable(url.into())
  }

  pub fn synthetic(parent: &ResourceId, tag: ModuleScriptTag) -> Self {
    ResourceId::Synthetic {
      parent: Arc::new(parent.clone()),
      tag,
    }
  }

  pub fn is_synthetic(&self) -> bool {
    matches!(self, ResourceId::Synthetic { .. })
  }

  pub fn as_addressable(&self) -> Option<&str> {
    match self {
      ResourceId::Addressable(url) => Some(url.as_ref()),
      ResourceId::Synthetic { .. } => None,
    }
  }

  /// The resource this synthetic identifier was discovered in
  pub fn parent(&self) -> Option<&ResourceId> {
    match self {
      ResourceId::Addressable(_) => None,
      ResourceId::Synthetic { parent, .. } => Some(parent.as_ref()),
    }
  }

  pub fn tag(&self) -> Option<ModuleScriptTag> {
    match self {
      ResourceId::Addressable(_) => None,
      ResourceId::Synthetic { tag, .. } => Some(*tag),
    }
  }

  /// The outermost addressable ancestor of this identifier
  pub fn root(&self) -> &ResourceId {
    let mut current = self;
    while let Some(parent) = current.parent() {
      current = parent;
    }
    current
  }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResourceId::Addressable(url) => f.write_str(url),
      ResourceId::Synthetic { parent, tag } => {
        write!(f, "{}{}{}", parent, SYNTHETIC_SEPARATOR, tag)
      }
    }
  }
}

impl From<&str> for ResourceId {
  fn from(url: &str) -> Self {
    ResourceId::addressable(url)
  }
}

impl From<String> for ResourceId {
  fn from(url: String) -> Self {
    ResourceId::addressable(url)
  }
}

impl Serialize for ResourceId {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}
