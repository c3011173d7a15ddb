//! Partitions everything a document reaches into eager dependencies, lazy
//! imports and module scripts.
//!
//! The traversal is a depth-first walk over import edges. A visit is "eager"
//! while every edge on the path from the entrypoint is non-lazy. Once a target
//! has been seen behind a lazy edge anywhere in the walk, it is lazy for the
//! rest of the walk, even along otherwise eager paths that reach it later.
//!
//! The precedence of the checks for each edge is significant and order
//! dependent:
//!
//! 1. a lazy edge marks its target lazy;
//! 2. targets already eager are skipped;
//! 3. the edge is eager only when the path is eager and the target is not lazy;
//! 4. eager targets are recorded and walked eagerly;
//! 5. non-eager targets already reached are skipped;
//! 6. other non-eager targets are recorded and walked lazily.
use deps_index_core::DocumentKinds;
use deps_index_core::DocumentRef;
use deps_index_core::EdgeKind;
use deps_index_core::EdgeQueryOptions;
use deps_index_core::ImportEdge;
use deps_index_core::ModuleScriptTag;
use deps_index_core::ResourceId;
use deps_index_core::SourceType;
use indexmap::IndexMap;
use indexmap::IndexSet;

/// Result of classifying one entrypoint
#[derive(Debug, Default)]
pub(crate) struct Classification {
  /// Everything reached from the entrypoint, lazily or not
  pub deps: IndexSet<ResourceId>,

  /// Resources that must ship in the entrypoint's own bundle
  pub eager_deps: IndexSet<ResourceId>,

  /// Targets of `<link rel="lazy-import">` or `import()` seen anywhere in the walk
  pub lazy_imports: IndexSet<ResourceId>,

  /// `<script type="module">` documents found in visited markup
  pub module_script_imports: IndexMap<ModuleScriptTag, DocumentRef>,
}

/// Classifies everything reachable from `document`
///
/// Counters for module script tags restart at 1 for every call. The walk keeps
/// its own stack, so the depth of the import graph is bounded by memory only.
pub(crate) fn classify(document: &DocumentRef) -> anyhow::Result<Classification> {
  let mut classifier = DependencyClassifier::default();
  classifier.walk(document)?;
  Ok(classifier.classification)
}

#[derive(Default)]
struct DependencyClassifier {
  classification: Classification,
  external_module_count: u32,
  inline_module_count: u32,
}

/// A document whose import edges are still being followed
struct VisitFrame {
  document: DocumentRef,
  via_eager: bool,
  pending_kinds: std::vec::IntoIter<EdgeKind>,
  edges: std::vec::IntoIter<ImportEdge>,
}

impl VisitFrame {
  /// Edge kinds are queried one at a time, once the previous kind is exhausted
  fn next_edge(&mut self) -> anyhow::Result<Option<ImportEdge>> {
    loop {
      if let Some(edge) = self.edges.next() {
        return Ok(Some(edge));
      }

      let Some(kind) = self.pending_kinds.next() else {
        return Ok(None);
      };

      self.edges = self
        .document
        .edges(kind, &EdgeQueryOptions::CLASSIFIER)?
        .into_iter();
    }
  }
}

impl DependencyClassifier {
  fn walk(&mut self, root: &DocumentRef) -> anyhow::Result<()> {
    let mut stack = vec![self.enter(root, true)?];

    while let Some(frame) = stack.last_mut() {
      let Some(edge) = frame.next_edge()? else {
        stack.pop();
        continue;
      };

      if let Some(is_eager) = self.follow(&frame.document, &edge, frame.via_eager) {
        stack.push(self.enter(&edge.target, is_eager)?);
      }
    }

    Ok(())
  }

  /// Markup documents follow their imports, script documents their module imports
  fn enter(&mut self, document: &DocumentRef, via_eager: bool) -> anyhow::Result<VisitFrame> {
    let kinds = document.kinds();
    let mut pending_kinds = Vec::with_capacity(2);

    if kinds.contains(DocumentKinds::MARKUP) {
      self.collect_module_scripts(document)?;
      pending_kinds.push(EdgeKind::MarkupImport);
    }

    if kinds.contains(DocumentKinds::SCRIPT) {
      pending_kinds.push(EdgeKind::ScriptImport);
    }

    Ok(VisitFrame {
      document: document.clone(),
      via_eager,
      pending_kinds: pending_kinds.into_iter(),
      edges: Vec::new().into_iter(),
    })
  }

  /// Module scripts are not walked here. They become entrypoints of their own.
  fn collect_module_scripts(&mut self, document: &DocumentRef) -> anyhow::Result<()> {
    let scripts = document.edges(EdgeKind::MarkupScript, &EdgeQueryOptions::CLASSIFIER)?;
    let modules = scripts
      .into_iter()
      .filter(|script| script.target.source_type() == SourceType::Module)
      .collect::<Vec<_>>();

    for script in modules.iter().filter(|script| !script.target.is_inline()) {
      self.external_module_count += 1;
      self.classification.module_script_imports.insert(
        ModuleScriptTag::external(self.external_module_count),
        script.target.clone(),
      );
    }

    for script in modules.iter().filter(|script| script.target.is_inline()) {
      self.inline_module_count += 1;
      self.classification.module_script_imports.insert(
        ModuleScriptTag::inline(self.inline_module_count),
        script.target.clone(),
      );
    }

    Ok(())
  }

  /// Records one edge and returns whether, and how, its target must be walked
  fn follow(&mut self, from: &DocumentRef, edge: &ImportEdge, via_eager: bool) -> Option<bool> {
    let target = edge.target_id().clone();
    let Classification {
      deps,
      eager_deps,
      lazy_imports,
      ..
    } = &mut self.classification;

    if edge.is_lazy {
      lazy_imports.insert(target.clone());
    }

    if eager_deps.contains(&target) {
      return None;
    }

    let is_eager = via_eager && !lazy_imports.contains(&target);
    if is_eager {
      eager_deps.insert(target.clone());
    } else if deps.contains(&target) {
      return None;
    }

    tracing::trace!(from = %from.id(), to = %target, is_eager, "Visiting import");
    deps.insert(target);
    Some(is_eager)
  }
}
