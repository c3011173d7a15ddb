use std::collections::HashSet;
use std::collections::VecDeque;

use deps_index_core::ResourceId;

/// FIFO frontier of entrypoints still to be indexed
///
/// Every identifier is handed out at most once, no matter how often it is pushed.
#[derive(Debug, Default)]
pub struct EntrypointWorklist {
  queue: VecDeque<ResourceId>,
  seen: HashSet<ResourceId>,
}

impl EntrypointWorklist {
  pub fn new(entrypoints: impl IntoIterator<Item = ResourceId>) -> Self {
    let mut worklist = Self::default();
    for entrypoint in entrypoints {
      worklist.push(entrypoint);
    }
    worklist
  }

  /// Returns false when the identifier was already queued or processed
  pub fn push(&mut self, entrypoint: ResourceId) -> bool {
    if !self.seen.insert(entrypoint.clone()) {
      return false;
    }

    self.queue.push_back(entrypoint);
    true
  }

  pub fn pop(&mut self) -> Option<ResourceId> {
    self.queue.pop_front()
  }

  /// Entries still waiting to be processed
  pub fn pending(&self) -> usize {
    self.queue.len()
  }

  /// Every entrypoint ever added
  pub fn discovered(&self) -> usize {
    self.seen.len()
  }
}
