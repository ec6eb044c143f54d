//! Deferred resource deletion.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use strand_command::CommandList;
use strand_core::{AnyResource, ResourceId};

/// Resources waiting to be destroyed on the command timeline.
///
/// [`schedule`](Self::schedule) keeps a resource alive, de-duplicated by
/// id and in insertion order. [`flush`](Self::flush) records one
/// `destroy_resource` per pending resource into a list, so destruction is
/// ordered after every use recorded before it. The list then owns the last
/// handle and releases it when reset.
///
/// Clones share the same queue. This is the only shared mutable state in
/// the crate; every access takes the mutex once.
#[derive(Clone, Default)]
pub struct DeletionQueue {
    pending: Arc<Mutex<IndexMap<ResourceId, AnyResource>>>,
}

impl DeletionQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `resource` for destruction. Returns `false` if it was
    /// already pending.
    pub fn schedule(&self, resource: impl Into<AnyResource>) -> bool {
        let resource = resource.into();
        let mut pending = self.pending.lock();
        if pending.contains_key(&resource.id()) {
            return false;
        }
        pending.insert(resource.id(), resource);
        true
    }

    /// Whether `id` is pending.
    pub fn contains(&self, id: ResourceId) -> bool {
        self.pending.lock().contains_key(&id)
    }

    /// Number of pending resources.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Record a `destroy_resource` for every pending resource into `list`,
    /// in scheduling order, and empty the queue. Returns the number
    /// recorded.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as recording into `list`.
    pub fn flush(&self, list: &mut CommandList) -> usize {
        let drained = std::mem::take(&mut *self.pending.lock());
        let count = drained.len();
        for resource in drained.into_values() {
            list.destroy_resource(&resource);
        }
        if count > 0 {
            tracing::debug!(count, "deferred deletions flushed");
        }
        count
    }
}

impl std::fmt::Debug for DeletionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeletionQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_command::RenderCommand;
    use strand_test_utils::fixtures;

    #[test]
    fn schedule_deduplicates_by_id() {
        let queue = DeletionQueue::new();
        let buf = fixtures::vertex_buffer("vb");
        assert!(queue.schedule(buf.clone()));
        assert!(!queue.schedule(buf.clone()));
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(buf.id()));
        // Caller's handle plus the queued one.
        assert_eq!(buf.ref_count(), 2);
    }

    #[test]
    fn flush_records_in_schedule_order() {
        let queue = DeletionQueue::new();
        let a = fixtures::texture("a", 4, 4);
        let b = fixtures::vertex_buffer("b");
        let c = fixtures::sampler("c");
        queue.schedule(b.clone());
        queue.schedule(a.clone());
        queue.schedule(c.clone());

        let mut list = CommandList::default();
        assert_eq!(queue.flush(&mut list), 3);
        assert!(queue.is_empty());

        let ids: Vec<ResourceId> = list
            .commands()
            .iter()
            .map(|cmd| match cmd {
                RenderCommand::DestroyResource { resource } => resource.id(),
                other => panic!("unexpected {}", other.name()),
            })
            .collect();
        assert_eq!(ids, vec![b.id(), a.id(), c.id()]);
    }

    #[test]
    fn list_owns_last_reference_after_flush() {
        let queue = DeletionQueue::new();
        let buf = fixtures::constant_buffer("cb");
        let tracked = AnyResource::from(buf.clone());
        queue.schedule(buf);

        let mut list = CommandList::default();
        queue.flush(&mut list);
        assert_eq!(tracked.ref_count(), 2);
        list.reset();
        assert_eq!(tracked.ref_count(), 1);
    }

    #[test]
    fn clones_share_state_across_threads() {
        let queue = DeletionQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for j in 0..8 {
                        queue.schedule(fixtures::texture(&format!("t{i}_{j}"), 1, 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(queue.len(), 32);
        let mut list = CommandList::default();
        assert_eq!(queue.flush(&mut list), 32);
        assert_eq!(queue.flush(&mut list), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use strand_core::Texture;

        proptest! {
            #[test]
            fn flush_keeps_first_schedule_order_without_duplicates(
                picks in prop::collection::vec(0usize..8, 0..48),
            ) {
                let pool: Vec<Texture> = (0..8)
                    .map(|i| fixtures::texture(&format!("t{i}"), 1, 1))
                    .collect();
                let queue = DeletionQueue::new();
                let mut expected: Vec<ResourceId> = Vec::new();
                for &i in &picks {
                    let fresh = !expected.contains(&pool[i].id());
                    prop_assert_eq!(queue.schedule(pool[i].clone()), fresh);
                    if fresh {
                        expected.push(pool[i].id());
                    }
                }
                prop_assert_eq!(queue.len(), expected.len());

                let mut list = CommandList::default();
                prop_assert_eq!(queue.flush(&mut list), expected.len());
                let recorded: Vec<ResourceId> = list
                    .commands()
                    .iter()
                    .filter_map(|cmd| match cmd {
                        RenderCommand::DestroyResource { resource } => Some(resource.id()),
                        _ => None,
                    })
                    .collect();
                prop_assert_eq!(recorded, expected);
                prop_assert!(queue.is_empty());

                list.reset();
                prop_assert!(pool.iter().all(|t| t.ref_count() == 1));
            }
        }
    }
}
