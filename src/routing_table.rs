use crate::controller::SourceController;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Concurrent SSRC → controller routing table.
///
/// Readers (the data plane) are lock-free via `dashmap`'s sharded
/// internal locking. A dedicated `insert_lock` serializes the group
/// insert of one controller's full SSRC family (primary + retransmission
/// across every encoding of its track) so a racing reader never observes
/// a controller registered under only some of its SSRCs.
#[derive(Default)]
pub struct RoutingTable {
    entries: DashMap<u32, Arc<dyn SourceController>>,
    insert_lock: Mutex<()>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable {
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
        }
    }

    /// Lock-free lookup used by the admission filter and pipeline
    /// adapters on every packet.
    pub fn get(&self, ssrc: u32) -> Option<Arc<dyn SourceController>> {
        self.entries.get(&ssrc).map(|e| Arc::clone(e.value()))
    }

    /// Registers `controller` under every SSRC in `ssrcs` atomically
    /// from a reader's perspective. Insertion is idempotent: re-inserting
    /// the same SSRC just overwrites the handle.
    pub fn insert_group(&self, ssrcs: &[u32], controller: Arc<dyn SourceController>) {
        let _guard = self.insert_lock.lock().unwrap();
        for ssrc in ssrcs {
            self.entries.insert(*ssrc, Arc::clone(&controller));
        }
    }

    pub fn contains(&self, ssrc: u32) -> bool {
        self.entries.contains_key(&ssrc)
    }

    /// Snapshot of every controller currently registered, for driving
    /// them all to `target_idx = -1` on a precondition miss (§4.5 step 6).
    pub fn all_controllers(&self) -> Vec<Arc<dyn SourceController>> {
        self.entries.iter().map(|e| Arc::clone(e.value())).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
