use crate::error::Result;
use crate::layer::Track;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Per-source controller: owns RTP/RTCP rewriting (sequence-number and
/// timestamp continuity, RTX) for one forwarded track. The core creates
/// one per track and steers it by setting `target_idx`/`optimal_idx`;
/// the actual rewriting is out of scope (§1) and lives in the host.
pub trait SourceController: Send + Sync {
    /// Packet-admission decision for this controller's own data packets.
    fn accept(&self, packet: &[u8]) -> bool;
    /// Rewrites one incoming data packet, producing zero or more outgoing
    /// packets (e.g. a dropped packet yields zero, a padding/FEC burst
    /// could yield more than one).
    fn rtp_transform(&self, packet: Vec<u8>) -> Vec<Vec<u8>>;
    /// Rewrites one outgoing control packet.
    fn rtcp_transform(&self, packet: Vec<u8>) -> Vec<u8>;
    fn set_target_idx(&self, idx: i32);
    fn set_optimal_idx(&self, idx: i32);
    fn target_idx(&self) -> i32;
    fn optimal_idx(&self) -> i32;
    fn current_idx(&self) -> i32;
    fn source(&self) -> &Arc<dyn Track>;
    fn close(&self) -> Result<()>;
}

/// Creates a `SourceController` for a track the allocator has just picked
/// up for the first time. The Coordinator calls this at most once per
/// track, under the same lock that guards the Routing Table group-insert
/// of the new controller's SSRC family.
pub trait ControllerFactory: Send + Sync {
    fn create(&self, track: Arc<dyn Track>) -> Arc<dyn SourceController>;
}

/// A `SourceController` driven purely by atomics, the shape every real
/// controller shares for its index state. Host implementations
/// typically wrap this for the RTP/RTCP rewriting parts and delegate
/// index bookkeeping to it.
pub struct IndexState {
    target_idx: AtomicI32,
    optimal_idx: AtomicI32,
    current_idx: AtomicI32,
}

impl Default for IndexState {
    fn default() -> Self {
        IndexState {
            target_idx: AtomicI32::new(-1),
            optimal_idx: AtomicI32::new(-1),
            current_idx: AtomicI32::new(-1),
        }
    }
}

impl IndexState {
    pub fn set_target_idx(&self, idx: i32) {
        self.target_idx.store(idx, Ordering::Release);
    }

    pub fn set_optimal_idx(&self, idx: i32) {
        self.optimal_idx.store(idx, Ordering::Release);
    }

    pub fn set_current_idx(&self, idx: i32) {
        self.current_idx.store(idx, Ordering::Release);
    }

    pub fn target_idx(&self) -> i32 {
        self.target_idx.load(Ordering::Acquire)
    }

    pub fn optimal_idx(&self) -> i32 {
        self.optimal_idx.load(Ordering::Acquire)
    }

    pub fn current_idx(&self) -> i32 {
        self.current_idx.load(Ordering::Acquire)
    }
}
