use crate::conference::{BandwidthEstimator, Transport};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// A `Transport` whose retransmission support is settable, for S4's
/// "transport without retransmission forces an unbounded cap" case.
pub struct MockTransport {
    retransmission: AtomicBool,
}

impl MockTransport {
    pub fn new(supports_retransmission: bool) -> Self {
        MockTransport {
            retransmission: AtomicBool::new(supports_retransmission),
        }
    }

    pub fn set_supports_retransmission(&self, supports: bool) {
        self.retransmission.store(supports, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    fn supports_retransmission(&self) -> bool {
        self.retransmission.load(Ordering::SeqCst)
    }
}

/// A `BandwidthEstimator` with a settable (or absent) latest estimate.
pub struct MockBandwidthEstimator {
    estimate: AtomicI64,
}

impl MockBandwidthEstimator {
    pub fn absent() -> Self {
        MockBandwidthEstimator {
            estimate: AtomicI64::new(-1),
        }
    }

    pub fn with_estimate(bps: u64) -> Self {
        MockBandwidthEstimator {
            estimate: AtomicI64::new(bps as i64),
        }
    }

    pub fn set_estimate(&self, bps: u64) {
        self.estimate.store(bps as i64, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.estimate.store(-1, Ordering::SeqCst);
    }
}

impl BandwidthEstimator for MockBandwidthEstimator {
    fn latest_estimate(&self) -> Option<u64> {
        let v = self.estimate.load(Ordering::SeqCst);
        if v < 0 {
            None
        } else {
            Some(v as u64)
        }
    }
}
