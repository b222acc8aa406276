use crate::layer::Track;
use std::collections::HashSet;
use std::sync::Arc;

/// One conference participant, as seen by the allocator. Implemented by
/// the host's conference membership registry.
pub trait Endpoint: Send + Sync {
    fn id(&self) -> &str;
    fn is_expired(&self) -> bool;
    fn selected_endpoint_ids(&self) -> &HashSet<String>;
    fn pinned_endpoint_ids(&self) -> &HashSet<String>;
    /// Negative ⇒ unlimited.
    fn last_n(&self) -> i32;
    fn max_frame_height(&self) -> i32;
    fn video_tracks(&self) -> &[Arc<dyn Track>];
}

/// Conference membership, ordered by dominant-speaker recency.
pub trait ConferenceContext: Send + Sync {
    /// Index 0 = most-recent dominant speaker.
    fn endpoints_by_dominant_speaker(&self) -> Vec<Arc<dyn Endpoint>>;
}

/// Reports a retransmission-capability query against the destination's
/// transport.
pub trait Transport: Send + Sync {
    fn supports_retransmission(&self) -> bool;
}

/// The latest downlink bandwidth estimate, or `None` if unavailable.
pub trait BandwidthEstimator: Send + Sync {
    fn latest_estimate(&self) -> Option<u64>;
}

/// Delivery of the last-N change event is external to the core; this is
/// the minimum surface the Coordinator needs to emit one.
pub trait ChangeNotifier: Send + Sync {
    fn on_forwarded_endpoints_changed(
        &self,
        new_forwarded: &HashSet<String>,
        entering: &HashSet<String>,
        all_conference_endpoint_ids: &HashSet<String>,
    );
}
