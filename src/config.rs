/// Tunables for the allocator and coordinator, read once at construction
/// and threaded through explicitly rather than read from process-wide
/// state on the hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocatorConfig {
    /// Minimum relative change (%) of `last_bwe` that triggers re-allocation.
    pub bwe_change_threshold_pct: i64,
    /// Max height (px) of thumbnail candidate layers.
    pub thumbnail_max_height: i32,
    /// Height threshold (px) defining "preferred" for a selected source.
    pub onstage_preferred_height: i32,
    /// Min frame rate admitted for selected layers above the preferred height.
    pub onstage_preferred_frame_rate: f64,
    /// Whether the bandwidth estimate is trusted at all.
    pub trust_bwe: bool,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            bwe_change_threshold_pct: 15,
            thumbnail_max_height: 180,
            onstage_preferred_height: 360,
            onstage_preferred_frame_rate: 30.0,
            trust_bwe: false,
        }
    }
}

/// Grace period after the first media packet during which the bandwidth
/// estimate is not trusted even if `trust_bwe` is set.
pub const RAMP_UP_GRACE_MS: i64 = 10_000;
