//! Observability events (§6): one `qot` record per forwarded source on
//! each allocation cycle, emitted only when `log`'s debug level is
//! enabled for this crate.

use crate::controller::SourceController;
use log::Level;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Emits `qot,<t_ms>,<stream_hash>,<source_hash>,<current_idx>,<target_idx>,<optimal_idx>,<target_bps>,<optimal_bps>`.
///
/// Ids are hashed rather than logged verbatim: the format is a stable
/// per-stream record, not a human-readable trace, and callers may not
/// want endpoint/track ids in plaintext logs.
pub fn emit_qot(
    now_ms: i64,
    stream_id: &str,
    source_id: &str,
    controller: &dyn SourceController,
    target_bps: u64,
    optimal_bps: u64,
) {
    if !log::log_enabled!(Level::Debug) {
        return;
    }
    log::debug!(
        "qot,{},{},{},{},{},{},{},{}",
        now_ms,
        hash_id(stream_id),
        hash_id(source_id),
        controller.current_idx(),
        controller.target_idx(),
        controller.optimal_idx(),
        target_bps,
        optimal_bps,
    );
}

fn hash_id(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}
