use crate::controller::{ControllerFactory, IndexState, SourceController};
use crate::error::Result;
use crate::layer::Track;
use std::sync::Arc;

/// A `SourceController` that just records its index state and echoes
/// packets back unchanged, for tests that care about *which* indices
/// the Coordinator set rather than any real rewriting.
pub struct MockController {
    index: IndexState,
    track: Arc<dyn Track>,
}

impl MockController {
    pub fn new(track: Arc<dyn Track>) -> Self {
        MockController {
            index: IndexState::default(),
            track,
        }
    }
}

impl SourceController for MockController {
    fn accept(&self, _packet: &[u8]) -> bool {
        true
    }
    fn rtp_transform(&self, packet: Vec<u8>) -> Vec<Vec<u8>> {
        vec![packet]
    }
    fn rtcp_transform(&self, packet: Vec<u8>) -> Vec<u8> {
        packet
    }
    fn set_target_idx(&self, idx: i32) {
        self.index.set_target_idx(idx);
    }
    fn set_optimal_idx(&self, idx: i32) {
        self.index.set_optimal_idx(idx);
    }
    fn target_idx(&self) -> i32 {
        self.index.target_idx()
    }
    fn optimal_idx(&self) -> i32 {
        self.index.optimal_idx()
    }
    fn current_idx(&self) -> i32 {
        self.index.current_idx()
    }
    fn source(&self) -> &Arc<dyn Track> {
        &self.track
    }
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Builds a `MockController` for every new track the Coordinator picks up.
pub struct MockControllerFactory;

impl ControllerFactory for MockControllerFactory {
    fn create(&self, track: Arc<dyn Track>) -> Arc<dyn SourceController> {
        Arc::new(MockController::new(track))
    }
}
