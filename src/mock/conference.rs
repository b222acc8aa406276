use crate::conference::{ConferenceContext, Endpoint};
use crate::layer::Track;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A settable fake `Endpoint`. Every field is public so a test can poke
/// at `selected`/`pinned`/`last_n` mid-scenario (e.g. S6's membership
/// change) without going through a builder.
pub struct MockEndpoint {
    pub id: String,
    pub expired: bool,
    pub selected: HashSet<String>,
    pub pinned: HashSet<String>,
    pub last_n: i32,
    pub max_frame_height: i32,
    pub tracks: Vec<Arc<dyn Track>>,
}

impl MockEndpoint {
    pub fn new(id: impl Into<String>) -> Self {
        MockEndpoint {
            id: id.into(),
            expired: false,
            selected: HashSet::new(),
            pinned: HashSet::new(),
            last_n: -1,
            max_frame_height: 720,
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, track: Arc<dyn Track>) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn with_last_n(mut self, last_n: i32) -> Self {
        self.last_n = last_n;
        self
    }
}

impl Endpoint for MockEndpoint {
    fn id(&self) -> &str {
        &self.id
    }
    fn is_expired(&self) -> bool {
        self.expired
    }
    fn selected_endpoint_ids(&self) -> &HashSet<String> {
        &self.selected
    }
    fn pinned_endpoint_ids(&self) -> &HashSet<String> {
        &self.pinned
    }
    fn last_n(&self) -> i32 {
        self.last_n
    }
    fn max_frame_height(&self) -> i32 {
        self.max_frame_height
    }
    fn video_tracks(&self) -> &[Arc<dyn Track>] {
        &self.tracks
    }
}

/// A `ConferenceContext` whose roster can be swapped between `update`
/// calls, for scenarios like S6 where membership changes mid-test.
#[derive(Default)]
pub struct MockConferenceContext {
    endpoints: Mutex<Vec<Arc<dyn Endpoint>>>,
}

impl MockConferenceContext {
    pub fn new(endpoints: Vec<Arc<dyn Endpoint>>) -> Self {
        MockConferenceContext {
            endpoints: Mutex::new(endpoints),
        }
    }

    pub fn set_endpoints(&self, endpoints: Vec<Arc<dyn Endpoint>>) {
        *self.endpoints.lock().unwrap() = endpoints;
    }
}

impl ConferenceContext for MockConferenceContext {
    fn endpoints_by_dominant_speaker(&self) -> Vec<Arc<dyn Endpoint>> {
        self.endpoints.lock().unwrap().clone()
    }
}
