use crate::conference::ChangeNotifier;
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every `on_forwarded_endpoints_changed` call it receives, so
/// a test can assert on how many times the event fired and with what
/// arguments (S6's membership-change scenario).
#[derive(Default)]
pub struct MockNotifier {
    calls: Mutex<Vec<(HashSet<String>, HashSet<String>, HashSet<String>)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        MockNotifier::default()
    }

    pub fn calls(&self) -> Vec<(HashSet<String>, HashSet<String>, HashSet<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ChangeNotifier for MockNotifier {
    fn on_forwarded_endpoints_changed(
        &self,
        new_forwarded: &HashSet<String>,
        entering: &HashSet<String>,
        all_conference_endpoint_ids: &HashSet<String>,
    ) {
        self.calls.lock().unwrap().push((
            new_forwarded.clone(),
            entering.clone(),
            all_conference_endpoint_ids.clone(),
        ));
    }
}
