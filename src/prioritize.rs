use crate::conference::Endpoint;
use crate::config::AllocatorConfig;
use crate::error::Error;
use crate::source_allocation::SourceAllocation;
use std::collections::HashSet;
use std::sync::Arc;

/// Builds the priority-ordered array of `Source Allocation`s for one
/// destination, per §4.2.
///
/// Returns an empty vec if the destination is expired/missing or the
/// conference has no (other) endpoints; the Coordinator treats an empty
/// result as an abort signal, not an error. [`prioritize_checked`] is the
/// same computation with the reason for an empty result kept as an
/// `Error`, for callers that want to log or assert on *why*.
///
/// `destination` must be the destination's own `Endpoint`; it is always
/// skipped when it appears in `endpoints`.
///
/// `endpoints` is consumed: bands 1 and 2 remove entries as they're
/// emitted (band 3 does not). Callers must pass a defensive copy of
/// whatever list they got from the `ConferenceContext`, since this
/// mutates it in place.
pub fn prioritize(
    destination: &dyn Endpoint,
    endpoints: Vec<Arc<dyn Endpoint>>,
    cfg: &AllocatorConfig,
) -> Vec<SourceAllocation> {
    prioritize_checked(destination, endpoints, cfg).unwrap_or_default()
}

/// Same as [`prioritize`], but surfaces *why* the result is empty instead
/// of silently collapsing to an empty vec. `Coordinator::update` calls
/// this directly so it can log the precondition miss before converting it
/// to `UpdateOutcome::Aborted`.
pub fn prioritize_checked(
    destination: &dyn Endpoint,
    mut endpoints: Vec<Arc<dyn Endpoint>>,
    cfg: &AllocatorConfig,
) -> Result<Vec<SourceAllocation>, Error> {
    if destination.is_expired() {
        return Err(Error::DestinationExpired);
    }

    // §4.2 defines effective last-N against |E|-1, treating E as the full
    // conference roster (destination included). The caller-supplied
    // order is conventionally just the *other* endpoints (see the
    // worked example in §4.4: conference order [A,B,C], destination X),
    // so |E|-1 collapses to this list's length as given.
    let e_len = endpoints.len() as i32;
    let effective_last_n = if destination.last_n() < 0 {
        e_len
    } else {
        destination.last_n().min(e_len)
    };

    endpoints.retain(|e| !e.is_expired() && e.id() != destination.id());
    if endpoints.is_empty() {
        return Err(Error::EmptyConference);
    }

    let selected_ids = destination.selected_endpoint_ids().clone();
    let pinned_ids = destination.pinned_endpoint_ids().clone();

    let mut out = Vec::new();
    let mut emitted_endpoint_count: i32 = 0;

    // Band 1: selected.
    let mut i = 0;
    while i < endpoints.len() {
        if emitted_endpoint_count >= effective_last_n {
            break;
        }
        if selected_ids.contains(endpoints[i].id()) {
            let ep = endpoints.remove(i);
            emit_endpoint(&mut out, &*ep, true, true, destination.max_frame_height(), cfg);
            emitted_endpoint_count += 1;
        } else {
            i += 1;
        }
    }

    // Band 2: pinned, excluding anything already emitted as selected.
    let mut i = 0;
    while i < endpoints.len() {
        if emitted_endpoint_count >= effective_last_n {
            break;
        }
        if pinned_ids.contains(endpoints[i].id()) {
            let ep = endpoints.remove(i);
            emit_endpoint(&mut out, &*ep, false, true, destination.max_frame_height(), cfg);
            emitted_endpoint_count += 1;
        } else {
            i += 1;
        }
    }

    // Band 3: everything left, in original order.
    for ep in &endpoints {
        let fits = emitted_endpoint_count < effective_last_n;
        emit_endpoint(&mut out, &**ep, false, fits, destination.max_frame_height(), cfg);
        emitted_endpoint_count += 1;
    }

    Ok(out)
}

fn emit_endpoint(
    out: &mut Vec<SourceAllocation>,
    ep: &dyn Endpoint,
    selected: bool,
    fits_in_last_n: bool,
    max_frame_height: i32,
    cfg: &AllocatorConfig,
) {
    for track in ep.video_tracks() {
        out.push(SourceAllocation::build(
            ep.id().to_owned(),
            fits_in_last_n,
            selected,
            max_frame_height,
            Some(Arc::clone(track)),
            cfg,
        ));
    }
}

/// All endpoint ids present in the conference (for the change event's
/// `all_conference` argument), excluding the destination itself.
pub fn all_endpoint_ids(endpoints: &[Arc<dyn Endpoint>], destination_id: &str) -> HashSet<String> {
    endpoints
        .iter()
        .filter(|e| e.id() != destination_id)
        .map(|e| e.id().to_owned())
        .collect()
}
