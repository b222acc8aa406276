use crate::allocator::allocate;
use crate::clock::Clock;
use crate::config::{AllocatorConfig, RAMP_UP_GRACE_MS};
use crate::conference::{ChangeNotifier, ConferenceContext, Endpoint, Transport};
use crate::controller::{ControllerFactory, SourceController};
use crate::error::Result;
use crate::layer::Track;
use crate::prioritize::{all_endpoint_ids, prioritize_checked};
use crate::routing_table::RoutingTable;
use arc_swap::ArcSwap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// The part of the Coordinator the data-packet pipeline adapter needs:
/// latching `first_media_ms` on the first packet it ever sees. Kept as
/// a narrow trait so the pipeline module doesn't need the rest of
/// `Coordinator`'s surface.
pub trait FirstMediaSink: Send + Sync {
    fn mark_first_media_received(&self);
}

/// Outcome of one `Coordinator::update` cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Threshold gate rejected the new bandwidth estimate; nothing ran.
    NoOp,
    /// Prioritization returned no allocations (destination expired or
    /// missing, or an empty conference); every known controller was
    /// driven to `target_idx = optimal_idx = -1`.
    Aborted,
    /// A full cycle ran and produced a (possibly unchanged) forwarded set.
    Applied {
        forwarded: HashSet<String>,
        entering: HashSet<String>,
    },
}

/// Drives the allocation update cycle of §4.5: owns the Routing Table,
/// the active-controller list the pacer reads, and the bookkeeping
/// (`last_bwe`, `first_media_ms`, `forwarded_endpoint_ids`) that gates
/// and shapes each cycle.
pub struct Coordinator {
    cfg: AllocatorConfig,
    clock: Arc<dyn Clock>,
    destination: Arc<dyn Endpoint>,
    conference: Arc<dyn ConferenceContext>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn ChangeNotifier>,
    factory: Arc<dyn ControllerFactory>,
    routing: Arc<RoutingTable>,
    active_controllers: ArcSwap<Vec<Arc<dyn SourceController>>>,
    track_controllers: Mutex<HashMap<String, Arc<dyn SourceController>>>,
    last_bwe: AtomicI64,
    first_media_ms: AtomicI64,
    forwarded_endpoint_ids: Mutex<HashSet<String>>,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: AllocatorConfig,
        clock: Arc<dyn Clock>,
        destination: Arc<dyn Endpoint>,
        conference: Arc<dyn ConferenceContext>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn ChangeNotifier>,
        factory: Arc<dyn ControllerFactory>,
        routing: Arc<RoutingTable>,
    ) -> Self {
        Coordinator {
            cfg,
            clock,
            destination,
            conference,
            transport,
            notifier,
            factory,
            routing,
            active_controllers: ArcSwap::from_pointee(Vec::new()),
            track_controllers: Mutex::new(HashMap::new()),
            last_bwe: AtomicI64::new(-1),
            first_media_ms: AtomicI64::new(-1),
            forwarded_endpoint_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of the currently active controllers, for the pacer/prober.
    pub fn active_controllers(&self) -> Arc<Vec<Arc<dyn SourceController>>> {
        self.active_controllers.load_full()
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing
    }

    /// Latches `first_media_ms` on the first call; every later call is a
    /// no-op. Safe to call from the data-plane thread.
    pub fn mark_first_media_received(&self) {
        let now = self.clock.now_ms();
        let _ = self
            .first_media_ms
            .compare_exchange(-1, now, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Runs one update cycle (§4.5).
    pub fn update(
        &self,
        endpoint_order: Option<Vec<Arc<dyn Endpoint>>>,
        bwe_bps: i64,
    ) -> Result<UpdateOutcome> {
        if bwe_bps >= 0 {
            let last = self.last_bwe.load(Ordering::Acquire);
            let threshold = last * self.cfg.bwe_change_threshold_pct / 100;
            let diff = (last - bwe_bps).abs();
            if diff < threshold {
                log::debug!("bwe change {diff} below threshold {threshold}, no-op");
                return Ok(UpdateOutcome::NoOp);
            }
            self.last_bwe.store(bwe_bps, Ordering::Release);
        }

        let endpoints = match endpoint_order {
            Some(list) => list,
            None => self.conference.endpoints_by_dominant_speaker(),
        };
        let all_conference_ids = all_endpoint_ids(&endpoints, self.destination.id());

        let cap = self.effective_cap(bwe_bps);
        let mut allocations = match prioritize_checked(&*self.destination, endpoints, &self.cfg) {
            Ok(allocations) => allocations,
            Err(err) => {
                log::debug!("update aborted: {err}");
                self.abort(&all_conference_ids);
                return Ok(UpdateOutcome::Aborted);
            }
        };
        allocate(cap, &mut allocations);

        if allocations.is_empty() {
            log::debug!("update aborted: prioritization produced no allocations");
            self.abort(&all_conference_ids);
            return Ok(UpdateOutcome::Aborted);
        }

        let previous_forwarded = self.forwarded_endpoint_ids.lock().unwrap().clone();
        let mut new_forwarded = HashSet::new();
        let mut entering = HashSet::new();
        let mut new_active = Vec::with_capacity(allocations.len());

        for alloc in &allocations {
            let Some(track) = alloc.track.as_ref() else {
                continue;
            };
            let controller = self.controller_for(track);

            let target_idx = alloc.rates_idx;
            let optimal_idx = if alloc.rates.is_empty() {
                -1
            } else {
                (alloc.rates.len() - 1) as i32
            };
            controller.set_target_idx(target_idx);
            controller.set_optimal_idx(optimal_idx);

            let target_bps = if target_idx >= 0 {
                alloc.rates[target_idx as usize].bps
            } else {
                0
            };
            let optimal_bps = alloc.rates.last().map(|r| r.bps).unwrap_or(0);
            crate::stats::emit_qot(
                self.clock.now_ms(),
                &alloc.endpoint_id,
                track.id(),
                &*controller,
                target_bps,
                optimal_bps,
            );

            new_active.push(Arc::clone(&controller));

            if target_idx > -1 {
                new_forwarded.insert(alloc.endpoint_id.clone());
                if !previous_forwarded.contains(&alloc.endpoint_id) {
                    entering.insert(alloc.endpoint_id.clone());
                }
            }
        }

        self.active_controllers.store(Arc::new(new_active));

        if new_forwarded != previous_forwarded {
            self.notifier
                .on_forwarded_endpoints_changed(&new_forwarded, &entering, &all_conference_ids);
        }
        *self.forwarded_endpoint_ids.lock().unwrap() = new_forwarded.clone();

        Ok(UpdateOutcome::Applied {
            forwarded: new_forwarded,
            entering,
        })
    }

    /// Drives every known controller to `target_idx = optimal_idx = -1`
    /// and clears the active-controller list and forwarded set, firing a
    /// change event if the forwarded set was non-empty (§4.5 step 6).
    fn abort(&self, all_conference_ids: &HashSet<String>) {
        for controller in self.routing.all_controllers() {
            controller.set_target_idx(-1);
            controller.set_optimal_idx(-1);
        }
        self.active_controllers.store(Arc::new(Vec::new()));
        let previous = std::mem::take(&mut *self.forwarded_endpoint_ids.lock().unwrap());
        if !previous.is_empty() {
            self.notifier.on_forwarded_endpoints_changed(
                &HashSet::new(),
                &HashSet::new(),
                all_conference_ids,
            );
        }
    }

    /// Looks up the controller already bound to `track`, or creates one
    /// and group-inserts every SSRC of every encoding under the same
    /// lock (§4.5 step 5, §9 "grouped insert must be atomic from the
    /// reader's perspective").
    fn controller_for(&self, track: &Arc<dyn Track>) -> Arc<dyn SourceController> {
        let mut guard = self.track_controllers.lock().unwrap();
        if let Some(existing) = guard.get(track.id()) {
            return Arc::clone(existing);
        }
        let controller = self.factory.create(Arc::clone(track));
        let ssrcs = track_ssrcs(track);
        self.routing.insert_group(&ssrcs, Arc::clone(&controller));
        guard.insert(track.id().to_owned(), Arc::clone(&controller));
        controller
    }

    fn effective_cap(&self, bwe_bps: i64) -> u64 {
        let estimator_available = bwe_bps >= 0;
        if estimator_available
            && self.cfg.trust_bwe
            && self.ramp_up_grace_elapsed()
            && self.transport.supports_retransmission()
        {
            bwe_bps as u64
        } else {
            u64::MAX
        }
    }

    fn ramp_up_grace_elapsed(&self) -> bool {
        let first = self.first_media_ms.load(Ordering::Acquire);
        first != -1 && self.clock.now_ms() - first >= RAMP_UP_GRACE_MS
    }
}

impl FirstMediaSink for Coordinator {
    fn mark_first_media_received(&self) {
        Coordinator::mark_first_media_received(self);
    }
}

fn track_ssrcs(track: &Arc<dyn Track>) -> Vec<u32> {
    let mut ssrcs = Vec::new();
    for layer in track.encodings() {
        ssrcs.push(layer.primary_ssrc);
        if let Some(rtx) = layer.rtx_ssrc {
            ssrcs.push(rtx);
        }
    }
    ssrcs
}
