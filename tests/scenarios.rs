//! Literal end-to-end scenarios (S1-S6).

use sfm_core::allocator::allocate;
use sfm_core::clock::{Clock, MockClock};
use sfm_core::config::AllocatorConfig;
use sfm_core::coordinator::{Coordinator, UpdateOutcome};
use sfm_core::layer::EncodingLayer;
use sfm_core::conference::BandwidthEstimator;
use sfm_core::mock::{
    MockBandwidthEstimator, MockConferenceContext, MockControllerFactory, MockEndpoint,
    MockNotifier, MockTrack, MockTransport,
};
use sfm_core::prioritize::prioritize;
use sfm_core::routing_table::RoutingTable;
use std::sync::Arc;

fn ladder() -> Arc<MockTrack> {
    Arc::new(MockTrack {
        id: "v0".to_owned(),
        encodings: vec![
            EncodingLayer {
                index: 0,
                quality_index: 0,
                height: 180,
                frame_rate: 7.5,
                last_stable_bps: 50_000,
                primary_ssrc: 1,
                rtx_ssrc: None,
            },
            EncodingLayer {
                index: 1,
                quality_index: 1,
                height: 180,
                frame_rate: 15.0,
                last_stable_bps: 150_000,
                primary_ssrc: 2,
                rtx_ssrc: None,
            },
            EncodingLayer {
                index: 2,
                quality_index: 2,
                height: 180,
                frame_rate: 30.0,
                last_stable_bps: 300_000,
                primary_ssrc: 3,
                rtx_ssrc: None,
            },
            EncodingLayer {
                index: 3,
                quality_index: 3,
                height: 360,
                frame_rate: 30.0,
                last_stable_bps: 700_000,
                primary_ssrc: 4,
                rtx_ssrc: None,
            },
            EncodingLayer {
                index: 4,
                quality_index: 4,
                height: 720,
                frame_rate: 30.0,
                last_stable_bps: 2_500_000,
                primary_ssrc: 5,
                rtx_ssrc: None,
            },
        ],
    })
}

fn endpoint(id: &str) -> Arc<MockEndpoint> {
    Arc::new(MockEndpoint::new(id).with_track(ladder() as Arc<dyn sfm_core::layer::Track>))
}

#[test]
fn s1_three_endpoints_one_selected_unlimited_bandwidth() {
    let cfg = AllocatorConfig::default();
    let a = endpoint("A");
    let b = endpoint("B");
    let c = endpoint("C");

    let mut dest = MockEndpoint::new("X");
    dest.selected.insert("B".to_owned());

    let mut allocations = prioritize(
        &dest,
        vec![
            a.clone() as Arc<dyn sfm_core::conference::Endpoint>,
            b.clone() as Arc<dyn sfm_core::conference::Endpoint>,
            c.clone() as Arc<dyn sfm_core::conference::Endpoint>,
        ],
        &cfg,
    );
    assert_eq!(
        allocations.iter().map(|a| a.endpoint_id.as_str()).collect::<Vec<_>>(),
        vec!["B", "A", "C"]
    );

    allocate(u64::MAX, &mut allocations);

    let b_alloc = allocations.iter().find(|a| a.endpoint_id == "B").unwrap();
    let a_alloc = allocations.iter().find(|a| a.endpoint_id == "A").unwrap();
    let c_alloc = allocations.iter().find(|a| a.endpoint_id == "C").unwrap();
    assert_eq!(b_alloc.rates_idx, 4, "selected source reaches the top of the ladder");
    assert_eq!(a_alloc.rates_idx, 2, "thumbnails cap at the last 180p rung");
    assert_eq!(c_alloc.rates_idx, 2);
    assert!(allocations.iter().all(|a| a.rates_idx > -1));
}

#[test]
fn s2_same_conference_capped_bandwidth_converges_below_cap() {
    // See the long comment on `allocator::test::s2_capped_bandwidth_converges_below_cap`
    // for why the reachable fixed point is B=L3/A=L0/C=L0 rather than the
    // spec narrative's B=L3/A=L1/C=L1 (that combination exceeds the cap).
    let cfg = AllocatorConfig::default();
    let mut dest = MockEndpoint::new("X");
    dest.selected.insert("B".to_owned());

    let mut allocations = prioritize(
        &dest,
        vec![
            endpoint("A") as Arc<dyn sfm_core::conference::Endpoint>,
            endpoint("B") as Arc<dyn sfm_core::conference::Endpoint>,
            endpoint("C") as Arc<dyn sfm_core::conference::Endpoint>,
        ],
        &cfg,
    );
    allocate(900_000, &mut allocations);

    let total: u64 = allocations.iter().map(|a| a.current_bitrate()).sum();
    assert!(total <= 900_000);
    let b_alloc = allocations.iter().find(|a| a.endpoint_id == "B").unwrap();
    assert_eq!(b_alloc.rates_idx, 3, "B boosts straight to its preferred rung");
}

/// `Coordinator::update` takes the bandwidth estimate directly as
/// `bwe_bps` (a `BandwidthEstimator` is the host's problem, consulted
/// before calling `update`). `-1` is its "absent" sentinel, matching
/// `estimator.latest_estimate() == None`.
fn bwe_bps(estimator: &dyn BandwidthEstimator) -> i64 {
    estimator.latest_estimate().map(|bps| bps as i64).unwrap_or(-1)
}

#[test]
fn s3_bandwidth_threshold_gate() {
    let coord = Coordinator::new(
        AllocatorConfig::default(),
        Arc::new(MockClock::new(0)),
        Arc::new(MockEndpoint::new("X")),
        Arc::new(MockConferenceContext::new(vec![])),
        Arc::new(MockTransport::new(true)),
        Arc::new(MockNotifier::new()),
        Arc::new(MockControllerFactory),
        Arc::new(RoutingTable::new()),
    );
    let estimator = MockBandwidthEstimator::absent();
    assert_eq!(bwe_bps(&estimator), -1);

    // First non-negative bwe always passes the gate (last_bwe starts at -1).
    estimator.set_estimate(1_000_000);
    let first = coord.update(Some(vec![]), bwe_bps(&estimator)).unwrap();
    assert_ne!(first, UpdateOutcome::NoOp);

    // 1_100_000 is a 10% change from 1_000_000, under the 15% threshold.
    estimator.set_estimate(1_100_000);
    assert_eq!(
        coord.update(Some(vec![]), bwe_bps(&estimator)).unwrap(),
        UpdateOutcome::NoOp
    );

    // 1_200_000 is a 20% change, over the threshold: it passes.
    estimator.set_estimate(1_200_000);
    let third = coord.update(Some(vec![]), bwe_bps(&estimator)).unwrap();
    assert_ne!(third, UpdateOutcome::NoOp);
}

#[test]
fn s4_ramp_up_grace_keeps_cap_unbounded() {
    let clock = Arc::new(MockClock::new(0));
    let mut cfg = AllocatorConfig::default();
    cfg.trust_bwe = true;

    let a = endpoint("A");
    let mut dest = MockEndpoint::new("X");
    dest.selected.insert("A".to_owned());

    let coord = Coordinator::new(
        cfg,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::new(dest),
        Arc::new(MockConferenceContext::new(vec![
            a as Arc<dyn sfm_core::conference::Endpoint>,
        ])),
        Arc::new(MockTransport::new(true)),
        Arc::new(MockNotifier::new()),
        Arc::new(MockControllerFactory),
        Arc::new(RoutingTable::new()),
    );

    coord.mark_first_media_received();
    clock.advance(5_000);

    // bwe present (-1 means absent; any non-negative value here stands in
    // for "the estimator has a reading"), but ramp-up grace (10s) has not
    // elapsed yet, so the cap is still unbounded and every forwarded
    // source reaches the top of its ladder.
    let outcome = coord.update(None, 500_000).unwrap();
    match outcome {
        UpdateOutcome::Applied { forwarded, .. } => assert!(forwarded.contains("A")),
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[test]
fn s5_rollback_keeps_previous_forwarded_count() {
    // Exercised directly against the allocator's private rollback
    // machinery in `allocator::test::rollback_restores_the_prior_passs_forwarded_count`,
    // since `improve`'s monotonicity makes it structurally unclear
    // whether a legitimate multi-pass `allocate` call can ever reach
    // `old_state_len > new_state_len` through normal sequential
    // per-source processing. This test instead checks the property the
    // scenario cares about observationally: a capped, generous-enough
    // two-selected-source allocation never regresses its forwarded
    // count across repeated `allocate` calls at the same cap.
    let cfg = AllocatorConfig::default();
    let mut dest = MockEndpoint::new("X");
    dest.selected.insert("P".to_owned());
    dest.selected.insert("Q".to_owned());

    let mut allocations = prioritize(
        &dest,
        vec![
            endpoint("P") as Arc<dyn sfm_core::conference::Endpoint>,
            endpoint("Q") as Arc<dyn sfm_core::conference::Endpoint>,
        ],
        &cfg,
    );
    let cap = 700_000 + 50_000;
    allocate(cap, &mut allocations);
    let forwarded_once = allocations.iter().filter(|a| a.rates_idx > -1).count();

    allocate(cap, &mut allocations);
    let forwarded_twice = allocations.iter().filter(|a| a.rates_idx > -1).count();

    assert!(forwarded_twice >= forwarded_once, "forwarded count never regresses at a stable cap");
}

#[test]
fn s6_membership_change_fires_entering_event() {
    let clock = Arc::new(MockClock::new(0));
    let mut cfg = AllocatorConfig::default();
    cfg.trust_bwe = false;

    let mut dest = MockEndpoint::new("X");
    dest.selected.insert("B".to_owned());

    let conference = Arc::new(MockConferenceContext::new(vec![
        endpoint("A") as Arc<dyn sfm_core::conference::Endpoint>
    ]));
    let notifier = Arc::new(MockNotifier::new());

    let coord = Coordinator::new(
        cfg,
        clock as Arc<dyn Clock>,
        Arc::new(dest),
        Arc::clone(&conference) as Arc<dyn sfm_core::conference::ConferenceContext>,
        Arc::new(MockTransport::new(true)),
        Arc::clone(&notifier) as Arc<dyn sfm_core::conference::ChangeNotifier>,
        Arc::new(MockControllerFactory),
        Arc::new(RoutingTable::new()),
    );

    coord.update(None, -1).unwrap();
    let calls_before = notifier.call_count();

    // B joins the conference between update calls.
    conference.set_endpoints(vec![
        endpoint("A") as Arc<dyn sfm_core::conference::Endpoint>,
        endpoint("B") as Arc<dyn sfm_core::conference::Endpoint>,
    ]);
    let outcome = coord.update(None, -1).unwrap();

    match outcome {
        UpdateOutcome::Applied { forwarded, entering } => {
            assert!(forwarded.contains("B"));
            assert!(entering.contains("B"));
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    assert!(notifier.call_count() > calls_before, "membership change fires a new event");
}
