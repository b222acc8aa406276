use crate::config::AllocatorConfig;
use crate::layer::Track;
use crate::rate::RateSnapshot;
use std::sync::Arc;

/// Per-video-source allocation record: the ranked candidate encodings for
/// one track and the index this cycle has chosen to forward.
#[derive(Debug, Clone)]
pub struct SourceAllocation {
    pub endpoint_id: String,
    pub fits_in_last_n: bool,
    pub selected: bool,
    pub target_ssrc: i64,
    pub max_frame_height: i32,
    pub track: Option<Arc<dyn Track>>,
    pub rates: Vec<RateSnapshot>,
    /// Highest index among `rates` the source is guaranteed to reach
    /// before lower-priority sources are upgraded past their own
    /// preferred quality. Always 0 for thumbnails (see module docs on
    /// `build_rates`).
    pub preferred_idx: i32,
    /// Currently chosen index into `rates`; -1 means "do not forward".
    pub rates_idx: i32,
}

impl SourceAllocation {
    /// Builds an empty, non-forwarding allocation for an endpoint/track
    /// pair that did not pass the last-N or track-presence gates.
    pub fn empty(endpoint_id: String, fits_in_last_n: bool, selected: bool) -> Self {
        SourceAllocation {
            endpoint_id,
            fits_in_last_n,
            selected,
            target_ssrc: -1,
            max_frame_height: 0,
            track: None,
            rates: Vec::new(),
            preferred_idx: 0,
            rates_idx: -1,
        }
    }

    /// Builds a `SourceAllocation` for one endpoint's track, ranking
    /// candidate encodings per §4.3.
    ///
    /// `preferred_idx` is only ever advanced inside the `selected` branch;
    /// for thumbnails it stays at its initial value of 0. That's
    /// intentional upstream behavior (see `improve`'s doc comment) and is
    /// preserved here rather than "fixed".
    pub fn build(
        endpoint_id: String,
        fits_in_last_n: bool,
        selected: bool,
        max_frame_height: i32,
        track: Option<Arc<dyn Track>>,
        cfg: &AllocatorConfig,
    ) -> Self {
        if !fits_in_last_n {
            return SourceAllocation::empty(endpoint_id, false, selected);
        }

        let Some(track) = track else {
            return SourceAllocation::empty(endpoint_id, true, selected);
        };

        let mut rates = Vec::new();
        let mut preferred_idx: i32 = 0;

        for layer in track.encodings() {
            if layer.height > max_frame_height {
                continue;
            }

            let include = if selected {
                layer.height < cfg.onstage_preferred_height
                    || layer.frame_rate >= cfg.onstage_preferred_frame_rate
            } else {
                layer.height <= cfg.thumbnail_max_height
            };

            if !include {
                continue;
            }

            rates.push(RateSnapshot {
                bps: layer.last_stable_bps,
                layer: layer.clone(),
            });

            if selected && layer.height <= cfg.onstage_preferred_height {
                preferred_idx = (rates.len() - 1) as i32;
            }
        }

        let target_ssrc = rates
            .first()
            .map(|r| r.layer.primary_ssrc as i64)
            .unwrap_or(-1);

        SourceAllocation {
            endpoint_id,
            fits_in_last_n: true,
            selected,
            target_ssrc,
            max_frame_height,
            track: Some(track),
            rates,
            preferred_idx,
            rates_idx: -1,
        }
    }

    /// Current chosen bitrate, or 0 if not forwarding anything.
    pub fn current_bitrate(&self) -> u64 {
        if self.rates_idx < 0 {
            0
        } else {
            self.rates
                .get(self.rates_idx as usize)
                .map(|r| r.bps)
                .unwrap_or(0)
        }
    }

    /// Advances this allocation's chosen index by at most one rung,
    /// given `remaining` bandwidth available to it this pass.
    ///
    /// Comparison asymmetry is preserved on purpose: the first-upgrade
    /// "boost" to `preferred_idx` for a selected source accepts a rate
    /// *equal to* `remaining` (`<=`), while every subsequent incremental
    /// step requires strictly *less than* `remaining` (`<`). This mirrors
    /// the source behavior this allocator is modeled on; changing it
    /// would alter which boundary bitrates get admitted at `cap == bps`.
    pub fn improve(&mut self, remaining: u64) {
        if self.rates.is_empty() {
            return;
        }

        if self.rates_idx == -1 && self.selected {
            let mut chosen: i32 = -1;
            for i in 1..self.rates.len() {
                if i as i32 > self.preferred_idx {
                    break;
                }
                if self.rates[i].bps > remaining {
                    break;
                }
                chosen = i as i32;
            }
            self.rates_idx = chosen;
            return;
        }

        let next = self.rates_idx + 1;
        if (next as usize) < self.rates.len() && self.rates[next as usize].bps < remaining {
            self.rates_idx = next;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::{EncodingLayer, SimpleTrack};

    fn layer(index: usize, height: i32, frame_rate: f64, bps: u64) -> EncodingLayer {
        EncodingLayer {
            index,
            quality_index: index as i32,
            height,
            frame_rate,
            last_stable_bps: bps,
            primary_ssrc: 1000 + index as u32,
            rtx_ssrc: None,
        }
    }

    fn ladder() -> Arc<dyn Track> {
        Arc::new(SimpleTrack {
            id: "t".to_owned(),
            encodings: vec![
                layer(0, 180, 7.5, 50_000),
                layer(1, 180, 15.0, 150_000),
                layer(2, 180, 30.0, 300_000),
                layer(3, 360, 30.0, 700_000),
                layer(4, 720, 30.0, 2_500_000),
            ],
        })
    }

    #[test]
    fn thumbnail_caps_at_configured_height() {
        let cfg = AllocatorConfig::default();
        let alloc = SourceAllocation::build(
            "a".to_owned(),
            true,
            false,
            720,
            Some(ladder()),
            &cfg,
        );
        assert_eq!(alloc.rates.len(), 3);
        assert_eq!(alloc.preferred_idx, 0);
    }

    #[test]
    fn selected_includes_full_ladder_to_preferred_plus_full_rate_above() {
        let cfg = AllocatorConfig::default();
        let alloc =
            SourceAllocation::build("a".to_owned(), true, true, 720, Some(ladder()), &cfg);
        assert_eq!(alloc.rates.len(), 5);
        // preferred height is 360 -> index 3 is the last layer at/under it.
        assert_eq!(alloc.preferred_idx, 3);
    }

    #[test]
    fn improve_boost_accepts_equal_bps_incremental_does_not() {
        let cfg = AllocatorConfig::default();
        let mut alloc =
            SourceAllocation::build("a".to_owned(), true, true, 720, Some(ladder()), &cfg);
        alloc.improve(700_000);
        assert_eq!(alloc.rates_idx, 3, "boost accepts bps == remaining");

        let mut alloc2 =
            SourceAllocation::build("a".to_owned(), true, true, 720, Some(ladder()), &cfg);
        alloc2.rates_idx = 2;
        alloc2.improve(700_000);
        assert_eq!(alloc2.rates_idx, 2, "incremental step rejects bps == remaining");
    }

    #[test]
    fn empty_track_never_forwards() {
        let cfg = AllocatorConfig::default();
        let mut alloc = SourceAllocation::build("a".to_owned(), false, false, 720, None, &cfg);
        assert!(alloc.rates.is_empty());
        alloc.improve(u64::MAX);
        assert_eq!(alloc.rates_idx, -1);
    }
}
