use super::PacketStage;
use crate::admission::parse_ssrc;
use crate::coordinator::FirstMediaSink;
use crate::error::{flatten_close_errors, Result};
use crate::routing_table::RoutingTable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Data-packet pipeline stage (§4.6): looks up each packet's controller
/// by SSRC and delegates rewriting to it. A dropped packet becomes
/// `None` in the output rather than being removed, so the batch stays
/// index-aligned with its input.
pub struct DataPacketAdapter {
    routing: Arc<RoutingTable>,
    first_media: Arc<dyn FirstMediaSink>,
    first_packet_seen: AtomicBool,
}

impl DataPacketAdapter {
    pub fn new(routing: Arc<RoutingTable>, first_media: Arc<dyn FirstMediaSink>) -> Self {
        DataPacketAdapter {
            routing,
            first_media,
            first_packet_seen: AtomicBool::new(false),
        }
    }

    /// Rewrites one batch of data packets in place. Any controller
    /// producing more than one output packet has its extras appended
    /// to the tail of the batch, after the index-aligned slots.
    pub fn transform(&self, packets: Vec<Option<Vec<u8>>>) -> Vec<Option<Vec<u8>>> {
        if !self.first_packet_seen.swap(true, Ordering::AcqRel) {
            self.first_media.mark_first_media_received();
        }

        let mut out = Vec::with_capacity(packets.len());
        let mut extras = Vec::new();

        for slot in packets {
            let Some(packet) = slot else {
                out.push(None);
                continue;
            };
            let Some(ssrc) = parse_ssrc(&packet) else {
                out.push(None);
                continue;
            };
            match self.routing.get(ssrc) {
                Some(controller) => {
                    let mut rewritten = controller.rtp_transform(packet);
                    if rewritten.is_empty() {
                        out.push(None);
                    } else {
                        out.push(Some(rewritten.remove(0)));
                        extras.extend(rewritten.into_iter().map(Some));
                    }
                }
                None => out.push(None),
            }
        }

        out.extend(extras);
        out
    }
}

impl PacketStage for DataPacketAdapter {
    /// Tears down every known controller. No single controller's close
    /// failure blocks the rest (§4.6, §7); their errors are collected and
    /// flattened into one, rather than only the first one winning.
    fn close(&self) -> Result<()> {
        let errs: Vec<_> = self
            .routing
            .all_controllers()
            .into_iter()
            .filter_map(|controller| controller.close().err())
            .collect();
        flatten_close_errors(errs)
    }
}
