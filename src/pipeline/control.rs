use super::PacketStage;
use crate::error::Result;
use crate::routing_table::RoutingTable;
use bytes::Bytes;
use std::sync::Arc;

/// Control-packet pipeline stage (§4.6): extracts the RTCP report's
/// destination SSRC and delegates to its controller, passing the
/// packet through unchanged when no controller owns it.
pub struct ControlPacketAdapter {
    routing: Arc<RoutingTable>,
}

impl ControlPacketAdapter {
    pub fn new(routing: Arc<RoutingTable>) -> Self {
        ControlPacketAdapter { routing }
    }

    pub fn transform(&self, packet: Vec<u8>) -> Vec<u8> {
        match parse_report_ssrc(&packet) {
            Some(ssrc) => match self.routing.get(ssrc) {
                Some(controller) => controller.rtcp_transform(packet),
                None => packet,
            },
            None => packet,
        }
    }
}

impl PacketStage for ControlPacketAdapter {
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn parse_report_ssrc(packet: &[u8]) -> Option<u32> {
    let mut buf = Bytes::copy_from_slice(packet);
    let packets = rtcp::packet::unmarshal(&mut buf).ok()?;
    packets.first()?.destination_ssrc().first().copied()
}
