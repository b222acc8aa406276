use crate::routing_table::RoutingTable;

/// Byte offset of the SSRC field in an RFC 3550 RTP header.
const SSRC_OFFSET: usize = 8;

/// Parses the SSRC out of a data packet's fixed RTP header (big-endian
/// u32 at byte offset 8). Returns `None` if the packet is too short to
/// contain one, since such a packet can't be a valid RTP packet either way.
pub fn parse_ssrc(packet: &[u8]) -> Option<u32> {
    let bytes = packet.get(SSRC_OFFSET..SSRC_OFFSET + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Stateless per-packet admission decision (§4.1): unknown sources are
/// dropped by default. Lookup is O(1) and lock-free for readers.
pub fn accept(routing: &RoutingTable, packet: &[u8]) -> bool {
    let Some(ssrc) = parse_ssrc(packet) else {
        return false;
    };
    match routing.get(ssrc) {
        Some(controller) => controller.accept(packet),
        None => {
            log::trace!("dropping packet for unknown ssrc {ssrc}");
            false
        }
    }
}
