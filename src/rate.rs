use crate::layer::EncodingLayer;

/// An immutable candidate bitrate for one encoding layer, valid for the
/// lifetime of a single allocation cycle.
///
/// Holds a clone of the layer descriptor rather than a borrow: allocation
/// cycles are infrequent relative to packet handling and a handful of
/// `EncodingLayer` clones per source is cheap compared to keeping the
/// whole `Source Allocation` array lifetime-tied to the conference
/// snapshot it was built from.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub bps: u64,
    pub layer: EncodingLayer,
}
