/// One simulcast/SVC encoding layer of a video source track.
///
/// Layers of one source are totally ordered by `index`; higher indices
/// depend on all lower indices for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingLayer {
    /// Position in the source's layer ladder, ascending quality.
    pub index: usize,
    /// Subjective quality index, monotone with quality.
    pub quality_index: i32,
    /// Frame height in pixels.
    pub height: i32,
    /// Frame rate in frames per second.
    pub frame_rate: f64,
    /// Last-stable bitrate in bits/s.
    pub last_stable_bps: u64,
    /// Primary SSRC of this layer.
    pub primary_ssrc: u32,
    /// Retransmission SSRC of this layer, if any.
    pub rtx_ssrc: Option<u32>,
}

/// A source track: the ordered array of encoding layers one endpoint
/// advertises for one camera.
///
/// Implemented by the host; the core only ever holds `Arc<dyn Track>`
/// and never mutates it.
pub trait Track: Send + Sync {
    /// Stable identifier for this track, independent of its endpoint.
    fn id(&self) -> &str;
    /// Layers in ascending index order.
    fn encodings(&self) -> &[EncodingLayer];
}

/// A plain in-memory `Track`, the shape every non-mock caller will use.
#[derive(Debug, Clone)]
pub struct SimpleTrack {
    pub id: String,
    pub encodings: Vec<EncodingLayer>,
}

impl Track for SimpleTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn encodings(&self) -> &[EncodingLayer] {
        &self.encodings
    }
}
