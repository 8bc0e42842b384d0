//! Raw video frames as delivered by the frame source.

use std::sync::Arc;

/// Monotonic timestamp in nanoseconds since round start.
pub type TimestampNs = u64;

/// Device orientation hint accompanying a frame.
///
/// Forwarded verbatim to the pose detector, which may use it to rotate its
/// input; the engine itself never reinterprets pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

/// One frame pushed by the external frame source.
///
/// The pixel buffer is shared, so cloning a frame (for the thumbnail
/// snapshot) never copies image data.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub pixels: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    pub timestamp_ns: TimestampNs,
}

impl VideoFrame {
    pub fn new(
        pixels: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
        orientation: Orientation,
        timestamp_ns: TimestampNs,
    ) -> Self {
        Self {
            pixels: pixels.into(),
            width,
            height,
            orientation,
            timestamp_ns,
        }
    }

    /// Timestamp as fractional seconds since round start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}
