//! The sliding window of encoded frames.

use std::collections::VecDeque;

use matchpose_pose_model::encoded::{EncodedFrame, WindowTensor, VALUES_PER_JOINT};

/// Bounded FIFO of encoded frames with stride-batched eviction.
///
/// `append` signals *window ready* when the push brings the length to
/// exactly the capacity W; the next push overflows the window and removes
/// the S oldest entries in a single batch. The resulting stepped advance
/// (ready every S frames after the first W) is the intended policy, not a
/// per-frame slide.
///
/// Single producer: the window is owned exclusively by the frame pipeline
/// and is never mutated from outside it.
#[derive(Debug)]
pub struct FrameWindow {
    frames: VecDeque<EncodedFrame>,
    capacity: usize,
    stride: usize,
}

impl FrameWindow {
    /// Create a window with capacity W and eviction stride S.
    pub fn new(capacity: usize, stride: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
            stride,
        }
    }

    /// Push a frame; returns true when the window just became ready.
    pub fn append(&mut self, frame: EncodedFrame) -> bool {
        self.frames.push_back(frame);

        let ready = self.frames.len() == self.capacity;

        if self.frames.len() > self.capacity {
            // One batched removal of the S oldest entries, not S
            // single-frame slides.
            let evict = self.stride.min(self.frames.len());
            self.frames.drain(..evict);
            tracing::trace!(evicted = evict, len = self.frames.len(), "Window evicted batch");
        }

        ready
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all buffered frames (round reset).
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Oldest-first iteration, for inspection and tests.
    pub fn iter(&self) -> impl Iterator<Item = &EncodedFrame> {
        self.frames.iter()
    }

    /// Concatenate the buffered frames, oldest first, into one tensor.
    pub fn to_tensor(&self) -> WindowTensor {
        let frame_len = self.frames.front().map(|f| f.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(self.frames.len() * frame_len);
        for frame in &self.frames {
            data.extend_from_slice(frame.as_slice());
        }
        let joints = frame_len / VALUES_PER_JOINT;
        WindowTensor::new(data, self.frames.len(), joints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 90;
    const S: usize = 10;

    /// A frame whose first value tags its insertion index.
    fn tagged_frame(tag: usize) -> EncodedFrame {
        let mut values = vec![0.0; 6];
        values[0] = tag as f32;
        EncodedFrame::new(values)
    }

    fn first_tag(window: &FrameWindow) -> usize {
        window.iter().next().unwrap().as_slice()[0] as usize
    }

    #[test]
    fn test_fill_to_capacity_signals_ready_exactly_once() {
        let mut window = FrameWindow::new(W, S);
        let mut ready_signals = 0;
        for i in 0..W {
            if window.append(tagged_frame(i)) {
                ready_signals += 1;
            }
        }
        assert_eq!(ready_signals, 1);
        assert_eq!(window.len(), W);
    }

    #[test]
    fn test_overflow_evicts_stride_in_one_batch() {
        let mut window = FrameWindow::new(W, S);
        for i in 0..W {
            window.append(tagged_frame(i));
        }

        // The overflowing push drops from W+1 straight to W+1-S.
        let ready = window.append(tagged_frame(W));
        assert!(!ready);
        assert_eq!(window.len(), W + 1 - S);

        // The S oldest entries went in one batch: the new front is frame S.
        assert_eq!(first_tag(&window), S);
    }

    #[test]
    fn test_ready_fires_again_every_stride() {
        let mut window = FrameWindow::new(W, S);
        let mut ready_ticks = vec![];
        for i in 0..(W + 3 * S) {
            if window.append(tagged_frame(i)) {
                ready_ticks.push(i);
            }
        }
        // First ready at frame W-1, then every S frames.
        assert_eq!(ready_ticks, vec![W - 1, W - 1 + S, W - 1 + 2 * S, W - 1 + 3 * S]);
    }

    #[test]
    fn test_fifo_order_survives_eviction() {
        let mut window = FrameWindow::new(6, 2);
        for i in 0..8 {
            window.append(tagged_frame(i));
        }
        let tags: Vec<usize> = window
            .iter()
            .map(|f| f.as_slice()[0] as usize)
            .collect();
        // 7 pushed past capacity once: frames 0..2 evicted in one batch.
        assert_eq!(tags, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_tensor_concatenates_in_window_order() {
        let mut window = FrameWindow::new(3, 1);
        for i in 0..3 {
            window.append(tagged_frame(i));
        }
        let tensor = window.to_tensor();
        assert_eq!(tensor.shape(), (3, 3, 2));
        assert_eq!(tensor.data()[0], 0.0);
        assert_eq!(tensor.data()[6], 1.0);
        assert_eq!(tensor.data()[12], 2.0);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut window = FrameWindow::new(4, 2);
        window.append(tagged_frame(0));
        window.append(tagged_frame(1));
        window.clear();
        assert!(window.is_empty());
        // Refilling after a clear behaves like a fresh window.
        for i in 0..4 {
            let ready = window.append(tagged_frame(i));
            assert_eq!(ready, i == 3);
        }
    }
}
