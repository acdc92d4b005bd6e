//! Stride-based frame sampling.
//!
//! Only every Nth frame (0-based indices 0, N, 2N, ...) is forwarded for
//! classification. A read failure ends the stream like end-of-file does.

use crate::source::{Frame, FrameSource};

/// A frame selected for processing, tagged with its 0-based source index.
#[derive(Clone, Debug)]
pub struct SampledFrame {
    pub index: usize,
    pub frame: Frame,
}

/// Lazy iterator over the sampled frames of a source.
pub struct FrameSampler<S> {
    source: S,
    stride: usize,
    position: usize,
    exhausted: bool,
}

impl<S: FrameSource> FrameSampler<S> {
    /// Wrap a source. A stride of 0 is treated as 1.
    pub fn new(source: S, stride: usize) -> Self {
        Self {
            source,
            stride: stride.max(1),
            position: 0,
            exhausted: false,
        }
    }

    /// Number of raw frames pulled from the source so far.
    pub fn frames_read(&self) -> usize {
        self.position
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<SampledFrame> {
        if self.exhausted {
            return None;
        }

        loop {
            let frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!(frames = self.position, "video source exhausted");
                    self.exhausted = true;
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        frames = self.position,
                        "frame read failed; treating as end of stream"
                    );
                    self.exhausted = true;
                    return None;
                }
            };

            let index = self.position;
            self.position += 1;

            if index % self.stride == 0 {
                return Some(SampledFrame { index, frame });
            }
        }
    }
}
