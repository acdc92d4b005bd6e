//! End-of-stream intruder confirmation.
//!
//! Counts sampled frames that hold at least one unknown face. The decision
//! is taken once, after the stream ends: more than `threshold` such frames
//! confirms an intrusion.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntruderState {
    Monitoring,
    Confirmed,
}

impl IntruderState {
    pub fn is_confirmed(self) -> bool {
        self == IntruderState::Confirmed
    }
}

#[derive(Debug, Clone)]
pub struct IntruderMonitor {
    threshold: u32,
    unknown_frames: u32,
}

impl IntruderMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            unknown_frames: 0,
        }
    }

    /// Count a sampled frame. Several unknown faces in one frame count once.
    pub fn observe(&mut self, frame_has_unknown: bool) {
        if frame_has_unknown {
            self.unknown_frames = self.unknown_frames.saturating_add(1);
        }
    }

    pub fn unknown_frames(&self) -> u32 {
        self.unknown_frames
    }

    pub fn evaluate(&self) -> IntruderState {
        if self.unknown_frames > self.threshold {
            IntruderState::Confirmed
        } else {
            IntruderState::Monitoring
        }
    }
}
