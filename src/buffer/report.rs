//! Diagnostic dump of the buffer pool.

use std::fmt;

use super::frame::FrameSnapshot;

/// Every frame's descriptor at one point in time, as produced by
/// [`BufferManager::introspect`](crate::buffer::BufferManager::introspect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    pub frames: Vec<FrameSnapshot>,
    pub valid_frames: usize,
}

impl PoolReport {
    pub(crate) fn new(frames: Vec<FrameSnapshot>) -> Self {
        let valid_frames = frames.iter().filter(|f| f.valid).count();
        Self {
            frames,
            valid_frames,
        }
    }

    /// Total pins held across the pool.
    pub fn total_pins(&self) -> u64 {
        self.frames.iter().map(|f| f.pin_count as u64).sum()
    }

    pub fn dirty_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.valid && f.dirty).count()
    }
}

impl fmt::Display for PoolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
        }
        write!(f, "Total Number of Valid Frames:{}", self.valid_frames)
    }
}
