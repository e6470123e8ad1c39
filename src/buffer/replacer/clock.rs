//! CLOCK (second-chance) replacement policy.
//!
//! The replacer owns the clock hand and decides which frame to reuse. It
//! never performs I/O: when the chosen frame still holds a page, the buffer
//! manager writes it back and unregisters it.

use crate::buffer::frame::FrameDesc;
use crate::common::{Error, FrameId, Result};

/// Frame chosen by [`ClockReplacer::pick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Victim {
    /// The frame holds no page and can be used as is.
    Free(FrameId),
    /// The frame holds an unpinned, unreferenced page that must be evicted.
    Evict(FrameId),
}

/// Circular scan over the pool implementing second-chance eviction.
///
/// For the frame under the hand:
/// 1. invalid: pick it, hand stays
/// 2. reference bit set: clear it, advance
/// 3. pinned: count it, advance
/// 4. otherwise: pick it for eviction, hand stays
///
/// Once the pinned counter reaches the pool size the scan gives up with
/// `PoolExhausted`. The hand is never rewound, so the next scan resumes
/// where this one stopped.
pub struct ClockReplacer {
    hand: FrameId,
    num_bufs: usize,
}

impl ClockReplacer {
    /// Start with the hand on the last frame.
    ///
    /// # Panics
    /// Panics if `num_bufs` is 0.
    pub fn new(num_bufs: usize) -> Self {
        assert!(num_bufs > 0, "clock needs at least one frame");
        Self {
            hand: FrameId::new(num_bufs - 1),
            num_bufs,
        }
    }

    /// Current position of the hand.
    #[inline]
    pub fn hand(&self) -> FrameId {
        self.hand
    }

    #[inline]
    fn advance(&mut self) {
        self.hand = self.hand.next_in(self.num_bufs);
    }

    /// Scan for a reusable frame, clearing reference bits on the way.
    pub(crate) fn pick(&mut self, descs: &mut [FrameDesc]) -> Result<Victim> {
        debug_assert_eq!(descs.len(), self.num_bufs);

        let mut pinned_seen = 0;
        loop {
            if pinned_seen == self.num_bufs {
                return Err(Error::PoolExhausted);
            }

            let desc = &mut descs[self.hand.0];
            if !desc.is_valid() {
                return Ok(Victim::Free(self.hand));
            }
            if desc.ref_bit() {
                desc.clear_ref_bit();
            } else if desc.is_pinned() {
                pinned_seen += 1;
            } else {
                return Ok(Victim::Evict(self.hand));
            }
            self.advance();
        }
    }
}
