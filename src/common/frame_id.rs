//! Frame identifier type.

use std::fmt;

/// Position of a frame in the buffer pool.
///
/// A frame's id equals its index in the pool and never changes after the
/// pool is built. The descriptor table and the page slots are parallel
/// `Vec`s, so `frame_id.0` indexes both directly.
///
/// # Example
/// ```
/// use clockdb::FrameId;
///
/// let last = FrameId::new(2);
/// assert_eq!(last.next_in(3), FrameId::new(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Create a new FrameId.
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// The frame after this one in a circular pool of `num_bufs` frames.
    #[inline]
    pub fn next_in(self, num_bufs: usize) -> Self {
        FrameId((self.0 + 1) % num_bufs)
    }

    /// Iterate over every frame id of a pool, in order.
    pub fn all(num_bufs: usize) -> impl Iterator<Item = FrameId> {
        (0..num_bufs).map(FrameId)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
