//! Frame descriptors - per-frame bookkeeping for the buffer pool.
//!
//! A [`FrameDesc`] records what a pool slot holds:
//! - Which file and page are loaded, and whether the slot is valid at all
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Reference bit for the clock replacer
//!
//! Descriptors are only mutated by the buffer manager. Everything outside
//! the crate sees them through [`FrameSnapshot`].

use std::fmt;

use crate::common::{FileId, FrameId, PageId};
use crate::storage::FileHandle;

/// Bookkeeping for one frame of the buffer pool.
pub(crate) struct FrameDesc {
    frame_id: FrameId,

    /// Owning file, or None while the frame is invalid.
    file: Option<FileHandle>,

    /// Cached page, meaningful only while `valid`.
    page_id: PageId,

    valid: bool,
    dirty: bool,
    ref_bit: bool,
    pin_count: u32,

    /// Bumped every time the frame is cleared, so stale page handles can be
    /// told apart from live ones.
    generation: u64,
}

impl FrameDesc {
    /// Create an invalid descriptor for the frame at `frame_id`.
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            file: None,
            page_id: PageId::INVALID,
            valid: false,
            dirty: false,
            ref_bit: false,
            pin_count: 0,
            generation: 0,
        }
    }

    /// Record a freshly loaded page: valid, referenced, pinned once, clean.
    pub fn set(&mut self, file: FileHandle, page_id: PageId) {
        self.file = Some(file);
        self.page_id = page_id;
        self.valid = true;
        self.dirty = false;
        self.ref_bit = true;
        self.pin_count = 1;
    }

    /// Return to the invalid state.
    pub fn clear(&mut self) {
        self.file = None;
        self.page_id = PageId::INVALID;
        self.valid = false;
        self.dirty = false;
        self.ref_bit = false;
        self.pin_count = 0;
        self.generation += 1;
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    /// Whether the frame is tagged with `file`, valid or not.
    #[inline]
    pub fn belongs_to(&self, file: &FileHandle) -> bool {
        self.file.as_ref().is_some_and(|owner| owner == file)
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Add a pin and set the reference bit. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.ref_bit = true;
        self.pin_count += 1;
        self.pin_count
    }

    /// Drop a pin. Returns the new pin count, or None if it was already zero.
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    // ========================================================================
    // Dirty flag and reference bit
    // ========================================================================

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    #[inline]
    pub fn clear_ref_bit(&mut self) {
        self.ref_bit = false;
    }

    /// Read-only copy for introspection.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame_id: self.frame_id(),
            file: self.file.as_ref().map(|f| f.name().to_string()),
            file_id: self.file.as_ref().map(FileHandle::id),
            page_id: self.page_id,
            valid: self.valid,
            dirty: self.dirty,
            ref_bit: self.ref_bit,
            pin_count: self.pin_count,
        }
    }

    /// Put the descriptor in the state `flush_file` reports as a bad buffer.
    #[cfg(test)]
    pub fn invalidate_keeping_file(&mut self) {
        self.valid = false;
    }
}

/// A point-in-time copy of one frame's descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub frame_id: FrameId,
    /// Name of the owning file.
    pub file: Option<String>,
    pub file_id: Option<FileId>,
    pub page_id: PageId,
    pub valid: bool,
    pub dirty: bool,
    pub ref_bit: bool,
    pub pin_count: u32,
}

impl fmt::Display for FrameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameNo:{} ", self.frame_id.0)?;
        match &self.file {
            Some(name) => write!(f, "file:{} pageNo:{} ", name, self.page_id.0)?,
            None => write!(f, "file:NULL ")?,
        }
        write!(
            f,
            "valid:{} pinCnt:{} dirty:{} refbit:{}",
            self.valid, self.pin_count, self.dirty, self.ref_bit
        )
    }
}
