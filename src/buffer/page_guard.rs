//! Access to pages held in the buffer pool.
//!
//! - [`PageHandle`] - Index-based reference returned by `read_page` and
//!   `allocate_page`, checked against the frame's generation on every use
//! - [`PinnedPage`] - RAII guard that unpins the page when dropped

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::common::{FrameId, PageId};
use crate::storage::page::Page;
use crate::storage::FileHandle;

use super::buffer_manager::BufferManager;

/// Names a pinned page in the pool.
///
/// A handle stays usable until the frame it names is evicted, flushed or
/// disposed; after that [`BufferManager::page`] reports `StaleHandle`
/// instead of handing out another page's bytes. A handle does not keep the
/// page pinned on its own: every handle obtained from `read_page` or
/// `allocate_page` must eventually be matched by one `unpin_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle {
    frame_id: FrameId,
    page_id: PageId,
    generation: u64,
}

impl PageHandle {
    pub(crate) fn new(frame_id: FrameId, page_id: PageId, generation: u64) -> Self {
        Self {
            frame_id,
            page_id,
            generation,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

/// A pinned page that unpins itself when dropped.
///
/// The guard borrows the manager mutably, so the page cannot be evicted
/// while it lives. Mutable access marks the page dirty, and the dirty flag
/// is passed on to `unpin_page` on drop.
///
/// # Example
/// ```
/// use clockdb::BufferManager;
/// use clockdb::storage::{FileHandle, MemFile};
///
/// let mut bpm = BufferManager::new(4);
/// let file = FileHandle::new(MemFile::new("guarded"));
///
/// let page_id = {
///     let mut page = bpm.new_page(&file).unwrap();
///     page.data_mut()[0] = 0xAB;
///     page.page_id()
/// }; // unpinned here, marked dirty
///
/// assert_eq!(bpm.pin_count(&file, page_id), Some(0));
/// ```
pub struct PinnedPage<'a> {
    bpm: &'a mut BufferManager,
    file: FileHandle,
    handle: PageHandle,
    dirty: bool,
}

impl<'a> PinnedPage<'a> {
    /// Called by `BufferManager::fetch_page()` and `BufferManager::new_page()`.
    pub(crate) fn new(bpm: &'a mut BufferManager, file: FileHandle, handle: PageHandle) -> Self {
        Self {
            bpm,
            file,
            handle,
            dirty: false,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.handle.page_id()
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.handle.frame_id()
    }

    /// Report the page as modified on drop even without mutable access.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read-only view of the manager, for inspecting pins while the guard lives.
    pub fn manager(&self) -> &BufferManager {
        &*self.bpm
    }
}

impl Deref for PinnedPage<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.bpm.slot(self.handle.frame_id())
    }
}

impl DerefMut for PinnedPage<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.dirty = true;
        self.bpm.slot_mut(self.handle.frame_id())
    }
}

impl Drop for PinnedPage<'_> {
    fn drop(&mut self) {
        let page_id = self.handle.page_id();
        if let Err(err) = self.bpm.unpin_page(&self.file, page_id, self.dirty) {
            warn!(file = %self.file, page = %page_id, error = %err, "failed to unpin guarded page");
        }
    }
}
