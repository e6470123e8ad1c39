//! Buffer Manager - the core page caching layer.
//!
//! The [`BufferManager`] provides:
//! - Page caching between page files and memory
//! - Pin-based reference counting
//! - Write-back of dirty pages before their frame is reused
//! - CLOCK (second chance) eviction

use tracing::{debug, error, trace, warn};

use crate::buffer::directory::PageDirectory;
use crate::buffer::frame::FrameDesc;
use crate::buffer::replacer::{ClockReplacer, Victim};
use crate::buffer::{BufferStats, PageHandle, PinnedPage, PoolReport};
use crate::common::config::DEFAULT_POOL_SIZE;
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::FileHandle;

/// Manages a fixed pool of frames caching pages of any number of files.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                      BufferManager                          │
/// │  ┌────────────────┐  ┌─────────────────────────────────┐   │
/// │  │   directory    │  │  descs: Vec<FrameDesc>          │   │
/// │  │(File,Page)→Fid │─▶│  pool:  Vec<Page>               │   │
/// │  └────────────────┘  │  [Frame0] [Frame1] [Frame2] ... │   │
/// │  ┌────────────────┐  └─────────────────────────────────┘   │
/// │  │    replacer    │        ▲            │ write-back /     │
/// │  │ ClockReplacer  │────────┘            ▼ load             │
/// │  └────────────────┘               FileHandle (per file)    │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The manager is the only thing that mutates frame descriptors, the
/// directory or the clock hand. Every operation takes `&mut self` and runs
/// to completion synchronously; errors from page files are returned as is.
///
/// # Usage
/// ```
/// use clockdb::BufferManager;
/// use clockdb::storage::{FileHandle, MemFile};
///
/// let mut bpm = BufferManager::new(8);
/// let file = FileHandle::new(MemFile::new("example"));
///
/// let (page_id, handle) = bpm.allocate_page(&file).unwrap();
/// bpm.page_mut(&handle).unwrap().data_mut()[0] = 0xAB;
/// bpm.unpin_page(&file, page_id, true).unwrap();
///
/// let handle = bpm.read_page(&file, page_id).unwrap();
/// assert_eq!(bpm.page(&handle).unwrap().data()[0], 0xAB);
/// bpm.unpin_page(&file, page_id, false).unwrap();
///
/// bpm.flush_file(&file).unwrap();
/// assert!(!bpm.is_resident(&file, page_id));
/// ```
pub struct BufferManager {
    /// One descriptor per frame, indexed by `FrameId`.
    descs: Vec<FrameDesc>,

    /// Page slots, parallel to `descs`.
    pool: Vec<Page>,

    /// Maps resident `(file, page)` pairs to frames.
    directory: PageDirectory,

    /// Owns the clock hand.
    replacer: ClockReplacer,

    stats: BufferStats,

    /// Number of frames in the pool (immutable after construction).
    num_bufs: usize,
}

impl BufferManager {
    /// Create a buffer manager with `num_bufs` frames, all invalid.
    ///
    /// # Panics
    /// Panics if `num_bufs` is 0. See [`try_new`](Self::try_new).
    pub fn new(num_bufs: usize) -> Self {
        assert!(num_bufs > 0, "num_bufs must be > 0");

        Self {
            descs: FrameId::all(num_bufs).map(FrameDesc::new).collect(),
            pool: (0..num_bufs).map(|_| Page::new()).collect(),
            directory: PageDirectory::with_capacity(num_bufs),
            replacer: ClockReplacer::new(num_bufs),
            stats: BufferStats::default(),
            num_bufs,
        }
    }

    /// Like [`new`](Self::new), but reports a zero frame count as an error.
    pub fn try_new(num_bufs: usize) -> Result<Self> {
        if num_bufs == 0 {
            return Err(Error::InvalidPoolSize(num_bufs));
        }
        Ok(Self::new(num_bufs))
    }

    // ========================================================================
    // Public API: pin and unpin pages
    // ========================================================================

    /// Pin a page, loading it from `file` if it is not resident.
    ///
    /// Every successful call adds exactly one pin, which the caller must
    /// release with [`unpin_page`](Self::unpin_page).
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if the page is not resident and every frame is pinned
    /// - Any error from `file` while writing back a victim or reading the page
    pub fn read_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<PageHandle> {
        if let Some(frame_id) = self.directory.lookup(file, page_id) {
            let pins = self.descs[frame_id.0].pin();
            self.stats.hits += 1;
            trace!(file = %file, page = %page_id, frame = %frame_id, pins, "buffer hit");
            return Ok(self.handle_for(frame_id));
        }

        self.stats.misses += 1;
        let frame_id = self.allocate_frame()?;

        let page = file.read_page(page_id)?;
        self.stats.pages_read += 1;
        self.install(file, page_id, frame_id, page)?;

        debug!(file = %file, page = %page_id, frame = %frame_id, "loaded page");
        Ok(self.handle_for(frame_id))
    }

    /// Release one pin on a page, optionally marking it dirty.
    ///
    /// Unpinning a page that is not resident does nothing. Passing
    /// `is_dirty = false` never clears a dirty flag set earlier.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is resident with a pin count of zero.
    pub fn unpin_page(&mut self, file: &FileHandle, page_id: PageId, is_dirty: bool) -> Result<()> {
        let Some(frame_id) = self.directory.lookup(file, page_id) else {
            return Ok(());
        };

        let desc = &mut self.descs[frame_id.0];
        if desc.unpin().is_none() {
            return Err(Error::PageNotPinned {
                file: file.name().to_string(),
                page: page_id,
                frame: frame_id,
            });
        }
        if is_dirty {
            desc.mark_dirty();
        }
        Ok(())
    }

    /// Allocate a new page in `file` and pin it in the pool.
    ///
    /// The file allocates first; if no frame can then be found, the new
    /// page stays allocated in the file but is not cached. The returned
    /// page holds one pin, which the caller must release.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - Any error from `file`
    pub fn allocate_page(&mut self, file: &FileHandle) -> Result<(PageId, PageHandle)> {
        let page = file.allocate_page()?;
        let page_id = page.page_id();

        let frame_id = self.allocate_frame()?;
        self.install(file, page_id, frame_id, page)?;

        debug!(file = %file, page = %page_id, frame = %frame_id, "allocated page");
        Ok((page_id, self.handle_for(frame_id)))
    }

    // ========================================================================
    // Public API: flush and dispose
    // ========================================================================

    /// Write back and drop every page of `file` from the pool.
    ///
    /// Frames are visited in pool order. Frames processed before a failure
    /// stay flushed; frames after it are untouched.
    ///
    /// # Errors
    /// - `Error::PagePinned` if a page of `file` is pinned
    /// - `Error::BadBuffer` if a frame is tagged with `file` but invalid
    /// - Any error from `file` while writing back
    pub fn flush_file(&mut self, file: &FileHandle) -> Result<()> {
        let mut flushed = 0usize;

        for frame_id in FrameId::all(self.num_bufs) {
            let desc = &self.descs[frame_id.0];
            if !desc.belongs_to(file) {
                continue;
            }

            let page_id = desc.page_id();
            if desc.is_pinned() {
                return Err(Error::PagePinned {
                    file: file.name().to_string(),
                    page: page_id,
                    frame: frame_id,
                });
            }
            if !desc.is_valid() {
                return Err(self.bad_buffer(frame_id));
            }

            if desc.is_dirty() {
                file.write_page(&self.pool[frame_id.0])?;
                self.stats.pages_written += 1;
                self.descs[frame_id.0].clear_dirty();
            }

            self.directory.remove(file, page_id);
            self.descs[frame_id.0].clear();
            flushed += 1;
        }

        debug!(file = %file, frames = flushed, "flushed file");
        Ok(())
    }

    /// Drop a page from the pool if resident, then delete it from `file`.
    ///
    /// The page is dropped even if pinned; its dirty contents are discarded.
    ///
    /// # Errors
    /// Any error from `file` while deleting the page.
    pub fn dispose_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<()> {
        if let Some(frame_id) = self.directory.remove(file, page_id) {
            self.descs[frame_id.0].clear();
            self.stats.disposals += 1;
            debug!(file = %file, page = %page_id, frame = %frame_id, "disposed page");
        }

        file.delete_page(page_id)
    }

    /// Write back every dirty page without evicting anything.
    ///
    /// Pins, reference bits and residency are left as they are.
    pub fn flush_all(&mut self) -> Result<()> {
        for frame_id in FrameId::all(self.num_bufs) {
            let desc = &self.descs[frame_id.0];
            if !desc.is_valid() || !desc.is_dirty() {
                continue;
            }
            let Some(file) = desc.file() else {
                return Err(self.bad_buffer(frame_id));
            };

            file.write_page(&self.pool[frame_id.0])?;
            self.stats.pages_written += 1;
            self.descs[frame_id.0].clear_dirty();
        }
        Ok(())
    }

    // ========================================================================
    // Public API: page access
    // ========================================================================

    /// The page named by `handle`.
    ///
    /// # Errors
    /// `Error::StaleHandle` if the frame has been evicted, flushed or
    /// disposed since the handle was issued.
    pub fn page(&self, handle: &PageHandle) -> Result<&Page> {
        self.check_handle(handle)?;
        Ok(&self.pool[handle.frame_id().0])
    }

    /// Mutable access to the page named by `handle`.
    ///
    /// Remember to unpin with `is_dirty = true` after modifying it.
    ///
    /// # Errors
    /// `Error::StaleHandle`, as for [`page`](Self::page).
    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page> {
        self.check_handle(handle)?;
        Ok(&mut self.pool[handle.frame_id().0])
    }

    /// Pin a page and wrap it in a guard that unpins on drop.
    pub fn fetch_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<PinnedPage<'_>> {
        let handle = self.read_page(file, page_id)?;
        Ok(PinnedPage::new(self, file.clone(), handle))
    }

    /// Allocate a page and wrap it in a guard that unpins on drop.
    pub fn new_page(&mut self, file: &FileHandle) -> Result<PinnedPage<'_>> {
        let (_, handle) = self.allocate_page(file)?;
        Ok(PinnedPage::new(self, file.clone(), handle))
    }

    // ========================================================================
    // Public API: introspection
    // ========================================================================

    /// Snapshot every frame's descriptor and count the valid ones.
    pub fn introspect(&self) -> PoolReport {
        PoolReport::new(self.descs.iter().map(FrameDesc::snapshot).collect())
    }

    /// Pin count of a resident page, or None if it is not resident.
    pub fn pin_count(&self, file: &FileHandle, page_id: PageId) -> Option<u32> {
        self.directory
            .lookup(file, page_id)
            .map(|frame_id| self.descs[frame_id.0].pin_count())
    }

    pub fn is_resident(&self, file: &FileHandle, page_id: PageId) -> bool {
        self.directory.lookup(file, page_id).is_some()
    }

    /// Frame currently caching a page.
    pub fn frame_of(&self, file: &FileHandle, page_id: PageId) -> Option<FrameId> {
        self.directory.lookup(file, page_id)
    }

    /// Number of resident pages.
    pub fn resident_pages(&self) -> usize {
        self.directory.len()
    }

    /// Where the next clock scan starts.
    pub fn clock_hand(&self) -> FrameId {
        self.replacer.hand()
    }

    pub fn num_bufs(&self) -> usize {
        self.num_bufs
    }

    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // ========================================================================
    // Internal: used by PinnedPage, which holds a pin on the frame
    // ========================================================================

    pub(crate) fn slot(&self, frame_id: FrameId) -> &Page {
        &self.pool[frame_id.0]
    }

    pub(crate) fn slot_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pool[frame_id.0]
    }

    // ========================================================================
    // Internal: frame allocation and eviction
    // ========================================================================

    /// Find an unpinned frame holding no page, evicting one if needed.
    fn allocate_frame(&mut self) -> Result<FrameId> {
        match self.replacer.pick(&mut self.descs)? {
            Victim::Free(frame_id) => Ok(frame_id),
            Victim::Evict(frame_id) => {
                self.evict(frame_id)?;
                Ok(frame_id)
            }
        }
    }

    /// Write back (if dirty), unregister and clear a valid, unpinned frame.
    ///
    /// If the write-back fails the frame is left valid, dirty and registered.
    fn evict(&mut self, frame_id: FrameId) -> Result<()> {
        let desc = &self.descs[frame_id.0];
        let page_id = desc.page_id();
        let Some(file) = desc.file().cloned() else {
            return Err(self.bad_buffer(frame_id));
        };

        if desc.is_dirty() {
            file.write_page(&self.pool[frame_id.0])?;
            self.stats.pages_written += 1;
        }

        self.directory.remove(&file, page_id);
        self.descs[frame_id.0].clear();
        self.stats.evictions += 1;

        debug!(file = %file, page = %page_id, frame = %frame_id, "evicted page");
        Ok(())
    }

    /// Put a loaded page into a free frame and register it.
    fn install(
        &mut self,
        file: &FileHandle,
        page_id: PageId,
        frame_id: FrameId,
        page: Page,
    ) -> Result<()> {
        self.directory.insert(file, page_id, frame_id)?;
        self.pool[frame_id.0] = page;
        self.descs[frame_id.0].set(file.clone(), page_id);
        Ok(())
    }

    fn handle_for(&self, frame_id: FrameId) -> PageHandle {
        let desc = &self.descs[frame_id.0];
        PageHandle::new(frame_id, desc.page_id(), desc.generation())
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<()> {
        let frame_id = handle.frame_id();
        match self.descs.get(frame_id.0) {
            Some(desc) if desc.is_valid() && desc.generation() == handle.generation() => Ok(()),
            _ => Err(Error::StaleHandle { frame: frame_id }),
        }
    }

    fn bad_buffer(&self, frame_id: FrameId) -> Error {
        let desc = &self.descs[frame_id.0];
        error!(
            frame = %frame_id,
            dirty = desc.is_dirty(),
            valid = desc.is_valid(),
            refbit = desc.ref_bit(),
            "inconsistent frame descriptor"
        );
        Error::BadBuffer {
            frame: frame_id,
            dirty: desc.is_dirty(),
            valid: desc.is_valid(),
            ref_bit: desc.ref_bit(),
        }
    }
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        if let Err(err) = self.flush_all() {
            warn!(error = %err, "failed to write back dirty pages on shutdown");
        }
    }
}
