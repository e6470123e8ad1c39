//! Disk File - a page file backed by a single OS file.
//!
//! The [`DiskFile`] handles all direct file operations:
//! - Reading and writing pages, with checksums
//! - Allocating new pages, reusing deleted slots first
//! - Deleting pages by marking their slot free

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::PageFile;

/// A page file stored in one OS file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// A deleted page keeps its slot; the slot is rewritten with a
/// [`PageType::Free`] header and handed out again by the next allocation.
/// `open` rebuilds the free set by scanning headers.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskFile {
    file: File,
    name: String,
    /// Number of page slots in the file, free or not.
    page_count: u32,
    /// Deleted slots, lowest reused first.
    free_pages: BTreeSet<PageId>,
}

impl DiskFile {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        Ok(Self {
            file,
            name: path.as_ref().display().to_string(),
            page_count: 0,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing page file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        let mut free_pages = BTreeSet::new();
        let mut header = [0u8; PageHeader::SIZE];
        for n in 0..page_count {
            let page_id = PageId::new(n);
            file.seek(SeekFrom::Start(page_id.offset()))?;
            file.read_exact(&mut header)?;
            if PageHeader::from_bytes(&header).page_type == PageType::Free {
                free_pages.insert(page_id);
            }
        }

        debug!(
            path = %path.as_ref().display(),
            page_count,
            free = free_pages.len(),
            "opened page file"
        );

        Ok(Self {
            file,
            name: path.as_ref().display().to_string(),
            page_count,
            free_pages,
        })
    }

    /// Open an existing page file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of page slots in the file, including free ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of live (allocated, not deleted) pages.
    #[inline]
    pub fn live_page_count(&self) -> u32 {
        self.page_count - self.free_pages.len() as u32
    }

    /// Get the total size of the file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    fn is_live(&self, page_id: PageId) -> bool {
        page_id.is_valid() && page_id.0 < self.page_count && !self.free_pages.contains(&page_id)
    }

    /// Stamp a checksum on a copy of `page` and write it at `page_id`.
    fn write_slot(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let mut out = Page::new();
        out.copy_from(page);
        out.update_checksum();

        self.file.seek(SeekFrom::Start(page_id.offset()))?;
        self.file.write_all(out.as_slice())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl PageFile for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }

        self.file.seek(SeekFrom::Start(page_id.offset()))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(page_id));
        }
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_id = page.page_id();
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }
        self.write_slot(page_id, page)
    }

    fn allocate_page(&mut self) -> Result<Page> {
        let page_id = match self.free_pages.first() {
            Some(&page_id) => page_id,
            None => {
                if self.page_count as u64 >= MAX_PAGES {
                    return Err(Error::InvalidPageId(PageId::new(self.page_count)));
                }
                PageId::new(self.page_count)
            }
        };

        // Bookkeeping only changes once the slot is on disk.
        let page = Page::with_id(page_id);
        self.write_slot(page_id, &page)?;
        if !self.free_pages.remove(&page_id) {
            self.page_count += 1;
        }
        Ok(page)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }

        let mut tombstone = Page::new();
        tombstone.set_header(&PageHeader::new(PageType::Free, page_id));
        self.write_slot(page_id, &tombstone)?;
        self.free_pages.insert(page_id);
        Ok(())
    }
}
