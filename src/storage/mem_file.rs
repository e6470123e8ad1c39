//! In-memory page file.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageFile;

#[derive(Default)]
struct MemInner {
    pages: HashMap<PageId, Page>,
    next_page: u32,
    free_pages: BTreeSet<PageId>,
    reads: u64,
    writes: u64,
    deletes: u64,
    write_log: Vec<PageId>,
}

/// A page file that lives in memory.
///
/// Follows the same contract as [`DiskFile`](crate::storage::DiskFile),
/// including reuse of deleted page ids. Clones share the same pages and
/// counters, so a caller can keep one clone to inspect I/O after handing
/// another to a [`FileHandle`](crate::storage::FileHandle).
///
/// # Example
/// ```
/// use clockdb::storage::{FileHandle, MemFile};
///
/// let mem = MemFile::new("scratch");
/// let file = FileHandle::new(mem.clone());
/// file.allocate_page().unwrap();
/// assert_eq!(mem.live_page_count(), 1);
/// ```
#[derive(Clone)]
pub struct MemFile {
    name: Arc<str>,
    inner: Arc<Mutex<MemInner>>,
}

impl MemFile {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(MemInner::default())),
        }
    }

    /// Number of pages that are allocated and not deleted.
    pub fn live_page_count(&self) -> usize {
        self.inner.lock().pages.len()
    }

    pub fn contains(&self, page_id: PageId) -> bool {
        self.inner.lock().pages.contains_key(&page_id)
    }

    /// Copy of the caller bytes stored for `page_id`, as last written.
    pub fn stored_data(&self, page_id: PageId) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .pages
            .get(&page_id)
            .map(|page| page.data().to_vec())
    }

    pub fn reads(&self) -> u64 {
        self.inner.lock().reads
    }

    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }

    pub fn deletes(&self) -> u64 {
        self.inner.lock().deletes
    }

    /// Page ids in the order they were written back.
    pub fn write_log(&self) -> Vec<PageId> {
        self.inner.lock().write_log.clone()
    }
}

impl PageFile for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        let stored = inner
            .pages
            .get(&page_id)
            .ok_or(Error::PageNotFound(page_id))?;

        let mut page = Page::new();
        page.copy_from(stored);
        inner.reads += 1;
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_id = page.page_id();
        let mut inner = self.inner.lock();
        let stored = inner
            .pages
            .get_mut(&page_id)
            .ok_or(Error::PageNotFound(page_id))?;

        stored.copy_from(page);
        inner.writes += 1;
        inner.write_log.push(page_id);
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<Page> {
        let mut inner = self.inner.lock();
        let page_id = match inner.free_pages.pop_first() {
            Some(page_id) => page_id,
            None => {
                if inner.next_page == PageId::INVALID.0 {
                    return Err(Error::InvalidPageId(PageId::INVALID));
                }
                inner.next_page += 1;
                PageId::new(inner.next_page - 1)
            }
        };

        inner.pages.insert(page_id, Page::with_id(page_id));
        Ok(Page::with_id(page_id))
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.pages.remove(&page_id).is_none() {
            return Err(Error::PageNotFound(page_id));
        }
        inner.free_pages.insert(page_id);
        inner.deletes += 1;
        Ok(())
    }
}
