//! The page file abstraction consumed by the buffer pool.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{FileId, PageId, Result};
use crate::storage::page::Page;

/// A file of fixed-size pages.
///
/// The buffer pool only ever talks to files through this trait. Page layout
/// on disk, file naming and retry policy belong to the implementation.
pub trait PageFile: Send {
    /// Human-readable name, used in error messages and diagnostics.
    fn name(&self) -> &str;

    /// Read an existing page.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page was never allocated or has been deleted.
    fn read_page(&mut self, page_id: PageId) -> Result<Page>;

    /// Write a page back at the id recorded in its header.
    fn write_page(&mut self, page: &Page) -> Result<()>;

    /// Allocate a new zeroed page and return it stamped with its fresh id.
    fn allocate_page(&mut self) -> Result<Page>;

    /// Remove a page from persistent storage.
    fn delete_page(&mut self, page_id: PageId) -> Result<()>;
}

/// Shared handle to an open page file.
///
/// Clones share the underlying file and its [`FileId`]. Equality and hashing
/// use the id only, so two handles over files with identical contents are
/// still different files.
///
/// # Example
/// ```
/// use clockdb::storage::{FileHandle, MemFile};
///
/// let file = FileHandle::new(MemFile::new("orders"));
/// let same = file.clone();
/// assert_eq!(file, same);
/// assert_ne!(file, FileHandle::new(MemFile::new("orders")));
/// ```
#[derive(Clone)]
pub struct FileHandle {
    id: FileId,
    name: Arc<str>,
    file: Arc<Mutex<dyn PageFile>>,
}

impl FileHandle {
    /// Wrap a page file and give it a fresh identity.
    pub fn new<F: PageFile + 'static>(file: F) -> Self {
        let name: Arc<str> = Arc::from(file.name());
        Self {
            id: FileId::fresh(),
            name,
            file: Arc::new(Mutex::new(file)),
        }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_page(&self, page_id: PageId) -> Result<Page> {
        self.file.lock().read_page(page_id)
    }

    pub fn write_page(&self, page: &Page) -> Result<()> {
        self.file.lock().write_page(page)
    }

    pub fn allocate_page(&self) -> Result<Page> {
        self.file.lock().allocate_page()
    }

    pub fn delete_page(&self, page_id: PageId) -> Result<()> {
        self.file.lock().delete_page(page_id)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileHandle {}

impl Hash for FileHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
