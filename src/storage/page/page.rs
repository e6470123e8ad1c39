//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between a page file and the buffer pool. It records its own [`PageId`]
//! in its header, so a page file knows where to write it back.

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

use super::page_header::{PageHeader, PageType};

/// A page of data (4KB, 4KB-aligned).
///
/// The first [`PageHeader::SIZE`] bytes hold the header; callers read and
/// write their own bytes through [`data`](Page::data) and
/// [`data_mut`](Page::data_mut), which cover the rest of the page.
///
/// `Page` does not implement `Clone`; page files copy pages explicitly.
///
/// # Example
/// ```
/// use clockdb::{Page, PageId};
///
/// let mut page = Page::with_id(PageId::new(3));
/// page.data_mut()[0] = 0xFF;
/// assert_eq!(page.page_id(), PageId::new(3));
/// assert_eq!(page.data()[0], 0xFF);
/// ```
///
/// The header belongs to the page file, so callers cannot retarget a page:
/// ```compile_fail
/// use clockdb::{Page, PageHeader, PageId, PageType};
///
/// let mut page = Page::with_id(PageId::new(3));
/// page.set_header(&PageHeader::new(PageType::Data, PageId::new(4)));
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Usable bytes after the header.
    pub const DATA_SIZE: usize = PAGE_SIZE - PageHeader::SIZE;

    /// Create a zeroed page that belongs to no page id.
    pub fn new() -> Self {
        let mut page = Self {
            data: [0u8; PAGE_SIZE],
        };
        page.set_header(&PageHeader::default());
        page
    }

    /// Create a zeroed data page stamped with `page_id`.
    pub fn with_id(page_id: PageId) -> Self {
        let mut page = Self::new();
        page.set_header(&PageHeader::new(PageType::Data, page_id));
        page
    }

    /// The page id recorded in the header.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.header().page_id
    }

    /// The whole page, header included.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The whole page, header included, for page files filling it from disk.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Caller bytes, after the header.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    /// Mutable caller bytes, after the header.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// Zero the caller bytes, keeping the header.
    pub fn reset(&mut self) {
        self.data[PageHeader::SIZE..].fill(0);
    }

    /// Overwrite this page with the contents of `other`.
    pub(crate) fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Read the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    /// Write a page header.
    pub(crate) fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }

    /// Compute and store the checksum in the header.
    ///
    /// Page files call this right before a page goes to disk.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the page checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
