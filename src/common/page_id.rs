//! Page number type.

use std::fmt;

/// Page number within a single page file.
///
/// Page ids are only unique per file; the buffer pool keys resident pages by
/// `(FileId, PageId)`.
///
/// # Example
/// ```
/// use clockdb::PageId;
///
/// let page_id = PageId::new(7);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.offset(), 7 * 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page", held by descriptors of invalid frames.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page inside a file of contiguous pages.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 as u64 * crate::common::config::PAGE_SIZE as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
