//! Configuration constants for ClockDB.

/// Size of a page in bytes (4KB).
///
/// Every frame in the buffer pool holds exactly one page of this size, and
/// every [`PageFile`](crate::storage::PageFile) reads and writes in units of it.
pub const PAGE_SIZE: usize = 4096;

/// Frame count used by [`BufferManager::default`](crate::buffer::BufferManager).
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Maximum number of pages addressable with a u32 `PageId`.
///
/// `u32::MAX` itself is reserved for `PageId::INVALID`.
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Maximum size of a single page file in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;
