//! Error types for ClockDB.

use thiserror::Error;

use super::{FrameId, PageId};

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors raised by the buffer manager and its page files.
///
/// Errors from a page file (I/O, missing pages, bad checksums) pass through
/// the buffer manager unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist in the file (never allocated, or deleted).
    #[error("{0} not found")]
    PageNotFound(PageId),

    /// The page id cannot be addressed by a page file.
    #[error("invalid page ID: {0}")]
    InvalidPageId(PageId),

    /// A page read from disk failed checksum verification.
    #[error("checksum mismatch on {0}")]
    ChecksumMismatch(PageId),

    /// Every frame is pinned; nothing can be evicted.
    #[error("buffer pool exhausted: every frame is pinned")]
    PoolExhausted,

    /// `unpin_page` on a resident page whose pin count is already zero.
    #[error("{page} of file {file} in {frame} is not pinned")]
    PageNotPinned {
        file: String,
        page: PageId,
        frame: FrameId,
    },

    /// `flush_file` found a pinned frame belonging to the file.
    #[error("{page} of file {file} in {frame} is still pinned")]
    PagePinned {
        file: String,
        page: PageId,
        frame: FrameId,
    },

    /// A frame is tagged with a file but marked invalid.
    #[error("bad buffer {frame}: dirty={dirty} valid={valid} refbit={ref_bit}")]
    BadBuffer {
        frame: FrameId,
        dirty: bool,
        valid: bool,
        ref_bit: bool,
    },

    /// The page directory already maps this page to a frame.
    #[error("{page} of file {file} is already in the page directory")]
    DirectoryConflict { file: String, page: PageId },

    /// A page handle outlived the page it was issued for.
    #[error("stale page handle for {frame}")]
    StaleHandle { frame: FrameId },

    /// A buffer pool needs at least one frame.
    #[error("invalid pool size: {0}")]
    InvalidPoolSize(usize),
}
