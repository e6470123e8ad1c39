//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between access methods and page
//! files. It manages a fixed pool of frames, each holding one page, and
//! reuses frames with the CLOCK policy when the pool is full.
//!
//! # Components
//! - [`BufferManager`] - The page cache and its public operations
//! - [`PageHandle`] / [`PinnedPage`] - References to pinned pages
//! - `replacer` - Eviction policy (CLOCK)
//! - [`BufferStats`] - Hit, miss and I/O counters
//! - [`PoolReport`] / [`FrameSnapshot`] - Read-only views for diagnostics
//!
//! The replacer is internal; only the manager drives the clock:
//! ```compile_fail
//! use clockdb::buffer::replacer::ClockReplacer;
//! ```

mod buffer_manager;
mod directory;
mod frame;
mod page_guard;
pub(crate) mod replacer;
mod report;
mod stats;

pub use buffer_manager::BufferManager;
pub use frame::FrameSnapshot;
pub use page_guard::{PageHandle, PinnedPage};
pub use report::PoolReport;
pub use stats::BufferStats;
