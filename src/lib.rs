//! ClockDB - the buffer manager of a disk-oriented data engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Access methods (records, indexes, ...)             │
//! └─────────────────────────────────────────────────────────────────┘
//!                                ↓ read / allocate / unpin / flush / dispose
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Buffer Pool (buffer/)                          │
//! │   BufferManager ── PageDirectory ── FrameDesc[] + Page[]        │
//! │         └── ClockReplacer (second chance)                       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                ↓ read / write / allocate / delete
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Storage Layer (storage/)                       │
//! │      PageFile trait ── FileHandle ── DiskFile | MemFile         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, FileId, Error, config)
//! - [`buffer`] - Buffer pool management and CLOCK eviction
//! - [`storage`] - Page files and page format
//!
//! # Quick Start
//! ```no_run
//! use clockdb::BufferManager;
//! use clockdb::storage::{DiskFile, FileHandle};
//!
//! let file = FileHandle::new(DiskFile::open_or_create("my_table.db").unwrap());
//! let mut bpm = BufferManager::new(128);
//!
//! let (page_id, handle) = bpm.allocate_page(&file).unwrap();
//! bpm.page_mut(&handle).unwrap().data_mut()[0] = 1;
//! bpm.unpin_page(&file, page_id, true).unwrap();
//! bpm.flush_file(&file).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, FileId, FrameId, PageId, Result};

pub use buffer::{BufferManager, BufferStats, FrameSnapshot, PageHandle, PinnedPage, PoolReport};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{DiskFile, FileHandle, MemFile, PageFile};
