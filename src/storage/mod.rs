//! Storage layer - the page files the buffer pool caches.
//!
//! This module handles persistent storage:
//! - [`PageFile`] - What the buffer pool needs from a file
//! - [`FileHandle`] - Shared, identity-carrying handle to an open page file
//! - [`DiskFile`] - Page file backed by a single OS file
//! - [`MemFile`] - Page file held in memory, with I/O counters
//! - [`page`] - Page types and layouts

mod disk_file;
mod file;
mod mem_file;
pub mod page;

pub use disk_file::DiskFile;
pub use file::{FileHandle, PageFile};
pub use mem_file::MemFile;
