//! Page directory - which frame holds which page.

use std::collections::HashMap;

use crate::common::{Error, FileId, FrameId, PageId, Result};
use crate::storage::FileHandle;

/// Maps `(file, page)` to the frame caching it.
///
/// An entry exists exactly while its frame is valid and holds that page.
/// Keys are unique; iteration order is unspecified.
pub(crate) struct PageDirectory {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageDirectory {
    /// Size the table for a pool of `num_bufs` frames with some slack.
    pub fn with_capacity(num_bufs: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(num_bufs + num_bufs / 5 + 1),
        }
    }

    /// The frame holding `(file, page_id)`, if resident.
    #[inline]
    pub fn lookup(&self, file: &FileHandle, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&(file.id(), page_id)).copied()
    }

    /// Register `(file, page_id)` as held by `frame_id`.
    ///
    /// # Errors
    /// `Error::DirectoryConflict` if the page already has an entry; the
    /// existing entry is left untouched.
    pub fn insert(&mut self, file: &FileHandle, page_id: PageId, frame_id: FrameId) -> Result<()> {
        let key = (file.id(), page_id);
        if self.entries.contains_key(&key) {
            return Err(Error::DirectoryConflict {
                file: file.name().to_string(),
                page: page_id,
            });
        }
        self.entries.insert(key, frame_id);
        Ok(())
    }

    /// Remove the entry for `(file, page_id)`, returning the frame it named.
    #[inline]
    pub fn remove(&mut self, file: &FileHandle, page_id: PageId) -> Option<FrameId> {
        self.entries.remove(&(file.id(), page_id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (FileId, PageId, FrameId)> + '_ {
        self.entries
            .iter()
            .map(|(&(file_id, page_id), &frame_id)| (file_id, page_id, frame_id))
    }
}
