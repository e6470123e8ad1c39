//! Buffer pool statistics tracking.

use std::fmt;

/// Counters maintained by the buffer manager.
///
/// The manager is the single owner of its pool, so these are plain
/// integers updated through `&mut self`. Copy the struct to keep a
/// point-in-time view.
///
/// # Example
/// ```
/// use clockdb::BufferStats;
///
/// let stats = BufferStats { hits: 3, misses: 1, ..Default::default() };
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    /// `read_page` calls answered from the pool.
    pub hits: u64,

    /// `read_page` calls that had to load the page.
    pub misses: u64,

    /// Valid pages pushed out by the clock replacer.
    pub evictions: u64,

    /// Pages read from a page file.
    pub pages_read: u64,

    /// Pages written back to a page file.
    pub pages_written: u64,

    /// Pages dropped from the pool by `dispose_page`.
    pub disposals: u64,
}

impl BufferStats {
    /// Fraction of `read_page` calls that hit (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, written: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.evictions,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}
