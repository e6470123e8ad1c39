//! Buffer Manager Tests
//!
//! End-to-end behavior of the public API against in-memory page files.

use clockdb::storage::{FileHandle, MemFile};
use clockdb::{BufferManager, Error, FrameId, PageId};

/// A memory file with `pages` pages already allocated.
fn create_file(name: &str, pages: u32) -> (MemFile, FileHandle) {
    let mem = MemFile::new(name);
    let file = FileHandle::new(mem.clone());
    for _ in 0..pages {
        file.allocate_page().unwrap();
    }
    (mem, file)
}

// ============================================================================
// Pool exhaustion
// ============================================================================

/// Three pinned pages fill a three-frame pool; a fourth cannot be loaded.
#[test]
fn test_pool_exhausted_when_all_pinned() {
    let (_mem, file) = create_file("f", 5);
    let mut bpm = BufferManager::new(3);

    let mut frames = vec![];
    for p in 1..=3 {
        let handle = bpm.read_page(&file, PageId::new(p)).unwrap();
        frames.push(handle.frame_id());
        assert_eq!(bpm.pin_count(&file, PageId::new(p)), Some(1));
    }
    frames.sort();
    frames.dedup();
    assert_eq!(frames.len(), 3);

    let result = bpm.read_page(&file, PageId::new(4));
    assert!(matches!(result, Err(Error::PoolExhausted)));
    assert!(!bpm.is_resident(&file, PageId::new(4)));
    assert_eq!(bpm.introspect().valid_frames, 3);
}

/// Unpinning one page makes exactly that frame reusable.
#[test]
fn test_unpin_frees_frame_for_reuse() {
    let (_mem, file) = create_file("f", 5);
    let mut bpm = BufferManager::new(3);

    for p in 1..=3 {
        bpm.read_page(&file, PageId::new(p)).unwrap();
    }
    let freed = bpm.frame_of(&file, PageId::new(2)).unwrap();
    bpm.unpin_page(&file, PageId::new(2), false).unwrap();

    let handle = bpm.read_page(&file, PageId::new(4)).unwrap();
    assert_eq!(handle.frame_id(), freed);
    assert!(!bpm.is_resident(&file, PageId::new(2)));
}

// ============================================================================
// Write-back
// ============================================================================

/// A dirty page is written back before its frame takes another page.
#[test]
fn test_dirty_page_written_back_on_eviction() {
    let (mem, file) = create_file("f", 3);
    let mut bpm = BufferManager::new(1);

    bpm.read_page(&file, PageId::new(1)).unwrap();
    bpm.unpin_page(&file, PageId::new(1), true).unwrap();
    assert_eq!(bpm.pin_count(&file, PageId::new(1)), Some(0));

    bpm.read_page(&file, PageId::new(2)).unwrap();

    assert_eq!(mem.write_log(), vec![PageId::new(1)]);
    assert_eq!(mem.reads(), 2);
    assert!(bpm.is_resident(&file, PageId::new(2)));
    assert!(!bpm.is_resident(&file, PageId::new(1)));
}

/// Data written through a handle survives eviction and comes back on re-read.
#[test]
fn test_round_trip_through_eviction() {
    let (_mem, file) = create_file("f", 0);
    let mut bpm = BufferManager::new(2);

    let mut page_ids = vec![];
    for i in 0u8..6 {
        let (page_id, handle) = bpm.allocate_page(&file).unwrap();
        let page = bpm.page_mut(&handle).unwrap();
        page.data_mut()[0] = i;
        page.data_mut()[1] = i.wrapping_mul(3);
        bpm.unpin_page(&file, page_id, true).unwrap();
        page_ids.push(page_id);
    }
    assert!(bpm.stats().evictions >= 4);

    for (i, &page_id) in page_ids.iter().enumerate() {
        let handle = bpm.read_page(&file, page_id).unwrap();
        let page = bpm.page(&handle).unwrap();
        assert_eq!(page.data()[0], i as u8);
        assert_eq!(page.data()[1], (i as u8).wrapping_mul(3));
        bpm.unpin_page(&file, page_id, false).unwrap();
    }
}

// ============================================================================
// Pins
// ============================================================================

/// Two reads pin twice; one unpin leaves the page resident and pinned.
#[test]
fn test_double_read_double_pin() {
    let (mem, file) = create_file("f", 2);
    let mut bpm = BufferManager::new(2);

    bpm.read_page(&file, PageId::new(1)).unwrap();
    bpm.read_page(&file, PageId::new(1)).unwrap();
    assert_eq!(bpm.pin_count(&file, PageId::new(1)), Some(2));
    assert_eq!(mem.reads(), 1);

    bpm.unpin_page(&file, PageId::new(1), false).unwrap();
    assert_eq!(bpm.pin_count(&file, PageId::new(1)), Some(1));
    assert!(bpm.is_resident(&file, PageId::new(1)));
}

/// Unpinning twice after a single read is a caller bug and is reported.
#[test]
fn test_double_unpin_fails() {
    let (_mem, file) = create_file("f", 1);
    let mut bpm = BufferManager::new(2);

    bpm.read_page(&file, PageId::new(0)).unwrap();
    bpm.unpin_page(&file, PageId::new(0), false).unwrap();

    let err = bpm.unpin_page(&file, PageId::new(0), false).unwrap_err();
    assert!(matches!(err, Error::PageNotPinned { .. }));
    assert!(err.to_string().contains("is not pinned"));
}

/// Unpinning a page that was never loaded changes nothing.
#[test]
fn test_unpin_non_resident_is_silent() {
    let (_mem, file) = create_file("f", 3);
    let mut bpm = BufferManager::new(2);
    bpm.read_page(&file, PageId::new(0)).unwrap();
    let before = bpm.introspect();

    for _ in 0..3 {
        bpm.unpin_page(&file, PageId::new(2), true).unwrap();
    }

    assert_eq!(bpm.introspect(), before);
}

// ============================================================================
// Flush and dispose
// ============================================================================

/// A pinned page stops the flush; frames visited before it stay flushed.
#[test]
fn test_flush_file_stops_at_pinned_page() {
    let (mem, file) = create_file("f", 3);
    let mut bpm = BufferManager::new(3);

    for p in 0..3 {
        bpm.read_page(&file, PageId::new(p)).unwrap();
    }
    let pinned_frame = bpm.frame_of(&file, PageId::new(2)).unwrap();
    bpm.unpin_page(&file, PageId::new(0), true).unwrap();
    bpm.unpin_page(&file, PageId::new(1), true).unwrap();

    let err = bpm.flush_file(&file).unwrap_err();
    assert!(matches!(err, Error::PagePinned { frame, .. } if frame == pinned_frame));

    // Pages in frames before the pinned one were written and dropped; pages
    // after it are untouched.
    for p in 0..2 {
        let page_id = PageId::new(p);
        let frame_before = bpm.frame_of(&file, page_id);
        match frame_before {
            Some(frame) => assert!(frame > pinned_frame),
            None => assert!(mem.write_log().contains(&page_id)),
        }
    }
    assert!(bpm.is_resident(&file, PageId::new(2)));

    // Once the last pin is released the flush completes.
    bpm.unpin_page(&file, PageId::new(2), false).unwrap();
    bpm.flush_file(&file).unwrap();
    assert_eq!(bpm.resident_pages(), 0);
    assert_eq!(mem.writes(), 2);
}

/// Flushing one file leaves other files' pages alone.
#[test]
fn test_flush_file_only_touches_its_file() {
    let (_a_mem, a) = create_file("a", 2);
    let (_b_mem, b) = create_file("b", 2);
    let mut bpm = BufferManager::new(4);

    for p in 0..2 {
        bpm.read_page(&a, PageId::new(p)).unwrap();
        bpm.unpin_page(&a, PageId::new(p), false).unwrap();
        bpm.read_page(&b, PageId::new(p)).unwrap();
    }

    bpm.flush_file(&a).unwrap();

    assert_eq!(bpm.resident_pages(), 2);
    assert!(bpm.is_resident(&b, PageId::new(0)));
    assert!(bpm.is_resident(&b, PageId::new(1)));
}

/// Disposal ignores pins, drops the frame and deletes from the file.
#[test]
fn test_dispose_pinned_page() {
    let (mem, file) = create_file("f", 2);
    let mut bpm = BufferManager::new(2);

    bpm.read_page(&file, PageId::new(1)).unwrap();
    bpm.unpin_page(&file, PageId::new(1), true).unwrap();
    bpm.read_page(&file, PageId::new(1)).unwrap();

    bpm.dispose_page(&file, PageId::new(1)).unwrap();

    assert!(!bpm.is_resident(&file, PageId::new(1)));
    assert_eq!(bpm.introspect().valid_frames, 0);
    assert!(!mem.contains(PageId::new(1)));
    // Dirty contents of a disposed page are discarded, not written.
    assert_eq!(mem.writes(), 0);
}

/// Disposing a page the file does not have reports the file's error.
#[test]
fn test_dispose_missing_page_propagates() {
    let (_mem, file) = create_file("f", 1);
    let mut bpm = BufferManager::new(2);

    let result = bpm.dispose_page(&file, PageId::new(5));
    assert!(matches!(result, Err(Error::PageNotFound(_))));
}

// ============================================================================
// Clock fairness
// ============================================================================

/// Unpinned pages loaded in sequence are evicted in the same sequence.
#[test]
fn test_clock_evicts_in_load_order() {
    let (_mem, file) = create_file("f", 6);
    let mut bpm = BufferManager::new(3);

    for p in 0..3 {
        bpm.read_page(&file, PageId::new(p)).unwrap();
        bpm.unpin_page(&file, PageId::new(p), false).unwrap();
    }

    for (incoming, evicted) in [(3, 0), (4, 1), (5, 2)] {
        bpm.read_page(&file, PageId::new(incoming)).unwrap();
        bpm.unpin_page(&file, PageId::new(incoming), false).unwrap();
        assert!(!bpm.is_resident(&file, PageId::new(evicted)));
    }
}

/// A failed scan leaves the hand where it stopped, not where it started.
#[test]
fn test_failed_scan_keeps_hand_position() {
    let (_mem, file) = create_file("f", 4);
    let mut bpm = BufferManager::new(3);
    assert_eq!(bpm.clock_hand(), FrameId::new(2));

    for p in 0..3 {
        bpm.read_page(&file, PageId::new(p)).unwrap();
    }
    // Hit every page once more so all reference bits are set.
    for p in 0..3 {
        bpm.read_page(&file, PageId::new(p)).unwrap();
        bpm.unpin_page(&file, PageId::new(p), false).unwrap();
    }
    let hand = bpm.clock_hand();

    assert!(matches!(
        bpm.read_page(&file, PageId::new(3)),
        Err(Error::PoolExhausted)
    ));
    // One lap clears reference bits, one lap counts pins: back where it began.
    assert_eq!(bpm.clock_hand(), hand);
    assert!(bpm.introspect().frames.iter().all(|f| !f.ref_bit));
}

/// A recently referenced page gets a second chance over an unreferenced one.
#[test]
fn test_second_chance_protects_referenced_page() {
    let (_mem, file) = create_file("f", 4);
    let mut bpm = BufferManager::new(2);

    bpm.read_page(&file, PageId::new(0)).unwrap();
    bpm.read_page(&file, PageId::new(1)).unwrap();
    bpm.unpin_page(&file, PageId::new(0), false).unwrap();
    bpm.unpin_page(&file, PageId::new(1), false).unwrap();

    // Touch page 0 again so its reference bit is set.
    bpm.read_page(&file, PageId::new(0)).unwrap();
    bpm.unpin_page(&file, PageId::new(0), false).unwrap();

    bpm.read_page(&file, PageId::new(2)).unwrap();
    assert!(bpm.is_resident(&file, PageId::new(0)));
    assert!(!bpm.is_resident(&file, PageId::new(1)));
}

// ============================================================================
// Guards and introspection
// ============================================================================

/// Mutating through a guard marks the page dirty when the guard drops.
#[test]
fn test_guard_unpins_and_marks_dirty() {
    let (mem, file) = create_file("f", 1);
    let mut bpm = BufferManager::new(2);

    {
        let mut page = bpm.fetch_page(&file, PageId::new(0)).unwrap();
        assert_eq!(page.manager().pin_count(&file, PageId::new(0)), Some(1));
        page.data_mut()[0] = 0x99;
    }
    assert_eq!(bpm.pin_count(&file, PageId::new(0)), Some(0));
    assert_eq!(bpm.introspect().dirty_frames(), 1);

    {
        let page = bpm.fetch_page(&file, PageId::new(0)).unwrap();
        assert_eq!(page.data()[0], 0x99);
    }

    bpm.flush_file(&file).unwrap();
    assert_eq!(mem.stored_data(PageId::new(0)).unwrap()[0], 0x99);
}

/// The report lists every frame and counts the valid ones.
#[test]
fn test_introspect_counts_valid_frames() {
    let (_mem, file) = create_file("f", 2);
    let mut bpm = BufferManager::new(4);
    bpm.read_page(&file, PageId::new(0)).unwrap();
    bpm.read_page(&file, PageId::new(1)).unwrap();
    bpm.read_page(&file, PageId::new(1)).unwrap();

    let report = bpm.introspect();
    assert_eq!(report.frames.len(), 4);
    assert_eq!(report.valid_frames, 2);
    assert_eq!(report.total_pins(), 3);
    assert!(report.to_string().ends_with("Total Number of Valid Frames:2"));
}
